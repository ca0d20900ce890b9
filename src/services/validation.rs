// src/services/validation.rs
//
// Form checks run before any store call. Each validator collects every field
// problem at once and, on success, yields the record to be written.

use crate::{
    errors::{AppError, AppResult, FieldError},
    models::{
        Client, ClientForm, Department, Employee, EmployeeForm, Expense, ExpenseForm,
        ExpenseType, Income, IncomeForm, document::dedup,
    },
};
use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::LazyLock;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"));

static PHONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{10}$").expect("static regex"));

/// Inclusive range of dates accepted on any form.
#[derive(Debug, Clone, Copy)]
pub struct DateWindow {
    pub earliest: NaiveDate,
    pub latest: NaiveDate,
}

impl DateWindow {
    pub fn new(earliest: NaiveDate, latest: NaiveDate) -> Self {
        Self { earliest, latest }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.earliest && date <= self.latest
    }

    fn describe(&self) -> String {
        format!(
            "Date must be between {} and {}",
            self.earliest.format("%d %b %Y"),
            self.latest.format("%d %b %Y")
        )
    }
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn finish<T>(errors: Vec<FieldError>, record: T) -> AppResult<T> {
    if errors.is_empty() {
        Ok(record)
    } else {
        Err(AppError::Validation(errors))
    }
}

fn check_date(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    date: NaiveDate,
    window: &DateWindow,
) {
    if !window.contains(date) {
        errors.push(FieldError::new(field, window.describe()));
    }
}

fn positive_amount(errors: &mut Vec<FieldError>, field: &'static str, amount: Option<Decimal>) -> Decimal {
    match amount {
        Some(a) if a > Decimal::ZERO => a,
        _ => {
            errors.push(FieldError::new(field, "Enter a valid amount"));
            Decimal::ZERO
        }
    }
}

// ─── Client ───────────────────────────────────────────────────────────────────

/// Validates an add/edit client form. The returned record has an empty id.
pub fn client(form: ClientForm, window: &DateWindow) -> AppResult<Client> {
    let mut errors = Vec::new();

    if blank(&form.name) {
        errors.push(FieldError::new("name", "Name is required"));
    }
    if blank(&form.email) {
        errors.push(FieldError::new("email", "Email is required"));
    }

    let sub_services = dedup(form.sub_services.into_iter().map(|s| s.trim().to_string()));
    match Department::from_label(&form.main_service) {
        None if blank(&form.main_service) => {
            errors.push(FieldError::new("main_service", "Main service is required"))
        }
        None => errors.push(FieldError::new(
            "main_service",
            format!("Unknown main service '{}'", form.main_service.trim()),
        )),
        Some(dept) => {
            if let Some(bad) = sub_services.iter().find(|s| !dept.offers(s)) {
                errors.push(FieldError::new(
                    "sub_services",
                    format!("'{}' is not a {} service", bad, dept),
                ));
            }
        }
    }
    if sub_services.is_empty() {
        errors.push(FieldError::new("sub_services", "Select at least one sub service"));
    }

    let total_payment = form.total_payment.unwrap_or(Decimal::ZERO);
    if total_payment < Decimal::ZERO {
        errors.push(FieldError::new("total_payment", "Total payment cannot be negative"));
    }
    let paid_amount = form.paid_amount.unwrap_or(Decimal::ZERO);
    if paid_amount < Decimal::ZERO {
        errors.push(FieldError::new("paid_amount", "Paid amount cannot be negative"));
    }

    let added_date = form.added_date.unwrap_or(window.latest);
    check_date(&mut errors, "added_date", added_date, window);

    finish(
        errors,
        Client {
            id: String::new(),
            name: non_blank(Some(form.name)),
            email: non_blank(Some(form.email)),
            phone: non_blank(form.phone),
            address: non_blank(form.address),
            main_service: non_blank(Some(form.main_service)),
            sub_services,
            assigned_employees: dedup(
                form.assigned_employees
                    .into_iter()
                    .map(|e| e.trim().to_string())
                    .filter(|e| !e.is_empty()),
            ),
            notes: non_blank(form.notes),
            total_payment,
            paid_amount,
            added_date: Some(added_date),
        },
    )
}

// ─── Employee ─────────────────────────────────────────────────────────────────

pub fn employee(form: EmployeeForm, window: &DateWindow) -> AppResult<Employee> {
    let mut errors = Vec::new();

    if blank(&form.name) {
        errors.push(FieldError::new("name", "Name is required"));
    }

    let email = form.email.trim();
    if email.is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !EMAIL.is_match(email) {
        errors.push(FieldError::new("email", "Invalid email format"));
    }

    let phone = form.phone.trim();
    if phone.is_empty() {
        errors.push(FieldError::new("phone", "Phone is required"));
    } else if !PHONE.is_match(phone) {
        errors.push(FieldError::new("phone", "Phone number must be 10 digits"));
    }

    match form.date_of_join {
        None => errors.push(FieldError::new("date_of_join", "Joining date is required")),
        Some(d) if d < window.earliest => errors.push(FieldError::new(
            "date_of_join",
            format!(
                "Joining date cannot be before {}",
                window.earliest.format("%d %B %Y")
            ),
        )),
        Some(d) if d > window.latest => errors.push(FieldError::new(
            "date_of_join",
            "Joining date cannot be in the future",
        )),
        Some(_) => {}
    }

    let role = dedup(form.role.into_iter().map(|r| r.trim().to_string()));
    let department = Department::from_label(&form.department);
    match department {
        None if blank(&form.department) => {
            errors.push(FieldError::new("department", "Department is required"))
        }
        None => errors.push(FieldError::new(
            "department",
            format!("Unknown department '{}'", form.department.trim()),
        )),
        Some(dept) => {
            if let Some(bad) = role.iter().find(|r| !dept.offers(r)) {
                errors.push(FieldError::new(
                    "role",
                    format!("'{}' is not a {} role", bad, dept),
                ));
            }
        }
    }
    if role.is_empty() {
        errors.push(FieldError::new("role", "Select at least one role"));
    }

    let salary = match form.salary {
        None => {
            errors.push(FieldError::new("salary", "Salary is required"));
            Decimal::ZERO
        }
        Some(s) if s <= Decimal::ZERO => {
            errors.push(FieldError::new("salary", "Salary must be positive"));
            s
        }
        Some(s) => s,
    };

    finish(
        errors,
        Employee {
            id: String::new(),
            name: non_blank(Some(form.name)),
            email: non_blank(Some(email.to_string())),
            phone: non_blank(Some(phone.to_string())),
            department,
            role,
            salary,
            date_of_join: form.date_of_join,
        },
    )
}

// ─── Income ───────────────────────────────────────────────────────────────────

/// Checks the form fields. The client reference is returned unresolved; the
/// caller looks it up and fills in both the id and the name.
pub fn income(form: IncomeForm, window: &DateWindow) -> AppResult<Income> {
    let mut errors = Vec::new();

    let date = form.date.unwrap_or(window.latest);
    check_date(&mut errors, "date", date, window);

    let amount = positive_amount(&mut errors, "amount", form.amount);

    let client_id = non_blank(form.client_id);
    let client_name = non_blank(form.client_name);
    if client_id.is_none() && client_name.is_none() {
        errors.push(FieldError::new("client", "Select a client"));
    }

    if blank(&form.description) {
        errors.push(FieldError::new("description", "Description is required"));
    }

    finish(
        errors,
        Income {
            id: String::new(),
            client_id,
            client_name,
            amount,
            description: non_blank(Some(form.description)),
            date: Some(date),
        },
    )
}

// ─── Expense ──────────────────────────────────────────────────────────────────

pub fn expense(form: ExpenseForm, window: &DateWindow) -> AppResult<Expense> {
    let mut errors = Vec::new();

    let kind = ExpenseType::from_label(&form.kind);
    let client_name = non_blank(form.client_name);
    let employee_name = non_blank(form.employee_name);
    match kind {
        None => errors.push(FieldError::new("type", "Select expense type")),
        Some(ExpenseType::Client) if client_name.is_none() => {
            errors.push(FieldError::new("client_name", "Select client"))
        }
        Some(ExpenseType::Employee) if employee_name.is_none() => {
            errors.push(FieldError::new("employee_name", "Select employee"))
        }
        Some(_) => {}
    }

    if blank(&form.description) {
        errors.push(FieldError::new("description", "Description is required"));
    }

    let amount = positive_amount(&mut errors, "amount", form.amount);

    let date = form.date.unwrap_or(window.latest);
    check_date(&mut errors, "date", date, window);

    // Only the name matching the expense type is kept.
    finish(
        errors,
        Expense {
            id: String::new(),
            kind,
            client_name: client_name.filter(|_| kind == Some(ExpenseType::Client)),
            employee_name: employee_name.filter(|_| kind == Some(ExpenseType::Employee)),
            description: non_blank(Some(form.description)),
            amount,
            date: Some(date),
        },
    )
}
