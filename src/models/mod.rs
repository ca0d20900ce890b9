// src/models/mod.rs

use crate::store::{Collection, Document, Fields};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::{IntoParams, ToSchema};

pub mod document;

use document::{Record, amount, date, put_amount, put_date, put_set, put_text, string_set, text};

// ─── Service Catalog ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Department {
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "Software Development")]
    SoftwareDevelopment,
}

impl Department {
    pub const ALL: [Department; 2] = [Department::WebDevelopment, Department::SoftwareDevelopment];

    pub fn label(self) -> &'static str {
        match self {
            Department::WebDevelopment => "Web Development",
            Department::SoftwareDevelopment => "Software Development",
        }
    }

    /// Services offered by the department; also the roles its employees hold.
    pub fn services(self) -> &'static [&'static str] {
        match self {
            Department::WebDevelopment => &[
                "Frontend Development",
                "Backend Development",
                "Fullstack Development",
                "E-commerce Development",
                "CMS Development",
            ],
            Department::SoftwareDevelopment => &[
                "Desktop Applications",
                "Custom Software (ERP/CRM)",
                "API & Integrations",
            ],
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.label() == label.trim())
    }

    pub fn offers(self, service: &str) -> bool {
        self.services().contains(&service)
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DepartmentServices {
    pub department: Department,
    pub services: Vec<String>,
}

// ─── Client ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct Client {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub main_service: Option<String>,
    pub sub_services: Vec<String>,
    /// Weak references to employee ids; never contains duplicates.
    pub assigned_employees: Vec<String>,
    pub notes: Option<String>,
    pub total_payment: Decimal,
    /// Seed value captured at creation. The real paid amount is derived from incomes.
    pub paid_amount: Decimal,
    pub added_date: Option<NaiveDate>,
}

impl Client {
    pub fn has_employee(&self, employee_id: &str) -> bool {
        self.assigned_employees.iter().any(|e| e == employee_id)
    }

    /// The assignment set with one employee reference removed.
    pub fn assignments_without(&self, employee_id: &str) -> Vec<String> {
        self.assigned_employees
            .iter()
            .filter(|e| *e != employee_id)
            .cloned()
            .collect()
    }
}

impl Record for Client {
    const COLLECTION: Collection = Collection::Clients;

    fn from_document(doc: Document) -> Self {
        Client {
            name: text(&doc, "name"),
            email: text(&doc, "email"),
            phone: text(&doc, "phone"),
            address: text(&doc, "address"),
            main_service: text(&doc, "mainService"),
            sub_services: string_set(&doc, "subServices"),
            assigned_employees: string_set(&doc, "assignedEmployees"),
            notes: text(&doc, "notes"),
            total_payment: amount(&doc, "totalPayment"),
            paid_amount: amount(&doc, "paidAmount"),
            added_date: date(&doc, "addedDate"),
            id: doc.id,
        }
    }

    fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        put_text(&mut fields, "name", &self.name);
        put_text(&mut fields, "email", &self.email);
        put_text(&mut fields, "phone", &self.phone);
        put_text(&mut fields, "address", &self.address);
        put_text(&mut fields, "mainService", &self.main_service);
        put_set(&mut fields, "subServices", &self.sub_services);
        put_set(&mut fields, "assignedEmployees", &self.assigned_employees);
        put_text(&mut fields, "notes", &self.notes);
        put_amount(&mut fields, "totalPayment", self.total_payment);
        put_amount(&mut fields, "paidAmount", self.paid_amount);
        put_date(&mut fields, "addedDate", self.added_date);
        fields
    }
}

// ─── Employee ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct Employee {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<Department>,
    pub role: Vec<String>,
    pub salary: Decimal,
    pub date_of_join: Option<NaiveDate>,
}

impl Record for Employee {
    const COLLECTION: Collection = Collection::Employees;

    fn from_document(doc: Document) -> Self {
        Employee {
            name: text(&doc, "name"),
            email: text(&doc, "email"),
            phone: text(&doc, "phone"),
            department: text(&doc, "department").and_then(|d| Department::from_label(&d)),
            role: string_set(&doc, "role"),
            // Older employee documents hold the salary as a string.
            salary: amount(&doc, "salary"),
            date_of_join: date(&doc, "dateOfJoin"),
            id: doc.id,
        }
    }

    fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        put_text(&mut fields, "name", &self.name);
        put_text(&mut fields, "email", &self.email);
        put_text(&mut fields, "phone", &self.phone);
        put_text(
            &mut fields,
            "department",
            &self.department.map(|d| d.label().to_string()),
        );
        put_set(&mut fields, "role", &self.role);
        put_amount(&mut fields, "salary", self.salary);
        put_date(&mut fields, "dateOfJoin", self.date_of_join);
        fields
    }
}

// ─── Client References ────────────────────────────────────────────────────────

/// How an income points at its client. Older income documents carry only the
/// client's name; newer ones carry the id as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientRef {
    ById(String),
    ByName(String),
}

impl ClientRef {
    /// Blank ids and names never match anything.
    pub fn matches(&self, client: &Client) -> bool {
        match self {
            ClientRef::ById(id) => !id.is_empty() && *id == client.id,
            ClientRef::ByName(name) => client.name.as_deref() == Some(name.as_str()),
        }
    }
}

// ─── Income ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct Income {
    pub id: String,
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

impl Income {
    pub fn client_refs(&self) -> Vec<ClientRef> {
        let by_id = self.client_id.clone().map(ClientRef::ById);
        let by_name = self.client_name.clone().map(ClientRef::ByName);
        by_id.into_iter().chain(by_name).collect()
    }

    /// True when either reference points at the client. An income carrying
    /// both still refers to it once.
    pub fn references(&self, client: &Client) -> bool {
        self.client_refs().iter().any(|r| r.matches(client))
    }
}

impl Record for Income {
    const COLLECTION: Collection = Collection::Incomes;

    fn from_document(doc: Document) -> Self {
        Income {
            client_id: text(&doc, "clientId"),
            client_name: text(&doc, "clientName"),
            amount: amount(&doc, "amount"),
            description: text(&doc, "description"),
            date: date(&doc, "date"),
            id: doc.id,
        }
    }

    fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        if self.client_id.is_some() {
            put_text(&mut fields, "clientId", &self.client_id);
        }
        put_text(&mut fields, "clientName", &self.client_name);
        put_amount(&mut fields, "amount", self.amount);
        put_text(&mut fields, "description", &self.description);
        put_date(&mut fields, "date", self.date);
        fields
    }
}

// ─── Expense ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ExpenseType {
    Client,
    Employee,
    Other,
}

impl ExpenseType {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Client" => Some(ExpenseType::Client),
            "Employee" => Some(ExpenseType::Employee),
            "Other" => Some(ExpenseType::Other),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExpenseType::Client => "Client",
            ExpenseType::Employee => "Employee",
            ExpenseType::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct Expense {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: Option<ExpenseType>,
    pub client_name: Option<String>,
    pub employee_name: Option<String>,
    pub description: Option<String>,
    pub amount: Decimal,
    pub date: Option<NaiveDate>,
}

impl Expense {
    pub fn is_for_client(&self, client: &Client) -> bool {
        self.client_name.is_some() && self.client_name == client.name
    }

    pub fn is_for_employee(&self, employee: &Employee) -> bool {
        self.employee_name.is_some() && self.employee_name == employee.name
    }
}

impl Record for Expense {
    const COLLECTION: Collection = Collection::Expenses;

    fn from_document(doc: Document) -> Self {
        Expense {
            kind: text(&doc, "type").and_then(|t| ExpenseType::from_label(&t)),
            client_name: text(&doc, "clientName"),
            employee_name: text(&doc, "employeeName"),
            description: text(&doc, "description"),
            amount: amount(&doc, "amount"),
            date: date(&doc, "date"),
            id: doc.id,
        }
    }

    fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        put_text(
            &mut fields,
            "type",
            &self.kind.map(|k| k.label().to_string()),
        );
        put_text(&mut fields, "clientName", &self.client_name);
        put_text(&mut fields, "employeeName", &self.employee_name);
        put_text(&mut fields, "description", &self.description);
        put_amount(&mut fields, "amount", self.amount);
        put_date(&mut fields, "date", self.date);
        fields
    }
}

// ─── Forms ────────────────────────────────────────────────────────────────────
//
// Request bodies for the add and edit screens. Every field is optional at the
// JSON level so missing input is reported as a validation failure rather than
// a deserialization rejection.

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct ClientForm {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub main_service: String,
    pub sub_services: Vec<String>,
    pub assigned_employees: Vec<String>,
    pub notes: Option<String>,
    pub total_payment: Option<Decimal>,
    /// Seed payment; a positive value also records an "Initial Payment" income on create.
    pub paid_amount: Option<Decimal>,
    /// Defaults to today.
    pub added_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct EmployeeForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date_of_join: Option<NaiveDate>,
    pub department: String,
    pub role: Vec<String>,
    pub salary: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct IncomeForm {
    /// Preferred reference. When only a name is given it is resolved to an id.
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    pub amount: Option<Decimal>,
    pub description: String,
    /// Defaults to today.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct ExpenseForm {
    #[serde(rename = "type")]
    pub kind: String,
    pub client_name: Option<String>,
    pub employee_name: Option<String>,
    pub description: String,
    pub amount: Option<Decimal>,
    /// Defaults to today.
    pub date: Option<NaiveDate>,
}

// ─── Listing ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Name order, `asc` (default) or `desc`.
    pub order: Option<SortOrder>,
    /// Comma-separated sub-services; restricts employees to those holding one of them.
    pub services: Option<String>,
}

// ─── Derived Views ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FinancialSummary {
    pub total_revenue: Decimal,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    /// Income minus expense; negative on overspend.
    pub total_profit: Decimal,
    /// Revenue minus income; negative on overpayment.
    pub total_pending: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClientNote {
    pub id: String,
    pub name: String,
    pub notes: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub totals: FinancialSummary,
    pub client_notes: Vec<ClientNote>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClientDetail {
    pub client: Client,
    pub assigned_employees: Vec<Employee>,
    pub paid_amount: Decimal,
    pub pending_amount: Decimal,
    /// Newest first.
    pub payments: Vec<Income>,
    /// Newest first.
    pub expenses: Vec<Expense>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeDetail {
    pub employee: Employee,
    pub assigned_clients: Vec<Client>,
    /// Newest first.
    pub expenses: Vec<Expense>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Created {
    pub id: String,
}

// ─── Cascade Report ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CascadeAction {
    Delete,
    UnassignEmployee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Done,
    Failed,
    /// Not attempted because an earlier step failed.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CascadeStep {
    pub collection: String,
    pub document_id: String,
    pub action: CascadeAction,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CascadeStep {
    pub fn is_done(&self) -> bool {
        self.status == StepStatus::Done
    }
}

/// Per-step result of a cascading delete. Dependent steps come first, the
/// owning record's deletion last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CascadeReport {
    pub entity: String,
    pub entity_id: String,
    pub steps: Vec<CascadeStep>,
}

impl CascadeReport {
    pub fn succeeded(&self) -> bool {
        self.steps.iter().all(CascadeStep::is_done)
    }

    pub fn failed_steps(&self) -> impl Iterator<Item = &CascadeStep> {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Failed)
    }
}
