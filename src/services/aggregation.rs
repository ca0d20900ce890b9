// src/services/aggregation.rs

use crate::models::{Client, ClientNote, Employee, Expense, FinancialSummary, Income, SortOrder};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::cmp::Ordering;

/// Records that can be listed by name.
pub trait Named {
    fn name(&self) -> Option<&str>;
}

/// Records that carry a calendar date.
pub trait Dated {
    fn date(&self) -> Option<NaiveDate>;
}

impl Named for Client {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Named for Employee {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Dated for Income {
    fn date(&self) -> Option<NaiveDate> {
        self.date
    }
}

impl Dated for Expense {
    fn date(&self) -> Option<NaiveDate> {
        self.date
    }
}

// ─── Totals ───────────────────────────────────────────────────────────────────
//
// Amounts were already coerced when the documents were read, so a malformed
// value arrives here as zero.

pub fn total_revenue(clients: &[Client]) -> Decimal {
    clients.iter().map(|c| c.total_payment).sum()
}

pub fn total_income(incomes: &[Income]) -> Decimal {
    incomes.iter().map(|i| i.amount).sum()
}

pub fn total_expense(expenses: &[Expense]) -> Decimal {
    expenses.iter().map(|e| e.amount).sum()
}

impl FinancialSummary {
    pub fn compute(clients: &[Client], incomes: &[Income], expenses: &[Expense]) -> Self {
        let total_revenue = total_revenue(clients);
        let total_income = total_income(incomes);
        let total_expense = total_expense(expenses);

        FinancialSummary {
            total_revenue,
            total_income,
            total_expense,
            total_profit: total_income - total_expense,
            total_pending: total_revenue - total_income,
        }
    }
}

/// Dashboard notes, one per client, in store order.
pub fn client_notes(clients: &[Client]) -> Vec<ClientNote> {
    clients
        .iter()
        .map(|c| ClientNote {
            id: c.id.clone(),
            name: c.name.clone().unwrap_or_else(|| "Unknown".to_string()),
            notes: c
                .notes
                .clone()
                .unwrap_or_else(|| "No notes available".to_string()),
        })
        .collect()
}

// ─── Per Client ───────────────────────────────────────────────────────────────

/// Sum of every income referring to the client by id or by name.
pub fn paid_amount(client: &Client, incomes: &[Income]) -> Decimal {
    incomes
        .iter()
        .filter(|i| i.references(client))
        .map(|i| i.amount)
        .sum()
}

/// Negative when the client has overpaid.
pub fn pending_amount(client: &Client, incomes: &[Income]) -> Decimal {
    client.total_payment - paid_amount(client, incomes)
}

/// Newest first.
pub fn client_payment_history(client: &Client, incomes: &[Income]) -> Vec<Income> {
    let mut payments: Vec<Income> = incomes
        .iter()
        .filter(|i| i.references(client))
        .cloned()
        .collect();
    sort_by_date_desc(&mut payments);
    payments
}

/// Newest first.
pub fn client_expense_history(client: &Client, expenses: &[Expense]) -> Vec<Expense> {
    let mut history: Vec<Expense> = expenses
        .iter()
        .filter(|e| e.is_for_client(client))
        .cloned()
        .collect();
    sort_by_date_desc(&mut history);
    history
}

/// Resolves the client's employee references. Dangling ids are skipped.
pub fn assigned_employees(client: &Client, employees: &[Employee]) -> Vec<Employee> {
    employees
        .iter()
        .filter(|e| client.has_employee(&e.id))
        .cloned()
        .collect()
}

// ─── Per Employee ─────────────────────────────────────────────────────────────

pub fn assigned_clients(employee: &Employee, clients: &[Client]) -> Vec<Client> {
    clients
        .iter()
        .filter(|c| c.has_employee(&employee.id))
        .cloned()
        .collect()
}

/// Newest first.
pub fn expense_history(employee: &Employee, expenses: &[Expense]) -> Vec<Expense> {
    let mut history: Vec<Expense> = expenses
        .iter()
        .filter(|e| e.is_for_employee(employee))
        .cloned()
        .collect();
    sort_by_date_desc(&mut history);
    history
}

/// Employees holding at least one of the selected sub-services. Nobody is
/// eligible until a sub-service is selected.
pub fn eligible_employees(sub_services: &[String], employees: &[Employee]) -> Vec<Employee> {
    if sub_services.is_empty() {
        return Vec::new();
    }
    employees
        .iter()
        .filter(|e| e.role.iter().any(|r| sub_services.contains(r)))
        .cloned()
        .collect()
}

// ─── Ordering ─────────────────────────────────────────────────────────────────

fn name_key<T: Named>(record: &T) -> String {
    record.name().unwrap_or_default().to_lowercase()
}

/// Case-insensitive, stable. A missing name sorts as the empty string.
pub fn sort_by_name<T: Named>(records: &mut [T], order: SortOrder) {
    records.sort_by(|a, b| {
        let ord = name_key(a).cmp(&name_key(b));
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

/// Most recent first, stable for equal dates. Undated records go last.
pub fn sort_by_date_desc<T: Dated>(records: &mut [T]) {
    records.sort_by(|a, b| match (a.date(), b.date()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
