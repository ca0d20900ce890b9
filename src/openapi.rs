// src/openapi.rs

use crate::models::{
    CascadeAction, CascadeReport, CascadeStep, Client, ClientDetail, ClientForm, ClientNote,
    Created, DashboardSummary, Department, DepartmentServices, Employee, EmployeeDetail,
    EmployeeForm, Expense, ExpenseForm, ExpenseType, FinancialSummary, Income, IncomeForm,
    SortOrder, StepStatus,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Business Dashboard API",
        version = "0.1.0",
        description = "Back office API for a small services business. Tracks clients, \
            employees, incomes and expenses in a hosted document store, derives revenue, \
            profit and pending totals, and keeps cross-collection references consistent \
            when records are deleted.",
        license(name = "MIT")
    ),
    paths(
        // Dashboard
        crate::handlers::dashboard::get_dashboard,
        crate::handlers::dashboard::list_services,
        // Clients
        crate::handlers::client::list_clients,
        crate::handlers::client::create_client,
        crate::handlers::client::get_client,
        crate::handlers::client::update_client,
        crate::handlers::client::delete_client,
        // Employees
        crate::handlers::employee::list_employees,
        crate::handlers::employee::create_employee,
        crate::handlers::employee::get_employee,
        crate::handlers::employee::update_employee,
        crate::handlers::employee::delete_employee,
        // Incomes
        crate::handlers::income::list_incomes,
        crate::handlers::income::create_income,
        crate::handlers::income::get_income,
        crate::handlers::income::update_income,
        crate::handlers::income::delete_income,
        // Expenses
        crate::handlers::expense::list_expenses,
        crate::handlers::expense::create_expense,
        crate::handlers::expense::get_expense,
        crate::handlers::expense::update_expense,
        crate::handlers::expense::delete_expense,
    ),
    components(
        schemas(
            FinancialSummary, ClientNote, DashboardSummary, Department, DepartmentServices,
            Client, ClientForm, ClientDetail,
            Employee, EmployeeForm, EmployeeDetail,
            Income, IncomeForm,
            Expense, ExpenseForm, ExpenseType,
            SortOrder, Created,
            CascadeReport, CascadeStep, CascadeAction, StepStatus,
        )
    ),
    tags(
        (name = "Dashboard", description = "Business totals and the service catalog"),
        (name = "Clients", description = "Manage clients, their payments and assignments"),
        (name = "Employees", description = "Onboard and manage employees"),
        (name = "Incomes", description = "Payments received from clients"),
        (name = "Expenses", description = "Money spent on clients, employees or overheads"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/dashboard",
            "/api/v1/catalog/services",
            "/api/v1/clients/{client_id}",
            "/api/v1/employees",
            "/api/v1/incomes/{income_id}",
            "/api/v1/expenses",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
