// src/handlers/employee.rs

use crate::{
    errors::AppResult,
    models::{CascadeReport, Created, Employee, EmployeeDetail, EmployeeForm, ListQuery},
    services::{aggregation, validation},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};

/// List employees ordered by name, optionally only those able to deliver the given services
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(ListQuery),
    responses(
        (status = 200, description = "List of employees", body = Vec<Employee>),
        (status = 422, description = "Malformed query string"),
        (status = 503, description = "Document store unavailable"),
    ),
    tag = "Employees"
)]
pub async fn list_employees(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> AppResult<Json<Vec<Employee>>> {
    let Query(query) = query?;
    let mut employees = state.repo.list_employees().await?;

    if let Some(services) = query.services.as_deref() {
        let selected: Vec<String> = services
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        employees = aggregation::eligible_employees(&selected, &employees);
    }

    aggregation::sort_by_name(&mut employees, query.order.unwrap_or_default());
    Ok(Json(employees))
}

/// Onboard a new employee
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = EmployeeForm,
    responses(
        (status = 201, description = "Employee created", body = Created),
        (status = 422, description = "Invalid form"),
        (status = 503, description = "Document store unavailable"),
    ),
    tag = "Employees"
)]
pub async fn create_employee(
    State(state): State<AppState>,
    Json(body): Json<EmployeeForm>,
) -> AppResult<(StatusCode, Json<Created>)> {
    let employee = validation::employee(body, &state.date_window())?;
    let id = state.repo.create(&employee).await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

/// Get an employee with the clients they serve and their expenses
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id" = String, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee detail", body = EmployeeDetail),
        (status = 404, description = "Employee not found"),
    ),
    tag = "Employees"
)]
pub async fn get_employee(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
) -> AppResult<Json<EmployeeDetail>> {
    let employee = state.repo.get_employee(&employee_id).await?;
    let (clients, expenses) =
        tokio::try_join!(state.repo.list_clients(), state.repo.list_expenses())?;

    Ok(Json(EmployeeDetail {
        assigned_clients: aggregation::assigned_clients(&employee, &clients),
        expenses: aggregation::expense_history(&employee, &expenses),
        employee,
    }))
}

/// Replace every field of an employee
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}",
    request_body = EmployeeForm,
    params(("employee_id" = String, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 404, description = "Employee not found"),
        (status = 422, description = "Invalid form"),
    ),
    tag = "Employees"
)]
pub async fn update_employee(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    Json(body): Json<EmployeeForm>,
) -> AppResult<Json<Employee>> {
    let mut employee = validation::employee(body, &state.date_window())?;
    state.repo.update(&employee_id, &employee).await?;
    employee.id = employee_id;
    Ok(Json(employee))
}

/// Delete an employee, their expenses, and their client assignments
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id" = String, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee and dependents updated", body = CascadeReport),
        (status = 404, description = "Employee not found"),
        (status = 502, description = "Some dependent writes failed; employee kept"),
    ),
    tag = "Employees"
)]
pub async fn delete_employee(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
) -> AppResult<Json<CascadeReport>> {
    let employee = state.repo.get_employee(&employee_id).await?;
    let report = state.coordinator.delete_employee(&employee).await?;
    Ok(Json(report))
}
