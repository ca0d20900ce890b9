// src/handlers/expense.rs

use crate::{
    errors::AppResult,
    models::{Created, Expense, ExpenseForm},
    services::{aggregation, validation},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

/// List expenses, newest first
#[utoipa::path(
    get,
    path = "/api/v1/expenses",
    responses(
        (status = 200, description = "List of expenses", body = Vec<Expense>),
        (status = 503, description = "Document store unavailable"),
    ),
    tag = "Expenses"
)]
pub async fn list_expenses(State(state): State<AppState>) -> AppResult<Json<Vec<Expense>>> {
    let mut expenses = state.repo.list_expenses().await?;
    aggregation::sort_by_date_desc(&mut expenses);
    Ok(Json(expenses))
}

/// Record an expense against a client, an employee, or neither
#[utoipa::path(
    post,
    path = "/api/v1/expenses",
    request_body = ExpenseForm,
    responses(
        (status = 201, description = "Expense recorded", body = Created),
        (status = 422, description = "Invalid form"),
    ),
    tag = "Expenses"
)]
pub async fn create_expense(
    State(state): State<AppState>,
    Json(body): Json<ExpenseForm>,
) -> AppResult<(StatusCode, Json<Created>)> {
    let expense = validation::expense(body, &state.date_window())?;
    let id = state.repo.create(&expense).await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

/// Get a single expense
#[utoipa::path(
    get,
    path = "/api/v1/expenses/{expense_id}",
    params(("expense_id" = String, Path, description = "Expense ID")),
    responses(
        (status = 200, description = "Expense detail", body = Expense),
        (status = 404, description = "Expense not found"),
    ),
    tag = "Expenses"
)]
pub async fn get_expense(
    State(state): State<AppState>,
    Path(expense_id): Path<String>,
) -> AppResult<Json<Expense>> {
    Ok(Json(state.repo.get_expense(&expense_id).await?))
}

/// Replace every field of an expense
#[utoipa::path(
    put,
    path = "/api/v1/expenses/{expense_id}",
    request_body = ExpenseForm,
    params(("expense_id" = String, Path, description = "Expense ID")),
    responses(
        (status = 200, description = "Expense updated", body = Expense),
        (status = 404, description = "Expense not found"),
        (status = 422, description = "Invalid form"),
    ),
    tag = "Expenses"
)]
pub async fn update_expense(
    State(state): State<AppState>,
    Path(expense_id): Path<String>,
    Json(body): Json<ExpenseForm>,
) -> AppResult<Json<Expense>> {
    let mut expense = validation::expense(body, &state.date_window())?;
    state.repo.update(&expense_id, &expense).await?;
    expense.id = expense_id;
    Ok(Json(expense))
}

/// Delete an expense
#[utoipa::path(
    delete,
    path = "/api/v1/expenses/{expense_id}",
    params(("expense_id" = String, Path, description = "Expense ID")),
    responses(
        (status = 204, description = "Expense deleted"),
        (status = 503, description = "Document store unavailable"),
    ),
    tag = "Expenses"
)]
pub async fn delete_expense(
    State(state): State<AppState>,
    Path(expense_id): Path<String>,
) -> AppResult<StatusCode> {
    state.repo.delete::<Expense>(&expense_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
