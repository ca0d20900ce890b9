// src/handlers/income.rs

use crate::{
    errors::AppResult,
    models::{Created, Income, IncomeForm},
    services::validation,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

/// List incomes in store order
#[utoipa::path(
    get,
    path = "/api/v1/incomes",
    responses(
        (status = 200, description = "List of incomes", body = Vec<Income>),
        (status = 503, description = "Document store unavailable"),
    ),
    tag = "Incomes"
)]
pub async fn list_incomes(State(state): State<AppState>) -> AppResult<Json<Vec<Income>>> {
    Ok(Json(state.repo.list_incomes().await?))
}

/// Record a payment received from a client
#[utoipa::path(
    post,
    path = "/api/v1/incomes",
    request_body = IncomeForm,
    responses(
        (status = 201, description = "Income recorded", body = Created),
        (status = 404, description = "Referenced client not found"),
        (status = 422, description = "Invalid form"),
    ),
    tag = "Incomes"
)]
pub async fn create_income(
    State(state): State<AppState>,
    Json(body): Json<IncomeForm>,
) -> AppResult<(StatusCode, Json<Created>)> {
    let income = validation::income(body, &state.date_window())?;
    let income = state.coordinator.resolve_client(income).await?;
    let id = state.repo.create(&income).await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

/// Get a single income
#[utoipa::path(
    get,
    path = "/api/v1/incomes/{income_id}",
    params(("income_id" = String, Path, description = "Income ID")),
    responses(
        (status = 200, description = "Income detail", body = Income),
        (status = 404, description = "Income not found"),
    ),
    tag = "Incomes"
)]
pub async fn get_income(
    State(state): State<AppState>,
    Path(income_id): Path<String>,
) -> AppResult<Json<Income>> {
    Ok(Json(state.repo.get_income(&income_id).await?))
}

/// Replace every field of an income
#[utoipa::path(
    put,
    path = "/api/v1/incomes/{income_id}",
    request_body = IncomeForm,
    params(("income_id" = String, Path, description = "Income ID")),
    responses(
        (status = 200, description = "Income updated", body = Income),
        (status = 404, description = "Income or referenced client not found"),
        (status = 422, description = "Invalid form"),
    ),
    tag = "Incomes"
)]
pub async fn update_income(
    State(state): State<AppState>,
    Path(income_id): Path<String>,
    Json(body): Json<IncomeForm>,
) -> AppResult<Json<Income>> {
    let income = validation::income(body, &state.date_window())?;
    let mut income = state.coordinator.resolve_client(income).await?;
    state.repo.update(&income_id, &income).await?;
    income.id = income_id;
    Ok(Json(income))
}

/// Delete an income
#[utoipa::path(
    delete,
    path = "/api/v1/incomes/{income_id}",
    params(("income_id" = String, Path, description = "Income ID")),
    responses(
        (status = 204, description = "Income deleted"),
        (status = 503, description = "Document store unavailable"),
    ),
    tag = "Incomes"
)]
pub async fn delete_income(
    State(state): State<AppState>,
    Path(income_id): Path<String>,
) -> AppResult<StatusCode> {
    state.repo.delete::<Income>(&income_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
