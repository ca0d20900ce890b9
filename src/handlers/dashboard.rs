// src/handlers/dashboard.rs

use crate::{
    errors::AppResult,
    models::{DashboardSummary, Department, DepartmentServices, FinancialSummary},
    services::aggregation::client_notes,
    state::AppState,
};
use axum::{Json, extract::State};

/// Business totals and the notes recorded against each client
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Dashboard totals", body = DashboardSummary),
        (status = 503, description = "Document store unavailable"),
    ),
    tag = "Dashboard"
)]
pub async fn get_dashboard(State(state): State<AppState>) -> AppResult<Json<DashboardSummary>> {
    let (clients, incomes, expenses) = tokio::try_join!(
        state.repo.list_clients(),
        state.repo.list_incomes(),
        state.repo.list_expenses(),
    )?;

    Ok(Json(DashboardSummary {
        totals: FinancialSummary::compute(&clients, &incomes, &expenses),
        client_notes: client_notes(&clients),
    }))
}

/// Departments and the services each offers
#[utoipa::path(
    get,
    path = "/api/v1/catalog/services",
    responses(
        (status = 200, description = "Service catalog", body = Vec<DepartmentServices>),
    ),
    tag = "Dashboard"
)]
pub async fn list_services() -> Json<Vec<DepartmentServices>> {
    Json(
        Department::ALL
            .into_iter()
            .map(|department| DepartmentServices {
                department,
                services: department.services().iter().map(|s| s.to_string()).collect(),
            })
            .collect(),
    )
}
