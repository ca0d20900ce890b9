// src/handlers/client.rs

use crate::{
    errors::AppResult,
    models::{CascadeReport, Client, ClientDetail, ClientForm, Created, ListQuery},
    services::{aggregation, validation},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};

/// List clients ordered by name
#[utoipa::path(
    get,
    path = "/api/v1/clients",
    params(ListQuery),
    responses(
        (status = 200, description = "List of clients", body = Vec<Client>),
        (status = 422, description = "Malformed query string"),
        (status = 503, description = "Document store unavailable"),
    ),
    tag = "Clients"
)]
pub async fn list_clients(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> AppResult<Json<Vec<Client>>> {
    let Query(query) = query?;
    let mut clients = state.repo.list_clients().await?;
    aggregation::sort_by_name(&mut clients, query.order.unwrap_or_default());
    Ok(Json(clients))
}

/// Add a client. A positive paid amount is also recorded as an initial payment.
#[utoipa::path(
    post,
    path = "/api/v1/clients",
    request_body = ClientForm,
    responses(
        (status = 201, description = "Client created", body = Created),
        (status = 422, description = "Invalid form"),
        (status = 503, description = "Document store unavailable"),
    ),
    tag = "Clients"
)]
pub async fn create_client(
    State(state): State<AppState>,
    Json(body): Json<ClientForm>,
) -> AppResult<(StatusCode, Json<Created>)> {
    let client = validation::client(body, &state.date_window())?;
    let id = state.coordinator.create_client(&client).await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

/// Client card: assigned employees, paid and pending amounts, payment and expense history
#[utoipa::path(
    get,
    path = "/api/v1/clients/{client_id}",
    params(("client_id" = String, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client detail", body = ClientDetail),
        (status = 404, description = "Client not found"),
        (status = 503, description = "Document store unavailable"),
    ),
    tag = "Clients"
)]
pub async fn get_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> AppResult<Json<ClientDetail>> {
    let client = state.repo.get_client(&client_id).await?;
    let (employees, incomes, expenses) = tokio::try_join!(
        state.repo.list_employees(),
        state.repo.list_incomes(),
        state.repo.list_expenses(),
    )?;

    Ok(Json(ClientDetail {
        assigned_employees: aggregation::assigned_employees(&client, &employees),
        paid_amount: aggregation::paid_amount(&client, &incomes),
        pending_amount: aggregation::pending_amount(&client, &incomes),
        payments: aggregation::client_payment_history(&client, &incomes),
        expenses: aggregation::client_expense_history(&client, &expenses),
        client,
    }))
}

/// Replace every field of a client
#[utoipa::path(
    put,
    path = "/api/v1/clients/{client_id}",
    request_body = ClientForm,
    params(("client_id" = String, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client updated", body = Client),
        (status = 404, description = "Client not found"),
        (status = 422, description = "Invalid form"),
    ),
    tag = "Clients"
)]
pub async fn update_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Json(body): Json<ClientForm>,
) -> AppResult<Json<Client>> {
    let mut client = validation::client(body, &state.date_window())?;
    state.repo.update(&client_id, &client).await?;
    client.id = client_id;
    Ok(Json(client))
}

/// Delete a client together with its incomes and expenses
#[utoipa::path(
    delete,
    path = "/api/v1/clients/{client_id}",
    params(("client_id" = String, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client and dependents deleted", body = CascadeReport),
        (status = 404, description = "Client not found"),
        (status = 502, description = "Some dependent deletes failed; client kept"),
    ),
    tag = "Clients"
)]
pub async fn delete_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> AppResult<Json<CascadeReport>> {
    let client = state.repo.get_client(&client_id).await?;
    let report = state.coordinator.delete_client(&client).await?;
    Ok(Json(report))
}
