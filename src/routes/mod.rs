// src/routes/mod.rs

use crate::{
    handlers::{
        client::{create_client, delete_client, get_client, list_clients, update_client},
        dashboard::{get_dashboard, list_services},
        employee::{
            create_employee, delete_employee, get_employee, list_employees, update_employee,
        },
        expense::{create_expense, delete_expense, get_expense, list_expenses, update_expense},
        general::{health_handler, root_handler},
        income::{create_income, delete_income, get_income, list_incomes, update_income},
    },
    openapi::ApiDoc,
    state::AppState,
};
use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // ─── Dashboard ────────────────────────────────────────
        .route("/dashboard", get(get_dashboard))
        .route("/catalog/services", get(list_services))
        // ─── Clients ──────────────────────────────────────────
        .route("/clients", get(list_clients).post(create_client))
        .route(
            "/clients/{client_id}",
            get(get_client).put(update_client).delete(delete_client),
        )
        // ─── Employees ────────────────────────────────────────
        .route("/employees", get(list_employees).post(create_employee))
        .route(
            "/employees/{employee_id}",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
        // ─── Incomes ──────────────────────────────────────────
        .route("/incomes", get(list_incomes).post(create_income))
        .route(
            "/incomes/{income_id}",
            get(get_income).put(update_income).delete(delete_income),
        )
        // ─── Expenses ─────────────────────────────────────────
        .route("/expenses", get(list_expenses).post(create_expense))
        .route(
            "/expenses/{expense_id}",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
}

/// The whole service: landing page, health, the versioned API and its docs.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .nest("/api/v1", api_routes())
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        store::{Collection, MemoryStore, memory::Operation},
    };
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::{Value, json};
    use std::{str::FromStr, sync::Arc};
    use tower::ServiceExt;

    fn test_app() -> (MemoryStore, Router) {
        let store = MemoryStore::new();
        let state = AppState::new(Arc::new(store.clone()), Config::for_tests());
        (store, app(state))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn money(value: &Value) -> Decimal {
        match value {
            Value::String(s) => Decimal::from_str(s).unwrap(),
            other => Decimal::from_str(&other.to_string()).unwrap(),
        }
    }

    async fn seed(store: &MemoryStore, collection: Collection, id: &str, body: Value) {
        store
            .insert(collection, id, body.as_object().cloned().unwrap())
            .await;
    }

    #[tokio::test]
    async fn health_reports_the_store() {
        let (store, app) = test_app();
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["store"], "connected");

        store.set_offline(true).await;
        let (status, _) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn new_client_with_payment_shows_on_the_dashboard() {
        let (_, app) = test_app();
        let (status, created) = send(
            &app,
            "POST",
            "/api/v1/clients",
            Some(json!({
                "name": "Acme",
                "email": "ops@acme.test",
                "main_service": "Web Development",
                "sub_services": ["CMS Development"],
                "total_payment": 10000,
                "paid_amount": 2500
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();

        let (status, dashboard) = send(&app, "GET", "/api/v1/dashboard", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(money(&dashboard["totals"]["total_revenue"]), dec!(10000));
        assert_eq!(money(&dashboard["totals"]["total_income"]), dec!(2500));
        assert_eq!(money(&dashboard["totals"]["total_pending"]), dec!(7500));
        assert_eq!(dashboard["client_notes"][0]["notes"], "No notes available");

        let (status, card) = send(&app, "GET", &format!("/api/v1/clients/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(money(&card["paid_amount"]), dec!(2500));
        assert_eq!(card["payments"][0]["description"], "Initial Payment");
    }

    #[tokio::test]
    async fn invalid_form_lists_field_errors_without_writing() {
        let (store, app) = test_app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/employees",
            Some(json!({"name": "Ravi", "email": "nope", "phone": "123"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let fields: Vec<&str> = body["error"]["fields"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|f| f["field"].as_str())
            .collect();
        assert!(fields.contains(&"email"));
        assert!(fields.contains(&"phone"));
        assert_eq!(store.count(Collection::Employees).await, 0);
    }

    #[tokio::test]
    async fn unknown_client_is_not_found() {
        let (_, app) = test_app();
        let (status, body) = send(&app, "GET", "/api/v1/clients/ghost", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], 404);
    }

    #[tokio::test]
    async fn partial_cascade_returns_the_report() {
        let (store, app) = test_app();
        seed(&store, Collection::Clients, "c1", json!({"name": "Acme"})).await;
        seed(&store, Collection::Incomes, "i1", json!({"clientId": "c1", "amount": 100})).await;
        seed(&store, Collection::Incomes, "i2", json!({"clientName": "Acme", "amount": 200})).await;
        store.fail_on(Operation::Delete, Collection::Incomes, "i2").await;

        let (status, body) = send(&app, "DELETE", "/api/v1/clients/c1", None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let steps = body["error"]["report"]["steps"].as_array().unwrap();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[2]["status"], "skipped");
        assert_eq!(store.count(Collection::Clients).await, 1);
    }

    #[tokio::test]
    async fn employees_filter_by_service_and_sort_by_name() {
        let (store, app) = test_app();
        seed(&store, Collection::Employees, "e1", json!({"name": "zoe", "role": ["CMS Development"]})).await;
        seed(&store, Collection::Employees, "e2", json!({"name": "Adam", "role": ["CMS Development"]})).await;
        seed(&store, Collection::Employees, "e3", json!({"name": "Mina", "role": ["Desktop Applications"]})).await;

        let (status, body) = send(
            &app,
            "GET",
            "/api/v1/employees?services=CMS%20Development&order=desc",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e["name"].as_str())
            .collect();
        assert_eq!(names, vec!["zoe", "Adam"]);
    }

    #[tokio::test]
    async fn unknown_sort_order_is_a_field_error() {
        let (store, app) = test_app();
        seed(&store, Collection::Clients, "c1", json!({"name": "Acme"})).await;

        for uri in ["/api/v1/clients?order=sideways", "/api/v1/employees?order=sideways"] {
            let (status, body) = send(&app, "GET", uri, None).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert_eq!(body["error"]["code"], 422);
            assert_eq!(body["error"]["fields"][0]["field"], "query");
        }
    }

    #[tokio::test]
    async fn expenses_list_newest_first() {
        let (store, app) = test_app();
        seed(&store, Collection::Expenses, "x1", json!({"type": "Other", "amount": 1, "date": "2024-02-01"})).await;
        seed(&store, Collection::Expenses, "x2", json!({"type": "Other", "amount": 2, "date": "2024-05-01"})).await;

        let (_, body) = send(&app, "GET", "/api/v1/expenses", None).await;
        assert_eq!(body[0]["id"], "x2");
        assert_eq!(body[1]["id"], "x1");
    }

    #[tokio::test]
    async fn income_by_client_name_stores_both_references() {
        let (store, app) = test_app();
        seed(&store, Collection::Clients, "c1", json!({"name": "Acme"})).await;

        let (status, created) = send(
            &app,
            "POST",
            "/api/v1/incomes",
            Some(json!({"client_name": "Acme", "amount": 400, "description": "Milestone 1"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let uri = format!("/api/v1/incomes/{}", created["id"].as_str().unwrap());
        let (_, income) = send(&app, "GET", &uri, None).await;
        assert_eq!(income["client_id"], "c1");
        assert_eq!(income["client_name"], "Acme");
    }

    #[tokio::test]
    async fn store_outage_is_service_unavailable() {
        let (store, app) = test_app();
        store.set_offline(true).await;
        let (status, body) = send(&app, "GET", "/api/v1/incomes", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], 503);
    }
}
