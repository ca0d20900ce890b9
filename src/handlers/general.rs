// src/handlers/general.rs

use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use serde_json::json;

/// Landing page with links to the docs and a route overview
pub async fn root_handler() -> impl IntoResponse {
    Html(r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0"/>
  <title>Business Dashboard API</title>
  <style>
    body { margin: 0; font-family: Inter, system-ui, sans-serif; background: #f8fafc; color: #0f172a; }
    main { max-width: 920px; margin: 0 auto; padding: 48px 24px; }
    h1 { margin: 0 0 4px; font-size: 2.2rem; color: #047857; }
    .lead { margin: 0 0 8px; color: #475569; }
    .tag { font-size: 0.75rem; color: #0369a1; background: #e0f2fe; border-radius: 999px; padding: 3px 10px; }
    .tiles { display: flex; flex-wrap: wrap; gap: 12px; margin: 32px 0; }
    .tile { flex: 1 1 240px; background: #fff; border: 1px solid #e2e8f0; border-radius: 10px; padding: 16px 18px; }
    .tile h3 { margin: 0 0 6px; font-size: 0.95rem; }
    .tile p { margin: 0; font-size: 0.85rem; color: #64748b; }
    .tile a { display: inline-block; margin-top: 8px; color: #0369a1; font-size: 0.85rem; }
    .endpoints { background: #fff; border: 1px solid #e2e8f0; border-radius: 10px; padding: 8px 20px 20px; }
    .endpoints h2 { font-size: 1.1rem; }
    .route-group h4 { margin: 18px 0 6px; font-size: 0.75rem; letter-spacing: 0.08em; text-transform: uppercase; color: #94a3b8; }
    .route-item { display: grid; grid-template-columns: 64px 260px 1fr; gap: 10px; padding: 5px 0; font-size: 0.85rem; border-top: 1px solid #f1f5f9; }
    .method { font: 700 0.7rem monospace; text-align: center; border-radius: 4px; padding: 2px 0; }
    .get { background: #dcfce7; color: #166534; }
    .post { background: #dbeafe; color: #1e40af; }
    .put { background: #ffedd5; color: #9a3412; }
    .delete { background: #ffe4e6; color: #9f1239; }
    .route-path { font-family: monospace; }
    .route-desc { color: #64748b; }
    footer { margin-top: 32px; text-align: center; font-size: 0.8rem; color: #94a3b8; }
  </style>
</head>
<body>
<main>
  <header>
    <h1>Business Dashboard API</h1>
    <p class="lead">Clients, employees, incomes and expenses for a small services business</p>
    <span class="tag">v0.1.0 · REST API · JSON</span>
  </header>

  <div class="tiles">
    <div class="tile">
      <h3>📖 API Documentation</h3>
      <p>Interactive Swagger UI with every endpoint and schema.</p>
      <a href="/docs">Open Swagger UI →</a>
    </div>
    <div class="tile">
      <h3>❤️ Health Check</h3>
      <p>Confirm the service is running and the document store answers.</p>
      <a href="/health">GET /health →</a>
    </div>
    <div class="tile">
      <h3>🧹 Cascading Deletes</h3>
      <p>Deleting a client or employee cleans up the records that point at it and returns a per-step report.</p>
    </div>
  </div>

  <div class="endpoints">
    <h2>Endpoints</h2>
    <div class="route-group">
      <h4>Dashboard</h4>
      <div class="route-item"><span class="method get">GET</span><span class="route-path">/api/v1/dashboard</span><span class="route-desc">Revenue, income, expense, profit, pending and client notes</span></div>
      <div class="route-item"><span class="method get">GET</span><span class="route-path">/api/v1/catalog/services</span><span class="route-desc">Departments and the services they offer</span></div>
    </div>

    <div class="route-group">
      <h4>Clients</h4>
      <div class="route-item"><span class="method get">GET</span><span class="route-path">/api/v1/clients</span><span class="route-desc">List clients by name (?order=asc|desc)</span></div>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/clients</span><span class="route-desc">Add a client, recording any initial payment</span></div>
      <div class="route-item"><span class="method get">GET</span><span class="route-path">/api/v1/clients/:id</span><span class="route-desc">Client card with employees, payments and expenses</span></div>
      <div class="route-item"><span class="method put">PUT</span><span class="route-path">/api/v1/clients/:id</span><span class="route-desc">Replace a client</span></div>
      <div class="route-item"><span class="method delete">DELETE</span><span class="route-path">/api/v1/clients/:id</span><span class="route-desc">Delete a client with its incomes and expenses</span></div>
    </div>

    <div class="route-group">
      <h4>Employees</h4>
      <div class="route-item"><span class="method get">GET</span><span class="route-path">/api/v1/employees</span><span class="route-desc">List employees (?order, ?services=a,b)</span></div>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/employees</span><span class="route-desc">Add an employee</span></div>
      <div class="route-item"><span class="method get">GET</span><span class="route-path">/api/v1/employees/:id</span><span class="route-desc">Employee with assigned clients and expenses</span></div>
      <div class="route-item"><span class="method put">PUT</span><span class="route-path">/api/v1/employees/:id</span><span class="route-desc">Replace an employee</span></div>
      <div class="route-item"><span class="method delete">DELETE</span><span class="route-path">/api/v1/employees/:id</span><span class="route-desc">Delete an employee, unassigning it from clients</span></div>
    </div>

    <div class="route-group">
      <h4>Incomes</h4>
      <div class="route-item"><span class="method get">GET</span><span class="route-path">/api/v1/incomes</span><span class="route-desc">List incomes</span></div>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/incomes</span><span class="route-desc">Record a client payment</span></div>
      <div class="route-item"><span class="method get">GET</span><span class="route-path">/api/v1/incomes/:id</span><span class="route-desc">Get an income</span></div>
      <div class="route-item"><span class="method put">PUT</span><span class="route-path">/api/v1/incomes/:id</span><span class="route-desc">Replace an income</span></div>
      <div class="route-item"><span class="method delete">DELETE</span><span class="route-path">/api/v1/incomes/:id</span><span class="route-desc">Delete an income</span></div>
    </div>

    <div class="route-group">
      <h4>Expenses</h4>
      <div class="route-item"><span class="method get">GET</span><span class="route-path">/api/v1/expenses</span><span class="route-desc">List expenses, newest first</span></div>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/expenses</span><span class="route-desc">Record an expense</span></div>
      <div class="route-item"><span class="method get">GET</span><span class="route-path">/api/v1/expenses/:id</span><span class="route-desc">Get an expense</span></div>
      <div class="route-item"><span class="method put">PUT</span><span class="route-path">/api/v1/expenses/:id</span><span class="route-desc">Replace an expense</span></div>
      <div class="route-item"><span class="method delete">DELETE</span><span class="route-path">/api/v1/expenses/:id</span><span class="route-desc">Delete an expense</span></div>
    </div>
  </div>

  <footer>
    <p>Built with 🦀 Rust · Axum · Firestore</p>
  </footer>
</main>
</body>
</html>"#)
}

/// Health check; probes the document store
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.repo.store().probe().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "store": "connected",
                "service": "business-dashboard",
                "version": env!("CARGO_PKG_VERSION")
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "store": "disconnected",
                "error": e.to_string()
            })),
        ),
    }
}
