use anyhow::Context;
use std::sync::Arc;
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod handlers;
mod models;
mod openapi;
mod repository;
mod routes;
mod services;
mod state;
mod store;

use config::{Config, StoreBackend};
use state::AppState;
use store::{DocumentStore, FirestoreStore, MemoryStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ─── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("business_dashboard=debug,tower_http=info")),
        )
        .with_max_level(Level::TRACE)
        .init();

    // ─── Config ───────────────────────────────────────────────────────────────
    let config = Config::from_env()?;
    let addr = config.server_addr();

    // ─── Document Store ───────────────────────────────────────────────────────
    let store: Arc<dyn DocumentStore> = match &config.store {
        StoreBackend::Firestore(settings) => {
            let store = FirestoreStore::new(settings, config.store_timeout)
                .context("Failed to build the Firestore client")?;
            info!(
                "Using Firestore project {} database {}",
                settings.project_id, settings.database
            );
            Arc::new(store)
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store; data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };

    if let Err(e) = store.probe().await {
        warn!("Document store not reachable yet: {}", e);
    } else {
        info!("Document store reachable ✓");
    }

    // ─── Router ───────────────────────────────────────────────────────────────
    let app = routes::app(AppState::new(store, config));

    // ─── Start Server ─────────────────────────────────────────────────────────
    info!("🚀 Business Dashboard API listening on http://{}", addr);
    info!("📖 Swagger UI:  http://{}/docs", addr);
    info!("❤️  Health:      http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}
