//! opsdesk: spreadsheet-backed back-office server
//!
//! A small HTTP app over a shared Google Sheet: contact directory, hours,
//! expenses, mileage, sales pipeline, and invoices, each a worksheet in
//! one spreadsheet. Reads go through a freshness-windowed cache with a
//! stale fallback when the Sheets API rate-limits; writes append rows
//! directly. On startup the schema reconciler creates any missing
//! worksheets and header columns.

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod google_api;
pub mod metrics;
pub mod records;
pub mod routes;
pub mod schema;
pub mod services;
pub mod state;
pub mod store;

use std::sync::Arc;

/// Load config, reconcile the spreadsheet schema, and serve until shutdown.
pub async fn run() -> Result<(), String> {
    let config = config::load_config()?;
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(state::AppState::new(config));

    // Best effort: a rate limit or credentials problem at boot should not
    // keep the server down, reads will surface the same error with context.
    if let Err(e) = schema::reconcile(state.store.as_ref()).await {
        log::warn!("Schema reconciliation skipped: {}", e);
    }

    let app = routes::router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("Failed to bind {}: {}", bind_addr, e))?;
    log::info!("Listening on {}", bind_addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| format!("Server error: {}", e))
}
