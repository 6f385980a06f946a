//! Read-only REST API over a finished generation run.
//!
//! Provides three GET endpoints:
//! - `/summary` - the run's summary document
//! - `/sites` - the site registry
//! - `/records` - dataset rows, filterable by site, type and date range

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tracing::info;

use crate::dataset::Dataset;
use crate::summary::SummaryDocument;

/// Immutable application state shared across all request handlers.
///
/// Built once after generation completes and wrapped in `Arc`; no locks
/// since nothing is written after startup.
pub struct AppState {
    pub summary: SummaryDocument,
    pub dataset: Dataset,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/summary", get(handlers::get_summary))
        .route("/sites", get(handlers::get_sites))
        .route("/records", get(handlers::get_records))
        .with_state(state)
}

/// Binds to `addr` and serves the API until the process exits.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
