//! REST API for Tempos
//!
//! Exposes schedule extraction, direct insertion, listing, purging, guarded
//! natural-language queries and a read-only SQL console over JSON.

mod error;
mod handlers;
mod types;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tempos_core::service::ScheduleService;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use handlers::*;
pub use types::*;

/// API server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ScheduleService>,
}

impl AppState {
    pub fn new(service: ScheduleService) -> Self {
        Self { service: Arc::new(service) }
    }
}

/// Build the API router with all endpoints
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/tasks/parse", post(parse_schedule))
        .route(
            "/api/v1/tasks",
            post(create_schedule).get(list_schedules).delete(purge_schedules),
        )
        .route("/api/v1/query", post(query))
        .route("/api/v1/upcoming", get(upcoming))
        .route("/api/v1/admin/sql", post(admin_sql))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the API server
pub async fn start_server(addr: &str, state: AppState) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    serve(listener, state).await
}

/// Serve on an already bound listener
pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    tracing::info!("Starting API server on {}", listener.local_addr()?);
    axum::serve(listener, build_router(state)).await
}
