//! HTTP request handlers for API endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tempos_core::models::{NewSchedule, Schedule};
use tracing::{info, warn};

use crate::{
    error::ApiError,
    types::{
        HealthResponse, ListParams, ParseRequest, PurgeResponse, QueryRequest, QueryResponse,
        RowsResponse, ScheduleInput, SqlRequest, UpcomingParams,
    },
    AppState,
};

pub const DEFAULT_LIST_LIMIT: u32 = 100;
pub const DEFAULT_UPCOMING_DAYS: u32 = 30;

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Extract a schedule from free text and store it
pub async fn parse_schedule(
    State(state): State<AppState>,
    payload: Result<Json<ParseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Schedule>), ApiError> {
    let Json(request) = payload?;
    info!(chars = request.text.len(), "parse request");
    let saved = state.service.extract_and_save(&request.text).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// Store a schedule as given
pub async fn create_schedule(
    State(state): State<AppState>,
    payload: Result<Json<ScheduleInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Schedule>), ApiError> {
    let Json(input) = payload?;
    let saved = state.service.add_schedule(NewSchedule::from(input)).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn list_schedules(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Schedule>>, ApiError> {
    let Query(params) = params?;
    let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    Ok(Json(state.service.list_schedules(limit).await?))
}

pub async fn purge_schedules(
    State(state): State<AppState>,
) -> Result<Json<PurgeResponse>, ApiError> {
    let deleted = state.service.purge_all().await?;
    Ok(Json(PurgeResponse { deleted }))
}

/// Answer a natural-language question with a gated, read-only query
pub async fn query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(request) = payload?;
    let outcome = state.service.ask(&request.question).await?;
    if outcome.fallback_used {
        info!(question = %request.question, "answered with fallback query");
    }

    let summary = if request.summarize {
        // Summaries are best effort.
        match state.service.summarize(&request.question, &outcome.rows).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "summary skipped");
                None
            }
        }
    } else {
        None
    };

    Ok(Json(QueryResponse {
        sql: outcome.sql,
        rows: outcome.rows,
        fallback_used: outcome.fallback_used,
        summary,
    }))
}

pub async fn upcoming(
    State(state): State<AppState>,
    params: Result<Query<UpcomingParams>, QueryRejection>,
) -> Result<Json<RowsResponse>, ApiError> {
    let Query(params) = params?;
    let days = params.days.unwrap_or(DEFAULT_UPCOMING_DAYS);
    let outcome = state.service.upcoming(days).await?;
    Ok(Json(RowsResponse { sql: outcome.sql, rows: outcome.rows }))
}

/// Read-only console; anything but a single SELECT is refused
pub async fn admin_sql(
    State(state): State<AppState>,
    payload: Result<Json<SqlRequest>, JsonRejection>,
) -> Result<Json<RowsResponse>, ApiError> {
    let Json(request) = payload?;
    let outcome = state.service.run_admin_sql(&request.sql).await?;
    Ok(Json(RowsResponse { sql: outcome.sql, rows: outcome.rows }))
}
