//! API request and response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempos_core::models::{join_tags, split_tags, truncate_to_seconds, NewSchedule, QueryRow};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Free text to extract a schedule from
#[derive(Debug, Clone, Deserialize)]
pub struct ParseRequest {
    pub text: String,
}

/// A schedule supplied directly, bypassing extraction.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleInput {
    pub title: String,
    #[serde(default, alias = "description")]
    pub details: Option<String>,
    /// RFC 3339 instant
    #[serde(default, alias = "start_ts")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, alias = "end_ts")]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<ScheduleInput> for NewSchedule {
    fn from(input: ScheduleInput) -> Self {
        NewSchedule {
            title: input.title,
            details: input.details.unwrap_or_default(),
            start: input.start.map(truncate_to_seconds),
            end: input.end.map(truncate_to_seconds),
            location: input.location.unwrap_or_default(),
            // Re-split so a tag never carries the column delimiter.
            tags: split_tags(&join_tags(&input.tags)),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListParams {
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpcomingParams {
    pub days: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurgeResponse {
    pub deleted: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    #[serde(default)]
    pub summarize: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub sql: String,
    pub rows: Vec<QueryRow>,
    pub fallback_used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// A statement typed by an operator.
#[derive(Debug, Clone, Deserialize)]
pub struct SqlRequest {
    pub sql: String,
}

/// Rows produced by a fixed or operator-supplied statement.
#[derive(Debug, Clone, Serialize)]
pub struct RowsResponse {
    pub sql: String,
    pub rows: Vec<QueryRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
}
