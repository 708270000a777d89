use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Separator used when tags are flattened into the `tags` column.
pub const TAG_DELIMITER: char = ',';

/// Title used when the model does not provide one.
pub const PLACEHOLDER_TITLE: &str = "Untitled";

/// A persisted schedule entry. Rows are immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Schedule {
    pub id: i64,
    pub title: String,
    pub details: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub location: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A schedule entry that has not been stored yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewSchedule {
    pub title: String,
    pub details: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub location: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for NewSchedule {
    fn default() -> Self {
        let now = truncate_to_seconds(Utc::now());
        Self {
            title: PLACEHOLDER_TITLE.to_string(),
            details: String::new(),
            start: None,
            end: None,
            location: String::new(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Raw row shape of the `schedules` table. Timestamps are ISO-8601 text.
#[derive(Debug, Clone, FromRow)]
pub struct ScheduleRow {
    pub id: i64,
    pub title: String,
    pub details: Option<String>,
    pub start_ts: Option<String>,
    pub end_ts: Option<String>,
    pub location: Option<String>,
    pub tags: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ScheduleRow> for Schedule {
    fn from(row: ScheduleRow) -> Self {
        let created_at = parse_utc(&row.created_at).unwrap_or_default();
        Self {
            id: row.id,
            title: row.title,
            details: row.details.unwrap_or_default(),
            start: row.start_ts.as_deref().and_then(parse_utc),
            end: row.end_ts.as_deref().and_then(parse_utc),
            location: row.location.unwrap_or_default(),
            tags: split_tags(row.tags.as_deref().unwrap_or_default()),
            created_at,
            updated_at: parse_utc(&row.updated_at).unwrap_or(created_at),
        }
    }
}

/// One result row of a free-form query, keyed by column name in select order.
pub type QueryRow = serde_json::Map<String, serde_json::Value>;

/// Result of running a natural-language question through the query pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    /// The statement that was actually executed.
    pub sql: String,
    pub rows: Vec<QueryRow>,
    /// True when the model's statement was discarded in favour of the fallback.
    pub fallback_used: bool,
}

/// Formats an instant the way it is stored: `2025-08-28T09:30:00Z`.
pub fn format_utc(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn parse_utc(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn truncate_to_seconds(instant: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(instant.timestamp(), 0).unwrap_or(instant)
}

pub fn join_tags(tags: &[String]) -> String {
    tags.join(&TAG_DELIMITER.to_string())
}

pub fn split_tags(joined: &str) -> Vec<String> {
    joined
        .split(TAG_DELIMITER)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}
