//! Free text to structured schedule records.

use crate::error::CoreError;
use crate::llm::LanguageModel;
use crate::models::{truncate_to_seconds, NewSchedule, PLACEHOLDER_TITLE, TAG_DELIMITER};
use crate::prompt::{repair_messages, EXTRACTION_PROMPT};
use crate::timezone::TimestampNormalizer;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Strips the formatting models like to wrap their answers in.
///
/// Removes surrounding whitespace and a Markdown code fence (with or without
/// a language tag such as `json` or `sql`). Unfenced text is only trimmed.
pub fn clean_model_output(text: &str) -> &str {
    let mut text = text.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // Drop the opening fence line, including any language tag.
        text = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            None => rest,
        };
        if let Some(body) = text.trim_end().strip_suffix("```") {
            text = body;
        }
        text = text.trim();
    }

    text
}

/// Extracts schedule records with a language model.
#[derive(Clone)]
pub struct Extractor {
    model: Arc<dyn LanguageModel>,
    normalizer: TimestampNormalizer,
}

impl Extractor {
    pub fn new(model: Arc<dyn LanguageModel>, normalizer: TimestampNormalizer) -> Self {
        Self { model, normalizer }
    }

    pub async fn extract(&self, text: &str) -> Result<NewSchedule, CoreError> {
        self.extract_at(text, Utc::now()).await
    }

    /// Same as [`Extractor::extract`] with an explicit "now", used to resolve
    /// partial dates and to stamp `created_at`/`updated_at`.
    pub async fn extract_at(
        &self,
        text: &str,
        reference: DateTime<Utc>,
    ) -> Result<NewSchedule, CoreError> {
        let messages = EXTRACTION_PROMPT.build(text);
        let reply = self
            .model
            .complete(&messages)
            .await
            .map_err(CoreError::LanguageModel)?;

        let cleaned = clean_model_output(&reply);
        let fields = match parse_object(cleaned) {
            Ok(fields) => fields,
            Err(first_error) => {
                tracing::warn!(error = %first_error, "model returned malformed JSON, attempting repair");
                self.repair(cleaned).await?
            }
        };

        Ok(self.coerce(&fields, reference))
    }

    /// The single repair pass: ask the model to fix its own output.
    async fn repair(&self, malformed: &str) -> Result<Map<String, Value>, CoreError> {
        let reply = self
            .model
            .complete(&repair_messages(malformed))
            .await
            .map_err(CoreError::LanguageModel)?;

        let cleaned = clean_model_output(&reply);
        parse_object(cleaned).map_err(|reason| CoreError::ExtractionFailure {
            raw: cleaned.to_string(),
            reason,
        })
    }

    fn coerce(&self, fields: &Map<String, Value>, reference: DateTime<Utc>) -> NewSchedule {
        let title = text_field(fields, "title")
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_TITLE.to_string());
        let details = text_field(fields, "details").unwrap_or_default();
        let location = text_field(fields, "location").unwrap_or_default();
        let tags = fields.get("tags").map(coerce_tags).unwrap_or_default();

        let start_raw = text_field(fields, "start");
        let end_raw = text_field(fields, "end");
        let start = self.normalizer.normalize(start_raw.as_deref(), reference);
        let mut end = self.normalizer.normalize(end_raw.as_deref(), reference);

        if let (Some(s), Some(e)) = (start, end) {
            if e < s {
                tracing::warn!(start = %s, end = %e, "dropping end time that precedes start");
                end = None;
            }
        }

        let created_at = truncate_to_seconds(reference);
        NewSchedule {
            title,
            details,
            start,
            end,
            location,
            tags,
            created_at,
            updated_at: created_at,
        }
    }
}

fn parse_object(text: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(format!("expected a JSON object, got {}", json_kind(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Strings are trimmed, other scalars stringified, null and missing become `None`.
fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    scalar_to_string(fields.get(key)?).map(|s| s.trim().to_string())
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Accepts a list or a single comma-separated string. Tags never contain the
/// delimiter afterwards; empty entries are dropped.
fn coerce_tags(value: &Value) -> Vec<String> {
    let candidates: Vec<String> = match value {
        Value::Array(items) => items.iter().filter_map(scalar_to_string).collect(),
        other => scalar_to_string(other).into_iter().collect(),
    };

    candidates
        .iter()
        .flat_map(|candidate| candidate.split(TAG_DELIMITER))
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}
