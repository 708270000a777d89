//! Natural-language questions to guarded, read-only SQL.
//!
//! Model output is never trusted: every statement goes through
//! [`gate_statement`] before it reaches the store, and the store handle used
//! for execution is itself read-only.

use crate::error::CoreError;
use crate::extraction::clean_model_output;
use crate::llm::LanguageModel;
use crate::prompt::SQL_PROMPT;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub const SCHEDULE_TABLE: &str = "schedules";

pub const SCHEDULE_COLUMNS: &[&str] = &[
    "id",
    "title",
    "details",
    "start_ts",
    "end_ts",
    "location",
    "tags",
    "created_at",
    "updated_at",
];

/// Deterministic ordering: undated rows last, then by start time, then by id.
pub const ORDER_CLAUSE: &str = "ORDER BY start_ts IS NULL, start_ts, id";

/// Keywords that can change data or schema, or reach outside the database.
const FORBIDDEN_KEYWORDS: &[&str] = &[
    "insert", "update", "delete", "drop", "alter", "create", "attach", "detach", "pragma",
];

/// The statement used whenever the model's statement is unusable: everything
/// starting within the next `days` days.
pub fn fallback_statement(days: u32) -> String {
    format!(
        "SELECT id, title, start_ts, end_ts, location, tags FROM {SCHEDULE_TABLE}\n\
WHERE start_ts >= strftime('%Y-%m-%dT%H:%M:%SZ','now') AND start_ts < strftime('%Y-%m-%dT%H:%M:%SZ','now','+{days} days')\n\
{ORDER_CLAUSE};"
    )
}

/// Why a statement was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnsafeStatement {
    #[error("statement is empty")]
    Empty,
    #[error("statement does not start with SELECT")]
    NotSelect,
    #[error("statement contains forbidden keyword '{0}'")]
    ForbiddenKeyword(String),
    #[error("statement contains more than one statement terminator")]
    MultipleStatements,
    #[error("statement has an unclosed quote, bracket or comment")]
    Unbalanced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateVerdict {
    /// Passed as-is.
    Accepted,
    /// Passed, with the fixed ordering clause appended.
    OrderingAppended,
    /// Refused; the fallback statement was substituted.
    Rejected(UnsafeStatement),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatedStatement {
    pub sql: String,
    pub verdict: GateVerdict,
}

impl GatedStatement {
    pub fn is_fallback(&self) -> bool {
        matches!(self.verdict, GateVerdict::Rejected(_))
    }
}

impl fmt::Display for GatedStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Checks a statement without rewriting it.
pub fn check_statement(sql: &str) -> Result<(), UnsafeStatement> {
    inspect(sql).map(|_| ())
}

/// Runs every check and returns the top-level words of the statement body.
fn inspect(sql: &str) -> Result<Vec<(usize, &str)>, UnsafeStatement> {
    let trimmed = sql.trim_start();
    if trimmed.is_empty() {
        return Err(UnsafeStatement::Empty);
    }
    let leading = trimmed
        .split(|c: char| !is_word_char(c))
        .next()
        .unwrap_or_default();
    if !leading.eq_ignore_ascii_case("select") {
        return Err(UnsafeStatement::NotSelect);
    }

    let words = words(sql);
    if let Some(keyword) = words.iter().find(|word| {
        FORBIDDEN_KEYWORDS
            .iter()
            .any(|forbidden| word.eq_ignore_ascii_case(forbidden))
    }) {
        return Err(UnsafeStatement::ForbiddenKeyword(keyword.to_ascii_lowercase()));
    }

    // A single terminator is allowed, and only at the very end.
    let body = strip_terminator(sql);
    if body.contains(';') {
        return Err(UnsafeStatement::MultipleStatements);
    }

    outer_words(body).ok_or(UnsafeStatement::Unbalanced)
}

/// Gates a model-produced statement.
///
/// Refused statements are replaced by [`fallback_statement`] verbatim.
/// Accepted statements without a top-level `ORDER BY` get [`ORDER_CLAUSE`],
/// placed ahead of any `LIMIT`/`OFFSET` tail. Running the gate on its own
/// output returns the same statement.
pub fn gate_statement(sql: &str, fallback_days: u32) -> GatedStatement {
    let outer = match inspect(sql) {
        Ok(outer) => outer,
        Err(reason) => {
            tracing::warn!(%reason, "model statement rejected, using fallback query");
            return GatedStatement {
                sql: fallback_statement(fallback_days),
                verdict: GateVerdict::Rejected(reason),
            };
        }
    };

    if has_order_by(&outer) {
        return GatedStatement { sql: sql.to_string(), verdict: GateVerdict::Accepted };
    }

    let body = strip_terminator(sql);
    // OFFSET is only valid after LIMIT, so the LIMIT keyword starts the tail.
    let sql = match outer.iter().rev().find(|(_, word)| word.eq_ignore_ascii_case("limit")) {
        Some(&(at, _)) => format!("{}\n{}\n{};", body[..at].trim_end(), ORDER_CLAUSE, &body[at..]),
        None => format!("{}\n{};", body, ORDER_CLAUSE),
    };
    GatedStatement { sql, verdict: GateVerdict::OrderingAppended }
}

/// Gate for statements typed by an operator: refusal is an error, nothing is rewritten.
pub fn gate_strict(sql: &str) -> Result<String, CoreError> {
    check_statement(sql).map_err(CoreError::UnsafeStatementRejected)?;
    Ok(sql.trim().to_string())
}

fn strip_terminator(sql: &str) -> &str {
    let trimmed = sql.trim_end();
    trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end()
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn words(sql: &str) -> Vec<&str> {
    sql.split(|c: char| !is_word_char(c))
        .filter(|w| !w.is_empty())
        .collect()
}

/// Words outside parentheses, quotes and comments, with their byte offsets.
/// `None` when a quote, bracket or comment is left open.
fn outer_words(sql: &str) -> Option<Vec<(usize, &str)>> {
    let bytes = sql.as_bytes();
    let mut outer = Vec::new();
    let mut depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"' | b'`') => {
                i += sql[i + 1..].find(char::from(quote))? + 2;
            }
            b'[' => i += sql[i + 1..].find(']')? + 2,
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                i = sql[i..].find('\n').map_or(bytes.len(), |n| i + n + 1);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += sql[i + 2..].find("*/")? + 4;
            }
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' => {
                depth = depth.checked_sub(1)?;
                i += 1;
            }
            c if is_word_char(char::from(c)) => {
                let end = sql[i..]
                    .find(|c: char| !is_word_char(c))
                    .map_or(bytes.len(), |n| i + n);
                if depth == 0 {
                    outer.push((i, &sql[i..end]));
                }
                i = end;
            }
            _ => i += 1,
        }
    }

    (depth == 0).then_some(outer)
}

fn has_order_by(outer: &[(usize, &str)]) -> bool {
    outer.windows(2).any(|pair| {
        pair[0].1.eq_ignore_ascii_case("order") && pair[1].1.eq_ignore_ascii_case("by")
    })
}

/// Turns questions into gated statements using a language model.
#[derive(Clone)]
pub struct QueryTranslator {
    model: Arc<dyn LanguageModel>,
    fallback_days: u32,
}

impl QueryTranslator {
    pub fn new(model: Arc<dyn LanguageModel>, fallback_days: u32) -> Self {
        Self { model, fallback_days }
    }

    /// One model call, cleaned and gated. Only a model failure is an error;
    /// an unsafe statement silently becomes the fallback.
    pub async fn translate(&self, question: &str) -> Result<GatedStatement, CoreError> {
        let messages = SQL_PROMPT.build(question);
        let reply = self
            .model
            .complete(&messages)
            .await
            .map_err(CoreError::QueryTranslationFailure)?;

        let candidate = clean_model_output(&reply);
        tracing::debug!(%question, %candidate, "model proposed statement");
        Ok(gate_statement(candidate, self.fallback_days))
    }
}
