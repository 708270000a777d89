use crate::llm::LlmError;
use crate::query::UnsafeStatement;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Language model error: {0}")]
    LanguageModel(#[source] LlmError),

    /// The model's output could not be read as a JSON object, even after the repair pass.
    #[error("Could not extract a schedule from the model output: {reason}")]
    ExtractionFailure { raw: String, reason: String },

    #[error("Could not translate the question into a query: {0}")]
    QueryTranslationFailure(#[source] LlmError),

    #[error("Query failed to execute: {sql}")]
    QueryExecutionFailure {
        sql: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Statement rejected: {0}")]
    UnsafeStatementRejected(UnsafeStatement),
}
