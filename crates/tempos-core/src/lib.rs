//! # Tempos Core Library
//!
//! Natural-language schedule management on top of SQLite and a local
//! language model.
//!
//! ## Features
//!
//! - **Extraction**: free text becomes a structured schedule record, with one
//!   repair pass when the model returns malformed JSON
//! - **Timestamp Normalization**: loose dates and wall-clock times resolved in an
//!   IANA timezone and stored as UTC
//! - **Guarded Querying**: questions become SQL, and only single read-only
//!   `SELECT` statements ever run; anything else falls back to a fixed query
//! - **Read-only Execution**: free-form statements run on a separate
//!   `query_only` connection pool
//!
//! ## Core Modules
//!
//! - [`db`]: Database connection and migration management
//! - [`models`]: Schedule records and query results
//! - [`repository`]: Data access layer with Repository pattern
//! - [`extraction`]: Text to schedule records
//! - [`query`]: Question to gated SQL
//! - [`llm`]: Chat model abstraction and the Ollama client
//! - [`prompt`]: Prompt templates and few-shot examples
//! - [`timezone`]: Timestamp normalization and timezone validation
//! - [`service`]: The interactions offered by the CLI and the HTTP API
//! - [`config`]: Layered settings
//! - [`error`]: Error types with context
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use tempos_core::{config::Settings, service::ScheduleService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::new()?;
//!     let service = ScheduleService::from_settings(&settings).await?;
//!
//!     let saved = service
//!         .extract_and_save("Lunch with Sara tomorrow at 12:30 at Cafe Zaha")
//!         .await?;
//!     println!("Saved #{}: {}", saved.id, saved.title);
//!
//!     let outcome = service.ask("what's on Friday?").await?;
//!     println!("{} -> {} rows", outcome.sql, outcome.rows.len());
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod extraction;
pub mod llm;
pub mod models;
pub mod prompt;
pub mod query;
pub mod repository;
pub mod service;
pub mod timezone;
