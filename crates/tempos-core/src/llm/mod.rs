//! Language-model client abstraction.
//!
//! The pipelines only need `complete(messages) -> text`; anything that can
//! answer a chat transcript implements [`LanguageModel`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod ollama;

pub use ollama::OllamaClient;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "user")]
    Human,
    #[serde(rename = "assistant")]
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self { role: Role::Human, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("request to language model failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("language model returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("language model returned an unreadable response: {0}")]
    MalformedResponse(String),
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Sends the transcript and returns the model's free-form reply.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}
