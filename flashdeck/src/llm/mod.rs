//! Completion provider boundary.
//!
//! The deck generator only needs one request/response exchange: a system instruction, a
//! user instruction, and sampling parameters in; text out. [`CompletionProvider`] is that
//! seam. [`ChatCompletionsClient`] implements it over HTTP for any service speaking the
//! OpenAI-style chat-completions protocol (Groq, OpenAI, local gateways).
//!
//! The client is built once at startup and handed to the services as
//! `Arc<dyn CompletionProvider>`; there is no process-wide handle.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod client;
pub mod config;
pub mod errors;

pub use client::ChatCompletionsClient;
pub use config::LlmConfig;
pub use errors::{LlmError, LlmResult};

/// Output format requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    JsonObject,
}

/// One completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub response_format: ResponseFormat,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

/// A text-completion service
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Perform exactly one completion call and return the message content
    ///
    /// Implementations must not retry; an empty or missing content is an error.
    async fn complete(&self, request: &CompletionRequest) -> LlmResult<String>;
}
