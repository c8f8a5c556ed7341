//! Completion provider error types.

use std::time::Duration;
use thiserror::Error;

/// Completion provider errors
#[derive(Debug, Error)]
pub enum LlmError {
    /// Transport failure or undecodable response body
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Provider answered without any message content
    #[error("Provider returned no content")]
    EmptyContent,

    /// No answer within the configured time
    #[error("Provider did not answer within {0:?}")]
    Timeout(Duration),
}

/// Result type for completion provider operations
pub type LlmResult<T> = Result<T, LlmError>;
