//! Deck error types.

use thiserror::Error;

/// Deck errors
#[derive(Debug, Error)]
pub enum DeckError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No deck with that id is visible to the caller
    ///
    /// Decks owned by someone else produce this same error.
    #[error("Deck not found")]
    NotFound,

    /// The completion provider failed, timed out, or returned no content
    #[error("Deck generation unavailable: {0}")]
    GenerationFailure(String),

    /// The provider's text is not valid JSON
    #[error("Generated content is not valid JSON: {0}")]
    MalformedOutput(String),

    /// The provider's JSON does not have the deck shape
    #[error("Generated content is invalid at `{field}`: {reason}")]
    SchemaViolation { field: String, reason: String },

    /// Caller input rejected before touching the provider or the store
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The owner of a new deck has no account
    #[error("Deck owner does not exist")]
    UnknownOwner,
}

impl DeckError {
    pub(crate) fn schema(field: impl Into<String>, reason: impl Into<String>) -> Self {
        DeckError::SchemaViolation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Database errors and provider transport details are sanitized.
    pub fn client_message(&self) -> String {
        match self {
            DeckError::Database(_) => "Internal server error".to_string(),
            DeckError::GenerationFailure(_) => "Deck generation unavailable".to_string(),
            DeckError::MalformedOutput(_) => "Invalid generated content".to_string(),
            DeckError::SchemaViolation { field, .. } => {
                format!("Invalid generated content: bad field `{}`", field)
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for deck operations
pub type DeckResult<T> = Result<T, DeckError>;
