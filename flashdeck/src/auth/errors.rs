//! Authentication error types.

use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// Unknown username, wrong password, or password login on a federated account
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Username already exists
    #[error("User with this username already exists")]
    AlreadyExists,

    /// User not found
    #[error("User not found")]
    NotFound,

    /// Invalid username format
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    /// JWT could not be encoded or decoded
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Token decoded but is of the wrong kind for this operation
    #[error("Invalid token")]
    InvalidToken,
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Database and JWT errors are sanitized to prevent information disclosure
    /// about the internal system structure.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Database(_) => "Internal server error".to_string(),
            AuthError::Jwt(_) => "Invalid token".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
