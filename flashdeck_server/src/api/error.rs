//! Mapping of domain errors onto HTTP responses.
//!
//! Every error body is `{"error": "<message>"}` with the client-safe message of the
//! domain error. Database details never reach the client.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use flashdeck::{AuthError, DeckError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error returned by every handler
#[derive(Debug)]
pub enum ApiError {
    Auth(AuthError),
    Deck(DeckError),
    /// Missing or malformed `Authorization` header
    Unauthorized,
    /// Request body that is not the expected JSON document
    InvalidBody(String),
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::Auth(e)
    }
}

impl From<DeckError> for ApiError {
    fn from(e: DeckError) -> Self {
        ApiError::Deck(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(e) => match e {
                AuthError::AlreadyExists => StatusCode::CONFLICT,
                AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::Jwt(_) => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::NotFound => StatusCode::NOT_FOUND,
                AuthError::InvalidUsername(_) => StatusCode::BAD_REQUEST,
                AuthError::HashingFailed | AuthError::Database(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Deck(e) => match e {
                DeckError::NotFound => StatusCode::NOT_FOUND,
                DeckError::UnknownOwner => StatusCode::UNAUTHORIZED,
                DeckError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                DeckError::GenerationFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
                DeckError::MalformedOutput(_) | DeckError::SchemaViolation { .. } => {
                    StatusCode::BAD_GATEWAY
                }
                DeckError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn client_message(&self) -> String {
        match self {
            ApiError::Auth(e) => e.client_message(),
            ApiError::Deck(e) => e.client_message(),
            ApiError::Unauthorized => "Missing or invalid bearer token".to_string(),
            ApiError::InvalidBody(reason) => reason.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Auth(e) if status.is_server_error() => {
                tracing::error!(error_type = "auth", error = %e, "Responding with {}", status);
            }
            ApiError::Deck(e) if status.is_server_error() => {
                tracing::error!(error_type = "deck", error = %e, "Responding with {}", status);
            }
            _ => {
                tracing::debug!(error = ?self, "Responding with {}", status);
            }
        }

        (
            status,
            Json(ErrorResponse {
                error: self.client_message(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::from(DeckError::NotFound), StatusCode::NOT_FOUND),
            (ApiError::from(AuthError::AlreadyExists), StatusCode::CONFLICT),
            (
                ApiError::from(AuthError::InvalidCredentials),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ApiError::from(DeckError::GenerationFailure("down".to_string())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ApiError::from(DeckError::MalformedOutput("eof".to_string())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::from(DeckError::SchemaViolation {
                    field: "cards[0].answer".to_string(),
                    reason: "missing".to_string(),
                }),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::from(DeckError::InvalidInput("blank".to_string())),
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::from(DeckError::UnknownOwner), StatusCode::UNAUTHORIZED),
            (ApiError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                ApiError::InvalidBody("missing field `topic`".to_string()),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status(), expected, "{:?}", err);
        }
    }

    #[test]
    fn test_database_errors_are_sanitized() {
        let err = ApiError::from(DeckError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.client_message(), "Internal server error");
    }
}
