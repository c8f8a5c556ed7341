//! Request extractors whose rejections use the API error format.
//!
//! axum's own `Json` and `Path` extractors answer malformed input with plain-text
//! bodies. These wrappers turn the same failures into [`ApiError`] so every error
//! response is `{"error": "<message>"}`.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use flashdeck::{DeckError, DeckId};
use serde::de::DeserializeOwned;

use super::error::ApiError;

/// JSON request body
///
/// A body that is missing, not JSON, or missing required fields is `400 Bad Request`.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

/// The `{deck_id}` path segment
///
/// A segment that is not a deck id names no deck, so it is `404 Not Found` like any
/// other unknown id.
pub struct DeckIdPath(pub DeckId);

impl<S> FromRequestParts<S> for DeckIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| DeckError::NotFound)?;
        parse_deck_id(&raw).map(DeckIdPath)
    }
}

fn parse_deck_id(raw: &str) -> Result<DeckId, ApiError> {
    raw.parse().map_err(|_| DeckError::NotFound.into())
}
