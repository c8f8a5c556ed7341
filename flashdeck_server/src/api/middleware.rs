//! Authentication middleware for protected endpoints.
//!
//! Validates the JWT access token in the `Authorization` header, checks that its
//! account still exists, and injects the user ID into request extensions for
//! downstream handlers.
//!
//! # Extracting User ID
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use flashdeck::UserId;
//!
//! async fn protected_handler(Extension(user_id): Extension<UserId>) -> String {
//!     format!("Authenticated as user {}", user_id)
//! }
//! # let _ = protected_handler;
//! ```

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use super::{AppState, error::ApiError};

/// Authentication middleware that validates JWT tokens and injects the user ID.
///
/// - **Success**: Token valid → injects `UserId` into request extensions → calls next handler
/// - **Missing or non-bearer header**: `401 Unauthorized`
/// - **Invalid, expired, or refresh token**: `401 Unauthorized`
/// - **Token of a deleted account**: `401 Unauthorized`
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let user_id = state.auth_manager.authorize(token).await?;
    request.extensions_mut().insert(user_id);
    Ok(next.run(request).await)
}
