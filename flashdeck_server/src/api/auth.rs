//! Authentication API handlers.
//!
//! - Registration with username and optional password
//! - Login with username/password
//! - Access token refresh
//! - Current user lookup and account deletion
//!
//! # Examples
//!
//! Register a new user:
//! ```bash
//! curl -X POST http://localhost:8000/api/v1/auth/register \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "alice", "password": "Pass123!"}'
//! ```
//!
//! Login:
//! ```bash
//! curl -X POST http://localhost:8000/api/v1/auth/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "alice", "password": "Pass123!"}'
//! ```

use axum::{Extension, Json, extract::State, http::StatusCode};
use flashdeck::{
    User, UserId,
    auth::{LoginRequest, RegisterRequest},
};
use serde::{Deserialize, Serialize};

use super::{AppState, error::ApiError, extract::ApiJson};
use crate::{logging, metrics};

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshPayload {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: UserId,
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
}

fn auth_response(state: &AppState, user: User) -> Result<AuthResponse, ApiError> {
    let tokens = state.auth_manager.issue_tokens(&user)?;
    Ok(AuthResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        user_id: user.id,
        username: user.username,
    })
}

/// Register a new user account and log them in.
///
/// # Request Body
///
/// ```json
/// { "username": "alice", "password": "SecurePass123!" }
/// ```
///
/// The password may be omitted for accounts that will only use a federated login.
///
/// # Response
///
/// `201 Created` with an access/refresh token pair.
///
/// # Errors
///
/// - `400 Bad Request`: Invalid username
/// - `409 Conflict`: Username already taken
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterPayload>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let request = RegisterRequest {
        username: payload.username,
        password: payload.password,
    };

    let user = state
        .auth_manager
        .register(request)
        .await
        .inspect_err(|_| metrics::auth_attempts_total("register", false))?;
    metrics::auth_attempts_total("register", true);

    Ok((StatusCode::CREATED, Json(auth_response(&state, user)?)))
}

/// Authenticate a user and issue session tokens.
///
/// Access tokens last 15 minutes, refresh tokens 7 days.
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown username or wrong password (indistinguishable)
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginPayload>,
) -> Result<Json<AuthResponse>, ApiError> {
    let request = LoginRequest {
        username: payload.username.clone(),
        password: payload.password,
    };

    match state.auth_manager.authenticate(request).await {
        Ok(user) => {
            metrics::auth_attempts_total("login", true);
            Ok(Json(auth_response(&state, user)?))
        }
        Err(e) => {
            metrics::auth_attempts_total("login", false);
            logging::log_security_event(
                "failed_login",
                None,
                &format!("Login failed for {}", payload.username),
            );
            Err(e.into())
        }
    }
}

/// Exchange a refresh token for a new access token.
///
/// # Request Body
///
/// ```json
/// { "refresh_token": "eyJhbGciOiJIUzI1NiIs..." }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid or expired refresh token, an access token, or a
///   deleted account
pub async fn refresh_token(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RefreshPayload>,
) -> Result<Json<AccessTokenResponse>, ApiError> {
    let access_token = state
        .auth_manager
        .refresh_access_token(&payload.refresh_token)
        .await
        .inspect_err(|_| metrics::auth_attempts_total("refresh", false))?;
    metrics::auth_attempts_total("refresh", true);

    Ok(Json(AccessTokenResponse { access_token }))
}

/// The authenticated user.
pub async fn me(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.auth_manager.current_user(user_id).await?))
}

/// Delete the authenticated user's account together with all of their decks.
///
/// Outstanding access and refresh tokens of the account are refused afterwards.
pub async fn delete_me(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
) -> Result<StatusCode, ApiError> {
    state.auth_manager.delete_account(user_id).await?;
    logging::log_security_event("account_deleted", Some(user_id), "Account deleted");
    Ok(StatusCode::NO_CONTENT)
}
