//! Authentication module providing user registration, login, and token handling.
//!
//! This module implements:
//! - Argon2id password hashing with server-side pepper
//! - JWT access tokens (15-minute expiry)
//! - JWT refresh tokens (7-day expiry)
//! - Password-less accounts for identities verified by an OAuth provider
//!
//! ## Example
//!
//! ```no_run
//! use flashdeck::auth::{AuthManager, RegisterRequest};
//! use flashdeck::db::{Database, PgUserRepository};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&Default::default()).await?;
//!     let auth = AuthManager::new(
//!         Arc::new(PgUserRepository::new(db.pool().clone())),
//!         "secret_pepper".to_string(),
//!         "jwt_secret".to_string(),
//!     );
//!
//!     let user = auth
//!         .register(RegisterRequest {
//!             username: "alice".to_string(),
//!             password: Some("correct horse".to_string()),
//!         })
//!         .await?;
//!     println!("Registered user: {}", user.username);
//!
//!     let tokens = auth.issue_tokens(&user)?;
//!     let claims = auth.verify_access_token(&tokens.access_token)?;
//!     assert_eq!(claims.sub, user.id);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{AuthError, AuthResult};
pub use manager::AuthManager;
pub use models::{
    LoginRequest, RegisterRequest, SessionTokens, TokenClaims, TokenKind, User, UserId,
};
