//! Authentication manager implementation.

use super::{
    errors::{AuthError, AuthResult},
    models::{LoginRequest, RegisterRequest, SessionTokens, TokenClaims, TokenKind, User, UserId},
};
use crate::db::UserRepository;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::sync::Arc;

/// Longest accepted username, matching the registration form of the web client
pub const MAX_USERNAME_LEN: usize = 70;

/// Authentication manager
#[derive(Clone)]
pub struct AuthManager {
    users: Arc<dyn UserRepository>,
    pepper: String,
    jwt_secret: String,
    access_token_duration: Duration,
    refresh_token_duration: Duration,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `users` - Identity store
    /// * `pepper` - Server-side pepper for password hashing
    /// * `jwt_secret` - Secret key for JWT signing
    pub fn new(users: Arc<dyn UserRepository>, pepper: String, jwt_secret: String) -> Self {
        Self {
            users,
            pepper,
            jwt_secret,
            access_token_duration: Duration::minutes(15),
            refresh_token_duration: Duration::days(7),
        }
    }

    /// Register a new user
    ///
    /// The password is optional; an account registered without one can only sign in
    /// through a federated login.
    ///
    /// # Errors
    ///
    /// * `AuthError::AlreadyExists` - Username already exists
    /// * `AuthError::InvalidUsername` - Username format invalid
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<User> {
        validate_username(&request.username)?;

        if self.users.find_by_username(&request.username).await?.is_some() {
            return Err(AuthError::AlreadyExists);
        }

        let password_hash = match request.password.as_deref() {
            Some(password) => Some(self.hash_password(password)?),
            None => None,
        };

        // A concurrent registration can still win the race; the store reports it as
        // AlreadyExists through the unique constraint.
        let user = self
            .users
            .create_user(&request.username, password_hash.as_deref())
            .await?;

        log::info!("Created user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Check a username/password pair
    ///
    /// Unknown usernames, wrong passwords, and password attempts against federated-only
    /// accounts all fail the same way.
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidCredentials` - Any mismatch
    pub async fn authenticate(&self, request: LoginRequest) -> AuthResult<User> {
        let user = self
            .users
            .find_by_username(&request.username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;
        self.verify_password(&request.password, hash)?;

        log::info!("User authenticated with username: {}", user.username);
        Ok(user)
    }

    /// Sign in an identity already verified by the OAuth provider
    ///
    /// The verified email is the username. The account is created without a password
    /// on first sign-in.
    pub async fn login_federated(&self, verified_email: &str) -> AuthResult<User> {
        validate_username(verified_email)?;

        if let Some(user) = self.users.find_by_username(verified_email).await? {
            log::info!("Federated login for existing user {}", user.username);
            return Ok(user);
        }

        match self.users.create_user(verified_email, None).await {
            Ok(user) => {
                log::info!("Created federated user {} ({})", user.username, user.id);
                Ok(user)
            }
            // Lost a race with another first sign-in for the same identity
            Err(AuthError::AlreadyExists) => self
                .users
                .find_by_username(verified_email)
                .await?
                .ok_or(AuthError::NotFound),
            Err(e) => Err(e),
        }
    }

    /// Look up the user behind an authenticated request
    pub async fn current_user(&self, user_id: UserId) -> AuthResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::NotFound)
    }

    /// Delete an account; the store cascades the deletion to the user's decks
    pub async fn delete_account(&self, user_id: UserId) -> AuthResult<()> {
        if !self.users.delete_user(user_id).await? {
            return Err(AuthError::NotFound);
        }
        log::info!("Deleted user {}", user_id);
        Ok(())
    }

    /// Issue an access/refresh token pair for a user
    pub fn issue_tokens(&self, user: &User) -> AuthResult<SessionTokens> {
        Ok(SessionTokens {
            access_token: self.generate_token(user.id, &user.username, TokenKind::Access)?,
            refresh_token: self.generate_token(user.id, &user.username, TokenKind::Refresh)?,
        })
    }

    /// Verify an access token
    ///
    /// # Errors
    ///
    /// * `AuthError::Jwt` - Bad signature, malformed, or expired
    /// * `AuthError::InvalidToken` - A refresh token was presented
    pub fn verify_access_token(&self, token: &str) -> AuthResult<TokenClaims> {
        self.verify_token(token, TokenKind::Access)
    }

    /// Resolve the user behind an access token
    ///
    /// Unlike [`Self::verify_access_token`] this also requires the account to still
    /// exist, so tokens outliving a deleted account are refused.
    ///
    /// # Errors
    ///
    /// * `AuthError::Jwt` - Bad signature, malformed, or expired
    /// * `AuthError::InvalidToken` - A refresh token, or the account is gone
    pub async fn authorize(&self, access_token: &str) -> AuthResult<UserId> {
        let claims = self.verify_access_token(access_token)?;
        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or(AuthError::InvalidToken)?;
        Ok(user.id)
    }

    /// Exchange a refresh token for a new access token
    ///
    /// The user must still exist; tokens of deleted accounts are refused.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> AuthResult<String> {
        let claims = self.verify_token(refresh_token, TokenKind::Refresh)?;
        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        self.generate_token(user.id, &user.username, TokenKind::Access)
    }

    fn verify_token(&self, token: &str, expected: TokenKind) -> AuthResult<TokenClaims> {
        let token_data = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )?;

        if token_data.claims.kind != expected {
            return Err(AuthError::InvalidToken);
        }
        Ok(token_data.claims)
    }

    fn generate_token(
        &self,
        user_id: UserId,
        username: &str,
        kind: TokenKind,
    ) -> AuthResult<String> {
        let now = Utc::now();
        let lifetime = match kind {
            TokenKind::Access => self.access_token_duration,
            TokenKind::Refresh => self.refresh_token_duration,
        };
        let claims = TokenClaims {
            sub: user_id,
            username: username.to_string(),
            kind,
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Hash password with Argon2id + pepper
    fn hash_password(&self, password: &str) -> AuthResult<String> {
        let peppered = format!("{}{}", password, self.pepper);
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        Ok(argon2
            .hash_password(peppered.as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    /// Verify password against hash
    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<()> {
        let peppered = format!("{}{}", password, self.pepper);
        let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;

        Argon2::default()
            .verify_password(peppered.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidCredentials)
    }
}

/// Validate username format
fn validate_username(username: &str) -> AuthResult<()> {
    if username.trim().is_empty() {
        return Err(AuthError::InvalidUsername(
            "Username must not be empty".to_string(),
        ));
    }

    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(AuthError::InvalidUsername(format!(
            "Username must be at most {} characters",
            MAX_USERNAME_LEN
        )));
    }

    if username.trim() != username {
        return Err(AuthError::InvalidUsername(
            "Username must not start or end with whitespace".to_string(),
        ));
    }

    Ok(())
}
