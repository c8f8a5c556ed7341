//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use flashdeck::{db::DatabaseConfig, llm::LlmConfig};
use std::net::SocketAddr;

/// Default server bind address
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Prometheus exporter bind address; no exporter when absent
    pub metrics_bind: Option<SocketAddr>,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Completion provider configuration
    pub llm: LlmConfig,
    /// Fewest cards a generated deck may have
    pub min_cards: usize,
}

/// Security-related configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// JWT signing secret (required)
    pub jwt_secret: String,
    /// Password hashing pepper (required)
    pub password_pepper: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or unparseable
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_addr(
                "SERVER_BIND",
                &std::env::var("SERVER_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string()),
            )?,
        };

        let metrics_bind = std::env::var("METRICS_BIND")
            .ok()
            .map(|addr| parse_addr("METRICS_BIND", &addr))
            .transpose()?;

        let mut database = DatabaseConfig::from_env();
        if let Some(url) = database_url_override {
            database.database_url = url;
        }

        // Security configuration (REQUIRED)
        let jwt_secret = required("JWT_SECRET", "Generate with: openssl rand -hex 32")?;
        let password_pepper = required("PASSWORD_PEPPER", "Generate with: openssl rand -hex 16")?;

        let defaults = LlmConfig::default();
        let llm = LlmConfig {
            api_url: std::env::var("LLM_API_URL").unwrap_or(defaults.api_url),
            api_key: required("LLM_API_KEY", "API key of the chat-completions provider")?,
            model: std::env::var("LLM_MODEL").unwrap_or(defaults.model),
            timeout_secs: parse_env_or("LLM_TIMEOUT_SECS", defaults.timeout_secs),
            max_tokens: parse_env_or("LLM_MAX_TOKENS", defaults.max_tokens),
            temperature: parse_env_or("LLM_TEMPERATURE", defaults.temperature),
            top_p: parse_env_or("LLM_TOP_P", defaults.top_p),
        };

        Ok(ServerConfig {
            bind,
            metrics_bind,
            database,
            security: SecurityConfig {
                jwt_secret,
                password_pepper,
            },
            llm,
            min_cards: parse_env_or("DECK_MIN_CARDS", 0),
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.len() < 32 {
            return Err(invalid(
                "JWT_SECRET",
                "Must be at least 32 characters (128-bit security)",
            ));
        }

        if self.security.password_pepper.len() < 16 {
            return Err(invalid(
                "PASSWORD_PEPPER",
                "Must be at least 16 characters (64-bit security)",
            ));
        }

        if self.llm.api_key.trim().is_empty() {
            return Err(invalid("LLM_API_KEY", "Must not be empty"));
        }

        if self.llm.timeout_secs == 0 {
            return Err(invalid("LLM_TIMEOUT_SECS", "Must be greater than 0"));
        }

        if self.llm.max_tokens == 0 {
            return Err(invalid("LLM_MAX_TOKENS", "Must be greater than 0"));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(invalid("LLM_TEMPERATURE", "Must be between 0 and 2"));
        }

        if !(self.llm.top_p > 0.0 && self.llm.top_p <= 1.0) {
            return Err(invalid("LLM_TOP_P", "Must be in (0, 1]"));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(invalid(
                "DB_MIN_CONNECTIONS",
                format!(
                    "Cannot exceed max connections ({})",
                    self.database.max_connections
                ),
            ));
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn invalid(var: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        var: var.to_string(),
        reason: reason.into(),
    }
}

fn required(var: &str, hint: &str) -> Result<String, ConfigError> {
    std::env::var(var).map_err(|_| ConfigError::MissingRequired {
        var: var.to_string(),
        hint: hint.to_string(),
    })
}

fn parse_addr(var: &str, value: &str) -> Result<SocketAddr, ConfigError> {
    value
        .parse()
        .map_err(|e| invalid(var, format!("`{}` is not a socket address: {}", value, e)))
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
