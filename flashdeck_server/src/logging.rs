//! Structured logging configuration.
//!
//! The library crate logs through the `log` facade; the subscriber installed here also
//! receives those records, so one filter (`RUST_LOG`) governs both.

use flashdeck::UserId;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels come from `RUST_LOG`, defaulting to `info,sqlx=warn,hyper=warn`.
///
/// # Example
///
/// ```no_run
/// use flashdeck_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log security event with structured data
///
/// # Example
///
/// ```
/// use flashdeck_server::logging::log_security_event;
///
/// log_security_event("failed_login", None, "Invalid credentials for alice");
/// ```
pub fn log_security_event(event_type: &str, user_id: Option<UserId>, message: &str) {
    tracing::warn!(
        event_type = event_type,
        user_id = user_id.map(|id| id.to_string()),
        "SECURITY: {}",
        message
    );
}

/// Log the outcome of one deck generation request
pub fn log_generation(user_id: UserId, topic: &str, outcome: &str, duration_ms: u64) {
    if duration_ms > 30_000 {
        tracing::warn!(
            %user_id,
            topic = topic,
            outcome = outcome,
            duration_ms = duration_ms,
            "Slow deck generation"
        );
    } else {
        tracing::info!(
            %user_id,
            topic = topic,
            outcome = outcome,
            duration_ms = duration_ms,
            "Deck generation finished"
        );
    }
}
