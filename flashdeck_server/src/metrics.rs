//! Prometheus metrics for the flashcard API.
//!
//! Counters are recorded through the `metrics` facade. Without an installed exporter
//! they are no-ops, which is what the tests rely on.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use flashdeck_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("POST", "/api/v1/decks/generate", 201);
//! metrics::deck_generations_total("success");
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Deck Metrics
// ============================================================================

/// Count one generation request by outcome.
///
/// Outcomes: `success`, `invalid_input`, `generation_failure`, `malformed_output`,
/// `schema_violation`, `database`.
pub fn deck_generations_total(outcome: &'static str) {
    metrics::counter!("deck_generations_total", "outcome" => outcome).increment(1);
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Count one authentication attempt.
///
/// `kind` is `register`, `login` or `refresh`.
pub fn auth_attempts_total(kind: &'static str, success: bool) {
    metrics::counter!("auth_attempts_total",
        "kind" => kind,
        "outcome" => if success { "success" } else { "failure" }
    )
    .increment(1);
}
