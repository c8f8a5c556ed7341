//! HTTP server for the flashcard service.
//!
//! The binary in `main.rs` wires PostgreSQL stores and the chat-completions client into
//! [`api::AppState`]; the modules here are also used directly by the integration tests.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
