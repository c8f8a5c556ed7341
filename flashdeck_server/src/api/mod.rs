//! HTTP API for the flashcard service.
//!
//! # Modules
//!
//! - [`auth`]: Registration, login, token refresh, account
//! - [`decks`]: Deck generation and owner-scoped deck management
//! - [`middleware`]: Bearer token authentication for protected endpoints
//! - [`request_id`]: Request correlation IDs and HTTP metrics
//! - [`error`]: Domain error to HTTP status mapping
//! - [`extract`]: Body and path extractors answering in the error format
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use flashdeck::{
//!     AuthManager, DeckAssembler, DeckGenerator, DeckManager, DeckValidator, LlmConfig,
//!     db::memory::{InMemoryDeckRepository, InMemoryUserRepository},
//!     llm::ChatCompletionsClient,
//! };
//! use flashdeck_server::api::{AppState, create_router};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = LlmConfig::default();
//! let decks = Arc::new(InMemoryDeckRepository::new());
//! let generator = DeckGenerator::new(Arc::new(ChatCompletionsClient::new(&llm)?), &llm);
//!
//! let state = AppState {
//!     auth_manager: Arc::new(AuthManager::new(
//!         Arc::new(InMemoryUserRepository::new()),
//!         "pepper".to_string(),
//!         "secret".to_string(),
//!     )),
//!     deck_manager: Arc::new(DeckManager::new(decks.clone())),
//!     deck_assembler: Arc::new(DeckAssembler::new(generator, DeckValidator::new(), decks)),
//! };
//!
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod decks;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod request_id;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use flashdeck::{AuthManager, DeckAssembler, DeckManager};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; every field is an `Arc` built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub auth_manager: Arc<AuthManager>,
    pub deck_manager: Arc<DeckManager>,
    pub deck_assembler: Arc<DeckAssembler>,
}

/// Create the complete API router with all endpoints and middleware.
///
/// ```text
/// GET    /health                          - Health check (public)
/// POST   /api/v1/auth/register            - Register (public)
/// POST   /api/v1/auth/login               - Login (public)
/// POST   /api/v1/auth/token/refresh       - New access token (public, refresh token in body)
/// GET    /api/v1/auth/me                  - Current user
/// DELETE /api/v1/auth/me                  - Delete account and decks
/// POST   /api/v1/decks/generate           - Generate and store a deck
/// POST   /api/v1/decks                    - Create a deck
/// GET    /api/v1/decks                    - List own decks
/// GET    /api/v1/decks/{deck_id}          - Get deck with cards
/// PATCH  /api/v1/decks/{deck_id}          - Update name/description
/// DELETE /api/v1/decks/{deck_id}          - Delete deck and cards
/// POST   /api/v1/decks/{deck_id}/cards    - Append a card
/// ```
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", create_v1_router(state.clone()))
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_v1_router(state: AppState) -> Router<AppState> {
    // Public routes (no authentication middleware)
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/token/refresh", post(auth::refresh_token));

    // Protected routes (require authentication middleware)
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me).delete(auth::delete_me))
        .route("/decks/generate", post(decks::generate_deck))
        .route("/decks", post(decks::create_deck).get(decks::list_decks))
        .route(
            "/decks/{deck_id}",
            get(decks::get_deck)
                .patch(decks::update_deck)
                .delete(decks::delete_deck),
        )
        .route("/decks/{deck_id}/cards", post(decks::add_flashcard))
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth_middleware,
        ));

    Router::new().merge(public_routes).merge(protected_routes)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the deck store answers, `503 Service Unavailable` otherwise.
///
/// ```bash
/// curl http://localhost:8000/health
/// # {"status":"healthy","version":"0.1.0","database":true,"timestamp":"2026-01-01T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = match state.deck_manager.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            false
        }
    };

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
