//! Deck API handlers.
//!
//! All routes here sit behind the authentication middleware; the owner of every
//! operation is the authenticated user. Decks of other users answer `404 Not Found`.
//!
//! # Example
//!
//! ```bash
//! curl -X POST http://localhost:8000/api/v1/decks/generate \
//!   -H "Authorization: Bearer $TOKEN" \
//!   -H "Content-Type: application/json" \
//!   -d '{"topic": "Photosynthesis"}'
//! ```

use axum::{Extension, Json, extract::State, http::StatusCode};
use flashdeck::{
    Deck, DeckError, DeckSummary, Flashcard, UserId,
    deck::{DeckChanges, NewFlashcard},
};
use serde::Deserialize;
use std::time::Instant;

use super::{
    AppState,
    error::ApiError,
    extract::{ApiJson, DeckIdPath},
    request_id::RequestId,
};
use crate::{logging, metrics};

#[derive(Debug, Deserialize)]
pub struct GeneratePayload {
    pub topic: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateDeckPayload {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cards: Vec<NewFlashcard>,
}

fn generation_outcome(result: &Result<Deck, DeckError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(DeckError::InvalidInput(_)) => "invalid_input",
        Err(DeckError::GenerationFailure(_)) => "generation_failure",
        Err(DeckError::MalformedOutput(_)) => "malformed_output",
        Err(DeckError::SchemaViolation { .. }) => "schema_violation",
        Err(DeckError::UnknownOwner) => "unknown_owner",
        Err(DeckError::NotFound | DeckError::Database(_)) => "database",
    }
}

/// Generate a deck about a topic and store it.
///
/// One provider call per request; a failed generation is not retried.
///
/// # Request Body
///
/// ```json
/// { "topic": "Photosynthesis" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Blank topic
/// - `502 Bad Gateway`: Provider returned text that is not a valid deck
/// - `503 Service Unavailable`: Provider failed or timed out
pub async fn generate_deck(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Extension(request_id): Extension<RequestId>,
    ApiJson(payload): ApiJson<GeneratePayload>,
) -> Result<(StatusCode, Json<Deck>), ApiError> {
    tracing::info!(
        request_id = request_id.as_str(),
        %user_id,
        topic = %payload.topic,
        "Generating deck"
    );

    let started = Instant::now();
    let result = state
        .deck_assembler
        .generate_and_save(&payload.topic, user_id)
        .await;

    let outcome = generation_outcome(&result);
    metrics::deck_generations_total(outcome);
    logging::log_generation(
        user_id,
        &payload.topic,
        outcome,
        started.elapsed().as_millis() as u64,
    );

    Ok((StatusCode::CREATED, Json(result?)))
}

/// Create a deck from the request body.
///
/// # Request Body
///
/// ```json
/// {
///   "name": "Spanish verbs",
///   "description": "Irregular preterite",
///   "cards": [{ "question": "ir (yo)", "answer": "fui" }]
/// }
/// ```
pub async fn create_deck(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    ApiJson(payload): ApiJson<CreateDeckPayload>,
) -> Result<(StatusCode, Json<Deck>), ApiError> {
    let deck = state
        .deck_manager
        .create(user_id, payload.name, payload.description, payload.cards)
        .await?;
    Ok((StatusCode::CREATED, Json(deck)))
}

/// List the caller's decks, newest first.
pub async fn list_decks(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Json<Vec<DeckSummary>>, ApiError> {
    Ok(Json(state.deck_manager.list(user_id).await?))
}

/// Get one deck with its cards.
pub async fn get_deck(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    DeckIdPath(deck_id): DeckIdPath,
) -> Result<Json<Deck>, ApiError> {
    Ok(Json(state.deck_manager.get(deck_id, user_id).await?))
}

/// Rename a deck or change its description.
///
/// Fields left out of the body keep their stored values.
///
/// # Request Body
///
/// ```json
/// { "name": "Plants", "description": "Light into sugar" }
/// ```
pub async fn update_deck(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    DeckIdPath(deck_id): DeckIdPath,
    ApiJson(changes): ApiJson<DeckChanges>,
) -> Result<Json<Deck>, ApiError> {
    Ok(Json(
        state.deck_manager.update(deck_id, user_id, changes).await?,
    ))
}

/// Delete a deck and all of its cards.
pub async fn delete_deck(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    DeckIdPath(deck_id): DeckIdPath,
) -> Result<StatusCode, ApiError> {
    state.deck_manager.delete(deck_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Append a card to a deck.
///
/// # Request Body
///
/// ```json
/// { "question": "ser (yo)", "answer": "fui", "explanation": "Same form as ir" }
/// ```
pub async fn add_flashcard(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    DeckIdPath(deck_id): DeckIdPath,
    ApiJson(card): ApiJson<NewFlashcard>,
) -> Result<(StatusCode, Json<Flashcard>), ApiError> {
    let card = state
        .deck_manager
        .add_flashcard(deck_id, user_id, card)
        .await?;
    Ok((StatusCode::CREATED, Json(card)))
}
