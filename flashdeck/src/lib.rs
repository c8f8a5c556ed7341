//! # Flashdeck
//!
//! Backend core for a flashcard study application. Users register or sign in, ask for a
//! deck on a topic, and manage their own decks and cards.
//!
//! The one subsystem with real moving parts is the deck-generation pipeline: a prompt is
//! sent to an external completion provider, the returned text is validated as a strict
//! JSON deck shape, and only a validated draft is written to the database, deck and
//! cards together in a single transaction.
//!
//! ## Architecture
//!
//! ```text
//! DeckAssembler ──► DeckGenerator ──► CompletionProvider (HTTP)
//!       │                 raw text
//!       ├──► DeckValidator ──► GeneratedDeckDraft
//!       └──► DeckRepository (one transaction)
//!
//! DeckManager ──► DeckRepository        (owner-scoped CRUD)
//! AuthManager ──► UserRepository        (Argon2id + JWT)
//! ```
//!
//! ## Core Modules
//!
//! - [`auth`]: Registration, login, federated login, and token handling
//! - [`db`]: Connection pool, repository traits and their PostgreSQL / in-memory backends
//! - [`deck`]: Deck models, validator, generator, assembly and management services
//! - [`llm`]: Completion provider seam and the chat-completions HTTP client
//!
//! ## Example
//!
//! ```
//! use flashdeck::deck::DeckValidator;
//!
//! let raw = r#"{"title": "Cells", "description": "Basics", "cards": []}"#;
//! let draft = DeckValidator::new().validate(raw).unwrap();
//! assert_eq!(draft.title, "Cells");
//! ```

/// User registration, authentication, and JWT handling.
pub mod auth;

/// Database pool, configuration, and repositories.
pub mod db;

/// Decks, flashcards, and the generation pipeline.
pub mod deck;

/// External completion provider.
pub mod llm;

pub use auth::{AuthError, AuthManager, User, UserId};
pub use deck::{
    Deck, DeckAssembler, DeckError, DeckGenerator, DeckId, DeckManager, DeckSummary,
    DeckValidator, Flashcard, GeneratedDeckDraft,
};
pub use llm::{CompletionProvider, LlmConfig};
