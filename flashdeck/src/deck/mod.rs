//! Decks, flashcards, and the generation pipeline.
//!
//! - [`DeckGenerator`] builds the prompts and makes the one provider call
//! - [`DeckValidator`] checks the provider's text against the deck shape
//! - [`DeckAssembler`] chains the two and writes the deck with its cards atomically
//! - [`DeckManager`] is the owner-scoped CRUD surface

pub mod assembler;
pub mod errors;
pub mod generator;
pub mod manager;
pub mod models;
pub mod validator;

pub use assembler::DeckAssembler;
pub use errors::{DeckError, DeckResult};
pub use generator::DeckGenerator;
pub use manager::DeckManager;
pub use models::{
    Deck, DeckChanges, DeckId, DeckSummary, DraftCard, Flashcard, FlashcardId,
    GeneratedDeckDraft, NewDeck, NewFlashcard,
};
pub use validator::DeckValidator;
