//! Deck data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::UserId;

/// Deck ID type
pub type DeckId = Uuid;

/// Flashcard ID type
pub type FlashcardId = Uuid;

/// A persisted flashcard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: FlashcardId,
    pub deck_id: DeckId,
    /// Insertion ordinal within the deck, starting at 0
    pub position: i32,
    pub question: String,
    pub answer: String,
    pub explanation: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A persisted deck with its flashcards in insertion order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub id: DeckId,
    pub owner_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub cards: Vec<Flashcard>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Deck {
    /// Whether `owner` may see or change this deck
    pub fn is_owned_by(&self, owner: UserId) -> bool {
        self.owner_id == owner
    }
}

/// One row of a deck listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckSummary {
    pub id: DeckId,
    pub owner_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub card_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A flashcard to be written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFlashcard {
    pub question: String,
    pub answer: String,
    pub explanation: Option<String>,
}

/// A deck to be written, together with all of its cards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDeck {
    pub owner_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub cards: Vec<NewFlashcard>,
}

/// Fields of a deck that may be overwritten; `None` leaves the stored value alone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl DeckChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// A card proposed by the completion provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftCard {
    pub question: String,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// A validated but not yet persisted deck proposed by the completion provider
///
/// Only [`DeckValidator`](super::DeckValidator) builds these from provider output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedDeckDraft {
    pub title: String,
    pub description: String,
    pub cards: Vec<DraftCard>,
}

impl GeneratedDeckDraft {
    /// Turn the draft into a write request owned by `owner`, keeping card order
    pub fn into_new_deck(self, owner: UserId) -> NewDeck {
        NewDeck {
            owner_id: owner,
            name: self.title,
            description: Some(self.description),
            cards: self
                .cards
                .into_iter()
                .map(|card| NewFlashcard {
                    question: card.question,
                    answer: card.answer,
                    explanation: card.explanation,
                })
                .collect(),
        }
    }
}
