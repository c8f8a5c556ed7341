//! Owner-scoped deck management.

use std::sync::Arc;

use super::{
    errors::{DeckError, DeckResult},
    models::{Deck, DeckChanges, DeckId, DeckSummary, Flashcard, NewDeck, NewFlashcard},
};
use crate::{auth::UserId, db::DeckRepository};

/// Owner-scoped deck management
///
/// Every operation takes the caller's user id. A deck owned by anyone else is reported as
/// `DeckError::NotFound`, exactly as if the id did not exist.
pub struct DeckManager {
    decks: Arc<dyn DeckRepository>,
}

impl DeckManager {
    pub fn new(decks: Arc<dyn DeckRepository>) -> Self {
        Self { decks }
    }

    /// Create a deck from caller-supplied content
    ///
    /// # Errors
    ///
    /// - `DeckError::InvalidInput` - Empty name, question or answer
    /// - `DeckError::Database` - Write failed; nothing was stored
    pub async fn create(
        &self,
        owner: UserId,
        name: String,
        description: Option<String>,
        cards: Vec<NewFlashcard>,
    ) -> DeckResult<Deck> {
        validate_name(&name)?;
        for card in &cards {
            validate_card(card)?;
        }

        let deck = self
            .decks
            .create_deck(&NewDeck {
                owner_id: owner,
                name,
                description,
                cards,
            })
            .await?;

        log::info!("Deck {} created manually by user {}", deck.id, owner);
        Ok(deck)
    }

    /// Get a deck with its cards
    pub async fn get(&self, deck_id: DeckId, owner: UserId) -> DeckResult<Deck> {
        let deck = self.decks.get_deck(deck_id).await?;
        visible_to(deck, owner)
    }

    /// All of the owner's decks, newest first
    pub async fn list(&self, owner: UserId) -> DeckResult<Vec<DeckSummary>> {
        self.decks.list_decks(owner).await
    }

    /// Overwrite the supplied fields
    ///
    /// # Errors
    ///
    /// - `DeckError::InvalidInput` - Supplied name is empty
    /// - `DeckError::NotFound` - No such deck for this owner
    pub async fn update(
        &self,
        deck_id: DeckId,
        owner: UserId,
        changes: DeckChanges,
    ) -> DeckResult<Deck> {
        if let Some(name) = &changes.name {
            validate_name(name)?;
        }

        if changes.is_empty() {
            return self.get(deck_id, owner).await;
        }

        let deck = self.decks.update_deck(deck_id, owner, &changes).await?;
        visible_to(deck, owner)
    }

    /// Delete a deck and all of its cards
    pub async fn delete(&self, deck_id: DeckId, owner: UserId) -> DeckResult<()> {
        if self.decks.delete_deck(deck_id, owner).await? {
            log::info!("Deck {} deleted by user {}", deck_id, owner);
            Ok(())
        } else {
            Err(DeckError::NotFound)
        }
    }

    /// Append a card to the end of a deck
    pub async fn add_flashcard(
        &self,
        deck_id: DeckId,
        owner: UserId,
        card: NewFlashcard,
    ) -> DeckResult<Flashcard> {
        validate_card(&card)?;
        self.decks
            .add_flashcard(deck_id, owner, &card)
            .await?
            .ok_or(DeckError::NotFound)
    }

    /// Check that the deck store is reachable
    pub async fn ping(&self) -> DeckResult<()> {
        self.decks.ping().await
    }
}

/// Ownership hiding: a deck the caller does not own is indistinguishable from a missing one.
fn visible_to(deck: Option<Deck>, owner: UserId) -> DeckResult<Deck> {
    deck.filter(|deck| deck.is_owned_by(owner))
        .ok_or(DeckError::NotFound)
}

fn validate_name(name: &str) -> DeckResult<()> {
    if name.trim().is_empty() {
        return Err(DeckError::InvalidInput(
            "Deck name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_card(card: &NewFlashcard) -> DeckResult<()> {
    if card.question.trim().is_empty() || card.answer.trim().is_empty() {
        return Err(DeckError::InvalidInput(
            "Question and answer must not be empty".to_string(),
        ));
    }
    Ok(())
}
