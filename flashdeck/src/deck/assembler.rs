//! Generation pipeline: provider call, validation, atomic persistence.

use std::sync::Arc;

use super::{
    errors::DeckResult, generator::DeckGenerator, models::Deck, validator::DeckValidator,
};
use crate::{auth::UserId, db::DeckRepository};

/// Generates a deck and stores it for its owner
pub struct DeckAssembler {
    generator: DeckGenerator,
    validator: DeckValidator,
    decks: Arc<dyn DeckRepository>,
}

impl DeckAssembler {
    pub fn new(
        generator: DeckGenerator,
        validator: DeckValidator,
        decks: Arc<dyn DeckRepository>,
    ) -> Self {
        Self {
            generator,
            validator,
            decks,
        }
    }

    /// Generate a deck about `topic` and persist it, cards in draft order
    ///
    /// One provider call per invocation. A draft that fails validation is dropped without
    /// touching the store, and the deck with all its cards is written in one transaction.
    ///
    /// # Errors
    ///
    /// - `DeckError::InvalidInput` - Topic is blank
    /// - `DeckError::GenerationFailure` - Provider failed or timed out
    /// - `DeckError::MalformedOutput` - Provider text is not JSON
    /// - `DeckError::SchemaViolation` - Provider JSON does not have the deck shape
    /// - `DeckError::Database` - Write failed; nothing was stored
    pub async fn generate_and_save(&self, topic: &str, owner: UserId) -> DeckResult<Deck> {
        let raw = self.generator.generate(topic).await?;

        let draft = self.validator.validate(&raw).inspect_err(|e| {
            log::warn!("Rejected generated deck for user {}: {}", owner, e);
        })?;

        let deck = self.decks.create_deck(&draft.into_new_deck(owner)).await?;

        log::info!(
            "Deck created with ID: {} and title: {} ({} cards)",
            deck.id,
            deck.name,
            deck.cards.len()
        );

        Ok(deck)
    }
}
