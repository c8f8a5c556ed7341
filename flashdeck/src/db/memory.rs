//! In-process implementations of the repository traits.
//!
//! They keep users, decks and flashcards in separate tables the way the PostgreSQL
//! schema does, so cascade and orphan behaviour can be observed directly in tests.
//! `InMemoryDeckRepository::fail_card_writes_after` makes the n-th card write of a
//! deck creation fail, which exercises the all-or-nothing guarantee. Linking the two
//! stores with [`InMemoryUserRepository::with_decks`] adds the user foreign key: deck
//! deletion cascades from users, and decks for missing owners are refused.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::repository::{DeckRepository, UserRepository};
use crate::auth::{AuthError, AuthResult, User, UserId};
use crate::deck::{
    Deck, DeckChanges, DeckError, DeckId, DeckResult, DeckSummary, Flashcard, NewDeck,
    NewFlashcard,
};

/// Deck row without its cards
#[derive(Debug, Clone)]
struct DeckRow {
    seq: u64,
    deck: Deck,
}

#[derive(Debug, Default)]
struct DeckTables {
    next_seq: u64,
    decks: HashMap<DeckId, DeckRow>,
    flashcards: Vec<Flashcard>,
}

impl DeckTables {
    fn materialize(&self, deck_id: DeckId) -> Option<Deck> {
        let row = self.decks.get(&deck_id)?;
        let mut cards: Vec<Flashcard> = self
            .flashcards
            .iter()
            .filter(|card| card.deck_id == deck_id)
            .cloned()
            .collect();
        cards.sort_by_key(|card| card.position);
        Some(Deck {
            cards,
            ..row.deck.clone()
        })
    }

    fn owns(&self, deck_id: DeckId, owner: UserId) -> bool {
        self.decks
            .get(&deck_id)
            .is_some_and(|row| row.deck.owner_id == owner)
    }

    fn remove_deck(&mut self, deck_id: DeckId) {
        self.decks.remove(&deck_id);
        self.flashcards.retain(|card| card.deck_id != deck_id);
    }
}

type UserTable = Arc<Mutex<HashMap<UserId, User>>>;

/// In-memory deck store
#[derive(Clone, Default)]
pub struct InMemoryDeckRepository {
    tables: Arc<Mutex<DeckTables>>,
    // Shared by every clone so linking one handle links them all
    owners: Arc<OnceLock<UserTable>>,
    fail_card_writes_after: Option<usize>,
}

impl InMemoryDeckRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every deck creation fail when writing the card at index `n`
    pub fn fail_card_writes_after(mut self, n: usize) -> Self {
        self.fail_card_writes_after = Some(n);
        self
    }

    /// Number of deck rows currently stored
    pub async fn deck_rows(&self) -> usize {
        self.tables.lock().await.decks.len()
    }

    /// Number of flashcard rows currently stored, across all decks
    pub async fn flashcard_rows(&self) -> usize {
        self.tables.lock().await.flashcards.len()
    }

    /// Flashcard rows whose deck no longer exists
    pub async fn orphaned_flashcards(&self) -> usize {
        let tables = self.tables.lock().await;
        tables
            .flashcards
            .iter()
            .filter(|card| !tables.decks.contains_key(&card.deck_id))
            .count()
    }

    /// Delete every deck owned by `owner`, as the user foreign key cascade does
    pub async fn delete_owned_by(&self, owner: UserId) {
        let mut tables = self.tables.lock().await;
        let owned: Vec<DeckId> = tables
            .decks
            .values()
            .filter(|row| row.deck.owner_id == owner)
            .map(|row| row.deck.id)
            .collect();
        for deck_id in owned {
            tables.remove_deck(deck_id);
        }
    }
}

fn injected_failure() -> DeckError {
    DeckError::Database(sqlx::Error::Protocol(
        "injected flashcard write failure".to_string(),
    ))
}

#[async_trait]
impl DeckRepository for InMemoryDeckRepository {
    async fn create_deck(&self, deck: &NewDeck) -> DeckResult<Deck> {
        if let Some(users) = self.owners.get() {
            if !users.lock().await.contains_key(&deck.owner_id) {
                return Err(DeckError::UnknownOwner);
            }
        }

        let deck_id = Uuid::new_v4();
        let now = Utc::now();

        // Stage every row first; the tables are touched only once all writes succeeded
        let mut cards = Vec::with_capacity(deck.cards.len());
        for (position, card) in deck.cards.iter().enumerate() {
            if self.fail_card_writes_after == Some(position) {
                return Err(injected_failure());
            }
            cards.push(Flashcard {
                id: Uuid::new_v4(),
                deck_id,
                position: position as i32,
                question: card.question.clone(),
                answer: card.answer.clone(),
                explanation: card.explanation.clone(),
                created_at: now,
            });
        }

        let created = Deck {
            id: deck_id,
            owner_id: deck.owner_id,
            name: deck.name.clone(),
            description: deck.description.clone(),
            cards: cards.clone(),
            created_at: now,
            updated_at: now,
        };

        let mut tables = self.tables.lock().await;
        let seq = tables.next_seq;
        tables.next_seq += 1;
        tables.decks.insert(
            deck_id,
            DeckRow {
                seq,
                deck: Deck {
                    cards: Vec::new(),
                    ..created.clone()
                },
            },
        );
        tables.flashcards.extend(cards);

        Ok(created)
    }

    async fn add_flashcard(
        &self,
        deck_id: DeckId,
        owner: UserId,
        card: &NewFlashcard,
    ) -> DeckResult<Option<Flashcard>> {
        let mut tables = self.tables.lock().await;
        if !tables.owns(deck_id, owner) {
            return Ok(None);
        }

        let position = tables
            .flashcards
            .iter()
            .filter(|c| c.deck_id == deck_id)
            .map(|c| c.position + 1)
            .max()
            .unwrap_or(0);
        let now = Utc::now();
        let created = Flashcard {
            id: Uuid::new_v4(),
            deck_id,
            position,
            question: card.question.clone(),
            answer: card.answer.clone(),
            explanation: card.explanation.clone(),
            created_at: now,
        };
        tables.flashcards.push(created.clone());
        if let Some(row) = tables.decks.get_mut(&deck_id) {
            row.deck.updated_at = now;
        }

        Ok(Some(created))
    }

    async fn get_deck(&self, deck_id: DeckId) -> DeckResult<Option<Deck>> {
        Ok(self.tables.lock().await.materialize(deck_id))
    }

    async fn list_decks(&self, owner: UserId) -> DeckResult<Vec<DeckSummary>> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<&DeckRow> = tables
            .decks
            .values()
            .filter(|row| row.deck.owner_id == owner)
            .collect();
        rows.sort_by(|a, b| {
            b.deck
                .created_at
                .cmp(&a.deck.created_at)
                .then(b.seq.cmp(&a.seq))
        });

        Ok(rows
            .into_iter()
            .map(|row| DeckSummary {
                id: row.deck.id,
                owner_id: row.deck.owner_id,
                name: row.deck.name.clone(),
                description: row.deck.description.clone(),
                card_count: tables
                    .flashcards
                    .iter()
                    .filter(|c| c.deck_id == row.deck.id)
                    .count() as i64,
                created_at: row.deck.created_at,
                updated_at: row.deck.updated_at,
            })
            .collect())
    }

    async fn update_deck(
        &self,
        deck_id: DeckId,
        owner: UserId,
        changes: &DeckChanges,
    ) -> DeckResult<Option<Deck>> {
        let mut tables = self.tables.lock().await;
        let Some(row) = tables
            .decks
            .get_mut(&deck_id)
            .filter(|row| row.deck.owner_id == owner)
        else {
            return Ok(None);
        };

        if let Some(name) = &changes.name {
            row.deck.name = name.clone();
        }
        if let Some(description) = &changes.description {
            row.deck.description = Some(description.clone());
        }
        row.deck.updated_at = Utc::now();

        Ok(tables.materialize(deck_id))
    }

    async fn delete_deck(&self, deck_id: DeckId, owner: UserId) -> DeckResult<bool> {
        let mut tables = self.tables.lock().await;
        if !tables.owns(deck_id, owner) {
            return Ok(false);
        }
        tables.remove_deck(deck_id);
        Ok(true)
    }

    async fn ping(&self) -> DeckResult<()> {
        Ok(())
    }
}

/// In-memory identity store
///
/// When built with [`InMemoryUserRepository::with_decks`], deleting a user also deletes
/// the user's decks from that deck store.
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: UserTable,
    decks: Option<InMemoryDeckRepository>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cascade user deletion into `decks` and make `decks` refuse unknown owners
    ///
    /// A deck store can be linked to one user store only; later links are ignored.
    pub fn with_decks(mut self, decks: InMemoryDeckRepository) -> Self {
        let _ = decks.owners.set(self.users.clone());
        self.decks = Some(decks);
        self
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_user(&self, username: &str, password_hash: Option<&str>) -> AuthResult<User> {
        let mut users = self.users.lock().await;
        if users.values().any(|u| u.username == username) {
            return Err(AuthError::AlreadyExists);
        }

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.map(str::to_string),
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        Ok(self.users.lock().await.get(&user_id).cloned())
    }

    async fn delete_user(&self, user_id: UserId) -> AuthResult<bool> {
        let removed = self.users.lock().await.remove(&user_id).is_some();
        if removed {
            if let Some(decks) = &self.decks {
                decks.delete_owned_by(user_id).await;
            }
        }
        Ok(removed)
    }
}
