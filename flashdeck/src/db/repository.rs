//! Repository trait definitions and their PostgreSQL implementations.
//!
//! The traits are the boundary the services consume: the identity store and the deck
//! store. Implementations must keep two guarantees: `create_deck` writes the deck and
//! all of its cards as one unit, and deleting a deck (or a user) removes everything
//! beneath it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use uuid::Uuid;

use crate::auth::{AuthError, AuthResult, User, UserId};
use crate::deck::{
    Deck, DeckChanges, DeckError, DeckId, DeckResult, DeckSummary, Flashcard, NewDeck,
    NewFlashcard,
};

/// Trait for identity store operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    ///
    /// Returns `AuthError::AlreadyExists` if the username is taken.
    async fn create_user(&self, username: &str, password_hash: Option<&str>) -> AuthResult<User>;

    /// Find user by username
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>>;

    /// Delete a user and everything they own; `false` if there was no such user
    async fn delete_user(&self, user_id: UserId) -> AuthResult<bool>;
}

/// Trait for deck store operations
#[async_trait]
pub trait DeckRepository: Send + Sync {
    /// Write a deck and all of its cards in one transaction
    ///
    /// Cards are stored in the order given; on any failure nothing is written. An owner
    /// without an account is `DeckError::UnknownOwner`.
    async fn create_deck(&self, deck: &NewDeck) -> DeckResult<Deck>;

    /// Append a card to a deck owned by `owner`; `None` if no such deck
    async fn add_flashcard(
        &self,
        deck_id: DeckId,
        owner: UserId,
        card: &NewFlashcard,
    ) -> DeckResult<Option<Flashcard>>;

    /// Get a deck with its cards, whoever owns it
    async fn get_deck(&self, deck_id: DeckId) -> DeckResult<Option<Deck>>;

    /// All decks owned by `owner`, newest first
    async fn list_decks(&self, owner: UserId) -> DeckResult<Vec<DeckSummary>>;

    /// Overwrite the supplied fields of a deck owned by `owner`; `None` if no such deck
    async fn update_deck(
        &self,
        deck_id: DeckId,
        owner: UserId,
        changes: &DeckChanges,
    ) -> DeckResult<Option<Deck>>;

    /// Delete a deck owned by `owner` and its cards; `false` if no such deck
    async fn delete_deck(&self, deck_id: DeckId, owner: UserId) -> DeckResult<bool>;

    /// Check that the store is reachable
    async fn ping(&self) -> DeckResult<()>;
}

/// Default PostgreSQL implementation of `UserRepository`
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(r: &PgRow) -> User {
    User {
        id: r.get("id"),
        username: r.get("username"),
        password_hash: r.get("password_hash"),
        created_at: r.get::<DateTime<Utc>, _>("created_at"),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_user(&self, username: &str, password_hash: Option<&str>) -> AuthResult<User> {
        let row = sqlx::query(
            "INSERT INTO users (id, username, password_hash)
             VALUES ($1, $2, $3)
             RETURNING id, username, password_hash, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => AuthError::AlreadyExists,
            _ => AuthError::Database(e),
        })?;

        Ok(user_from_row(&row))
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let row =
            sqlx::query("SELECT id, username, password_hash, created_at FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn delete_user(&self, user_id: UserId) -> AuthResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Default PostgreSQL implementation of `DeckRepository`
pub struct PgDeckRepository {
    pool: PgPool,
}

impl PgDeckRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_card(
        tx: &mut Transaction<'_, Postgres>,
        deck_id: DeckId,
        position: i32,
        card: &NewFlashcard,
        created_at: DateTime<Utc>,
    ) -> Result<Flashcard, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO flashcards (id, deck_id, position, question, answer, explanation, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(id)
        .bind(deck_id)
        .bind(position)
        .bind(&card.question)
        .bind(&card.answer)
        .bind(&card.explanation)
        .bind(created_at)
        .execute(&mut **tx)
        .await?;

        Ok(Flashcard {
            id,
            deck_id,
            position,
            question: card.question.clone(),
            answer: card.answer.clone(),
            explanation: card.explanation.clone(),
            created_at,
        })
    }
}

fn card_from_row(r: &PgRow) -> Flashcard {
    Flashcard {
        id: r.get("id"),
        deck_id: r.get("deck_id"),
        position: r.get("position"),
        question: r.get("question"),
        answer: r.get("answer"),
        explanation: r.get("explanation"),
        created_at: r.get::<DateTime<Utc>, _>("created_at"),
    }
}

#[async_trait]
impl DeckRepository for PgDeckRepository {
    async fn create_deck(&self, deck: &NewDeck) -> DeckResult<Deck> {
        let deck_id = Uuid::new_v4();
        let now = Utc::now();

        // Dropping the transaction on an early return rolls everything back
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO decks (id, owner_id, name, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            "#,
        )
        .bind(deck_id)
        .bind(deck.owner_id)
        .bind(&deck.name)
        .bind(&deck.description)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_foreign_key_violation() => DeckError::UnknownOwner,
            _ => DeckError::Database(e),
        })?;

        let mut cards = Vec::with_capacity(deck.cards.len());
        for (position, card) in deck.cards.iter().enumerate() {
            let position = i32::try_from(position)
                .map_err(|_| DeckError::InvalidInput("Too many cards in one deck".to_string()))?;
            cards.push(Self::insert_card(&mut tx, deck_id, position, card, now).await?);
        }

        tx.commit().await?;

        Ok(Deck {
            id: deck_id,
            owner_id: deck.owner_id,
            name: deck.name.clone(),
            description: deck.description.clone(),
            cards,
            created_at: now,
            updated_at: now,
        })
    }

    async fn add_flashcard(
        &self,
        deck_id: DeckId,
        owner: UserId,
        card: &NewFlashcard,
    ) -> DeckResult<Option<Flashcard>> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent appends to the same deck
        let owned = sqlx::query("SELECT id FROM decks WHERE id = $1 AND owner_id = $2 FOR UPDATE")
            .bind(deck_id)
            .bind(owner)
            .fetch_optional(&mut *tx)
            .await?;
        if owned.is_none() {
            return Ok(None);
        }

        let next: i32 = sqlx::query(
            "SELECT COALESCE(MAX(position) + 1, 0) AS next FROM flashcards WHERE deck_id = $1",
        )
        .bind(deck_id)
        .fetch_one(&mut *tx)
        .await?
        .get("next");

        let now = Utc::now();
        let created = Self::insert_card(&mut tx, deck_id, next, card, now).await?;

        sqlx::query("UPDATE decks SET updated_at = $2 WHERE id = $1")
            .bind(deck_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(created))
    }

    async fn get_deck(&self, deck_id: DeckId) -> DeckResult<Option<Deck>> {
        let Some(row) = sqlx::query(
            r#"
            SELECT id, owner_id, name, description, created_at, updated_at
            FROM decks
            WHERE id = $1
            "#,
        )
        .bind(deck_id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let cards = sqlx::query(
            r#"
            SELECT id, deck_id, position, question, answer, explanation, created_at
            FROM flashcards
            WHERE deck_id = $1
            ORDER BY position
            "#,
        )
        .bind(deck_id)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(card_from_row)
        .collect();

        Ok(Some(Deck {
            id: row.get("id"),
            owner_id: row.get("owner_id"),
            name: row.get("name"),
            description: row.get("description"),
            cards,
            created_at: row.get::<DateTime<Utc>, _>("created_at"),
            updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
        }))
    }

    async fn list_decks(&self, owner: UserId) -> DeckResult<Vec<DeckSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT d.id, d.owner_id, d.name, d.description, d.created_at, d.updated_at,
                   COUNT(f.id) AS card_count
            FROM decks d
            LEFT JOIN flashcards f ON f.deck_id = d.id
            WHERE d.owner_id = $1
            GROUP BY d.id
            ORDER BY d.created_at DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| DeckSummary {
                id: r.get("id"),
                owner_id: r.get("owner_id"),
                name: r.get("name"),
                description: r.get("description"),
                card_count: r.get("card_count"),
                created_at: r.get::<DateTime<Utc>, _>("created_at"),
                updated_at: r.get::<DateTime<Utc>, _>("updated_at"),
            })
            .collect())
    }

    async fn update_deck(
        &self,
        deck_id: DeckId,
        owner: UserId,
        changes: &DeckChanges,
    ) -> DeckResult<Option<Deck>> {
        let updated = sqlx::query(
            r#"
            UPDATE decks
            SET name = COALESCE($3, name),
                description = COALESCE($4, description),
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING id
            "#,
        )
        .bind(deck_id)
        .bind(owner)
        .bind(&changes.name)
        .bind(&changes.description)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(_) => self.get_deck(deck_id).await,
            None => Ok(None),
        }
    }

    async fn delete_deck(&self, deck_id: DeckId, owner: UserId) -> DeckResult<bool> {
        // flashcards go with the deck through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM decks WHERE id = $1 AND owner_id = $2")
            .bind(deck_id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> DeckResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
