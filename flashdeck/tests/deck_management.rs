//! Integration tests for owner-scoped deck management.

use flashdeck::db::memory::InMemoryDeckRepository;
use flashdeck::deck::{DeckChanges, DeckError, DeckManager, NewFlashcard};
use std::sync::Arc;
use uuid::Uuid;

fn setup() -> (DeckManager, InMemoryDeckRepository) {
    let decks = InMemoryDeckRepository::new();
    (DeckManager::new(Arc::new(decks.clone())), decks)
}

fn card(question: &str, answer: &str) -> NewFlashcard {
    NewFlashcard {
        question: question.to_string(),
        answer: answer.to_string(),
        explanation: None,
    }
}

#[tokio::test]
async fn test_manual_deck_round_trips() {
    let (manager, _) = setup();
    let owner = Uuid::new_v4();

    let created = manager
        .create(
            owner,
            "Spanish verbs".to_string(),
            Some("Irregular preterite".to_string()),
            vec![card("ir (yo)", "fui"), card("tener (yo)", "tuve")],
        )
        .await
        .unwrap();

    let fetched = manager.get(created.id, owner).await.unwrap();
    assert_eq!(fetched.name, "Spanish verbs");
    assert_eq!(fetched.description.as_deref(), Some("Irregular preterite"));
    let questions: Vec<_> = fetched.cards.iter().map(|c| c.question.as_str()).collect();
    assert_eq!(questions, ["ir (yo)", "tener (yo)"]);
}

#[tokio::test]
async fn test_other_users_deck_is_indistinguishable_from_missing() {
    let (manager, _) = setup();
    let owner = Uuid::new_v4();
    let intruder = Uuid::new_v4();
    let deck = manager
        .create(owner, "Private".to_string(), None, vec![card("q", "a")])
        .await
        .unwrap();
    let missing = Uuid::new_v4();

    for deck_id in [deck.id, missing] {
        assert!(matches!(
            manager.get(deck_id, intruder).await,
            Err(DeckError::NotFound)
        ));
        assert!(matches!(
            manager
                .update(
                    deck_id,
                    intruder,
                    DeckChanges {
                        name: None,
                        description: Some("defaced".to_string()),
                    },
                )
                .await,
            Err(DeckError::NotFound)
        ));
        assert!(matches!(
            manager.delete(deck_id, intruder).await,
            Err(DeckError::NotFound)
        ));
    }

    // Untouched for the owner
    let deck = manager.get(deck.id, owner).await.unwrap();
    assert_eq!(deck.description, None);
    assert!(manager.list(intruder).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_overwrites_only_supplied_fields() {
    let (manager, _) = setup();
    let owner = Uuid::new_v4();
    let deck = manager
        .create(
            owner,
            "Rust".to_string(),
            Some("Ownership".to_string()),
            vec![card("q", "a")],
        )
        .await
        .unwrap();

    let renamed = manager
        .update(
            deck.id,
            owner,
            DeckChanges {
                name: Some("Rust basics".to_string()),
                description: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Rust basics");
    assert_eq!(renamed.description.as_deref(), Some("Ownership"));
    assert_eq!(renamed.cards.len(), 1);

    let described = manager
        .update(
            deck.id,
            owner,
            DeckChanges {
                name: None,
                description: Some("Borrowing".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(described.name, "Rust basics");
    assert_eq!(described.description.as_deref(), Some("Borrowing"));
    assert!(described.updated_at >= deck.updated_at);
}

#[tokio::test]
async fn test_delete_cascades_to_flashcards() {
    let (manager, decks) = setup();
    let owner = Uuid::new_v4();
    let kept = manager
        .create(owner, "Kept".to_string(), None, vec![card("k", "k")])
        .await
        .unwrap();
    let doomed = manager
        .create(
            owner,
            "Doomed".to_string(),
            None,
            vec![card("q1", "a1"), card("q2", "a2"), card("q3", "a3")],
        )
        .await
        .unwrap();
    assert_eq!(decks.flashcard_rows().await, 4);

    manager.delete(doomed.id, owner).await.unwrap();

    assert!(matches!(
        manager.get(doomed.id, owner).await,
        Err(DeckError::NotFound)
    ));
    assert_eq!(decks.flashcard_rows().await, 1);
    assert_eq!(decks.orphaned_flashcards().await, 0);
    assert_eq!(manager.get(kept.id, owner).await.unwrap().cards.len(), 1);

    // Deleting twice reports the deck as gone
    assert!(matches!(
        manager.delete(doomed.id, owner).await,
        Err(DeckError::NotFound)
    ));
}

#[tokio::test]
async fn test_list_is_newest_first_with_card_counts() {
    let (manager, _) = setup();
    let owner = Uuid::new_v4();
    let first = manager
        .create(owner, "First".to_string(), None, vec![card("q", "a")])
        .await
        .unwrap();
    let second = manager
        .create(
            owner,
            "Second".to_string(),
            None,
            vec![card("q", "a"), card("q", "a")],
        )
        .await
        .unwrap();
    manager
        .create(Uuid::new_v4(), "Someone else's".to_string(), None, vec![])
        .await
        .unwrap();

    let listed = manager.list(owner).await.unwrap();
    let ids: Vec<_> = listed.iter().map(|d| d.id).collect();
    assert_eq!(ids, [second.id, first.id]);
    assert_eq!(listed[0].card_count, 2);
    assert_eq!(listed[1].card_count, 1);
}

#[tokio::test]
async fn test_add_flashcard_appends() {
    let (manager, _) = setup();
    let owner = Uuid::new_v4();
    let deck = manager
        .create(owner, "Rust".to_string(), None, vec![card("first", "1")])
        .await
        .unwrap();

    let added = manager
        .add_flashcard(
            deck.id,
            owner,
            NewFlashcard {
                question: "second".to_string(),
                answer: "2".to_string(),
                explanation: Some("after the first".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(added.deck_id, deck.id);

    let deck = manager.get(deck.id, owner).await.unwrap();
    let questions: Vec<_> = deck.cards.iter().map(|c| c.question.as_str()).collect();
    assert_eq!(questions, ["first", "second"]);
    assert_eq!(deck.cards[1].explanation.as_deref(), Some("after the first"));
}
