//! Integration tests for the HTTP API.
//!
//! The router runs against in-memory stores and a scripted completion provider, so no
//! database or network access is needed.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use flashdeck::db::memory::{InMemoryDeckRepository, InMemoryUserRepository};
use flashdeck::llm::{CompletionProvider, CompletionRequest, LlmError, LlmResult};
use flashdeck::{AuthManager, DeckAssembler, DeckGenerator, DeckManager, DeckValidator, LlmConfig};
use flashdeck_server::api::{AppState, create_router};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt; // For `oneshot` method

/// Completion provider answering with whatever the test queued last
#[derive(Default)]
struct ScriptedProvider {
    reply: Mutex<Option<String>>,
}

impl ScriptedProvider {
    fn reply_with(&self, text: &str) {
        *self.reply.lock().unwrap() = Some(text.to_string());
    }

    fn fail(&self) {
        *self.reply.lock().unwrap() = None;
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, _request: &CompletionRequest) -> LlmResult<String> {
        self.reply.lock().unwrap().clone().ok_or(LlmError::Status {
            status: 503,
            body: "provider unavailable".to_string(),
        })
    }
}

struct TestServer {
    app: axum::Router,
    provider: Arc<ScriptedProvider>,
    decks: InMemoryDeckRepository,
}

/// Helper to create a test server over fresh in-memory stores
fn create_test_server() -> TestServer {
    let decks = InMemoryDeckRepository::new();
    let users = InMemoryUserRepository::new().with_decks(decks.clone());
    let provider = Arc::new(ScriptedProvider::default());

    let auth_manager = Arc::new(AuthManager::new(
        Arc::new(users),
        "test_pepper_for_testing_only".to_string(),
        "test_secret_key_for_testing_only_32+".to_string(),
    ));
    let generator = DeckGenerator::new(provider.clone(), &LlmConfig::default())
        .with_timeout(Duration::from_secs(5));

    let state = AppState {
        auth_manager,
        deck_manager: Arc::new(DeckManager::new(Arc::new(decks.clone()))),
        deck_assembler: Arc::new(DeckAssembler::new(
            generator,
            DeckValidator::new(),
            Arc::new(decks.clone()),
        )),
    };

    TestServer {
        app: create_router(state),
        provider,
        decks,
    }
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let body = match body {
        Some(body) => {
            builder = builder.header("content-type", "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// Register a user and return their access token
async fn register(app: &axum::Router, username: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({"username": username, "password": "SecurePass123!"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["access_token"].as_str().unwrap().to_string()
}

fn photosynthesis_json() -> String {
    let cards: Vec<Value> = (1..=6)
        .map(|i| {
            json!({
                "question": format!("Question {}", i),
                "answer": format!("Answer {}", i),
                "explanation": "Light reactions happen in the thylakoids."
            })
        })
        .collect();
    json!({
        "title": "Photosynthesis",
        "description": "How plants make sugar",
        "cards": cards
    })
    .to_string()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check_endpoint() {
    let server = create_test_server();

    let (status, body) = send(&server.app, "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let server = create_test_server();

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();
    let response = server.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = server.app.clone().oneshot(request).await.unwrap();
    let generated = response.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok());
}

// ============================================================================
// Authentication Tests
// ============================================================================

#[tokio::test]
async fn test_register_twice_conflicts() {
    let server = create_test_server();
    register(&server.app, "alice").await;

    let (status, body) = send(
        &server.app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({"username": "alice", "password": "other"})),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_login_and_wrong_password() {
    let server = create_test_server();
    register(&server.app, "alice").await;

    let (status, body) = send(
        &server.app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({"username": "alice", "password": "SecurePass123!"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert!(body["refresh_token"].is_string());

    let (status, _) = send(
        &server.app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({"username": "alice", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_and_me() {
    let server = create_test_server();
    let (_, body) = send(
        &server.app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({"username": "alice", "password": "pw"})),
    )
    .await;
    let refresh = body["refresh_token"].as_str().unwrap().to_string();

    let (status, body) = send(
        &server.app,
        "POST",
        "/api/v1/auth/token/refresh",
        None,
        Some(json!({"refresh_token": refresh})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let access = body["access_token"].as_str().unwrap().to_string();

    let (status, me) = send(&server.app, "GET", "/api/v1/auth/me", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "alice");
    assert!(me.get("password_hash").is_none());

    // A refresh token does not open protected routes
    let (status, _) = send(&server.app, "GET", "/api/v1/auth/me", Some(&refresh), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let server = create_test_server();

    let (status, body) = send(&server.app, "GET", "/api/v1/decks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = send(&server.app, "GET", "/api/v1/decks", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Deck Generation Tests
// ============================================================================

#[tokio::test]
async fn test_generate_deck() {
    let server = create_test_server();
    let token = register(&server.app, "alice").await;
    server.provider.reply_with(&photosynthesis_json());

    let (status, deck) = send(
        &server.app,
        "POST",
        "/api/v1/decks/generate",
        Some(&token),
        Some(json!({"topic": "Photosynthesis"})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(deck["name"], "Photosynthesis");
    assert_eq!(deck["cards"].as_array().unwrap().len(), 6);
    assert_eq!(deck["cards"][0]["question"], "Question 1");

    let (status, listed) = send(&server.app, "GET", "/api/v1/decks", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed[0]["card_count"], 6);
}

#[tokio::test]
async fn test_generation_error_statuses() {
    let server = create_test_server();
    let token = register(&server.app, "alice").await;
    let generate = |topic: &'static str| {
        let app = server.app.clone();
        let token = token.clone();
        async move {
            send(
                &app,
                "POST",
                "/api/v1/decks/generate",
                Some(&token),
                Some(json!({"topic": topic})),
            )
            .await
        }
    };

    server.provider.reply_with("not json");
    assert_eq!(generate("Photosynthesis").await.0, StatusCode::BAD_GATEWAY);

    server
        .provider
        .reply_with(r#"{"title": "t", "description": "d", "cards": [{"answer": "a"}]}"#);
    let (status, body) = generate("Photosynthesis").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("cards[0].question"));

    server.provider.fail();
    assert_eq!(
        generate("Photosynthesis").await.0,
        StatusCode::SERVICE_UNAVAILABLE
    );

    assert_eq!(generate("   ").await.0, StatusCode::BAD_REQUEST);

    assert_eq!(server.decks.deck_rows().await, 0);
}

// ============================================================================
// Deck Management Tests
// ============================================================================

#[tokio::test]
async fn test_deck_crud_and_ownership() {
    let server = create_test_server();
    let alice = register(&server.app, "alice").await;
    let bob = register(&server.app, "bob").await;

    let (status, deck) = send(
        &server.app,
        "POST",
        "/api/v1/decks",
        Some(&alice),
        Some(json!({
            "name": "Spanish verbs",
            "description": "Irregular preterite",
            "cards": [{"question": "ir (yo)", "answer": "fui"}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/v1/decks/{}", deck["id"].as_str().unwrap());

    // Bob cannot tell the deck exists
    for method in ["GET", "DELETE"] {
        let (status, _) = send(&server.app, method, &uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
    let (status, _) = send(
        &server.app,
        "PATCH",
        &uri,
        Some(&bob),
        Some(json!({"name": "Mine"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, updated) = send(
        &server.app,
        "PATCH",
        &uri,
        Some(&alice),
        Some(json!({"name": "Verbs"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Verbs");
    assert_eq!(updated["description"], "Irregular preterite");

    let (status, card) = send(
        &server.app,
        "POST",
        &format!("{}/cards", uri),
        Some(&alice),
        Some(json!({"question": "ser (yo)", "answer": "fui"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(card["position"], 1);

    let (status, fetched) = send(&server.app, "GET", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["cards"].as_array().unwrap().len(), 2);

    let (status, _) = send(&server.app, "DELETE", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&server.app, "GET", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(server.decks.flashcard_rows().await, 0);
}

#[tokio::test]
async fn test_empty_deck_name_is_bad_request() {
    let server = create_test_server();
    let token = register(&server.app, "alice").await;

    let (status, _) = send(
        &server.app,
        "POST",
        "/api/v1/decks",
        Some(&token),
        Some(json!({"name": ""})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_account_removes_decks() {
    let server = create_test_server();
    let token = register(&server.app, "alice").await;
    server.provider.reply_with(&photosynthesis_json());
    send(
        &server.app,
        "POST",
        "/api/v1/decks/generate",
        Some(&token),
        Some(json!({"topic": "Photosynthesis"})),
    )
    .await;
    assert_eq!(server.decks.deck_rows().await, 1);

    let (status, _) = send(&server.app, "DELETE", "/api/v1/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert_eq!(server.decks.deck_rows().await, 0);
    assert_eq!(server.decks.flashcard_rows().await, 0);
    let (status, _) = send(&server.app, "GET", "/api/v1/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_deleted_account_token_cannot_write_decks() {
    let server = create_test_server();
    let token = register(&server.app, "alice").await;
    let (status, _) = send(&server.app, "DELETE", "/api/v1/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    server.provider.reply_with(&photosynthesis_json());
    let (status, body) = send(
        &server.app,
        "POST",
        "/api/v1/decks/generate",
        Some(&token),
        Some(json!({"topic": "Photosynthesis"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string(), "{body}");

    let (status, _) = send(
        &server.app,
        "POST",
        "/api/v1/decks",
        Some(&token),
        Some(json!({"name": "Orphan"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(server.decks.deck_rows().await, 0);
}

#[tokio::test]
async fn test_malformed_deck_id_is_not_found() {
    let server = create_test_server();
    let token = register(&server.app, "alice").await;

    for (method, uri, body) in [
        ("GET", "/api/v1/decks/not-a-uuid", None),
        ("PATCH", "/api/v1/decks/not-a-uuid", Some(json!({"name": "x"}))),
        ("DELETE", "/api/v1/decks/12345", None),
        (
            "POST",
            "/api/v1/decks/not-a-uuid/cards",
            Some(json!({"question": "q", "answer": "a"})),
        ),
    ] {
        let (status, body) = send(&server.app, method, uri, Some(&token), body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(body["error"], "Deck not found", "{method} {uri}");
    }
}

#[tokio::test]
async fn test_invalid_bodies_are_bad_request_with_error_body() {
    let server = create_test_server();
    let token = register(&server.app, "alice").await;

    let (status, body) = send(
        &server.app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({"user": "bob"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("username"), "{body}");

    let (status, body) = send(
        &server.app,
        "POST",
        "/api/v1/decks/generate",
        Some(&token),
        Some(json!({"subject": "Photosynthesis"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("topic"), "{body}");

    // Not JSON at all
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/decks")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from("{name: oops"))
        .unwrap();
    let response = server.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string(), "{body}");
}
