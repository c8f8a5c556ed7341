//! Flashcard deck server.
//!
//! Connects to PostgreSQL, applies migrations, and serves the HTTP API backed by a
//! chat-completions provider for deck generation.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use flashdeck::{
    AuthManager, DeckAssembler, DeckGenerator, DeckManager, DeckValidator,
    db::{Database, DeckRepository, PgDeckRepository, PgUserRepository},
    llm::ChatCompletionsClient,
};
use flashdeck_server::{api, config::ServerConfig, logging, metrics};
use pico_args::Arguments;
use tracing::{error, info};

const HELP: &str = "\
Run the flashcard deck server

USAGE:
  flashdeck_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8000]
  --db-url     URL         Database connection string  [default: env DATABASE_URL or postgres://postgres@localhost/flashdeck]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8000)
  DATABASE_URL             PostgreSQL connection string
  JWT_SECRET               JWT signing secret (at least 32 characters)
  PASSWORD_PEPPER          Password hashing pepper (at least 16 characters)
  LLM_API_KEY              Completion provider API key
  LLM_API_URL, LLM_MODEL   Completion provider endpoint and model
  LLM_TIMEOUT_SECS         Upper bound on one generation call [default: 60]
  DECK_MIN_CARDS           Fewest cards a generated deck may have [default: 0]
  METRICS_BIND             Prometheus exporter address (disabled when unset)
  (See .env.example for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind_override: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let database_url_override: Option<String> = pargs.opt_value_from_str("--db-url")?;

    logging::init();

    let config = ServerConfig::from_env(bind_override, database_url_override)?;
    config.validate()?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(Error::msg)?;
        info!("Prometheus metrics exported on http://{}/metrics", addr);
    }

    info!("Connecting to database");
    let db = Database::new(&config.database)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await.context("Failed to apply migrations")?;
    info!("Database connected and migrated");

    let users = Arc::new(PgUserRepository::new(db.pool().clone()));
    let decks: Arc<dyn DeckRepository> = Arc::new(PgDeckRepository::new(db.pool().clone()));

    let auth_manager = Arc::new(AuthManager::new(
        users,
        config.security.password_pepper.clone(),
        config.security.jwt_secret.clone(),
    ));

    let provider = Arc::new(ChatCompletionsClient::new(&config.llm)?);
    let generator = DeckGenerator::new(provider, &config.llm);
    let deck_assembler = Arc::new(DeckAssembler::new(
        generator,
        DeckValidator::with_min_cards(config.min_cards),
        decks.clone(),
    ));
    let deck_manager = Arc::new(DeckManager::new(decks));

    info!(
        "Deck generation via {} (model {}, timeout {}s, min cards {})",
        config.llm.api_url, config.llm.model, config.llm.timeout_secs, config.min_cards
    );

    let app = api::create_router(api::AppState {
        auth_manager,
        deck_manager,
        deck_assembler,
    });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");
    db.close().await;

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
