//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        scripture::transport::ReqwestTransport, DbAdapter, MemoryStore, OpenAiAssistantAdapter,
        ScriptureClient, UnconfiguredAssistant,
    },
    config::Config,
    error::ApiError,
    web::{build_router, ApiDoc, AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::Router;
use bible_nav_core::domain::{Favorite, Note};
use bible_nav_core::ports::{BibleAssistantService, DatabaseService, OwnedRepository};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

type Stores = (
    Arc<dyn DatabaseService>,
    Arc<dyn OwnedRepository<Favorite>>,
    Arc<dyn OwnedRepository<Note>>,
);

/// Postgres when `DATABASE_URL` is set, otherwise the in-memory store.
async fn connect_stores(config: &Config) -> Result<Stores, ApiError> {
    let Some(database_url) = config.database_url.as_deref() else {
        warn!("DATABASE_URL is not set; data lives in memory and is lost on restart.");
        let store = Arc::new(MemoryStore::new());
        let stores: Stores = (store.clone(), store.clone(), store);
        return Ok(stores);
    };

    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");
    let stores: Stores = (db_adapter.clone(), db_adapter.clone(), db_adapter);
    Ok(stores)
}

fn build_assistant(config: &Config) -> Arc<dyn BibleAssistantService> {
    match config.ai_api_key.as_deref() {
        Some(key) => {
            let openai_config = OpenAIConfig::new()
                .with_api_key(key)
                .with_api_base(&config.ai_api_base);
            Arc::new(OpenAiAssistantAdapter::new(
                Client::with_config(openai_config),
                config.ai_model.clone(),
            ))
        }
        None => {
            warn!("AI_API_KEY is not set; /ai will answer 500.");
            Arc::new(UnconfiguredAssistant)
        }
    }
}

async fn shutdown_signal(token: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received.");
    token.cancel();
}

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Storage ---
    let (db, favorites, notes) = connect_stores(&config).await?;

    // --- 3. Initialize Service Adapters ---
    let transport = Arc::new(ReqwestTransport::new(config.scripture.http_timeout)?);
    let scripture = Arc::new(ScriptureClient::new(transport, config.scripture.clone()));
    let assistant = build_assistant(&config);

    // --- 4. Build the Shared AppState ---
    let shutdown = CancellationToken::new();
    let app_state = Arc::new(AppState {
        db,
        favorites,
        notes,
        scripture,
        assistant,
        config: config.clone(),
        shutdown: shutdown.clone(),
    });

    // --- 5. Create the Web Router ---
    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|_| {
        ApiError::Internal(format!("Invalid CORS_ORIGIN: '{}'", config.cors_origin))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    let app = Router::new()
        .merge(build_router(app_state).layer(cors))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    info!("Server stopped.");
    Ok(())
}
