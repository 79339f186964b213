//! Shared harness: the real router on an ephemeral port, backed by the in-memory
//! store, a canned scripture transport and a scripted assistant.

#![allow(dead_code)]

use api_lib::adapters::scripture::transport::{JsonTransport, TransportError};
use api_lib::adapters::{MemoryStore, ScriptureClient};
use api_lib::config::{Config, ScriptureConfig};
use api_lib::web::{build_router, AppState};
use async_trait::async_trait;
use bible_nav_client::BibleNavClient;
use bible_nav_core::ports::{BibleAssistantService, PortError, PortResult};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Serves canned JSON by URL prefix; anything else is an upstream 404.
#[derive(Default)]
pub struct CannedTransport {
    routes: Vec<(String, Value)>,
    requests: Mutex<Vec<String>>,
}

impl CannedTransport {
    pub fn route(mut self, prefix: &str, body: Value) -> Self {
        self.routes.push((prefix.to_string(), body));
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl JsonTransport for CannedTransport {
    async fn get_json(&self, url: &Url) -> Result<Value, TransportError> {
        let url = url.to_string();
        self.requests.lock().unwrap().push(url.clone());
        self.routes
            .iter()
            .find(|(prefix, _)| url.starts_with(prefix.as_str()))
            .map(|(_, body)| body.clone())
            .ok_or(TransportError::Status { status: 404, url })
    }
}

/// Answers every prompt by echoing it, except prompts containing "fail".
pub struct ScriptedAssistant;

#[async_trait]
impl BibleAssistantService for ScriptedAssistant {
    async fn answer(&self, prompt: &str) -> PortResult<String> {
        if prompt.contains("fail") {
            return Err(PortError::Unexpected("provider unavailable".to_string()));
        }
        Ok(format!("**Answer:** {prompt}"))
    }
}

pub struct TestServer {
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    pub transport: Arc<CannedTransport>,
    pub shutdown: CancellationToken,
}

impl TestServer {
    pub fn client(&self) -> BibleNavClient {
        BibleNavClient::new(&self.base_url).unwrap()
    }

    /// A fresh client already signed up as `email`.
    pub async fn signed_up(&self, email: &str) -> BibleNavClient {
        let client = self.client();
        client.signup(None, email, "correct horse").await.unwrap();
        client
    }
}

pub fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: None,
        log_level: tracing::Level::INFO,
        cors_origin: "http://localhost:3000".to_string(),
        session_ttl_days: 30,
        ai_api_key: None,
        ai_api_base: "http://ai.test/v1".to_string(),
        ai_model: "test-model".to_string(),
        scripture: ScriptureConfig {
            bible_api_base_url: Url::parse("http://bible.test/").unwrap(),
            supersearch_base_url: Url::parse("http://supersearch.test/api/").unwrap(),
            verse_of_the_day_url: Url::parse("http://manna.test/api/v1/get?format=json").unwrap(),
            ..ScriptureConfig::default()
        },
    }
}

pub async fn spawn_server(transport: CannedTransport) -> TestServer {
    let config = Arc::new(test_config());
    let store = Arc::new(MemoryStore::new());
    let transport = Arc::new(transport);
    let shutdown = CancellationToken::new();

    let state = Arc::new(AppState {
        db: store.clone(),
        favorites: store.clone(),
        notes: store.clone(),
        scripture: Arc::new(ScriptureClient::new(
            transport.clone(),
            config.scripture.clone(),
        )),
        assistant: Arc::new(ScriptedAssistant),
        config,
        shutdown: shutdown.clone(),
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{addr}/"),
        store,
        transport,
        shutdown,
    }
}
