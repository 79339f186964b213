//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::adapters::ScriptureClient;
use crate::config::Config;
use bible_nav_core::domain::{Favorite, Note};
use bible_nav_core::ports::{BibleAssistantService, DatabaseService, OwnedRepository};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub favorites: Arc<dyn OwnedRepository<Favorite>>,
    pub notes: Arc<dyn OwnedRepository<Note>>,
    pub scripture: Arc<ScriptureClient>,
    pub assistant: Arc<dyn BibleAssistantService>,
    pub config: Arc<Config>,
    /// Cancelled when the server starts shutting down; in-flight upstream lookups give up.
    pub shutdown: CancellationToken,
}
