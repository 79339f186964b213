//! crates/bible_nav_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    BibleVerse, BookInfo, Chapter, Favorite, FavoritePatch, NewFavorite, NewNote, NewUser, Note,
    NotePatch, SearchHit, User, UserCredentials, VerseFilter, VerseOfTheDay,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Account Ports
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---
    /// Fails with `AlreadyExists` when the email is taken.
    async fn create_user(&self, new_user: NewUser) -> PortResult<User>;

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    // --- Auth Sessions ---
    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Resolves a live session to its user id. Expired or unknown ids are `Unauthorized`.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;
}

//=========================================================================================
// Owner-Scoped Repositories
//=========================================================================================

/// A record that belongs to exactly one user and is only ever touched through
/// `(id, owner)` pairs.
pub trait OwnedEntity: Clone + Send + Sync + 'static {
    /// Fields required to create the record.
    type Draft: Send + Sync + 'static;
    /// Partial update; absent fields are left alone.
    type Patch: Send + Sync + 'static;

    /// Human-readable name used in error messages ("Favorite", "Note").
    const KIND: &'static str;

    fn id(&self) -> Uuid;
    fn owner(&self) -> Uuid;
}

impl OwnedEntity for Favorite {
    type Draft = NewFavorite;
    type Patch = FavoritePatch;
    const KIND: &'static str = "Favorite";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner(&self) -> Uuid {
        self.user_id
    }
}

impl OwnedEntity for Note {
    type Draft = NewNote;
    type Patch = NotePatch;
    const KIND: &'static str = "Note";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner(&self) -> Uuid {
        self.user_id
    }
}

/// Create/read/update/delete over records of type `E`, always scoped to one owner.
///
/// A record owned by someone else is reported exactly like a missing one
/// (`PortError::NotFound`).
#[async_trait]
pub trait OwnedRepository<E: OwnedEntity>: Send + Sync {
    /// All of the owner's records passing `filter`, newest first.
    async fn list(&self, owner: Uuid, filter: &VerseFilter) -> PortResult<Vec<E>>;

    async fn create(&self, owner: Uuid, draft: E::Draft) -> PortResult<E>;

    async fn get(&self, owner: Uuid, id: Uuid) -> PortResult<E>;

    async fn update(&self, owner: Uuid, id: Uuid, patch: E::Patch) -> PortResult<()>;

    async fn delete(&self, owner: Uuid, id: Uuid) -> PortResult<()>;
}

//=========================================================================================
// External Provider Ports
//=========================================================================================

/// Scripture lookups against third-party providers.
///
/// Lookups are advisory: provider failures surface as `None` or an empty list,
/// never as an error.
#[async_trait]
pub trait ScriptureService: Send + Sync {
    async fn verse_of_the_day(&self) -> Option<VerseOfTheDay>;

    async fn verse(&self, reference: &str, version: &str) -> Option<BibleVerse>;

    async fn chapter(&self, book: &str, chapter_number: u32, version: &str) -> Option<Chapter>;

    async fn books(&self, language: &str) -> Vec<BookInfo>;

    async fn search(&self, query: &str, version: &str) -> Vec<SearchHit>;
}

#[async_trait]
pub trait BibleAssistantService: Send + Sync {
    /// Answers a free-form question about the Bible.
    async fn answer(&self, prompt: &str) -> PortResult<String>;
}
