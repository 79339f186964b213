//! services/api/src/adapters/memory.rs
//!
//! An in-process implementation of the persistence ports. Used when the service is
//! started without a `DATABASE_URL` and by the test suites.

use async_trait::async_trait;
use bible_nav_core::domain::{
    Favorite, FavoritePatch, NewFavorite, NewNote, NewUser, Note, NotePatch, User,
    UserCredentials, VerseFilter,
};
use bible_nav_core::ports::{
    DatabaseService, OwnedEntity, OwnedRepository, PortError, PortResult,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Where a record sits in the text, plus its creation time for ordering.
trait Addressed {
    fn address(&self) -> (&str, i32, i32);
    fn created_at(&self) -> DateTime<Utc>;
}

impl Addressed for Favorite {
    fn address(&self) -> (&str, i32, i32) {
        (&self.book, self.chapter, self.verse_number)
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Addressed for Note {
    fn address(&self) -> (&str, i32, i32) {
        (&self.book, self.chapter, self.verse)
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Rows of one entity kind in insertion order. The sequence number breaks
/// creation-time ties so "newest first" stays deterministic.
struct Table<E> {
    rows: Vec<(u64, E)>,
    next_seq: u64,
}

impl<E> Default for Table<E> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<E: OwnedEntity + Addressed> Table<E> {
    fn insert(&mut self, row: E) -> E {
        self.next_seq += 1;
        self.rows.push((self.next_seq, row.clone()));
        row
    }

    fn list(&self, owner: Uuid, filter: &VerseFilter) -> Vec<E> {
        let mut matching: Vec<&(u64, E)> = self
            .rows
            .iter()
            .filter(|(_, row)| row.owner() == owner)
            .filter(|(_, row)| {
                let (book, chapter, verse) = row.address();
                filter.matches(book, chapter, verse)
            })
            .collect();
        matching.sort_by(|(seq_a, a), (seq_b, b)| {
            (b.created_at(), seq_b).cmp(&(a.created_at(), seq_a))
        });
        matching.into_iter().map(|(_, row)| row.clone()).collect()
    }

    fn get_mut(&mut self, owner: Uuid, id: Uuid) -> PortResult<&mut E> {
        self.rows
            .iter_mut()
            .map(|(_, row)| row)
            .find(|row| row.id() == id && row.owner() == owner)
            .ok_or_else(|| PortError::NotFound(format!("{} not found", E::KIND)))
    }

    fn delete(&mut self, owner: Uuid, id: Uuid) -> PortResult<()> {
        let before = self.rows.len();
        self.rows
            .retain(|(_, row)| !(row.id() == id && row.owner() == owner));
        if self.rows.len() == before {
            return Err(PortError::NotFound(format!("{} not found", E::KIND)));
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Default)]
struct Accounts {
    users: HashMap<Uuid, UserCredentials>,
    sessions: HashMap<String, (Uuid, DateTime<Utc>)>,
}

/// In-memory adapter implementing the account and owned-record ports.
#[derive(Default)]
pub struct MemoryStore {
    accounts: Mutex<Accounts>,
    favorites: Mutex<Table<Favorite>>,
    notes: Mutex<Table<Note>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total favorites across all users.
    pub async fn favorite_count(&self) -> usize {
        self.favorites.lock().await.len()
    }

    /// Total notes across all users.
    pub async fn note_count(&self) -> usize {
        self.notes.lock().await.len()
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        let mut accounts = self.accounts.lock().await;
        let taken = accounts
            .users
            .values()
            .any(|c| c.user.email.as_deref() == Some(new_user.email.as_str()));
        if taken {
            return Err(PortError::AlreadyExists("User already exists".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: Some(new_user.email),
            created_at: now,
            updated_at: now,
        };
        accounts.users.insert(
            user.id,
            UserCredentials {
                user: user.clone(),
                hashed_password: Some(new_user.hashed_password),
            },
        );
        Ok(user)
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        self.accounts
            .lock()
            .await
            .users
            .get(&user_id)
            .map(|c| c.user.clone())
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        self.accounts
            .lock()
            .await
            .users
            .values()
            .find(|c| c.user.email.as_deref() == Some(email))
            .cloned()
            .ok_or_else(|| {
                PortError::NotFound("No account found with that email address".to_string())
            })
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let mut accounts = self.accounts.lock().await;
        let now = Utc::now();
        accounts.sessions.retain(|_, (_, expires_at)| *expires_at > now);
        accounts
            .sessions
            .insert(session_id.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let mut accounts = self.accounts.lock().await;
        match accounts.sessions.get(session_id) {
            Some((user_id, expires_at)) if *expires_at > Utc::now() => Ok(*user_id),
            Some(_) => {
                accounts.sessions.remove(session_id);
                Err(PortError::Unauthorized)
            }
            None => Err(PortError::Unauthorized),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.accounts.lock().await.sessions.remove(session_id);
        Ok(())
    }
}

//=========================================================================================
// `OwnedRepository` Trait Implementations
//=========================================================================================

#[async_trait]
impl OwnedRepository<Favorite> for MemoryStore {
    async fn list(&self, owner: Uuid, filter: &VerseFilter) -> PortResult<Vec<Favorite>> {
        Ok(self.favorites.lock().await.list(owner, filter))
    }

    async fn create(&self, owner: Uuid, draft: NewFavorite) -> PortResult<Favorite> {
        let favorite = Favorite {
            id: Uuid::new_v4(),
            user_id: owner,
            book: draft.book,
            chapter: draft.chapter,
            verse_number: draft.verse_number,
            verse_text: draft.verse_text,
            created_at: Utc::now(),
        };
        Ok(self.favorites.lock().await.insert(favorite))
    }

    async fn get(&self, owner: Uuid, id: Uuid) -> PortResult<Favorite> {
        self.favorites
            .lock()
            .await
            .get_mut(owner, id)
            .map(|f| f.clone())
    }

    async fn update(&self, owner: Uuid, id: Uuid, patch: FavoritePatch) -> PortResult<()> {
        let mut favorites = self.favorites.lock().await;
        let favorite = favorites.get_mut(owner, id)?;
        if let Some(book) = patch.book {
            favorite.book = book;
        }
        if let Some(chapter) = patch.chapter {
            favorite.chapter = chapter;
        }
        if let Some(verse_number) = patch.verse_number {
            favorite.verse_number = verse_number;
        }
        if let Some(verse_text) = patch.verse_text {
            favorite.verse_text = verse_text;
        }
        Ok(())
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> PortResult<()> {
        self.favorites.lock().await.delete(owner, id)
    }
}

#[async_trait]
impl OwnedRepository<Note> for MemoryStore {
    async fn list(&self, owner: Uuid, filter: &VerseFilter) -> PortResult<Vec<Note>> {
        Ok(self.notes.lock().await.list(owner, filter))
    }

    async fn create(&self, owner: Uuid, draft: NewNote) -> PortResult<Note> {
        let now = Utc::now();
        let note = Note {
            id: Uuid::new_v4(),
            user_id: owner,
            book: draft.book,
            chapter: draft.chapter,
            verse: draft.verse,
            content: draft.content,
            created_at: now,
            updated_at: now,
        };
        Ok(self.notes.lock().await.insert(note))
    }

    async fn get(&self, owner: Uuid, id: Uuid) -> PortResult<Note> {
        self.notes.lock().await.get_mut(owner, id).map(|n| n.clone())
    }

    async fn update(&self, owner: Uuid, id: Uuid, patch: NotePatch) -> PortResult<()> {
        let mut notes = self.notes.lock().await;
        let note = notes.get_mut(owner, id)?;
        if let Some(book) = patch.book {
            note.book = book;
        }
        if let Some(chapter) = patch.chapter {
            note.chapter = chapter;
        }
        if let Some(verse) = patch.verse {
            note.verse = verse;
        }
        if let Some(content) = patch.content {
            note.content = content;
        }
        note.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> PortResult<()> {
        self.notes.lock().await.delete(owner, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft(book: &str, chapter: i32, verse: i32) -> NewFavorite {
        NewFavorite {
            book: book.to_string(),
            chapter,
            verse_number: verse,
            verse_text: "For God so loved the world".to_string(),
        }
    }

    #[tokio::test]
    async fn favorites_are_invisible_to_other_users() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let fav = OwnedRepository::<Favorite>::create(&store, alice, draft("John", 3, 16))
            .await
            .unwrap();

        let listed = OwnedRepository::<Favorite>::list(&store, bob, &VerseFilter::default())
            .await
            .unwrap();
        assert!(listed.is_empty());
        assert!(matches!(
            OwnedRepository::<Favorite>::get(&store, bob, fav.id).await,
            Err(PortError::NotFound(_))
        ));
        assert!(matches!(
            OwnedRepository::<Favorite>::update(&store, bob, fav.id, FavoritePatch::default())
                .await,
            Err(PortError::NotFound(_))
        ));
        assert!(matches!(
            OwnedRepository::<Favorite>::delete(&store, bob, fav.id).await,
            Err(PortError::NotFound(_))
        ));
        assert_eq!(store.favorite_count().await, 1);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        for verse in 1..=3 {
            OwnedRepository::<Favorite>::create(&store, owner, draft("Psalms", 23, verse))
                .await
                .unwrap();
        }
        let verses: Vec<i32> =
            OwnedRepository::<Favorite>::list(&store, owner, &VerseFilter::default())
                .await
                .unwrap()
                .into_iter()
                .map(|f| f.verse_number)
                .collect();
        assert_eq!(verses, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn second_delete_reports_not_found() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let note = OwnedRepository::<Note>::create(
            &store,
            owner,
            NewNote {
                book: "John".to_string(),
                chapter: 3,
                verse: 16,
                content: json!({"type": "doc"}),
            },
        )
        .await
        .unwrap();

        OwnedRepository::<Note>::delete(&store, owner, note.id)
            .await
            .unwrap();
        assert!(matches!(
            OwnedRepository::<Note>::delete(&store, owner, note.id).await,
            Err(PortError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn note_patch_replaces_content_only() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let note = OwnedRepository::<Note>::create(
            &store,
            owner,
            NewNote {
                book: "Ruth".to_string(),
                chapter: 1,
                verse: 16,
                content: json!("first draft"),
            },
        )
        .await
        .unwrap();

        let patch = NotePatch {
            content: Some(json!("second draft")),
            ..NotePatch::default()
        };
        OwnedRepository::<Note>::update(&store, owner, note.id, patch)
            .await
            .unwrap();

        let stored = OwnedRepository::<Note>::get(&store, owner, note.id)
            .await
            .unwrap();
        assert_eq!(stored.content, json!("second draft"));
        assert_eq!(stored.book, "Ruth");
        assert!(stored.updated_at >= note.updated_at);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        let new_user = NewUser {
            username: None,
            email: "a@b.com".to_string(),
            hashed_password: "hash".to_string(),
        };
        store.create_user(new_user.clone()).await.unwrap();
        assert!(matches!(
            store.create_user(new_user).await,
            Err(PortError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn expired_sessions_are_rejected() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        store
            .create_auth_session("stale", user_id, Utc::now() - chrono::Duration::minutes(1))
            .await
            .unwrap();
        store
            .create_auth_session("live", user_id, Utc::now() + chrono::Duration::days(1))
            .await
            .unwrap();

        assert!(matches!(
            store.validate_auth_session("stale").await,
            Err(PortError::Unauthorized)
        ));
        assert_eq!(store.validate_auth_session("live").await.unwrap(), user_id);
    }

    #[tokio::test]
    async fn expired_sessions_are_purged() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        let past = Utc::now() - chrono::Duration::minutes(1);
        store.create_auth_session("a", user_id, past).await.unwrap();
        store.accounts.lock().await.sessions.insert("b".into(), (user_id, past));
        assert_eq!(store.accounts.lock().await.sessions.len(), 2);

        // A failed lookup drops the stale row it found.
        assert!(store.validate_auth_session("b").await.is_err());
        assert!(!store.accounts.lock().await.sessions.contains_key("b"));

        // Opening a session sweeps every expired one.
        store
            .create_auth_session("live", user_id, Utc::now() + chrono::Duration::days(1))
            .await
            .unwrap();
        let accounts = store.accounts.lock().await;
        assert_eq!(accounts.sessions.len(), 1);
        assert!(accounts.sessions.contains_key("live"));
    }
}
