//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` and `OwnedRepository` ports from the `core` crate. It handles
//! all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use bible_nav_core::domain::{
    Favorite, FavoritePatch, NewFavorite, NewNote, NewUser, Note, NotePatch, User,
    UserCredentials, VerseFilter,
};
use bible_nav_core::ports::{
    DatabaseService, OwnedEntity, OwnedRepository, PortError, PortResult,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the account and owned-record ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn not_found<E: OwnedEntity>() -> PortError {
    PortError::NotFound(format!("{} not found", E::KIND))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    username: Option<String>,
    email: Option<String>,
    password_hash: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl UserRecord {
    fn into_credentials(self) -> UserCredentials {
        UserCredentials {
            hashed_password: self.password_hash.clone(),
            user: self.into_domain(),
        }
    }

    fn into_domain(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct FavoriteRecord {
    id: Uuid,
    user_id: Uuid,
    book: String,
    chapter: i32,
    verse_number: i32,
    verse_text: String,
    created_at: DateTime<Utc>,
}
impl From<FavoriteRecord> for Favorite {
    fn from(r: FavoriteRecord) -> Self {
        Favorite {
            id: r.id,
            user_id: r.user_id,
            book: r.book,
            chapter: r.chapter,
            verse_number: r.verse_number,
            verse_text: r.verse_text,
            created_at: r.created_at,
        }
    }
}

#[derive(FromRow)]
struct NoteRecord {
    id: Uuid,
    user_id: Uuid,
    book: String,
    chapter: i32,
    verse: i32,
    content: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl From<NoteRecord> for Note {
    fn from(r: NoteRecord) -> Self {
        Note {
            id: r.id,
            user_id: r.user_id,
            book: r.book,
            chapter: r.chapter,
            verse: r.verse,
            content: r.content,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

//=========================================================================================
// Owner-Scoped Table Descriptions
//=========================================================================================

/// Maps an owned entity onto its table. The scoped list/get/delete statements are
/// generated from these names, so every entity gets the same `(id, owner)` rule.
trait OwnedTable: OwnedEntity {
    const TABLE: &'static str;
    const OWNER_COLUMN: &'static str;
    const VERSE_COLUMN: &'static str;
    const COLUMNS: &'static str;

    type Record: for<'r> FromRow<'r, PgRow> + Into<Self> + Send + Unpin;
}

impl OwnedTable for Favorite {
    const TABLE: &'static str = "favorites";
    const OWNER_COLUMN: &'static str = "user_id";
    const VERSE_COLUMN: &'static str = "verse_number";
    const COLUMNS: &'static str = "id, user_id, book, chapter, verse_number, verse_text, created_at";

    type Record = FavoriteRecord;
}

impl OwnedTable for Note {
    const TABLE: &'static str = "notes";
    const OWNER_COLUMN: &'static str = "user_id";
    const VERSE_COLUMN: &'static str = "verse";
    const COLUMNS: &'static str =
        "id, user_id, book, chapter, verse, content, created_at, updated_at";

    type Record = NoteRecord;
}

impl DbAdapter {
    async fn scoped_list<E: OwnedTable>(
        &self,
        owner: Uuid,
        filter: &VerseFilter,
    ) -> PortResult<Vec<E>> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM {} WHERE {} = ",
            E::COLUMNS,
            E::TABLE,
            E::OWNER_COLUMN
        ));
        query.push_bind(owner);
        if let Some(book) = &filter.book {
            query.push(" AND book = ").push_bind(book.clone());
        }
        if let Some(chapter) = filter.chapter {
            query.push(" AND chapter = ").push_bind(chapter);
        }
        if let Some(verse) = filter.verse {
            query
                .push(format!(" AND {} = ", E::VERSE_COLUMN))
                .push_bind(verse);
        }
        query.push(" ORDER BY created_at DESC");

        let records = query
            .build_query_as::<E::Record>()
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(Into::into).collect())
    }

    async fn scoped_get<E: OwnedTable>(&self, owner: Uuid, id: Uuid) -> PortResult<E> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1 AND {} = $2",
            E::COLUMNS,
            E::TABLE,
            E::OWNER_COLUMN
        );
        sqlx::query_as::<_, E::Record>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .map(Into::into)
            .ok_or_else(not_found::<E>)
    }

    async fn scoped_delete<E: OwnedTable>(&self, owner: Uuid, id: Uuid) -> PortResult<()> {
        let sql = format!(
            "DELETE FROM {} WHERE id = $1 AND {} = $2",
            E::TABLE,
            E::OWNER_COLUMN
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(not_found::<E>());
        }
        Ok(())
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at, updated_at";

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        let sql = format!(
            "INSERT INTO users (id, username, email, password_hash) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(new_user.username)
            .bind(new_user.email)
            .bind(new_user.hashed_password)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    PortError::AlreadyExists("User already exists".to_string())
                }
                other => unexpected(other),
            })?;
        Ok(record.into_domain())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    PortError::NotFound(format!("User {} not found", user_id))
                }
                _ => unexpected(e),
            })?;
        Ok(record.into_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    PortError::NotFound("No account found with that email address".to_string())
                }
                _ => unexpected(e),
            })?;
        Ok(record.into_credentials())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let user_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        if let Some(user_id) = user_id {
            return Ok(user_id);
        }

        sqlx::query("DELETE FROM auth_sessions WHERE id = $1 AND expires_at <= NOW()")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Err(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}

//=========================================================================================
// `OwnedRepository` Trait Implementations
//=========================================================================================

#[async_trait]
impl OwnedRepository<Favorite> for DbAdapter {
    async fn list(&self, owner: Uuid, filter: &VerseFilter) -> PortResult<Vec<Favorite>> {
        self.scoped_list::<Favorite>(owner, filter).await
    }

    async fn create(&self, owner: Uuid, draft: NewFavorite) -> PortResult<Favorite> {
        let sql = format!(
            "INSERT INTO favorites (id, user_id, book, chapter, verse_number, verse_text) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            Favorite::COLUMNS
        );
        let record = sqlx::query_as::<_, FavoriteRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(owner)
            .bind(draft.book)
            .bind(draft.chapter)
            .bind(draft.verse_number)
            .bind(draft.verse_text)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.into())
    }

    async fn get(&self, owner: Uuid, id: Uuid) -> PortResult<Favorite> {
        self.scoped_get::<Favorite>(owner, id).await
    }

    async fn update(&self, owner: Uuid, id: Uuid, patch: FavoritePatch) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE favorites SET \
                book = COALESCE($3, book), \
                chapter = COALESCE($4, chapter), \
                verse_number = COALESCE($5, verse_number), \
                verse_text = COALESCE($6, verse_text) \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(owner)
        .bind(patch.book)
        .bind(patch.chapter)
        .bind(patch.verse_number)
        .bind(patch.verse_text)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(not_found::<Favorite>());
        }
        Ok(())
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> PortResult<()> {
        self.scoped_delete::<Favorite>(owner, id).await
    }
}

#[async_trait]
impl OwnedRepository<Note> for DbAdapter {
    async fn list(&self, owner: Uuid, filter: &VerseFilter) -> PortResult<Vec<Note>> {
        self.scoped_list::<Note>(owner, filter).await
    }

    async fn create(&self, owner: Uuid, draft: NewNote) -> PortResult<Note> {
        let sql = format!(
            "INSERT INTO notes (id, user_id, book, chapter, verse, content) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            Note::COLUMNS
        );
        let record = sqlx::query_as::<_, NoteRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(owner)
            .bind(draft.book)
            .bind(draft.chapter)
            .bind(draft.verse)
            .bind(draft.content)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.into())
    }

    async fn get(&self, owner: Uuid, id: Uuid) -> PortResult<Note> {
        self.scoped_get::<Note>(owner, id).await
    }

    async fn update(&self, owner: Uuid, id: Uuid, patch: NotePatch) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE notes SET \
                book = COALESCE($3, book), \
                chapter = COALESCE($4, chapter), \
                verse = COALESCE($5, verse), \
                content = COALESCE($6, content), \
                updated_at = NOW() \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(owner)
        .bind(patch.book)
        .bind(patch.chapter)
        .bind(patch.verse)
        .bind(patch.content)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(not_found::<Note>());
        }
        Ok(())
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> PortResult<()> {
        self.scoped_delete::<Note>(owner, id).await
    }
}
