//! services/api/src/web/notes.rs
//!
//! Per-verse rich-text notes. `content` is an opaque editor document and is
//! stored and returned exactly as sent.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use bible_nav_core::domain::{NewNote, Note, NotePatch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiError, ErrorBody};
use crate::web::resource::{
    delete_owned, get_owned, json_body, missing_fields, patch_positive, required_positive,
    required_text, update_owned, verse_filter, LenientInt, MessageResponse, VerseQuery,
};
use crate::web::state::AppState;

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub book: String,
    pub chapter: i32,
    pub verse: i32,
    #[schema(value_type = Object)]
    pub content: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Note> for NoteResponse {
    fn from(n: Note) -> Self {
        Self {
            id: n.id,
            user_id: n.user_id,
            book: n.book,
            chapter: n.chapter,
            verse: n.verse,
            content: n.content,
            created_at: n.created_at,
            updated_at: n.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct NotesResponse {
    pub notes: Vec<NoteResponse>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateNoteRequest {
    pub book: Option<String>,
    #[schema(value_type = Option<i32>)]
    pub chapter: Option<LenientInt>,
    #[schema(value_type = Option<i32>)]
    pub verse: Option<LenientInt>,
    #[schema(value_type = Option<Object>)]
    pub content: Option<Value>,
}

/// A document that is `null` or an empty string counts as missing.
fn required_content(content: Option<Value>) -> Option<Value> {
    content.filter(|c| !c.is_null() && c.as_str() != Some(""))
}

impl CreateNoteRequest {
    fn validate(self) -> Result<NewNote, ApiError> {
        match (
            required_text(self.book),
            required_positive(self.chapter),
            required_positive(self.verse),
            required_content(self.content),
        ) {
            (Some(book), Some(chapter), Some(verse), Some(content)) => Ok(NewNote {
                book,
                chapter,
                verse,
                content,
            }),
            _ => Err(missing_fields()),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateNoteRequest {
    pub book: Option<String>,
    #[schema(value_type = Option<i32>)]
    pub chapter: Option<LenientInt>,
    #[schema(value_type = Option<i32>)]
    pub verse: Option<LenientInt>,
    #[schema(value_type = Option<Object>)]
    pub content: Option<Value>,
}

impl UpdateNoteRequest {
    fn validate(self) -> Result<NotePatch, ApiError> {
        Ok(NotePatch {
            book: self.book,
            chapter: patch_positive(self.chapter, "chapter")?,
            verse: patch_positive(self.verse, "verse")?,
            content: self.content.filter(|c| !c.is_null()),
        })
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// List the caller's notes, newest first, optionally narrowed to a verse.
#[utoipa::path(
    get,
    path = "/notes",
    params(VerseQuery),
    responses(
        (status = 200, description = "Notes", body = NotesResponse),
        (status = 401, description = "No active session", body = ErrorBody)
    )
)]
pub async fn list_notes_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    query: Result<Query<VerseQuery>, QueryRejection>,
) -> Result<Json<NotesResponse>, ApiError> {
    let filter = verse_filter(query)?;
    let notes = state.notes.list(user_id, &filter).await?;
    Ok(Json(NotesResponse {
        notes: notes.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/notes",
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note created", body = NoteResponse),
        (status = 400, description = "Missing required fields", body = ErrorBody),
        (status = 401, description = "No active session", body = ErrorBody)
    )
)]
pub async fn create_note_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    body: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<NoteResponse>), ApiError> {
    let draft = json_body(body)?.validate()?;
    let note = state.notes.create(user_id, draft).await?;
    Ok((StatusCode::CREATED, Json(note.into())))
}

#[utoipa::path(
    get,
    path = "/notes/{id}",
    params(("id" = String, Path, description = "Note id")),
    responses(
        (status = 200, description = "The note", body = NoteResponse),
        (status = 404, description = "Note not found", body = ErrorBody)
    )
)]
pub async fn get_note_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<String>,
) -> Result<Json<NoteResponse>, ApiError> {
    let note = get_owned(state.notes.as_ref(), user_id, &id).await?;
    Ok(Json(note.into()))
}

/// Partially update a note and bump its `updatedAt`.
#[utoipa::path(
    patch,
    path = "/notes/{id}",
    params(("id" = String, Path, description = "Note id")),
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Updated successfully", body = MessageResponse),
        (status = 400, description = "Invalid chapter or verse number", body = ErrorBody),
        (status = 404, description = "Note not found", body = ErrorBody)
    )
)]
pub async fn update_note_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<String>,
    body: Result<Json<UpdateNoteRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let patch = json_body(body)?.validate()?;
    update_owned(state.notes.as_ref(), user_id, &id, patch).await
}

#[utoipa::path(
    delete,
    path = "/notes/{id}",
    params(("id" = String, Path, description = "Note id")),
    responses(
        (status = 200, description = "Deleted successfully", body = MessageResponse),
        (status = 404, description = "Note not found", body = ErrorBody)
    )
)]
pub async fn delete_note_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    delete_owned(state.notes.as_ref(), user_id, &id).await
}
