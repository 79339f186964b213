//! services/api/src/web/favorites.rs
//!
//! Saved verses. Every route runs behind `require_auth` and only ever touches the
//! caller's own rows.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use bible_nav_core::domain::{Favorite, FavoritePatch, NewFavorite};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
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
pub struct FavoriteResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub book: String,
    pub chapter: i32,
    pub verse_number: i32,
    pub verse_text: String,
    pub created_at: DateTime<Utc>,
}

impl From<Favorite> for FavoriteResponse {
    fn from(f: Favorite) -> Self {
        Self {
            id: f.id,
            user_id: f.user_id,
            book: f.book,
            chapter: f.chapter,
            verse_number: f.verse_number,
            verse_text: f.verse_text,
            created_at: f.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct FavoritesResponse {
    pub verses: Vec<FavoriteResponse>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFavoriteRequest {
    pub book: Option<String>,
    #[schema(value_type = Option<i32>)]
    pub chapter: Option<LenientInt>,
    #[schema(value_type = Option<i32>)]
    pub verse_number: Option<LenientInt>,
    pub verse_text: Option<String>,
}

impl CreateFavoriteRequest {
    fn validate(self) -> Result<NewFavorite, ApiError> {
        match (
            required_text(self.book),
            required_positive(self.chapter),
            required_positive(self.verse_number),
            required_text(self.verse_text),
        ) {
            (Some(book), Some(chapter), Some(verse_number), Some(verse_text)) => Ok(NewFavorite {
                book,
                chapter,
                verse_number,
                verse_text,
            }),
            _ => Err(missing_fields()),
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFavoriteRequest {
    pub book: Option<String>,
    #[schema(value_type = Option<i32>)]
    pub chapter: Option<LenientInt>,
    #[schema(value_type = Option<i32>)]
    pub verse_number: Option<LenientInt>,
    pub verse_text: Option<String>,
}

impl UpdateFavoriteRequest {
    fn validate(self) -> Result<FavoritePatch, ApiError> {
        Ok(FavoritePatch {
            book: self.book,
            chapter: patch_positive(self.chapter, "chapter")?,
            verse_number: patch_positive(self.verse_number, "verseNumber")?,
            verse_text: self.verse_text,
        })
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// List the caller's favorites, newest first.
#[utoipa::path(
    get,
    path = "/favorites",
    params(VerseQuery),
    responses(
        (status = 200, description = "Saved verses", body = FavoritesResponse),
        (status = 401, description = "No active session", body = ErrorBody)
    )
)]
pub async fn list_favorites_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    query: Result<Query<VerseQuery>, QueryRejection>,
) -> Result<Json<FavoritesResponse>, ApiError> {
    let filter = verse_filter(query)?;
    let favorites = state.favorites.list(user_id, &filter).await?;
    Ok(Json(FavoritesResponse {
        verses: favorites.into_iter().map(Into::into).collect(),
    }))
}

/// Save a verse.
#[utoipa::path(
    post,
    path = "/favorites",
    request_body = CreateFavoriteRequest,
    responses(
        (status = 201, description = "Favorite created", body = FavoriteResponse),
        (status = 400, description = "Missing required fields", body = ErrorBody),
        (status = 401, description = "No active session", body = ErrorBody)
    )
)]
pub async fn create_favorite_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    body: Result<Json<CreateFavoriteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FavoriteResponse>), ApiError> {
    let draft = json_body(body)?.validate()?;
    let favorite = state.favorites.create(user_id, draft).await?;
    Ok((StatusCode::CREATED, Json(favorite.into())))
}

#[utoipa::path(
    get,
    path = "/favorites/{id}",
    params(("id" = String, Path, description = "Favorite id")),
    responses(
        (status = 200, description = "The favorite", body = FavoriteResponse),
        (status = 404, description = "Favorite not found", body = ErrorBody)
    )
)]
pub async fn get_favorite_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<String>,
) -> Result<Json<FavoriteResponse>, ApiError> {
    let favorite = get_owned(state.favorites.as_ref(), user_id, &id).await?;
    Ok(Json(favorite.into()))
}

/// Partially update a favorite. Absent fields keep their value.
#[utoipa::path(
    patch,
    path = "/favorites/{id}",
    params(("id" = String, Path, description = "Favorite id")),
    request_body = UpdateFavoriteRequest,
    responses(
        (status = 200, description = "Updated successfully", body = MessageResponse),
        (status = 400, description = "Invalid chapter or verse number", body = ErrorBody),
        (status = 404, description = "Favorite not found", body = ErrorBody)
    )
)]
pub async fn update_favorite_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<String>,
    body: Result<Json<UpdateFavoriteRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let patch = json_body(body)?.validate()?;
    update_owned(state.favorites.as_ref(), user_id, &id, patch).await
}

#[utoipa::path(
    delete,
    path = "/favorites/{id}",
    params(("id" = String, Path, description = "Favorite id")),
    responses(
        (status = 200, description = "Deleted successfully", body = MessageResponse),
        (status = 404, description = "Favorite not found", body = ErrorBody)
    )
)]
pub async fn delete_favorite_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    delete_owned(state.favorites.as_ref(), user_id, &id).await
}
