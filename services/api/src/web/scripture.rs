//! services/api/src/web/scripture.rs
//!
//! Read-only proxy routes over the scripture client. No session is required.
//! Upstream failures are soft: they surface as 404 or an empty list.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use bible_nav_core::domain::{BibleVerse, BookInfo, Chapter, SearchHit, VerseOfTheDay};
use bible_nav_core::ports::ScriptureService;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::error::{ApiError, ErrorBody};
use crate::web::state::AppState;

const DEFAULT_VERSE_VERSION: &str = "web";
const DEFAULT_SEARCH_VERSION: &str = "kjv";
const DEFAULT_LANGUAGE: &str = "en";

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct VerseOfTheDayResponse {
    pub text: String,
    pub reference: String,
    pub version: String,
}

impl From<VerseOfTheDay> for VerseOfTheDayResponse {
    fn from(v: VerseOfTheDay) -> Self {
        Self {
            text: v.text,
            reference: v.reference,
            version: v.version,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct VerseResponse {
    pub text: String,
    pub reference: String,
    pub translation: String,
}

impl From<BibleVerse> for VerseResponse {
    fn from(v: BibleVerse) -> Self {
        Self {
            text: v.text,
            reference: v.reference,
            translation: v.translation,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    pub id: String,
    pub name: String,
    pub short_name: String,
    pub chapter_count: u32,
    pub verses_per_chapter: BTreeMap<u32, u32>,
}

impl From<BookInfo> for BookResponse {
    fn from(b: BookInfo) -> Self {
        Self {
            id: b.id,
            name: b.name,
            short_name: b.short_name,
            chapter_count: b.chapter_count,
            verses_per_chapter: b.verses_per_chapter,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct BooksResponse {
    pub books: Vec<BookResponse>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChapterVerseResponse {
    pub verse_number: u32,
    pub text: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChapterResponse {
    pub chapter_number: u32,
    pub verses: Vec<ChapterVerseResponse>,
}

impl From<Chapter> for ChapterResponse {
    fn from(c: Chapter) -> Self {
        Self {
            chapter_number: c.chapter_number,
            verses: c
                .verses
                .into_iter()
                .map(|v| ChapterVerseResponse {
                    verse_number: v.verse_number,
                    text: v.text,
                })
                .collect(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct SearchHitResponse {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
}

impl From<SearchHit> for SearchHitResponse {
    fn from(h: SearchHit) -> Self {
        Self {
            book: h.book,
            chapter: h.chapter,
            verse: h.verse,
            text: h.text,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct SearchResponse {
    pub results: Vec<SearchHitResponse>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VerseParams {
    pub reference: Option<String>,
    pub version: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BooksParams {
    pub language: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VersionParams {
    pub version: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    pub query: Option<String>,
    pub version: Option<String>,
}

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(params)| params)
        .map_err(|e| ApiError::BadRequest(format!("Invalid query: {}", e.body_text())))
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

//=========================================================================================
// Handlers
//=========================================================================================

#[utoipa::path(
    get,
    path = "/scripture/verse-of-the-day",
    responses(
        (status = 200, description = "Today's verse", body = VerseOfTheDayResponse),
        (status = 404, description = "Provider unavailable", body = ErrorBody)
    )
)]
pub async fn verse_of_the_day_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<VerseOfTheDayResponse>, ApiError> {
    state
        .scripture
        .verse_of_the_day_cancellable(&state.shutdown)
        .await
        .map(|v| Json(v.into()))
        .ok_or_else(|| ApiError::NotFound("Failed to load Verse of the Day".to_string()))
}

#[utoipa::path(
    get,
    path = "/scripture/verse",
    params(VerseParams),
    responses(
        (status = 200, description = "The first verse matching the reference", body = VerseResponse),
        (status = 400, description = "Missing reference", body = ErrorBody),
        (status = 404, description = "No match", body = ErrorBody)
    )
)]
pub async fn verse_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<VerseParams>, QueryRejection>,
) -> Result<Json<VerseResponse>, ApiError> {
    let params = query_params(query)?;
    let reference = params
        .reference
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Reference is required".to_string()))?;
    let version = or_default(params.version, DEFAULT_VERSE_VERSION);

    state
        .scripture
        .verse(&reference, &version)
        .await
        .map(|v| Json(v.into()))
        .ok_or_else(|| ApiError::NotFound("Verse not found".to_string()))
}

#[utoipa::path(
    get,
    path = "/scripture/books",
    params(BooksParams),
    responses((status = 200, description = "Book metadata", body = BooksResponse))
)]
pub async fn books_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<BooksParams>, QueryRejection>,
) -> Result<Json<BooksResponse>, ApiError> {
    let language = or_default(query_params(query)?.language, DEFAULT_LANGUAGE);
    let books = state.scripture.books(&language).await;
    Ok(Json(BooksResponse {
        books: books.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/scripture/chapters/{book}/{chapter}",
    params(
        ("book" = String, Path, description = "Full book name, e.g. `John`"),
        ("chapter" = u32, Path, description = "Chapter number"),
        VersionParams
    ),
    responses(
        (status = 200, description = "Every verse of the chapter", body = ChapterResponse),
        (status = 400, description = "Invalid chapter number", body = ErrorBody),
        (status = 404, description = "Chapter not found", body = ErrorBody)
    )
)]
pub async fn chapter_handler(
    State(state): State<Arc<AppState>>,
    Path((book, chapter)): Path<(String, String)>,
    query: Result<Query<VersionParams>, QueryRejection>,
) -> Result<Json<ChapterResponse>, ApiError> {
    let chapter_number = chapter
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| ApiError::BadRequest("Invalid chapter number".to_string()))?;
    let version = or_default(query_params(query)?.version, DEFAULT_VERSE_VERSION);

    state
        .scripture
        .chapter(&book, chapter_number, &version)
        .await
        .map(|c| Json(c.into()))
        .ok_or_else(|| ApiError::NotFound("Chapter not found".to_string()))
}

#[utoipa::path(
    get,
    path = "/scripture/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching verses, possibly none", body = SearchResponse),
        (status = 400, description = "Empty query", body = ErrorBody)
    )
)]
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let params = query_params(query)?;
    let text = params
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Search query is required".to_string()))?;
    let version = or_default(params.version, DEFAULT_SEARCH_VERSION);

    let hits = state.scripture.search(&text, &version).await;
    Ok(Json(SearchResponse {
        results: hits.into_iter().map(Into::into).collect(),
    }))
}
