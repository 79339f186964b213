//! services/api/src/web/resource.rs
//!
//! Handler plumbing shared by every owner-scoped resource: body/query extraction,
//! required-field checks, id parsing and the scoped get/update/delete flow.

use crate::error::ApiError;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query,
    },
    Json,
};
use bible_nav_core::domain::VerseFilter;
use bible_nav_core::ports::{OwnedEntity, OwnedRepository};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

//=========================================================================================
// Shared Payloads
//=========================================================================================

/// The body of a successful update or delete.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

/// Optional list filters. Blank, non-numeric and non-positive values are ignored.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VerseQuery {
    pub book: Option<String>,
    #[param(value_type = Option<i32>)]
    pub chapter: Option<String>,
    #[param(value_type = Option<i32>)]
    pub verse: Option<String>,
}

fn filter_number(raw: Option<String>) -> Option<i32> {
    raw?.trim().parse().ok().filter(|n: &i32| *n > 0)
}

impl From<VerseQuery> for VerseFilter {
    fn from(q: VerseQuery) -> Self {
        VerseFilter {
            book: q.book.filter(|b| !b.trim().is_empty()),
            chapter: filter_number(q.chapter),
            verse: filter_number(q.verse),
        }
    }
}

/// A number that clients may also send as a numeric string (`"3"`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LenientInt {
    Int(i64),
    Text(String),
}

impl LenientInt {
    pub fn value(&self) -> Option<i32> {
        match self {
            LenientInt::Int(n) => i32::try_from(*n).ok(),
            LenientInt::Text(s) => s.trim().parse().ok(),
        }
    }
}

//=========================================================================================
// Extraction Helpers
//=========================================================================================

pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e.body_text())))
}

pub fn verse_filter(query: Result<Query<VerseQuery>, QueryRejection>) -> Result<VerseFilter, ApiError> {
    query
        .map(|Query(q)| q.into())
        .map_err(|e| ApiError::BadRequest(format!("Invalid query: {}", e.body_text())))
}

/// A present, non-blank string.
pub fn required_text(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// A present number greater than zero.
pub fn required_positive(value: Option<LenientInt>) -> Option<i32> {
    value.and_then(|v| v.value()).filter(|n| *n > 0)
}

/// A patch number: absent or `null` leaves the field alone, anything else must be a
/// whole number greater than zero.
pub fn patch_positive(value: Option<LenientInt>, field: &str) -> Result<Option<i32>, ApiError> {
    match value {
        None => Ok(None),
        Some(raw) => raw
            .value()
            .filter(|n| *n > 0)
            .map(Some)
            .ok_or_else(|| ApiError::BadRequest(format!("Invalid {}", field))),
    }
}

pub fn missing_fields() -> ApiError {
    ApiError::BadRequest("Missing required fields".to_string())
}

/// Malformed ids are reported exactly like unknown ones.
pub fn parse_id<E: OwnedEntity>(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(format!("{} not found", E::KIND)))
}

//=========================================================================================
// Scoped Operations
//=========================================================================================

pub async fn get_owned<E: OwnedEntity>(
    repo: &dyn OwnedRepository<E>,
    owner: Uuid,
    raw_id: &str,
) -> Result<E, ApiError> {
    let id = parse_id::<E>(raw_id)?;
    Ok(repo.get(owner, id).await?)
}

pub async fn update_owned<E: OwnedEntity>(
    repo: &dyn OwnedRepository<E>,
    owner: Uuid,
    raw_id: &str,
    patch: E::Patch,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id::<E>(raw_id)?;
    repo.update(owner, id, patch).await?;
    Ok(MessageResponse::new("Updated successfully"))
}

pub async fn delete_owned<E: OwnedEntity>(
    repo: &dyn OwnedRepository<E>,
    owner: Uuid,
    raw_id: &str,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id::<E>(raw_id)?;
    repo.delete(owner, id).await?;
    Ok(MessageResponse::new("Deleted successfully"))
}
