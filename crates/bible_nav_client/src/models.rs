//! crates/bible_nav_client/src/models.rs
//!
//! Wire shapes of the Bible Nav API as the client sees them. Timestamps are
//! deserialized straight into `DateTime<Utc>`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

//=========================================================================================
// Accounts
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserEnvelope {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub(crate) struct Credentials<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<&'a str>,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageEnvelope {
    pub message: String,
}

//=========================================================================================
// Favorites
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: Uuid,
    pub user_id: Uuid,
    pub book: String,
    pub chapter: i32,
    pub verse_number: i32,
    pub verse_text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FavoritesEnvelope {
    pub verses: Vec<Favorite>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFavorite {
    pub book: String,
    pub chapter: i32,
    pub verse_number: i32,
    pub verse_text: String,
}

/// Only the fields that are `Some` are sent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verse_number: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verse_text: Option<String>,
}

//=========================================================================================
// Notes
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub book: String,
    pub chapter: i32,
    pub verse: i32,
    pub content: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NotesEnvelope {
    pub notes: Vec<Note>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewNote {
    pub book: String,
    pub chapter: i32,
    pub verse: i32,
    pub content: Value,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NoteUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verse: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
}

//=========================================================================================
// Filters & Assistant
//=========================================================================================

/// Narrows a favorites or notes listing. Unset fields are not sent.
#[derive(Debug, Clone, Default)]
pub struct VerseFilter {
    pub book: Option<String>,
    pub chapter: Option<i32>,
    pub verse: Option<i32>,
}

impl VerseFilter {
    pub fn verse(book: impl Into<String>, chapter: i32, verse: i32) -> Self {
        Self {
            book: Some(book.into()),
            chapter: Some(chapter),
            verse: Some(verse),
        }
    }

    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(book) = &self.book {
            pairs.push(("book", book.clone()));
        }
        if let Some(chapter) = self.chapter {
            pairs.push(("chapter", chapter.to_string()));
        }
        if let Some(verse) = self.verse {
            pairs.push(("verse", verse.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AskRequest<'a> {
    pub prompt: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AskResponse {
    pub answer: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn favorite_timestamps_decode_as_utc() {
        let favorite: Favorite = serde_json::from_value(json!({
            "id": "7d3c5b1e-9f5e-4a53-9a3b-0d6f1a2b3c4d",
            "userId": "0b8f4b3a-1c2d-4e5f-8a9b-0c1d2e3f4a5b",
            "book": "John", "chapter": 3, "verseNumber": 16,
            "verseText": "For God so loved the world",
            "createdAt": "2024-05-01T12:30:00Z"
        }))
        .unwrap();
        assert_eq!(favorite.created_at.to_rfc3339(), "2024-05-01T12:30:00+00:00");
    }

    #[test]
    fn update_sends_only_set_fields() {
        let body = serde_json::to_value(FavoriteUpdate {
            verse_text: Some("updated".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(body, json!({"verseText": "updated"}));
    }

    #[test]
    fn filter_skips_unset_fields() {
        let filter = VerseFilter {
            book: Some("John".into()),
            ..Default::default()
        };
        assert_eq!(filter.query_pairs(), vec![("book", "John".to_string())]);
        assert_eq!(VerseFilter::verse("John", 3, 16).query_pairs().len(), 3);
    }
}
