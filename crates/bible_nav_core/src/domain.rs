//! crates/bible_nav_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or wire format.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

//=========================================================================================
// Accounts
//=========================================================================================

/// Represents a user - used throughout app.
///
/// Provider accounts have no password; credentials accounts always carry an email.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub hashed_password: Option<String>,
}

/// Everything needed to register a credentials account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Option<String>,
    pub email: String,
    pub hashed_password: String,
}

//=========================================================================================
// Owned Records
//=========================================================================================

/// A user-saved scripture reference with a copy of the verse text taken at save time.
#[derive(Debug, Clone, PartialEq)]
pub struct Favorite {
    pub id: Uuid,
    pub user_id: Uuid,
    pub book: String,
    pub chapter: i32,
    pub verse_number: i32,
    pub verse_text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFavorite {
    pub book: String,
    pub chapter: i32,
    pub verse_number: i32,
    pub verse_text: String,
}

#[derive(Debug, Clone, Default)]
pub struct FavoritePatch {
    pub book: Option<String>,
    pub chapter: Option<i32>,
    pub verse_number: Option<i32>,
    pub verse_text: Option<String>,
}

/// A rich-text annotation attached to one verse.
///
/// `content` is the serialized editor document. It is stored and returned untouched.
#[derive(Debug, Clone, PartialEq)]
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

#[derive(Debug, Clone)]
pub struct NewNote {
    pub book: String,
    pub chapter: i32,
    pub verse: i32,
    pub content: Value,
}

#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub book: Option<String>,
    pub chapter: Option<i32>,
    pub verse: Option<i32>,
    pub content: Option<Value>,
}

/// Optional narrowing of a list query to one book, chapter or verse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerseFilter {
    pub book: Option<String>,
    pub chapter: Option<i32>,
    pub verse: Option<i32>,
}

impl VerseFilter {
    /// Returns true when a record at `(book, chapter, verse)` passes every set criterion.
    pub fn matches(&self, book: &str, chapter: i32, verse: i32) -> bool {
        self.book.as_deref().map_or(true, |b| b == book)
            && self.chapter.map_or(true, |c| c == chapter)
            && self.verse.map_or(true, |v| v == verse)
    }
}

//=========================================================================================
// Scripture
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct VerseOfTheDay {
    pub text: String,
    pub reference: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BibleVerse {
    pub text: String,
    pub reference: String,
    pub translation: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookInfo {
    pub id: String,
    pub name: String,
    pub short_name: String,
    pub chapter_count: u32,
    /// Chapter number to verse count.
    pub verses_per_chapter: BTreeMap<u32, u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChapterVerse {
    pub verse_number: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    pub chapter_number: u32,
    pub verses: Vec<ChapterVerse>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
}
