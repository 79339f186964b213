//! HTTP client for the Bible Nav API.

pub mod client;
pub mod error;
pub mod models;
pub mod revive;

pub use client::BibleNavClient;
pub use error::{ClientError, ClientResult};
pub use models::{
    Favorite, FavoriteUpdate, NewFavorite, NewNote, Note, NoteUpdate, User, VerseFilter,
};
pub use reqwest::Method;
pub use revive::{revive, Revived};
