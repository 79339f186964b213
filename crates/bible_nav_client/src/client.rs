//! crates/bible_nav_client/src/client.rs
//!
//! `BibleNavClient` sends JSON to the Bible Nav API, carries the session cookie
//! captured at signup/login, and turns error responses into `ClientError::Api`.

use crate::error::{ClientError, ClientResult};
use crate::models::{
    AskRequest, AskResponse, Credentials, Favorite, FavoriteUpdate, FavoritesEnvelope,
    MessageEnvelope, NewFavorite, NewNote, Note, NoteUpdate, NotesEnvelope, User, UserEnvelope,
    VerseFilter,
};
use crate::revive::{revive, Revived};
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

const SESSION_COOKIE: &str = "session";

pub struct BibleNavClient {
    http: reqwest::Client,
    base_url: Url,
    session: Mutex<Option<String>>,
}

impl BibleNavClient {
    /// `base_url` is the API root, e.g. `http://localhost:3000/`.
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Self::with_http_client(base_url, reqwest::Client::new())
    }

    pub fn with_http_client(base_url: &str, http: reqwest::Client) -> ClientResult<Self> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http,
            base_url,
            session: Mutex::new(None),
        })
    }

    /// The session id currently attached to requests, if any.
    pub fn session(&self) -> Option<String> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_session(&self, session: Option<String>) {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = session;
    }

    //=====================================================================================
    // Accounts
    //=====================================================================================

    pub async fn signup(
        &self,
        username: Option<&str>,
        email: &str,
        password: &str,
    ) -> ClientResult<User> {
        let body = Credentials {
            username,
            email,
            password,
        };
        let envelope: UserEnvelope = self.call(Method::POST, "signup", &[], Some(&body)).await?;
        Ok(envelope.user)
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<User> {
        let body = Credentials {
            username: None,
            email,
            password,
        };
        let envelope: UserEnvelope = self.call(Method::POST, "login", &[], Some(&body)).await?;
        Ok(envelope.user)
    }

    pub async fn logout(&self) -> ClientResult<()> {
        let _: MessageEnvelope = self.call(Method::POST, "logout", &[], None::<&()>).await?;
        self.set_session(None);
        Ok(())
    }

    pub async fn current_user(&self) -> ClientResult<User> {
        let envelope: UserEnvelope = self.call(Method::GET, "session", &[], None::<&()>).await?;
        Ok(envelope.user)
    }

    //=====================================================================================
    // Favorites
    //=====================================================================================

    pub async fn list_favorites(&self, filter: &VerseFilter) -> ClientResult<Vec<Favorite>> {
        let envelope: FavoritesEnvelope = self
            .call(Method::GET, "favorites", &filter.query_pairs(), None::<&()>)
            .await?;
        Ok(envelope.verses)
    }

    pub async fn add_favorite(&self, favorite: &NewFavorite) -> ClientResult<Favorite> {
        self.call(Method::POST, "favorites", &[], Some(favorite)).await
    }

    pub async fn get_favorite(&self, id: Uuid) -> ClientResult<Favorite> {
        self.call(Method::GET, &format!("favorites/{id}"), &[], None::<&()>)
            .await
    }

    pub async fn update_favorite(&self, id: Uuid, update: &FavoriteUpdate) -> ClientResult<String> {
        let envelope: MessageEnvelope = self
            .call(Method::PATCH, &format!("favorites/{id}"), &[], Some(update))
            .await?;
        Ok(envelope.message)
    }

    pub async fn delete_favorite(&self, id: Uuid) -> ClientResult<String> {
        let envelope: MessageEnvelope = self
            .call(Method::DELETE, &format!("favorites/{id}"), &[], None::<&()>)
            .await?;
        Ok(envelope.message)
    }

    //=====================================================================================
    // Notes
    //=====================================================================================

    pub async fn list_notes(&self, filter: &VerseFilter) -> ClientResult<Vec<Note>> {
        let envelope: NotesEnvelope = self
            .call(Method::GET, "notes", &filter.query_pairs(), None::<&()>)
            .await?;
        Ok(envelope.notes)
    }

    pub async fn create_note(&self, note: &NewNote) -> ClientResult<Note> {
        self.call(Method::POST, "notes", &[], Some(note)).await
    }

    pub async fn get_note(&self, id: Uuid) -> ClientResult<Note> {
        self.call(Method::GET, &format!("notes/{id}"), &[], None::<&()>)
            .await
    }

    pub async fn update_note(&self, id: Uuid, update: &NoteUpdate) -> ClientResult<String> {
        let envelope: MessageEnvelope = self
            .call(Method::PATCH, &format!("notes/{id}"), &[], Some(update))
            .await?;
        Ok(envelope.message)
    }

    pub async fn delete_note(&self, id: Uuid) -> ClientResult<String> {
        let envelope: MessageEnvelope = self
            .call(Method::DELETE, &format!("notes/{id}"), &[], None::<&()>)
            .await?;
        Ok(envelope.message)
    }

    //=====================================================================================
    // Assistant & Untyped Access
    //=====================================================================================

    pub async fn ask_ai(&self, prompt: &str) -> ClientResult<String> {
        let response: AskResponse = self
            .call(Method::POST, "ai", &[], Some(&AskRequest { prompt }))
            .await?;
        Ok(response.answer)
    }

    /// Any endpoint, returned as a tree with timestamps already parsed.
    pub async fn request_value(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> ClientResult<Revived> {
        let value: Value = self
            .call(method, path.trim_start_matches('/'), &[], body)
            .await?;
        Ok(revive(value))
    }

    //=====================================================================================
    // Plumbing
    //=====================================================================================

    async fn call<T, B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut url = self.base_url.join(path)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        debug!("{} {}", method, url);

        let mut request = self.http.request(method, url);
        if let Some(session) = self.session() {
            request = request.header(COOKIE, format!("{SESSION_COOKIE}={session}"));
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        self.capture_session(&response);

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let message = error_message(&text)
                .unwrap_or_else(|| format!("API Error: {}", status.as_u16()));
            warn!("Request to {} failed with {}: {}", path, status, message);
            return Err(ClientError::Api { status, message });
        }

        serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Adopts (or clears) the session from any `Set-Cookie: session=...` header.
    fn capture_session(&self, response: &Response) {
        let issued = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|cookie| {
                let pair = cookie.split(';').next()?.trim();
                let (name, value) = pair.split_once('=')?;
                (name == SESSION_COOKIE).then(|| value.to_string())
            });
        if let Some(value) = issued {
            self.set_session((!value.is_empty()).then_some(value));
        }
    }
}

/// The `error` or `message` field of a JSON error body, else the raw text.
fn error_message(body: &str) -> Option<String> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["error", "message"] {
            if let Some(Value::String(message)) = map.get(key) {
                return Some(message.clone());
            }
        }
    }
    let raw = body.trim();
    (!raw.is_empty()).then(|| raw.to_string())
}
