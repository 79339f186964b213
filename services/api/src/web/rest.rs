//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification and the route table.

use crate::error::ErrorBody;
use crate::web::{
    assistant::{self, AskRequest, AskResponse},
    auth::{self, AuthResponse, LoginRequest, SignupRequest, UserResponse},
    favorites::{self, CreateFavoriteRequest, FavoriteResponse, FavoritesResponse, UpdateFavoriteRequest},
    middleware::require_auth,
    notes::{self, CreateNoteRequest, NoteResponse, NotesResponse, UpdateNoteRequest},
    resource::MessageResponse,
    scripture::{
        self, BookResponse, BooksResponse, ChapterResponse, ChapterVerseResponse,
        SearchHitResponse, SearchResponse, VerseOfTheDayResponse, VerseResponse,
    },
    state::AppState,
};
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::session_handler,
        favorites::list_favorites_handler,
        favorites::create_favorite_handler,
        favorites::get_favorite_handler,
        favorites::update_favorite_handler,
        favorites::delete_favorite_handler,
        notes::list_notes_handler,
        notes::create_note_handler,
        notes::get_note_handler,
        notes::update_note_handler,
        notes::delete_note_handler,
        scripture::verse_of_the_day_handler,
        scripture::verse_handler,
        scripture::books_handler,
        scripture::chapter_handler,
        scripture::search_handler,
        assistant::ask_handler,
    ),
    components(
        schemas(
            ErrorBody, MessageResponse,
            SignupRequest, LoginRequest, UserResponse, AuthResponse,
            CreateFavoriteRequest, UpdateFavoriteRequest, FavoriteResponse, FavoritesResponse,
            CreateNoteRequest, UpdateNoteRequest, NoteResponse, NotesResponse,
            VerseOfTheDayResponse, VerseResponse, BookResponse, BooksResponse,
            ChapterResponse, ChapterVerseResponse, SearchHitResponse, SearchResponse,
            AskRequest, AskResponse,
        )
    ),
    tags(
        (name = "Bible Nav API", description = "Accounts, saved verses, verse notes, scripture lookup and the Bible assistant.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Router
//=========================================================================================

/// Every API route, with the session middleware applied to the protected half.
pub fn build_router(state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/signup", post(auth::signup_handler))
        .route("/login", post(auth::login_handler))
        .route("/logout", post(auth::logout_handler))
        .route("/ai", post(assistant::ask_handler))
        .route(
            "/scripture/verse-of-the-day",
            get(scripture::verse_of_the_day_handler),
        )
        .route("/scripture/verse", get(scripture::verse_handler))
        .route("/scripture/books", get(scripture::books_handler))
        .route(
            "/scripture/chapters/{book}/{chapter}",
            get(scripture::chapter_handler),
        )
        .route("/scripture/search", get(scripture::search_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/session", get(auth::session_handler))
        .route(
            "/favorites",
            get(favorites::list_favorites_handler).post(favorites::create_favorite_handler),
        )
        .route(
            "/favorites/{id}",
            get(favorites::get_favorite_handler)
                .patch(favorites::update_favorite_handler)
                .delete(favorites::delete_favorite_handler),
        )
        .route(
            "/notes",
            get(notes::list_notes_handler).post(notes::create_note_handler),
        )
        .route(
            "/notes/{id}",
            get(notes::get_note_handler)
                .patch(notes::update_note_handler)
                .delete(notes::delete_note_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/signup",
            "/login",
            "/logout",
            "/session",
            "/favorites",
            "/favorites/{id}",
            "/notes",
            "/notes/{id}",
            "/scripture/verse-of-the-day",
            "/scripture/verse",
            "/scripture/books",
            "/scripture/chapters/{book}/{chapter}",
            "/scripture/search",
            "/ai",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
