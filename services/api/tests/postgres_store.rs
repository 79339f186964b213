//! `DbAdapter` against a real Postgres. Each test gets a fresh database with the
//! migrations applied.
//!
//! Run with: DATABASE_URL=postgres://... cargo test -p api --test postgres_store -- --ignored

use api_lib::adapters::DbAdapter;
use bible_nav_core::domain::{
    Favorite, FavoritePatch, NewFavorite, NewNote, NewUser, Note, NotePatch, VerseFilter,
};
use bible_nav_core::ports::{DatabaseService, OwnedRepository, PortError};
use chrono::{Duration, Utc};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

async fn user(store: &DbAdapter, email: &str) -> Uuid {
    store
        .create_user(NewUser {
            username: None,
            email: email.to_string(),
            hashed_password: "hash".to_string(),
        })
        .await
        .unwrap()
        .id
}

async fn favorite(
    store: &DbAdapter,
    owner: Uuid,
    book: &str,
    chapter: i32,
    verse: i32,
) -> Favorite {
    let favorite = OwnedRepository::<Favorite>::create(
        store,
        owner,
        NewFavorite {
            book: book.to_string(),
            chapter,
            verse_number: verse,
            verse_text: format!("{book} {chapter}:{verse}"),
        },
    )
    .await
    .unwrap();
    // Keeps created_at strictly increasing between rows.
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    favorite
}

async fn session_rows(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM auth_sessions")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL pointing at a disposable Postgres"]
async fn favorites_are_scoped_to_their_owner(pool: PgPool) {
    let store = DbAdapter::new(pool);
    let alice = user(&store, "alice@x.com").await;
    let bob = user(&store, "bob@x.com").await;
    let saved = favorite(&store, alice, "John", 3, 16).await;

    assert!(matches!(
        OwnedRepository::<Favorite>::get(&store, bob, saved.id).await,
        Err(PortError::NotFound(_))
    ));
    assert!(matches!(
        OwnedRepository::<Favorite>::update(&store, bob, saved.id, FavoritePatch::default())
            .await,
        Err(PortError::NotFound(_))
    ));
    assert!(matches!(
        OwnedRepository::<Favorite>::delete(&store, bob, saved.id).await,
        Err(PortError::NotFound(_))
    ));
    assert!(OwnedRepository::<Favorite>::list(&store, bob, &VerseFilter::default())
        .await
        .unwrap()
        .is_empty());

    OwnedRepository::<Favorite>::delete(&store, alice, saved.id)
        .await
        .unwrap();
    assert!(matches!(
        OwnedRepository::<Favorite>::delete(&store, alice, saved.id).await,
        Err(PortError::NotFound(_))
    ));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL pointing at a disposable Postgres"]
async fn filtered_lists_are_newest_first(pool: PgPool) {
    let store = DbAdapter::new(pool);
    let owner = user(&store, "a@x.com").await;
    let first = favorite(&store, owner, "John", 3, 16).await;
    let psalm = favorite(&store, owner, "Psalms", 23, 1).await;
    let second = favorite(&store, owner, "John", 3, 17).await;
    let third = favorite(&store, owner, "John", 3, 16).await;

    let ids = |rows: Vec<Favorite>| rows.into_iter().map(|f| f.id).collect::<Vec<_>>();

    let all = OwnedRepository::<Favorite>::list(&store, owner, &VerseFilter::default())
        .await
        .unwrap();
    assert_eq!(ids(all), vec![third.id, second.id, psalm.id, first.id]);

    let book_only = VerseFilter {
        book: Some("John".into()),
        ..Default::default()
    };
    let john = OwnedRepository::<Favorite>::list(&store, owner, &book_only)
        .await
        .unwrap();
    assert_eq!(ids(john), vec![third.id, second.id, first.id]);

    let verse = VerseFilter {
        book: Some("John".into()),
        chapter: Some(3),
        verse: Some(16),
    };
    let john_3_16 = OwnedRepository::<Favorite>::list(&store, owner, &verse)
        .await
        .unwrap();
    assert_eq!(ids(john_3_16), vec![third.id, first.id]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL pointing at a disposable Postgres"]
async fn partial_updates_keep_absent_columns(pool: PgPool) {
    let store = DbAdapter::new(pool);
    let owner = user(&store, "a@x.com").await;

    let saved = favorite(&store, owner, "John", 3, 16).await;
    OwnedRepository::<Favorite>::update(
        &store,
        owner,
        saved.id,
        FavoritePatch {
            verse_text: Some("For God so loved the world".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let updated = OwnedRepository::<Favorite>::get(&store, owner, saved.id)
        .await
        .unwrap();
    assert_eq!(updated.verse_text, "For God so loved the world");
    assert_eq!(
        (updated.book.as_str(), updated.chapter, updated.verse_number),
        ("John", 3, 16)
    );

    let note = OwnedRepository::<Note>::create(
        &store,
        owner,
        NewNote {
            book: "Genesis".into(),
            chapter: 1,
            verse: 1,
            content: json!({"type": "doc", "content": []}),
        },
    )
    .await
    .unwrap();
    OwnedRepository::<Note>::update(
        &store,
        owner,
        note.id,
        NotePatch {
            chapter: Some(2),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let updated = OwnedRepository::<Note>::get(&store, owner, note.id)
        .await
        .unwrap();
    assert_eq!(updated.chapter, 2);
    assert_eq!(updated.book, "Genesis");
    assert_eq!(updated.content, note.content);
    assert!(updated.updated_at >= note.updated_at);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL pointing at a disposable Postgres"]
async fn expired_sessions_are_rejected_and_purged(pool: PgPool) {
    let store = DbAdapter::new(pool.clone());
    let owner = user(&store, "a@x.com").await;
    let past = Utc::now() - Duration::minutes(1);

    store.create_auth_session("stale", owner, past).await.unwrap();
    assert_eq!(session_rows(&pool).await, 1);
    assert!(matches!(
        store.validate_auth_session("stale").await,
        Err(PortError::Unauthorized)
    ));
    assert_eq!(session_rows(&pool).await, 0);

    store.create_auth_session("old", owner, past).await.unwrap();
    store
        .create_auth_session("live", owner, Utc::now() + Duration::days(1))
        .await
        .unwrap();
    assert_eq!(session_rows(&pool).await, 1);
    assert_eq!(store.validate_auth_session("live").await.unwrap(), owner);

    store.delete_auth_session("live").await.unwrap();
    assert!(store.validate_auth_session("live").await.is_err());
}
