//! services/api/src/adapters/scripture/mod.rs
//!
//! The external scripture client. Implements the `ScriptureService` port on top of
//! bible-api.com (primary), biblesupersearch.com (secondary) and ourmanna.com
//! (verse of the day). Every GET goes through the TTL cache keyed by its full URL.

pub mod books;
pub mod providers;
pub mod transport;

use crate::adapters::ttl_cache::TtlCache;
use crate::config::ScriptureConfig;
use async_trait::async_trait;
use bible_nav_core::domain::{BibleVerse, BookInfo, Chapter, SearchHit, VerseOfTheDay};
use bible_nav_core::ports::ScriptureService;
use providers::{
    BibleApiResponse, DailyVerseResponse, SuperSearchBooksResponse, SuperSearchChapterResponse,
    SuperSearchHitsResponse,
};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, LazyLock};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use transport::JsonTransport;
use url::Url;

/// "John 3:16", "Psalm 23", "1 John 4:8", "Song of Solomon 2:1".
static REFERENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[1-3]?\s?[A-Za-z]+(?:\s[A-Za-z]+)*\s?\d+(?::\d+)?$")
        .expect("reference pattern is valid")
});

/// Returns true when `query` reads as a book/chapter(/verse) reference rather
/// than keywords.
pub fn is_reference(query: &str) -> bool {
    REFERENCE_PATTERN.is_match(query.trim())
}

pub struct ScriptureClient {
    transport: Arc<dyn JsonTransport>,
    cache: TtlCache<Value>,
    config: ScriptureConfig,
}

impl ScriptureClient {
    pub fn new(transport: Arc<dyn JsonTransport>, config: ScriptureConfig) -> Self {
        Self {
            transport,
            cache: TtlCache::new(config.cache_ttl, config.cache_max_entries),
            config,
        }
    }

    pub fn cache(&self) -> &TtlCache<Value> {
        &self.cache
    }

    /// Like `verse_of_the_day`, but gives up with `None` as soon as `token` fires.
    pub async fn verse_of_the_day_cancellable(
        &self,
        token: &CancellationToken,
    ) -> Option<VerseOfTheDay> {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                info!("Verse of the day lookup cancelled.");
                None
            }
            verse = self.verse_of_the_day() => verse,
        }
    }

    /// GET through the cache, then decode. Failures are logged and become `None`.
    async fn fetch_json<T: DeserializeOwned>(&self, url: Url) -> Option<T> {
        let key = url.to_string();
        let value = self
            .cache
            .get_or_fetch(&key, self.cache.default_ttl(), || self.transport.get_json(&url))
            .await
            .map_err(|e| error!("Fetch error for {}: {}", key, e))
            .ok()?;

        serde_json::from_value(value)
            .map_err(|e| error!("Unexpected response shape from {}: {}", key, e))
            .ok()
    }

    fn bible_api_url(&self, path: &str, version: &str) -> Option<Url> {
        let mut url = self.config.bible_api_base_url.clone();
        url.path_segments_mut().ok()?.pop_if_empty().push(path);
        url.query_pairs_mut().append_pair("translation", version);
        Some(url)
    }

    fn supersearch_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Option<Url> {
        let mut url = self.config.supersearch_base_url.clone();
        url.path_segments_mut().ok()?.pop_if_empty().push(endpoint);
        url.query_pairs_mut().extend_pairs(params);
        Some(url)
    }

    async fn bible_api_lookup(&self, path: &str, version: &str) -> Option<BibleApiResponse> {
        let url = self.bible_api_url(path, version)?;
        self.fetch_json(url).await
    }
}

#[async_trait]
impl ScriptureService for ScriptureClient {
    async fn verse_of_the_day(&self) -> Option<VerseOfTheDay> {
        let url = self.config.verse_of_the_day_url.clone();
        self.fetch_json::<DailyVerseResponse>(url)
            .await
            .map(VerseOfTheDay::from)
    }

    async fn verse(&self, reference: &str, version: &str) -> Option<BibleVerse> {
        self.bible_api_lookup(reference.trim(), version)
            .await?
            .into_verse()
    }

    async fn chapter(&self, book: &str, chapter_number: u32, version: &str) -> Option<Chapter> {
        let primary = self
            .bible_api_lookup(&format!("{} {}", book, chapter_number), version)
            .await
            .and_then(|r| r.into_chapter(chapter_number));
        if primary.is_some() {
            return primary;
        }

        let short = match books::short_name(book) {
            Some(short) => short,
            None => {
                warn!("No short name for book '{}', using it as given", book);
                book
            }
        };
        let chapter = chapter_number.to_string();
        let url = self.supersearch_url(
            "verses",
            &[("bible", version), ("book_name", short), ("chapter", chapter.as_str())],
        )?;
        self.fetch_json::<SuperSearchChapterResponse>(url)
            .await
            .and_then(|r| r.into_chapter(chapter_number))
    }

    async fn books(&self, language: &str) -> Vec<BookInfo> {
        let Some(url) = self.supersearch_url("books", &[("language", language)]) else {
            return Vec::new();
        };
        self.fetch_json::<SuperSearchBooksResponse>(url)
            .await
            .map(|r| r.results.into_iter().map(BookInfo::from).collect())
            .unwrap_or_default()
    }

    async fn search(&self, query: &str, version: &str) -> Vec<SearchHit> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        if is_reference(trimmed) {
            return self
                .bible_api_lookup(trimmed, version)
                .await
                .map(BibleApiResponse::into_hits)
                .unwrap_or_default();
        }

        let keyword_hits: Vec<SearchHit> = match self
            .supersearch_url("search", &[("bible", version), ("query", trimmed)])
        {
            Some(url) => self
                .fetch_json::<SuperSearchHitsResponse>(url)
                .await
                .map(|r| r.results.into_iter().map(SearchHit::from).collect())
                .unwrap_or_default(),
            None => Vec::new(),
        };
        if !keyword_hits.is_empty() {
            return keyword_hits;
        }

        self.bible_api_lookup(trimmed, version)
            .await
            .map(BibleApiResponse::into_hits)
            .unwrap_or_default()
    }
}
