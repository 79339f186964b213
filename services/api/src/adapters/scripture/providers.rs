//! Response shapes of the third-party providers and their mapping onto the
//! domain types. The fallback logic in the client only ever sees domain types.

use bible_nav_core::domain::{
    BibleVerse, BookInfo, Chapter, ChapterVerse, SearchHit, VerseOfTheDay,
};
use serde::Deserialize;
use std::collections::BTreeMap;

//=========================================================================================
// bible-api.com (primary)
//=========================================================================================

#[derive(Debug, Deserialize)]
pub struct BibleApiResponse {
    #[serde(default)]
    pub verses: Vec<BibleApiVerse>,
    #[serde(default)]
    pub translation_name: String,
}

#[derive(Debug, Deserialize)]
pub struct BibleApiVerse {
    pub book_name: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
}

impl BibleApiResponse {
    /// The first matched verse, labelled with its canonical reference.
    pub fn into_verse(self) -> Option<BibleVerse> {
        let translation = self.translation_name;
        self.verses.into_iter().next().map(|v| BibleVerse {
            reference: format!("{} {}:{}", v.book_name, v.chapter, v.verse),
            text: v.text,
            translation,
        })
    }

    pub fn into_chapter(self, chapter_number: u32) -> Option<Chapter> {
        if self.verses.is_empty() {
            return None;
        }
        Some(Chapter {
            chapter_number,
            verses: self
                .verses
                .into_iter()
                .map(|v| ChapterVerse {
                    verse_number: v.verse,
                    text: v.text,
                })
                .collect(),
        })
    }

    pub fn into_hits(self) -> Vec<SearchHit> {
        self.verses
            .into_iter()
            .map(|v| SearchHit {
                book: v.book_name,
                chapter: v.chapter,
                verse: v.verse,
                text: v.text,
            })
            .collect()
    }
}

//=========================================================================================
// ourmanna.com (verse of the day)
//=========================================================================================

#[derive(Debug, Deserialize)]
pub struct DailyVerseResponse {
    pub verse: DailyVerse,
}

#[derive(Debug, Deserialize)]
pub struct DailyVerse {
    pub details: DailyVerseDetails,
}

#[derive(Debug, Deserialize)]
pub struct DailyVerseDetails {
    pub text: String,
    pub reference: String,
    pub version: String,
}

impl From<DailyVerseResponse> for VerseOfTheDay {
    fn from(r: DailyVerseResponse) -> Self {
        let details = r.verse.details;
        VerseOfTheDay {
            text: details.text,
            reference: details.reference,
            version: details.version,
        }
    }
}

//=========================================================================================
// biblesupersearch.com (secondary)
//=========================================================================================

/// Book ids arrive as numbers or strings depending on the endpoint.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProviderId {
    Number(u64),
    Text(String),
}

impl ProviderId {
    fn into_string(self) -> String {
        match self {
            ProviderId::Number(n) => n.to_string(),
            ProviderId::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SuperSearchBooksResponse {
    #[serde(default)]
    pub results: Vec<SuperSearchBook>,
}

#[derive(Debug, Deserialize)]
pub struct SuperSearchBook {
    pub id: ProviderId,
    pub name: String,
    pub shortname: String,
    pub chapters: u32,
    #[serde(default)]
    pub chapter_verses: BTreeMap<String, u32>,
}

impl From<SuperSearchBook> for BookInfo {
    fn from(b: SuperSearchBook) -> Self {
        BookInfo {
            id: b.id.into_string(),
            name: b.name,
            short_name: b.shortname,
            chapter_count: b.chapters,
            verses_per_chapter: b
                .chapter_verses
                .into_iter()
                .filter_map(|(chapter, count)| chapter.parse().ok().map(|c| (c, count)))
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SuperSearchChapterResponse {
    pub results: SuperSearchChapterResults,
}

#[derive(Debug, Deserialize)]
pub struct SuperSearchChapterResults {
    #[serde(default)]
    pub verses: Vec<SuperSearchVerse>,
}

#[derive(Debug, Deserialize)]
pub struct SuperSearchVerse {
    pub verse: u32,
    pub text: String,
}

impl SuperSearchChapterResponse {
    pub fn into_chapter(self, chapter_number: u32) -> Option<Chapter> {
        if self.results.verses.is_empty() {
            return None;
        }
        Some(Chapter {
            chapter_number,
            verses: self
                .results
                .verses
                .into_iter()
                .map(|v| ChapterVerse {
                    verse_number: v.verse,
                    text: v.text,
                })
                .collect(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SuperSearchHitsResponse {
    #[serde(default)]
    pub results: Vec<SuperSearchHit>,
}

#[derive(Debug, Deserialize)]
pub struct SuperSearchHit {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
}

impl From<SuperSearchHit> for SearchHit {
    fn from(h: SuperSearchHit) -> Self {
        SearchHit {
            book: h.book,
            chapter: h.chapter,
            verse: h.verse,
            text: h.text,
        }
    }
}
