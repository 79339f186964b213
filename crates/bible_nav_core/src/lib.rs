pub mod domain;
pub mod ports;

pub use domain::{
    BibleVerse, BookInfo, Chapter, ChapterVerse, Favorite, FavoritePatch,
    NewFavorite, NewNote, NewUser, Note, NotePatch, SearchHit, User, UserCredentials,
    VerseFilter, VerseOfTheDay,
};
pub use ports::{
    BibleAssistantService, DatabaseService, OwnedEntity, OwnedRepository, PortError, PortResult,
    ScriptureService,
};
