//! Book names as the secondary provider abbreviates them.

/// Full English book name to the three-character code the secondary provider
/// expects. 39 Old Testament books followed by 27 New Testament books.
const BOOK_SHORT_NAMES: [(&str, &str); 66] = [
    ("Genesis", "Gen"),
    ("Exodus", "Exo"),
    ("Leviticus", "Lev"),
    ("Numbers", "Num"),
    ("Deuteronomy", "Deu"),
    ("Joshua", "Jos"),
    ("Judges", "Jdg"),
    ("Ruth", "Rth"),
    ("1 Samuel", "1Sa"),
    ("2 Samuel", "2Sa"),
    ("1 Kings", "1Ki"),
    ("2 Kings", "2Ki"),
    ("1 Chronicles", "1Ch"),
    ("2 Chronicles", "2Ch"),
    ("Ezra", "Ezr"),
    ("Nehemiah", "Neh"),
    ("Esther", "Est"),
    ("Job", "Job"),
    ("Psalms", "Psa"),
    ("Proverbs", "Pro"),
    ("Ecclesiastes", "Ecc"),
    ("Song of Solomon", "SoS"),
    ("Isaiah", "Isa"),
    ("Jeremiah", "Jer"),
    ("Lamentations", "Lam"),
    ("Ezekiel", "Eze"),
    ("Daniel", "Dan"),
    ("Hosea", "Hos"),
    ("Joel", "Joe"),
    ("Amos", "Amo"),
    ("Obadiah", "Oba"),
    ("Jonah", "Jon"),
    ("Micah", "Mic"),
    ("Nahum", "Nah"),
    ("Habakkuk", "Hab"),
    ("Zephaniah", "Zep"),
    ("Haggai", "Hag"),
    ("Zechariah", "Zec"),
    ("Malachi", "Mal"),
    ("Matthew", "Mat"),
    ("Mark", "Mar"),
    ("Luke", "Luk"),
    ("John", "Joh"),
    ("Acts", "Act"),
    ("Romans", "Rom"),
    ("1 Corinthians", "1Co"),
    ("2 Corinthians", "2Co"),
    ("Galatians", "Gal"),
    ("Ephesians", "Eph"),
    ("Philippians", "Php"),
    ("Colossians", "Col"),
    ("1 Thessalonians", "1Th"),
    ("2 Thessalonians", "2Th"),
    ("1 Timothy", "1Ti"),
    ("2 Timothy", "2Ti"),
    ("Titus", "Tit"),
    ("Philemon", "Phm"),
    ("Hebrews", "Heb"),
    ("James", "Jam"),
    ("1 Peter", "1Pe"),
    ("2 Peter", "2Pe"),
    ("1 John", "1Jo"),
    ("2 John", "2Jo"),
    ("3 John", "3Jo"),
    ("Jude", "Jud"),
    ("Revelation", "Rev"),
];

/// Looks up the short code for `book`. Matching ignores ASCII case.
pub fn short_name(book: &str) -> Option<&'static str> {
    let book = book.trim();
    BOOK_SHORT_NAMES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(book))
        .map(|(_, short)| *short)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_both_testaments() {
        assert_eq!(BOOK_SHORT_NAMES[..39].last().map(|b| b.0), Some("Malachi"));
        assert_eq!(BOOK_SHORT_NAMES[39].0, "Matthew");
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(short_name("John"), Some("Joh"));
        assert_eq!(short_name("song of solomon"), Some("SoS"));
        assert_eq!(short_name(" 1 Corinthians "), Some("1Co"));
        assert_eq!(short_name("Maccabees"), None);
    }
}
