//! crates/bible_nav_client/src/revive.rs
//!
//! A JSON tree in which every ISO-8601 timestamp string has been turned into a
//! `DateTime<Utc>`. Used for untyped responses.

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static ISO_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(Z|[+-]\d{2}:\d{2})?$")
        .expect("timestamp pattern is valid")
});

#[derive(Debug, Clone, PartialEq)]
pub enum Revived {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Date(DateTime<Utc>),
    Array(Vec<Revived>),
    Object(BTreeMap<String, Revived>),
}

impl Revived {
    pub fn get(&self, key: &str) -> Option<&Revived> {
        match self {
            Revived::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Revived::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Revived::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Revived]> {
        match self {
            Revived::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Revived::Number(n) => n.as_i64(),
            _ => None,
        }
    }
}

/// Parses `s` when it looks like an ISO-8601 timestamp. Offsets are normalised to
/// UTC; timestamps without an offset are taken to be UTC already.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let captures = ISO_TIMESTAMP.captures(s)?;
    if captures.get(1).is_some() {
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|d| d.with_timezone(&Utc))
    } else {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|d| d.and_utc())
    }
}

fn revive_object(map: Map<String, Value>) -> BTreeMap<String, Revived> {
    map.into_iter().map(|(k, v)| (k, revive(v))).collect()
}

/// Walks `value` recursively, rewriting timestamp strings at any depth.
pub fn revive(value: Value) -> Revived {
    match value {
        Value::Null => Revived::Null,
        Value::Bool(b) => Revived::Bool(b),
        Value::Number(n) => Revived::Number(n),
        Value::String(s) => match parse_timestamp(&s) {
            Some(date) => Revived::Date(date),
            None => Revived::String(s),
        },
        Value::Array(items) => Revived::Array(items.into_iter().map(revive).collect()),
        Value::Object(map) => Revived::Object(revive_object(map)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn nested_timestamps_become_dates() {
        let tree = revive(json!({
            "notes": [
                {"book": "John", "createdAt": "2024-05-01T12:30:00.123Z",
                 "content": {"type": "doc", "edited": "2024-05-02T08:00:00+02:00"}}
            ]
        }));

        let note = &tree.get("notes").unwrap().as_array().unwrap()[0];
        assert_eq!(note.get("book").and_then(Revived::as_str), Some("John"));
        assert!(note.get("createdAt").unwrap().as_date().is_some());
        assert_eq!(
            note.get("content").unwrap().get("edited").unwrap().as_date(),
            Some(Utc.with_ymd_and_hms(2024, 5, 2, 6, 0, 0).unwrap())
        );
    }

    #[test]
    fn offsetless_timestamps_are_utc() {
        assert_eq!(
            parse_timestamp("2024-01-31T23:59:59"),
            Some(Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap())
        );
    }

    #[test]
    fn plain_strings_are_left_alone() {
        for s in ["John 3:16", "2024-05-01", "12:30:00", "2024-13-45T99:00:00Z"] {
            assert_eq!(revive(json!(s)), Revived::String(s.to_string()));
        }
    }
}
