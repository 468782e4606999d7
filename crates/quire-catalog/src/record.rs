//! Document records and the collection index.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Datetime layouts accepted without an explicit offset (read as UTC).
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Date-only layouts, read as midnight UTC.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

/// Publication status of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Draft,
    #[default]
    Published,
}

impl Status {
    /// Parse a status value. Anything other than `draft` is published.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("draft") {
            Self::Draft
        } else {
            Self::Published
        }
    }
}

/// A single indexed document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentRecord {
    /// Stable identifier, unique within a collection.
    pub identifier: String,
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub author: String,
    pub category: String,
    pub tags: Vec<String>,
    pub creation_date: String,
    pub last_modified: String,
    pub publish_date: String,
    pub sort_order: i64,
    pub status: Status,
    /// Rendered HTML, only filled by a full load.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub content: String,
    /// File the record was read from.
    pub source_path: PathBuf,
    /// Canonical URL path.
    pub url: String,
}

impl DocumentRecord {
    /// Build a record from frontmatter metadata, coercing loosely typed values.
    ///
    /// Identifier, slug and URL are left empty; the indexer derives them.
    #[must_use]
    pub fn from_meta(meta: &HashMap<String, Value>) -> Self {
        let field = |key: &str| text(meta.get(key));
        Self {
            title: field("title"),
            summary: field("summary"),
            author: field("author"),
            category: field("category"),
            tags: tags(meta.get("tags")),
            creation_date: field("creation_date"),
            last_modified: field("last_modified"),
            publish_date: field("publish_date"),
            sort_order: integer(meta.get("sort_order")),
            status: meta
                .get("status")
                .and_then(Value::as_str)
                .map(Status::parse)
                .unwrap_or_default(),
            ..Self::default()
        }
    }

    /// Whether the record may be shown at time `now` (unix seconds).
    ///
    /// Drafts are never visible. A publish date strictly in the future hides
    /// the record; an unparsable publish date does not.
    #[must_use]
    pub fn is_visible(&self, now: i64) -> bool {
        if self.status == Status::Draft {
            return false;
        }
        parse_timestamp(&self.publish_date).is_none_or(|ts| ts <= now)
    }

    /// JSON view for callers outside the catalog. Omits the source path.
    #[must_use]
    pub fn public_json(&self) -> Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(map) = value.as_object_mut() {
            map.remove("source_path");
        }
        value
    }
}

/// Identifier declared in metadata (`hash_id`, then `id`), trimmed and lowercased.
#[must_use]
pub fn metadata_identifier(meta: &HashMap<String, Value>) -> Option<String> {
    ["hash_id", "id"].iter().find_map(|key| {
        let id = text(meta.get(*key));
        let id = id.trim();
        (!id.is_empty()).then(|| id.to_lowercase())
    })
}

/// Parse a date-like string into unix seconds.
///
/// Accepts RFC 3339, RFC 2822, and common `YYYY-MM-DD[ HH:MM[:SS]]`
/// layouts. Values without an offset are read as UTC.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.timestamp());
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S %z") {
        return Some(dt.timestamp());
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.and_utc().timestamp());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date.and_time(NaiveTime::MIN).and_utc().timestamp());
        }
    }
    None
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn tags(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| text(Some(item)))
            .filter(|tag| !tag.is_empty())
            .collect(),
        Some(scalar) => {
            let tag = text(Some(scalar));
            if tag.is_empty() { Vec::new() } else { vec![tag] }
        }
        None => Vec::new(),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn integer(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        Some(Value::Bool(b)) => i64::from(*b),
        _ => 0,
    }
}

/// All visible records of one collection, keyed by identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionIndex {
    /// Collection id.
    pub collection: String,
    /// Build time (unix seconds).
    pub built_at: i64,
    pub records: BTreeMap<String, DocumentRecord>,
}

impl CollectionIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new(collection: &str, built_at: i64) -> Self {
        Self {
            collection: collection.to_owned(),
            built_at,
            records: BTreeMap::new(),
        }
    }

    /// Insert a record under its identifier, returning any record it replaced.
    pub fn insert(&mut self, record: DocumentRecord) -> Option<DocumentRecord> {
        self.records.insert(record.identifier.clone(), record)
    }

    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<&DocumentRecord> {
        self.records.get(identifier)
    }

    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.records.contains_key(identifier)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
