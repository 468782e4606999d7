//! Record ordering.
//!
//! The default comparator treats empty values as "absent" and always orders
//! them after present ones. Two absent values fall back to the title, so
//! undated documents still come out in a predictable order. Present values
//! compare numerically when both sides are numbers and case-insensitively
//! as text otherwise, with numbers ahead of non-numeric text.

use std::cmp::Ordering;
use std::fmt;

use crate::hooks::SortComparator;
use crate::record::{CollectionIndex, DocumentRecord, parse_timestamp};

/// Field records are ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortField {
    /// Source file name.
    File,
    CreationDate,
    LastModified,
    PublishDate,
    /// Title, compared case-insensitively. Used when nothing else is configured.
    #[default]
    Title,
    SortOrder,
}

impl SortField {
    /// All fields, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::File,
        Self::CreationDate,
        Self::LastModified,
        Self::PublishDate,
        Self::Title,
        Self::SortOrder,
    ];

    /// Parse a field name (`file`, `creation_date`, `last_modified`,
    /// `publish_date`, `title`, `sort_order`).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(value))
    }

    /// Resolve a configured field name, degrading to [`SortField::Title`].
    #[must_use]
    pub fn from_config(value: Option<&str>) -> Self {
        match value {
            None => Self::default(),
            Some(name) => Self::parse(name).unwrap_or_else(|| {
                tracing::warn!(sort_by = name, "Unknown sort field, sorting by title");
                Self::default()
            }),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::CreationDate => "creation_date",
            Self::LastModified => "last_modified",
            Self::PublishDate => "publish_date",
            Self::Title => "title",
            Self::SortOrder => "sort_order",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record's value for one sort field.
enum SortKey<'a> {
    Absent,
    Int(i64),
    Text(&'a str),
}

fn date_key(value: &str) -> SortKey<'_> {
    parse_timestamp(value).map_or(SortKey::Absent, SortKey::Int)
}

fn text_key(value: &str) -> SortKey<'_> {
    if value.is_empty() {
        SortKey::Absent
    } else {
        SortKey::Text(value)
    }
}

fn sort_key(record: &DocumentRecord, field: SortField) -> SortKey<'_> {
    match field {
        SortField::File => record
            .source_path
            .file_name()
            .and_then(|name| name.to_str())
            .map_or(SortKey::Absent, text_key),
        SortField::CreationDate => date_key(&record.creation_date),
        SortField::LastModified => date_key(&record.last_modified),
        SortField::PublishDate => date_key(&record.publish_date),
        SortField::Title => text_key(&record.title),
        SortField::SortOrder => match record.sort_order {
            0 => SortKey::Absent,
            n => SortKey::Int(n),
        },
    }
}

/// ASCII case-insensitive comparison without allocating.
fn compare_text(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
}

fn numeric(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Default comparator.
#[must_use]
pub fn compare_records(a: &DocumentRecord, b: &DocumentRecord, field: SortField) -> Ordering {
    match (sort_key(a, field), sort_key(b, field)) {
        (SortKey::Absent, SortKey::Absent) => compare_text(&a.title, &b.title),
        (SortKey::Absent, _) => Ordering::Greater,
        (_, SortKey::Absent) => Ordering::Less,
        (SortKey::Int(x), SortKey::Int(y)) => x.cmp(&y),
        (SortKey::Text(x), SortKey::Text(y)) => match (numeric(x), numeric(y)) {
            (Some(nx), Some(ny)) => nx.total_cmp(&ny),
            // Numbers rank before other text so the order stays total.
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => compare_text(x, y),
        },
        // A field yields either integers or text, never both.
        (SortKey::Int(_), SortKey::Text(_)) => Ordering::Less,
        (SortKey::Text(_), SortKey::Int(_)) => Ordering::Greater,
    }
}

/// Sort an index's records. The sort is stable over identifier order.
#[must_use]
pub fn sort_records<'a>(
    index: &'a CollectionIndex,
    field: SortField,
    comparator: Option<&dyn SortComparator>,
) -> Vec<&'a DocumentRecord> {
    let mut records: Vec<&DocumentRecord> = index.records.values().collect();
    match comparator {
        Some(comparator) => records.sort_by(|a, b| comparator.compare(a, b, field)),
        None => records.sort_by(|a, b| compare_records(a, b, field)),
    }
    records
}
