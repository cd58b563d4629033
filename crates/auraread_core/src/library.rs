//! crates/auraread_core/src/library.rs
//!
//! Ordering, filtering and presentation helpers for the document list.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::domain::Document;
use crate::text;

/// Number of text characters shown in a document preview.
pub const PREVIEW_CHARS: usize = 150;

pub const NO_PREVIEW: &str = "No preview available for this document.";

/// Sort orders offered by the document list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Alphabetical by title.
    Title,
    /// Newest upload first.
    #[default]
    Date,
    /// Alphabetical by language code.
    Language,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "title" => Ok(SortKey::Title),
            "date" => Ok(SortKey::Date),
            "language" => Ok(SortKey::Language),
            other => Err(format!("unknown sort key '{}' (expected title, date or language)", other)),
        }
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// The comparator behind each sort key.
pub fn compare_documents(a: &Document, b: &Document, key: SortKey) -> Ordering {
    match key {
        SortKey::Title => compare_text(&a.title, &b.title),
        SortKey::Date => b.uploaded_at.cmp(&a.uploaded_at),
        SortKey::Language => compare_text(&a.language, &b.language),
    }
}

/// Sorts in place; documents that compare equal keep their relative order.
pub fn sort_documents(documents: &mut [Document], key: SortKey) {
    documents.sort_by(|a, b| compare_documents(a, b, key));
}

/// Keeps documents whose title or description contains `term`, ignoring case.
pub fn filter_documents<'a>(documents: &'a [Document], term: &str) -> Vec<&'a Document> {
    let needle = term.trim().to_lowercase();
    documents
        .iter()
        .filter(|doc| {
            needle.is_empty()
                || doc.title.to_lowercase().contains(&needle)
                || doc
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Short description for a list entry: the description if there is one,
/// otherwise the start of the extracted text.
pub fn document_preview(document: &Document, text: Option<&str>) -> String {
    if let Some(description) = document.description.as_deref().filter(|d| !d.is_empty()) {
        return description.to_string();
    }
    match text.filter(|t| !t.is_empty()) {
        Some(t) if text::char_len(t) > PREVIEW_CHARS => {
            format!("{}...", text::take_chars(t, PREVIEW_CHARS))
        }
        Some(t) => t.to_string(),
        None => NO_PREVIEW.to_string(),
    }
}

/// Human-friendly label for an upload date relative to `now`.
pub fn relative_date_label(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - date).num_days().abs();
    match days {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => date.format("%A").to_string(),
        7..=364 => date.format("%b %-d").to_string(),
        _ => date.format("%b %-d, %Y").to_string(),
    }
}
