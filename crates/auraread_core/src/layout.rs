//! crates/auraread_core/src/layout.rs
//!
//! Splits extracted text into plain and highlighted runs for display.

use crate::domain::Annotation;
use crate::text::{self, TextRange};

/// A run of text, highlighted when it belongs to an annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub range: TextRange,
    pub annotation_id: Option<i64>,
}

/// Lays annotations over `full_text`.
///
/// Ranges are clamped to the text. Where annotations overlap, the one that
/// starts first keeps the shared characters.
pub fn annotated_segments<'a>(full_text: &'a str, annotations: &[Annotation]) -> Vec<Segment<'a>> {
    let len = text::char_len(full_text);
    let mut spans: Vec<(TextRange, i64)> = annotations
        .iter()
        .map(|a| (TextRange::new(a.start_offset.min(len), a.end_offset.min(len)), a.id))
        .filter(|(r, _)| !r.is_empty())
        .collect();
    spans.sort_by_key(|(r, id)| (r.start, *id));

    let mut segments = Vec::new();
    let mut cursor = 0;
    let mut push = |range: TextRange, annotation_id: Option<i64>| {
        if !range.is_empty() {
            segments.push(Segment {
                text: text::slice_chars(full_text, range),
                range,
                annotation_id,
            });
        }
    };
    for (range, id) in spans {
        let start = range.start.max(cursor);
        if start >= range.end {
            continue;
        }
        push(TextRange::new(cursor, start), None);
        push(TextRange::new(start, range.end), Some(id));
        cursor = range.end;
    }
    push(TextRange::new(cursor, len), None);
    segments
}
