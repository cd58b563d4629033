//! crates/auraread_core/src/text.rs
//!
//! Character-offset helpers shared by anchoring and read-aloud planning.
//!
//! Every offset exchanged with the backend counts Unicode scalar values, not
//! bytes, so Rust byte indices are converted at the edges of these helpers.

/// A half-open `[start, end)` range of character offsets into a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, other: &TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Number of characters in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Converts a byte index of `text` into a character offset.
pub fn byte_to_char(text: &str, byte_idx: usize) -> usize {
    text[..byte_idx].chars().count()
}

/// Converts a character offset into a byte index, clamping past-the-end offsets.
pub fn char_to_byte(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(b, _)| b)
        .unwrap_or(text.len())
}

/// Character offset of the first occurrence of `needle`, like `indexOf`.
pub fn find_chars(haystack: &str, needle: &str) -> Option<usize> {
    haystack.find(needle).map(|b| byte_to_char(haystack, b))
}

/// Returns the characters of `text` covered by `range` (clamped to the text).
pub fn slice_chars(text: &str, range: TextRange) -> &str {
    let start = char_to_byte(text, range.start);
    let end = char_to_byte(text, range.end.max(range.start));
    &text[start..end]
}

/// Returns at most the first `n` characters of `text`.
pub fn take_chars(text: &str, n: usize) -> &str {
    &text[..char_to_byte(text, n)]
}

/// Collapses every whitespace run into a single space.
pub fn collapse_whitespace(text: &str) -> String {
    collapse_whitespace_mapped(text).text
}

/// Whitespace-collapsed text that remembers where each character came from.
pub(crate) struct CollapsedText {
    pub text: String,
    /// Original character offset where each collapsed character starts.
    pub starts: Vec<usize>,
    /// Original character offset just past each collapsed character.
    pub ends: Vec<usize>,
}

pub(crate) fn collapse_whitespace_mapped(text: &str) -> CollapsedText {
    let mut out = CollapsedText {
        text: String::with_capacity(text.len()),
        starts: Vec::new(),
        ends: Vec::new(),
    };
    let mut in_run = false;
    for (i, c) in text.chars().enumerate() {
        if c.is_whitespace() {
            if in_run {
                if let Some(end) = out.ends.last_mut() {
                    *end = i + 1;
                }
                continue;
            }
            in_run = true;
            out.text.push(' ');
        } else {
            in_run = false;
            out.text.push(c);
        }
        out.starts.push(i);
        out.ends.push(i + 1);
    }
    out
}
