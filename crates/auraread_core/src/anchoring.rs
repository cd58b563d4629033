//! crates/auraread_core/src/anchoring.rs
//!
//! Maps a free-text selection back onto character offsets of a document's
//! extracted text so an annotation can be stored against it.
//!
//! This is a best-effort heuristic. Strategies are tried from most to least
//! precise, and repeated substrings always resolve to the first occurrence.

use crate::text::{self, TextRange};

/// How many leading characters of a selection the last-resort search uses.
pub const PREFIX_SEARCH_CHARS: usize = 100;

/// The text node a selection started in, as reported by the view layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionContainer {
    /// Full text content of the node.
    pub text: String,
    /// Character offset of the selection start inside the node.
    pub offset: usize,
}

/// A user's text selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub text: String,
    pub container: Option<SelectionContainer>,
}

impl Selection {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            container: None,
        }
    }

    pub fn with_container(mut self, text: impl Into<String>, offset: usize) -> Self {
        self.container = Some(SelectionContainer {
            text: text.into(),
            offset,
        });
        self
    }
}

/// Which strategy produced an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorStrategy {
    Exact,
    Normalized,
    Container,
    Prefix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub range: TextRange,
    pub strategy: AnchorStrategy,
}

/// Locates `selection` inside `full_text`.
///
/// Returns `None` when no strategy matches; callers drop the annotation.
pub fn anchor_selection(full_text: &str, selection: &Selection) -> Option<Anchor> {
    let selected = selection.text.as_str();
    if selected.trim().is_empty() {
        return None;
    }
    let text_len = text::char_len(full_text);
    let selected_len = text::char_len(selected);
    let span_from = |start: usize| TextRange::new(start, (start + selected_len).min(text_len));

    // 1. Verbatim.
    if let Some(start) = text::find_chars(full_text, selected) {
        return Some(Anchor {
            range: span_from(start),
            strategy: AnchorStrategy::Exact,
        });
    }

    // 2. Whitespace-insensitive, mapped back onto the original text.
    if let Some(range) = find_normalized(full_text, selected) {
        return Some(Anchor {
            range,
            strategy: AnchorStrategy::Normalized,
        });
    }

    // 3. Position of the containing node plus the offset inside it.
    if let Some(container) = &selection.container {
        if !container.text.is_empty() {
            let node_start = text::find_chars(full_text, &container.text)
                .filter(|_| container.offset <= text::char_len(&container.text));
            if let Some(start) = node_start.and_then(|n| n.checked_add(container.offset)) {
                if start < text_len {
                    return Some(Anchor {
                        range: span_from(start),
                        strategy: AnchorStrategy::Container,
                    });
                }
            }
        }
    }

    // 4. Leading characters only.
    let prefix = text::take_chars(selected, PREFIX_SEARCH_CHARS);
    text::find_chars(full_text, prefix).map(|start| Anchor {
        range: span_from(start),
        strategy: AnchorStrategy::Prefix,
    })
}

fn find_normalized(full_text: &str, selected: &str) -> Option<TextRange> {
    let collapsed = text::collapse_whitespace_mapped(full_text);
    let needle = text::collapse_whitespace(selected);
    let first = text::find_chars(&collapsed.text, &needle)?;
    let last = first + text::char_len(&needle) - 1;
    Some(TextRange::new(
        *collapsed.starts.get(first)?,
        *collapsed.ends.get(last)?,
    ))
}
