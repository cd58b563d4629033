//! crates/auraread_core/src/read_aloud.rs
//!
//! Sentence and word planning for read-aloud highlighting.
//!
//! The highlight is paced by an estimate of speaking time per word, not by the
//! real audio position. The plan here is pure; the timer that walks it lives
//! in the reader service.

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

use crate::text::{self, TextRange};

/// Longest text sent to the speech service in one request.
pub const MAX_TTS_CHARS: usize = 1000;

/// Fixed part of the per-word highlight duration.
pub const WORD_BASE_MS: u64 = 200;

/// Per-character part of the per-word highlight duration.
pub const WORD_CHAR_MS: u64 = 80;

fn sentence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^.!?]+[.!?]+").expect("sentence pattern is valid"))
}

/// Byte spans of the sentences in `text`.
fn sentence_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans: Vec<(usize, usize)> = sentence_pattern()
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect();
    let tail_start = spans.last().map_or(0, |&(_, end)| end);
    if !text[tail_start..].trim().is_empty() || spans.is_empty() {
        spans.push((tail_start, text.len()));
    }
    spans
}

/// Splits text into sentences ending in `.`, `!` or `?`.
///
/// A trailing fragment without terminal punctuation is kept as a last
/// sentence; text without any punctuation is one sentence.
pub fn split_sentences(text: &str) -> Vec<&str> {
    sentence_spans(text)
        .into_iter()
        .map(|(start, end)| &text[start..end])
        .collect()
}

/// Splits a sentence into whitespace-delimited words.
pub fn split_words(sentence: &str) -> Vec<&str> {
    sentence.split_whitespace().collect()
}

/// Estimated time to speak `word` at the given playback rate.
pub fn word_duration(word: &str, rate: f32) -> Duration {
    let millis = WORD_BASE_MS + WORD_CHAR_MS * text::char_len(word) as u64;
    if rate > 0.0 && rate.is_finite() {
        let micros = (millis as f64 * 1000.0 / rate as f64).round();
        Duration::from_micros(micros as u64)
    } else {
        Duration::from_millis(millis)
    }
}

/// Clips text to what one speech request may carry, marking the cut with `...`.
pub fn prepare_tts_text(text: &str) -> String {
    if text::char_len(text) > MAX_TTS_CHARS {
        format!("{}...", text::take_chars(text, MAX_TTS_CHARS))
    } else {
        text.to_string()
    }
}

/// Key under which synthesized audio is cached.
///
/// It combines language, engine preference, the last path segment of the
/// voice id, the text length and the first 20 characters of the text, with
/// each whitespace run written as a single `_`.
pub fn audio_cache_key(text: &str, language: &str, prefer_offline: bool, voice: Option<&str>) -> String {
    let engine = if prefer_offline { "offline" } else { "online" };
    let voice_key = voice
        .and_then(|v| v.rsplit('\\').next())
        .filter(|v| !v.is_empty())
        .unwrap_or("default");
    let mut head = String::new();
    let mut in_space = false;
    for c in text::take_chars(text, 20).chars() {
        if c.is_whitespace() {
            if !in_space {
                head.push('_');
            }
            in_space = true;
        } else {
            head.push(c);
            in_space = false;
        }
    }
    format!(
        "{}_{}_{}_{}_{}",
        language,
        engine,
        voice_key,
        text::char_len(text),
        head
    )
}

/// Location of a sentence and one of its words inside a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPosition {
    pub sentence: TextRange,
    pub word: TextRange,
}

/// Finds the `sentence_index`-th sentence of `text` and the first occurrence
/// of `word` inside it.
pub fn find_text_position(text: &str, word: &str, sentence_index: usize) -> Option<TextPosition> {
    let (start, end) = *sentence_spans(text).get(sentence_index)?;
    let sentence = &text[start..end];
    let word_byte = sentence.find(word)?;
    let sentence_start = text::byte_to_char(text, start);
    let word_start = sentence_start + text::byte_to_char(sentence, word_byte);
    Some(TextPosition {
        sentence: TextRange::new(sentence_start, sentence_start + text::char_len(sentence)),
        word: TextRange::new(word_start, word_start + text::char_len(word)),
    })
}

//=========================================================================================
// Reading Plan
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedWord {
    pub text: String,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSentence {
    /// The sentence without surrounding whitespace.
    pub range: TextRange,
    pub words: Vec<PlannedWord>,
}

/// Every sentence and word of a text with their character ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadingPlan {
    pub sentences: Vec<PlannedSentence>,
}

impl ReadingPlan {
    pub fn new(text: &str) -> Self {
        let sentences = sentence_spans(text)
            .into_iter()
            .filter_map(|(start, end)| plan_sentence(text, start, end))
            .collect();
        Self { sentences }
    }

    pub fn word_count(&self) -> usize {
        self.sentences.iter().map(|s| s.words.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Total estimated reading time at the given rate.
    pub fn estimated_duration(&self, rate: f32) -> Duration {
        self.sentences
            .iter()
            .flat_map(|s| s.words.iter())
            .map(|w| word_duration(&w.text, rate))
            .sum()
    }
}

fn plan_sentence(text: &str, start: usize, end: usize) -> Option<PlannedSentence> {
    let slice = &text[start..end];
    let mut words = Vec::new();
    let mut word_start: Option<usize> = None;
    for (offset, c) in slice.char_indices().chain(std::iter::once((slice.len(), ' '))) {
        match (c.is_whitespace(), word_start) {
            (false, None) => word_start = Some(offset),
            (true, Some(ws)) => {
                let from = text::byte_to_char(text, start + ws);
                let word = &slice[ws..offset];
                words.push(PlannedWord {
                    text: word.to_string(),
                    range: TextRange::new(from, from + text::char_len(word)),
                });
                word_start = None;
            }
            _ => {}
        }
    }
    let first = words.first()?.range.start;
    let last = words.last()?.range.end;
    Some(PlannedSentence {
        range: TextRange::new(first, last),
        words,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentences_split_on_terminal_punctuation() {
        let sentences = split_sentences("Hello there. How are you? Fine!");
        assert_eq!(sentences, vec!["Hello there.", " How are you?", " Fine!"]);
    }

    #[test]
    fn unpunctuated_text_is_a_single_sentence() {
        assert_eq!(split_sentences("no punctuation here"), vec!["no punctuation here"]);
        assert_eq!(split_sentences(""), vec![""]);
    }

    #[test]
    fn trailing_fragment_is_kept() {
        assert_eq!(split_sentences("One. Two"), vec!["One.", " Two"]);
        assert_eq!(split_sentences("One.  "), vec!["One."]);
    }

    #[test]
    fn words_split_on_whitespace() {
        assert_eq!(split_words("  How are\tyou? "), vec!["How", "are", "you?"]);
    }

    #[test]
    fn word_duration_scales_with_length_and_rate() {
        assert_eq!(word_duration("word", 1.0), Duration::from_millis(520));
        assert_eq!(word_duration("a", 2.0), Duration::from_millis(140));
        assert_eq!(word_duration("a", 0.0), Duration::from_millis(280));
    }

    #[test]
    fn long_text_is_truncated_for_speech() {
        let long = "a".repeat(MAX_TTS_CHARS + 5);
        let prepared = prepare_tts_text(&long);
        assert_eq!(prepared.len(), MAX_TTS_CHARS + 3);
        assert!(prepared.ends_with("..."));
        assert_eq!(prepare_tts_text("short"), "short");
    }

    #[test]
    fn cache_key_reflects_engine_voice_and_text() {
        let key = audio_cache_key("Hello big world", "en", true, Some(r"HKEY\Voices\TTS_MS_EN-US_DAVID"));
        assert_eq!(key, "en_offline_TTS_MS_EN-US_DAVID_15_Hello_big_world");
        let key = audio_cache_key("Hi", "de", false, None);
        assert_eq!(key, "de_online_default_2_Hi");
        let key = audio_cache_key("Hi \n\t there", "en", true, None);
        assert_eq!(key, "en_offline_default_12_Hi_there");
    }

    #[test]
    fn text_position_finds_word_inside_sentence() {
        let text = "First one. Second one here.";
        let pos = find_text_position(text, "one", 1).unwrap();
        assert_eq!(pos.sentence, TextRange::new(10, 27));
        assert_eq!(pos.word, TextRange::new(18, 21));
        assert!(find_text_position(text, "missing", 0).is_none());
        assert!(find_text_position(text, "one", 5).is_none());
    }

    #[test]
    fn plan_tracks_repeated_words_separately() {
        let text = "the cat saw the dog. Done";
        let plan = ReadingPlan::new(text);
        assert_eq!(plan.sentences.len(), 2);
        let words = &plan.sentences[0].words;
        assert_eq!(words.len(), 5);
        assert_eq!(words[0].range, TextRange::new(0, 3));
        assert_eq!(words[3].range, TextRange::new(12, 15));
        assert_eq!(plan.sentences[1].range, TextRange::new(21, 25));
        assert_eq!(plan.word_count(), 6);
    }

    #[test]
    fn plan_of_blank_text_is_empty() {
        assert!(ReadingPlan::new("   ").is_empty());
        assert_eq!(ReadingPlan::new("").estimated_duration(1.0), Duration::ZERO);
    }
}
