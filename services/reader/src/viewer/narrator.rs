//! services/reader/src/viewer/narrator.rs
//!
//! The read-aloud highlighter. It walks a reading plan word by word and emits
//! highlight events on a timer, independently of actual audio playback.
//! Stopping is done through a `CancellationToken`.

use std::time::Duration;

use async_stream::stream;
use auraread_core::read_aloud::{word_duration, ReadingPlan};
use auraread_core::text::TextRange;
use futures::Stream;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub const DEFAULT_RATE: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighlightEvent {
    /// A word is being spoken. `sentence` and `word` are char offsets into
    /// the narrated text, shifted by the narrator's origin.
    Word {
        sentence_index: usize,
        word_index: usize,
        sentence: TextRange,
        word: TextRange,
        text: String,
    },
    /// Reading was stopped before the end.
    Stopped,
    /// Every word was highlighted.
    Finished,
}

/// Paces highlights for one piece of text at a fixed playback rate.
#[derive(Debug, Clone)]
pub struct Narrator {
    plan: ReadingPlan,
    rate: f32,
    origin: usize,
}

impl Narrator {
    pub fn new(text: &str, rate: f32) -> Self {
        Self {
            plan: ReadingPlan::new(text),
            rate: if rate > 0.0 { rate } else { DEFAULT_RATE },
            origin: 0,
        }
    }

    /// Places the narrated text at `origin` inside a larger text, so that
    /// highlights point into that text.
    pub fn starting_at(mut self, origin: usize) -> Self {
        self.origin = origin;
        self
    }

    pub fn origin(&self) -> usize {
        self.origin
    }

    pub fn plan(&self) -> &ReadingPlan {
        &self.plan
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn estimated_duration(&self) -> Duration {
        self.plan.estimated_duration(self.rate)
    }

    /// Streams one `Word` event per word, each held for its estimated
    /// duration, then `Finished`. Cancelling `stop` ends the stream with
    /// `Stopped`.
    pub fn highlights(self, stop: CancellationToken) -> impl Stream<Item = HighlightEvent> {
        stream! {
            info!("Read-aloud started ({} words)", self.plan.word_count());
            for (sentence_index, sentence) in self.plan.sentences.iter().enumerate() {
                for (word_index, word) in sentence.words.iter().enumerate() {
                    if stop.is_cancelled() {
                        info!("Read-aloud stopped.");
                        yield HighlightEvent::Stopped;
                        return;
                    }
                    yield HighlightEvent::Word {
                        sentence_index,
                        word_index,
                        sentence: shift(sentence.range, self.origin),
                        word: shift(word.range, self.origin),
                        text: word.text.clone(),
                    };
                    let stopped = tokio::select! {
                        _ = stop.cancelled() => true,
                        _ = tokio::time::sleep(word_duration(&word.text, self.rate)) => false,
                    };
                    if stopped {
                        info!("Read-aloud stopped.");
                        yield HighlightEvent::Stopped;
                        return;
                    }
                }
            }
            info!("Read-aloud finished.");
            yield HighlightEvent::Finished;
        }
    }
}

fn shift(range: TextRange, origin: usize) -> TextRange {
    TextRange::new(
        range.start.saturating_add(origin),
        range.end.saturating_add(origin),
    )
}
