//! services/reader/src/viewer/mod.rs
//!
//! The document viewer: one document's text, its annotations, read-aloud
//! with TTS and, in smart mode, the AI helpers.
//!
//! All three viewer variants share this type and differ only by `ViewerMode`:
//! `Basic` reads aloud, `Enhanced` adds annotations, `Smart` adds summaries,
//! questions and tag suggestions.

pub mod narrator;

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;

use auraread_core::anchoring::{anchor_selection, Selection};
use auraread_core::domain::{
    language_name, Annotation, Answer, Document, DocumentPatch, SpeechAudio, SpeechRequest,
    SuggestedTag, Summary, VoiceCatalog,
};
use auraread_core::layout::{annotated_segments, Segment};
use auraread_core::ports::{PortError, PortResult};
use auraread_core::read_aloud::{audio_cache_key, prepare_tts_text};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::app::{AnnotationDraft, AppStore};
use narrator::{Narrator, DEFAULT_RATE};

pub use narrator::HighlightEvent;

const TEXT_NOT_READY: &str = "The document text has not been extracted yet";

/// Clips kept per viewer before the oldest is evicted.
pub const AUDIO_CACHE_LIMIT: usize = 16;

//=========================================================================================
// Viewer Mode and TTS Settings
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewerMode {
    Basic,
    #[default]
    Enhanced,
    Smart,
}

impl ViewerMode {
    pub fn has_annotations(self) -> bool {
        matches!(self, ViewerMode::Enhanced | ViewerMode::Smart)
    }

    pub fn has_ai(self) -> bool {
        self == ViewerMode::Smart
    }
}

impl FromStr for ViewerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(ViewerMode::Basic),
            "enhanced" => Ok(ViewerMode::Enhanced),
            "smart" => Ok(ViewerMode::Smart),
            other => Err(format!("unknown viewer mode '{}' (expected basic, enhanced or smart)", other)),
        }
    }
}

impl fmt::Display for ViewerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViewerMode::Basic => "basic",
            ViewerMode::Enhanced => "enhanced",
            ViewerMode::Smart => "smart",
        };
        f.write_str(name)
    }
}

/// The user's speech preferences for this viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct TtsSettings {
    pub language: String,
    pub prefer_offline: bool,
    pub voice_id: Option<String>,
    pub rate: f32,
}

/// Everything needed to play one read-aloud request.
pub struct ReadAloud {
    pub audio: SpeechAudio,
    /// The text actually sent for synthesis, after truncation.
    pub text: String,
    pub from_cache: bool,
    narrator: Narrator,
    stop: CancellationToken,
}

impl ReadAloud {
    pub fn narrator(&self) -> &Narrator {
        &self.narrator
    }

    /// The timed highlight stream for this request; stops with the viewer.
    pub fn highlights(&self) -> impl futures::Stream<Item = HighlightEvent> {
        self.narrator.clone().highlights(self.stop.clone())
    }
}

//=========================================================================================
// Audio Cache
//=========================================================================================

/// Synthesized clips keyed by the exact text and the settings that produced
/// them. Holds at most `AUDIO_CACHE_LIMIT` clips, evicting the oldest first.
#[derive(Default)]
struct AudioCache {
    clips: HashMap<(String, String), SpeechAudio>,
    order: VecDeque<(String, String)>,
}

impl AudioCache {
    fn get(&self, settings_key: &str, text: &str) -> Option<SpeechAudio> {
        self.clips
            .get(&(settings_key.to_string(), text.to_string()))
            .cloned()
    }

    fn insert(&mut self, settings_key: String, text: String, audio: SpeechAudio) {
        let key = (settings_key, text);
        if self.clips.insert(key.clone(), audio).is_none() {
            self.order.push_back(key);
        }
        while self.order.len() > AUDIO_CACHE_LIMIT {
            if let Some(oldest) = self.order.pop_front() {
                self.clips.remove(&oldest);
            }
        }
    }

    fn len(&self) -> usize {
        self.clips.len()
    }

    fn clear(&mut self) {
        self.clips.clear();
        self.order.clear();
    }
}

//=========================================================================================
// The Viewer
//=========================================================================================

pub struct Viewer {
    mode: ViewerMode,
    document_id: i64,
    settings: TtsSettings,
    voices: Option<VoiceCatalog>,
    audio_cache: AudioCache,
    stop: CancellationToken,
    pub summary: Option<Summary>,
    pub answers: Vec<Answer>,
    pub tags: Vec<SuggestedTag>,
    pub error: Option<String>,
}

impl Viewer {
    /// Opens a document: loads it, extracts its text and, when the mode
    /// supports them, its annotations.
    pub async fn open(store: &mut AppStore, document_id: i64, mode: ViewerMode) -> PortResult<Self> {
        let document = store.fetch_document(document_id).await?;
        store.extract_text(document_id).await?;
        if mode.has_annotations() {
            store.fetch_annotations(document_id).await?;
        } else {
            store.clear_annotations();
        }
        info!("Opened document {} in {} mode", document_id, mode);
        Ok(Self::for_document(store, &document, mode))
    }

    /// Builds a viewer for an already-loaded document.
    pub fn for_document(store: &AppStore, document: &Document, mode: ViewerMode) -> Self {
        let config = &store.services().config;
        let settings = TtsSettings {
            language: config
                .tts_language
                .clone()
                .unwrap_or_else(|| document.language.clone()),
            prefer_offline: config.prefer_offline_tts,
            voice_id: None,
            rate: DEFAULT_RATE,
        };
        Self {
            mode,
            document_id: document.id,
            settings,
            voices: None,
            audio_cache: AudioCache::default(),
            stop: CancellationToken::new(),
            summary: None,
            answers: Vec::new(),
            tags: Vec::new(),
            error: None,
        }
    }

    pub fn mode(&self) -> ViewerMode {
        self.mode
    }

    pub fn document_id(&self) -> i64 {
        self.document_id
    }

    pub fn settings(&self) -> &TtsSettings {
        &self.settings
    }

    pub fn voices(&self) -> Option<&VoiceCatalog> {
        self.voices.as_ref()
    }

    pub fn cached_audio_count(&self) -> usize {
        self.audio_cache.len()
    }

    fn fail<T>(&mut self, store: &mut AppStore, result: PortResult<T>) -> PortResult<T> {
        let result = store.check_auth(result);
        if let Err(e) = &result {
            self.error = Some(e.message().to_string());
        }
        result
    }

    fn current_text(&self, store: &AppStore) -> PortResult<String> {
        let loaded = store
            .documents
            .current_document
            .as_ref()
            .is_some_and(|d| d.id == self.document_id);
        match (&store.documents.extracted_text, loaded) {
            (Some(text), true) => Ok(text.clone()),
            _ => Err(PortError::Validation(TEXT_NOT_READY.to_string())),
        }
    }

    //-------------------------------------------------------------------------------------
    // Read-aloud
    //-------------------------------------------------------------------------------------

    /// Synthesizes speech for `selection`, or for the whole text when there
    /// is no selection, and prepares the matching highlight stream.
    ///
    /// Audio is cached per exact text, language, engine and voice. Highlight
    /// ranges are offsets into the document text, starting where the
    /// selection was found. Starting a new read stops the previous one.
    pub async fn read_aloud(&mut self, store: &mut AppStore, selection: Option<&str>) -> PortResult<ReadAloud> {
        self.error = None;
        let full_text = match self.current_text(store) {
            Ok(text) => text,
            Err(e) => return self.fail(store, Err(e)),
        };
        let source = selection
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(full_text.as_str());
        if source.trim().is_empty() {
            return self.fail(store, Err(PortError::Validation("There is no text to read".to_string())));
        }
        let text = prepare_tts_text(source);
        let origin = selection
            .filter(|s| !s.trim().is_empty())
            .and_then(|s| anchor_selection(&full_text, &Selection::new(s)))
            .map_or(0, |anchor| anchor.range.start);

        self.stop();
        self.stop = CancellationToken::new();

        let key = audio_cache_key(
            &text,
            &self.settings.language,
            self.settings.prefer_offline,
            self.settings.voice_id.as_deref(),
        );
        let (audio, from_cache) = match self.audio_cache.get(&key, &text) {
            Some(audio) => {
                debug!("TTS cache hit for {}", key);
                (audio, true)
            }
            None => {
                debug!("TTS cache miss for {}", key);
                let request = SpeechRequest {
                    text: text.clone(),
                    language: Some(self.settings.language.clone()),
                    prefer_offline: self.settings.prefer_offline,
                    voice_id: self.settings.voice_id.clone(),
                };
                let result = store
                    .services()
                    .speech
                    .synthesize(self.document_id, &request)
                    .await;
                let audio = self.fail(store, result)?;
                self.audio_cache.insert(key, text.clone(), audio.clone());
                (audio, false)
            }
        };

        Ok(ReadAloud {
            narrator: Narrator::new(&text, self.settings.rate).starting_at(origin),
            audio,
            text,
            from_cache,
            stop: self.stop.clone(),
        })
    }

    /// Stops the current read-aloud, if any.
    pub fn stop(&self) {
        if !self.stop.is_cancelled() {
            self.stop.cancel();
        }
    }

    pub fn stop_token(&self) -> CancellationToken {
        self.stop.clone()
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.settings.rate = if rate > 0.0 { rate } else { DEFAULT_RATE };
    }

    /// Picks a voice. Cached audio was made with the old voice and is dropped.
    pub fn set_voice(&mut self, voice_id: Option<String>) {
        if self.settings.voice_id != voice_id {
            self.settings.voice_id = voice_id;
            self.audio_cache.clear();
        }
    }

    /// Switches between the offline and online engines, dropping cached audio.
    pub fn set_prefer_offline(&mut self, prefer_offline: bool) {
        if self.settings.prefer_offline != prefer_offline {
            self.settings.prefer_offline = prefer_offline;
            self.audio_cache.clear();
        }
    }

    /// Changes the reading language and records it on the document.
    pub async fn set_language(&mut self, store: &mut AppStore, language: &str) -> PortResult<Document> {
        self.error = None;
        let code = language.trim().to_lowercase();
        if language_name(&code).is_none() {
            return self.fail(store, Err(PortError::Validation(format!("Unsupported language '{}'", language))));
        }
        let patch = DocumentPatch {
            language: Some(code.clone()),
            ..Default::default()
        };
        let result = store.update_document(self.document_id, &patch).await;
        let document = self.fail(store, result)?;
        self.settings.language = code;
        if let Some(voice) = self.voices.as_ref().and_then(|v| v.default_voice(&self.settings.language)) {
            let id = voice.id.clone();
            self.set_voice(Some(id));
        }
        Ok(document)
    }

    /// Loads the installed voices and, if no voice was chosen yet, picks the
    /// default one for the current language.
    pub async fn load_voices(&mut self, store: &mut AppStore) -> PortResult<&VoiceCatalog> {
        self.error = None;
        let result = store.services().speech.available_voices().await;
        let catalog = self.fail(store, result)?;
        if self.settings.voice_id.is_none() {
            self.settings.voice_id = catalog
                .default_voice(&self.settings.language)
                .map(|v| v.id.clone());
        }
        Ok(&*self.voices.insert(catalog))
    }

    //-------------------------------------------------------------------------------------
    // Annotations
    //-------------------------------------------------------------------------------------

    fn require_mode(&self, allowed: bool, what: &str) -> PortResult<()> {
        if allowed {
            Ok(())
        } else {
            Err(PortError::Validation(format!(
                "{} are not available in {} mode",
                what, self.mode
            )))
        }
    }

    /// Anchors a selection and saves it. `Ok(None)` means the selection could
    /// not be located and was dropped.
    pub async fn annotate(
        &mut self,
        store: &mut AppStore,
        selection: &Selection,
        draft: AnnotationDraft,
    ) -> PortResult<Option<Annotation>> {
        self.error = None;
        let checked = self
            .require_mode(self.mode.has_annotations(), "Annotations")
            .and_then(|_| self.current_text(store));
        let text = self.fail(store, checked)?;
        store
            .annotate_selection(self.document_id, &text, selection, draft)
            .await
    }

    /// The extracted text cut into plain and highlighted runs.
    pub fn segments<'a>(&self, store: &'a AppStore) -> Vec<Segment<'a>> {
        match &store.documents.extracted_text {
            Some(text) if self.mode.has_annotations() => {
                annotated_segments(text, &store.annotations.annotations)
            }
            Some(text) => annotated_segments(text, &[]),
            None => Vec::new(),
        }
    }

    //-------------------------------------------------------------------------------------
    // AI Helpers
    //-------------------------------------------------------------------------------------

    fn ai_text(&mut self, store: &mut AppStore) -> PortResult<String> {
        let checked = self
            .require_mode(self.mode.has_ai(), "AI features")
            .and_then(|_| self.current_text(store));
        self.fail(store, checked)
    }

    pub async fn summarize(&mut self, store: &mut AppStore) -> PortResult<Summary> {
        self.error = None;
        let text = self.ai_text(store)?;
        let result = store.services().ai.summarize(self.document_id, &text).await;
        let summary = self.fail(store, result)?;
        self.summary = Some(summary.clone());
        Ok(summary)
    }

    pub async fn ask(&mut self, store: &mut AppStore, question: &str) -> PortResult<Answer> {
        self.error = None;
        let text = self.ai_text(store)?;
        if question.trim().is_empty() {
            return self.fail(store, Err(PortError::Validation("Please enter a question".to_string())));
        }
        let result = store
            .services()
            .ai
            .ask(self.document_id, question.trim(), &text)
            .await;
        let answer = self.fail(store, result)?;
        self.answers.push(answer.clone());
        Ok(answer)
    }

    pub async fn suggest_tags(&mut self, store: &mut AppStore) -> PortResult<Vec<SuggestedTag>> {
        self.error = None;
        let text = self.ai_text(store)?;
        let result = store.services().ai.generate_tags(self.document_id, &text).await;
        let tags = self.fail(store, result)?;
        self.tags = tags.clone();
        Ok(tags)
    }
}
