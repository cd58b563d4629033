//! crates/auraread_core/src/domain.rs
//!
//! Defines the pure, core data structures for the reader client.
//! These structs are independent of the REST wire format; the HTTP adapter
//! owns the serde records and converts them into these types.

use bytes::Bytes;
use chrono::{DateTime, Utc};

/// Language assumed for a document when the backend does not report one.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Highlight colour given to new annotations unless the user picks another.
pub const DEFAULT_HIGHLIGHT_COLOR: &str = "yellow";

/// Languages offered for documents and speech, as `(code, display name)`.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("sq", "Albanian"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("es", "Spanish"),
    ("el", "Greek"),
];

/// Looks up the display name of a supported language code.
pub fn language_name(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

//=========================================================================================
// Users and Sessions
//=========================================================================================

/// Represents the logged-in user as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
}

/// A bearer/token session: the opaque credential plus the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
}

//=========================================================================================
// Documents
//=========================================================================================

/// Represents an uploaded PDF document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub language: String,
    pub page_count: Option<u32>,
    pub uploaded_at: DateTime<Utc>,
    pub file_url: Option<String>,
}

/// A partial update to a document's metadata. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub language: Option<String>,
    pub description: Option<String>,
}

impl DocumentPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.language.is_none() && self.description.is_none()
    }
}

/// A file that passed client-side validation and is ready to be sent.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub title: String,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

//=========================================================================================
// Annotations
//=========================================================================================

/// A user-authored highlight anchored to a character range of the extracted text.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub id: i64,
    pub document_id: i64,
    pub selected_text: String,
    pub start_offset: usize,
    pub end_offset: usize,
    pub note: Option<String>,
    pub highlight_color: String,
    pub page_number: u32,
    pub created_at: Option<DateTime<Utc>>,
}

/// The payload for creating (or fully replacing) an annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnnotation {
    pub document_id: i64,
    pub selected_text: String,
    pub start_offset: usize,
    pub end_offset: usize,
    pub note: Option<String>,
    pub highlight_color: String,
    pub page_number: u32,
}

impl From<&Annotation> for NewAnnotation {
    fn from(a: &Annotation) -> Self {
        Self {
            document_id: a.document_id,
            selected_text: a.selected_text.clone(),
            start_offset: a.start_offset,
            end_offset: a.end_offset,
            note: a.note.clone(),
            highlight_color: a.highlight_color.clone(),
            page_number: a.page_number,
        }
    }
}

//=========================================================================================
// Speech
//=========================================================================================

/// One installed voice of a TTS engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub id: String,
    pub name: String,
    pub language: String,
}

/// Voices grouped by the engine that provides them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceCatalog {
    pub windows_sapi: Vec<Voice>,
    pub pyttsx3: Vec<Voice>,
}

impl VoiceCatalog {
    pub fn is_empty(&self) -> bool {
        self.windows_sapi.is_empty() && self.pyttsx3.is_empty()
    }

    /// Picks the default voice for a language: the first SAPI voice whose
    /// language contains the code, otherwise the first SAPI voice.
    pub fn default_voice(&self, language: &str) -> Option<&Voice> {
        let code = language.to_lowercase().replace('_', "-");
        self.windows_sapi
            .iter()
            .find(|v| !code.is_empty() && v.language.to_lowercase().contains(&code))
            .or_else(|| self.windows_sapi.first())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub text: String,
    pub language: Option<String>,
    pub prefer_offline: bool,
    pub voice_id: Option<String>,
}

/// Synthesized audio as returned by the backend.
#[derive(Debug, Clone)]
pub struct SpeechAudio {
    pub bytes: Bytes,
    pub content_type: String,
}

impl SpeechAudio {
    /// File extension matching the audio's content type.
    pub fn extension(&self) -> &'static str {
        if self.content_type.contains("wav") {
            "wav"
        } else {
            "mp3"
        }
    }
}

//=========================================================================================
// AI Assistance
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub summary: String,
    pub key_points: Vec<String>,
    pub cached: bool,
    pub generated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub question: String,
    pub answer: String,
    pub document_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuggestedTag {
    pub tag: String,
    pub confidence: f32,
    pub created: bool,
}
