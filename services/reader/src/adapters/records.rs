//! services/reader/src/adapters/records.rs
//!
//! "Impure" wire records mirroring the REST backend's JSON. Each response
//! record converts into its core domain type with `to_domain`.

use auraread_core::domain::{
    Annotation, Answer, AuthSession, Document, DocumentPatch, NewAnnotation, SuggestedTag,
    Summary, User, Voice, VoiceCatalog, DEFAULT_HIGHLIGHT_COLOR, DEFAULT_LANGUAGE,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//=========================================================================================
// Auth
//=========================================================================================

#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
}

/// The user object, both as sent by the backend and as kept in local storage.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserRecord {
    pub fn from_domain(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }

    pub fn to_domain(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email.filter(|e| !e.is_empty()),
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct AuthResponseRecord {
    user: UserRecord,
    token: String,
}

impl AuthResponseRecord {
    pub fn to_domain(self) -> AuthSession {
        AuthSession {
            token: self.token,
            user: self.user.to_domain(),
        }
    }
}

//=========================================================================================
// Documents
//=========================================================================================

#[derive(Deserialize)]
pub(crate) struct DocumentRecord {
    id: i64,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    page_count: Option<u32>,
    uploaded_at: DateTime<Utc>,
    #[serde(default)]
    file_url: Option<String>,
}

impl DocumentRecord {
    pub fn to_domain(self) -> Document {
        Document {
            id: self.id,
            title: self.title,
            description: self.description.filter(|d| !d.is_empty()),
            language: self
                .language
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            page_count: self.page_count,
            uploaded_at: self.uploaded_at,
            file_url: self.file_url,
        }
    }
}

#[derive(Serialize)]
pub(crate) struct DocumentPatchRecord<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

impl<'a> DocumentPatchRecord<'a> {
    pub fn from_domain(patch: &'a DocumentPatch) -> Self {
        Self {
            title: patch.title.as_deref(),
            language: patch.language.as_deref(),
            description: patch.description.as_deref(),
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct ExtractedTextRecord {
    pub text: String,
}

#[derive(Deserialize)]
pub(crate) struct VoiceRecord {
    id: String,
    name: String,
    #[serde(default)]
    language: String,
}

impl VoiceRecord {
    fn to_domain(self) -> Voice {
        Voice {
            id: self.id,
            name: self.name,
            language: self.language,
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct VoiceCatalogRecord {
    #[serde(default)]
    windows_sapi: Vec<VoiceRecord>,
    #[serde(default)]
    pyttsx3: Vec<VoiceRecord>,
}

impl VoiceCatalogRecord {
    pub fn to_domain(self) -> VoiceCatalog {
        VoiceCatalog {
            windows_sapi: self.windows_sapi.into_iter().map(VoiceRecord::to_domain).collect(),
            pyttsx3: self.pyttsx3.into_iter().map(VoiceRecord::to_domain).collect(),
        }
    }
}

//=========================================================================================
// Annotations
//=========================================================================================

fn default_color() -> String {
    DEFAULT_HIGHLIGHT_COLOR.to_string()
}

fn default_page() -> u32 {
    1
}

#[derive(Deserialize)]
pub(crate) struct AnnotationRecord {
    id: i64,
    document: i64,
    start_offset: usize,
    end_offset: usize,
    selected_text: String,
    #[serde(default)]
    note: Option<String>,
    #[serde(default = "default_color")]
    highlight_color: String,
    #[serde(default = "default_page")]
    page_number: u32,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl AnnotationRecord {
    pub fn to_domain(self) -> Annotation {
        Annotation {
            id: self.id,
            document_id: self.document,
            selected_text: self.selected_text,
            start_offset: self.start_offset,
            end_offset: self.end_offset,
            note: self.note.filter(|n| !n.is_empty()),
            highlight_color: self.highlight_color,
            page_number: self.page_number,
            created_at: self.created_at,
        }
    }
}

#[derive(Serialize)]
pub(crate) struct AnnotationPayload<'a> {
    document: i64,
    start_offset: usize,
    end_offset: usize,
    selected_text: &'a str,
    note: &'a str,
    highlight_color: &'a str,
    page_number: u32,
}

impl<'a> AnnotationPayload<'a> {
    pub fn from_domain(a: &'a NewAnnotation) -> Self {
        Self {
            document: a.document_id,
            start_offset: a.start_offset,
            end_offset: a.end_offset,
            selected_text: &a.selected_text,
            note: a.note.as_deref().unwrap_or(""),
            highlight_color: &a.highlight_color,
            page_number: a.page_number,
        }
    }
}

//=========================================================================================
// AI
//=========================================================================================

#[derive(Serialize)]
pub(crate) struct SummarizeRequest<'a> {
    pub document_id: i64,
    pub text: &'a str,
}

#[derive(Serialize)]
pub(crate) struct QuestionRequest<'a> {
    pub document_id: i64,
    pub question: &'a str,
    pub text: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct SummaryRecord {
    summary: String,
    #[serde(default)]
    key_points: Vec<String>,
    #[serde(default)]
    cached: bool,
    #[serde(default)]
    generated_at: Option<DateTime<Utc>>,
}

impl SummaryRecord {
    pub fn to_domain(self) -> Summary {
        Summary {
            summary: self.summary,
            key_points: self.key_points,
            cached: self.cached,
            generated_at: self.generated_at,
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct AnswerRecord {
    #[serde(default)]
    question: String,
    answer: String,
    #[serde(default)]
    document_title: Option<String>,
}

impl AnswerRecord {
    pub fn to_domain(self, asked: &str) -> Answer {
        Answer {
            question: if self.question.is_empty() {
                asked.to_string()
            } else {
                self.question
            },
            answer: self.answer,
            document_title: self.document_title,
        }
    }
}

#[derive(Deserialize)]
struct TagRecord {
    tag: String,
    confidence: f32,
    #[serde(default)]
    created: bool,
}

#[derive(Deserialize)]
pub(crate) struct TagsRecord {
    tags: Vec<TagRecord>,
}

impl TagsRecord {
    pub fn to_domain(self) -> Vec<SuggestedTag> {
        self.tags
            .into_iter()
            .map(|t| SuggestedTag {
                tag: t.tag,
                confidence: t.confidence,
                created: t.created,
            })
            .collect()
    }
}
