//! crates/auraread_core/src/ports.rs
//!
//! Defines the service contracts (traits) the reader client depends on.
//! These traits form the boundary of the hexagonal architecture: the store and
//! viewer only ever talk to these ports, never to HTTP or the filesystem.

use async_trait::async_trait;

use crate::domain::{
    Annotation, Answer, AuthSession, Credentials, Document, DocumentPatch, DocumentUpload,
    NewAnnotation, Registration, SpeechAudio, SpeechRequest, SuggestedTag, Summary, User,
    VoiceCatalog,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
///
/// Failures are classified as validation problems (bad input, rejected before
/// or by the server), authentication failures, missing items, or the
/// network/server catch-all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unexpected(String),
}

impl PortError {
    /// The human-readable message shown to the user.
    pub fn message(&self) -> &str {
        match self {
            PortError::NotFound(m)
            | PortError::Unauthorized(m)
            | PortError::Validation(m)
            | PortError::Unexpected(m) => m,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, PortError::Unauthorized(_))
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> PortResult<AuthSession>;

    async fn register(&self, registration: &Registration) -> PortResult<AuthSession>;

    async fn logout(&self) -> PortResult<()>;

    async fn current_user(&self) -> PortResult<User>;
}

#[async_trait]
pub trait DocumentService: Send + Sync {
    async fn list_documents(&self) -> PortResult<Vec<Document>>;

    async fn get_document(&self, document_id: i64) -> PortResult<Document>;

    async fn upload_document(&self, upload: DocumentUpload) -> PortResult<Document>;

    async fn delete_document(&self, document_id: i64) -> PortResult<()>;

    async fn update_document(&self, document_id: i64, patch: &DocumentPatch)
        -> PortResult<Document>;

    /// Returns the plain text the backend extracted from the document's PDF.
    async fn extract_text(&self, document_id: i64) -> PortResult<String>;
}

#[async_trait]
pub trait SpeechService: Send + Sync {
    /// Synthesizes speech for a piece of a document's text.
    async fn synthesize(&self, document_id: i64, request: &SpeechRequest)
        -> PortResult<SpeechAudio>;

    async fn available_voices(&self) -> PortResult<VoiceCatalog>;
}

#[async_trait]
pub trait AnnotationService: Send + Sync {
    async fn list_annotations(&self, document_id: i64) -> PortResult<Vec<Annotation>>;

    async fn create_annotation(&self, annotation: &NewAnnotation) -> PortResult<Annotation>;

    async fn update_annotation(
        &self,
        annotation_id: i64,
        annotation: &NewAnnotation,
    ) -> PortResult<Annotation>;

    async fn delete_annotation(&self, annotation_id: i64) -> PortResult<()>;
}

#[async_trait]
pub trait AiService: Send + Sync {
    async fn summarize(&self, document_id: i64, text: &str) -> PortResult<Summary>;

    async fn ask(&self, document_id: i64, question: &str, text: &str) -> PortResult<Answer>;

    async fn generate_tags(&self, document_id: i64, text: &str) -> PortResult<Vec<SuggestedTag>>;
}

/// A string key/value store that outlives a single process, the client's
/// equivalent of browser local storage.
pub trait SessionStorage: Send + Sync {
    fn get_item(&self, key: &str) -> PortResult<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> PortResult<()>;

    fn remove_item(&self, key: &str) -> PortResult<()>;
}
