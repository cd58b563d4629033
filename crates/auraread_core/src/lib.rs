pub mod anchoring;
pub mod domain;
pub mod layout;
pub mod library;
pub mod ports;
pub mod read_aloud;
pub mod text;
pub mod upload;

pub use anchoring::{anchor_selection, Anchor, AnchorStrategy, Selection};
pub use domain::{
    Annotation, Answer, AuthSession, Credentials, Document, DocumentPatch, DocumentUpload,
    NewAnnotation, Registration, SpeechAudio, SpeechRequest, SuggestedTag, Summary, User, Voice,
    VoiceCatalog,
};
pub use ports::{
    AiService, AnnotationService, AuthService, DocumentService, PortError, PortResult,
    SessionStorage, SpeechService,
};
pub use text::TextRange;
