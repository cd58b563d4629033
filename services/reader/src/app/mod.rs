//! services/reader/src/app/mod.rs
//!
//! The client-side store and its slices.

pub mod annotations;
pub mod auth;
pub mod documents;
pub mod state;

pub use annotations::{AnnotationDraft, AnnotationsState};
pub use auth::AuthState;
pub use documents::DocumentsState;
pub use state::{AppState, AppStore};
