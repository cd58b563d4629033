//! crates/auraread_core/src/upload.rs
//!
//! Client-side checks run on a file before it is uploaded. Nothing here
//! touches the network, so a rejected file never produces a request.

use bytes::Bytes;

use crate::domain::DocumentUpload;
use crate::ports::{PortError, PortResult};

pub const PDF_MIME_TYPE: &str = "application/pdf";

/// A file picked by the user, before validation.
#[derive(Debug, Clone)]
pub struct PickedFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

/// Title suggested for a file: its name without the last extension.
pub fn default_title(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => String::new(),
    }
}

/// Validates a picked file and title and turns them into an upload.
///
/// An empty title falls back to [`default_title`]. Non-PDF files, empty files
/// and uploads left without any title are rejected.
pub fn prepare_upload(file: Option<PickedFile>, title: Option<&str>) -> PortResult<DocumentUpload> {
    let file = file.ok_or_else(|| PortError::Validation("Please select a PDF file".to_string()))?;
    if file.mime_type != PDF_MIME_TYPE {
        return Err(PortError::Validation("Please select a PDF file".to_string()));
    }
    if file.bytes.is_empty() {
        return Err(PortError::Validation("The selected file is empty".to_string()));
    }

    let title = title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| default_title(&file.file_name));
    if title.trim().is_empty() {
        return Err(PortError::Validation("Document title is required".to_string()));
    }

    Ok(DocumentUpload {
        title,
        file_name: file.file_name,
        mime_type: file.mime_type,
        bytes: file.bytes,
    })
}
