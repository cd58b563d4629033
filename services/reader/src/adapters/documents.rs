//! services/reader/src/adapters/documents.rs
//!
//! This module contains the adapter for the backend's document endpoints.
//! It implements the `DocumentService` port from the `core` crate.

use async_trait::async_trait;
use auraread_core::domain::{Document, DocumentPatch, DocumentUpload};
use auraread_core::ports::{DocumentService, PortError, PortResult};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use tracing::info;

use crate::adapters::api_client::{ApiClient, AuthScheme};
use crate::adapters::records::{DocumentPatchRecord, DocumentRecord, ExtractedTextRecord};

/// An adapter that implements the `DocumentService` port over the REST API.
#[derive(Clone)]
pub struct HttpDocumentAdapter {
    client: ApiClient,
}

impl HttpDocumentAdapter {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

fn upload_form(upload: DocumentUpload) -> PortResult<Form> {
    let file = Part::bytes(upload.bytes.to_vec())
        .file_name(upload.file_name)
        .mime_str(&upload.mime_type)
        .map_err(|e| PortError::Validation(format!("Invalid file type: {}", e)))?;
    Ok(Form::new().text("title", upload.title).part("file", file))
}

#[async_trait]
impl DocumentService for HttpDocumentAdapter {
    async fn list_documents(&self) -> PortResult<Vec<Document>> {
        let records: Vec<DocumentRecord> = self.client.get_json("documents/").await?;
        Ok(records.into_iter().map(DocumentRecord::to_domain).collect())
    }

    async fn get_document(&self, document_id: i64) -> PortResult<Document> {
        let record: DocumentRecord = self
            .client
            .get_json(&format!("documents/{}/", document_id))
            .await?;
        Ok(record.to_domain())
    }

    async fn upload_document(&self, upload: DocumentUpload) -> PortResult<Document> {
        info!("Uploading '{}' ({} bytes)", upload.file_name, upload.bytes.len());
        let form = upload_form(upload)?;
        let builder = self
            .client
            .request(Method::POST, "documents/", AuthScheme::Token)?
            .multipart(form);
        let record: DocumentRecord = self.client.send_json(builder).await?;
        Ok(record.to_domain())
    }

    async fn delete_document(&self, document_id: i64) -> PortResult<()> {
        self.client
            .send_empty(Method::DELETE, &format!("documents/{}/", document_id))
            .await
    }

    async fn update_document(&self, document_id: i64, patch: &DocumentPatch) -> PortResult<Document> {
        let body = DocumentPatchRecord::from_domain(patch);
        let record: DocumentRecord = self
            .client
            .write_json(
                Method::PATCH,
                &format!("documents/{}/", document_id),
                AuthScheme::Token,
                &body,
            )
            .await?;
        Ok(record.to_domain())
    }

    async fn extract_text(&self, document_id: i64) -> PortResult<String> {
        let record: ExtractedTextRecord = self
            .client
            .get_json(&format!("documents/{}/extract_text/", document_id))
            .await?;
        Ok(record.text)
    }
}
