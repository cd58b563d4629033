//! services/reader/src/app/documents.rs
//!
//! The documents slice: the user's library, the document being viewed and its
//! extracted text.

use auraread_core::domain::{Document, DocumentPatch};
use auraread_core::library::{filter_documents, sort_documents, SortKey};
use auraread_core::ports::PortResult;
use auraread_core::upload::{prepare_upload, PickedFile};
use tracing::{debug, info};

use crate::app::state::AppStore;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentsState {
    pub documents: Vec<Document>,
    pub current_document: Option<Document>,
    /// Text of `current_document`, once extracted.
    pub extracted_text: Option<String>,
    pub error: Option<String>,
}

impl DocumentsState {
    /// The library as shown in the list: filtered by `search`, then ordered.
    pub fn visible(&self, sort: SortKey, search: &str) -> Vec<Document> {
        let mut docs: Vec<Document> = filter_documents(&self.documents, search)
            .into_iter()
            .cloned()
            .collect();
        sort_documents(&mut docs, sort);
        docs
    }

    fn replace(&mut self, updated: &Document) {
        if let Some(slot) = self.documents.iter_mut().find(|d| d.id == updated.id) {
            *slot = updated.clone();
        }
        if self.current_document.as_ref().is_some_and(|d| d.id == updated.id) {
            self.current_document = Some(updated.clone());
        }
    }
}

impl AppStore {
    fn settle_documents<T>(&mut self, result: PortResult<T>) -> PortResult<T> {
        let result = self.check_auth(result);
        if let Err(e) = &result {
            self.documents.error = Some(e.message().to_string());
        }
        result
    }

    pub async fn fetch_documents(&mut self) -> PortResult<&[Document]> {
        self.documents.error = None;
        let result = self.services.documents.list_documents().await;
        let documents = self.settle_documents(result)?;
        debug!("Fetched {} documents", documents.len());
        self.documents.documents = documents;
        Ok(&self.documents.documents)
    }

    /// Loads a document and makes it current. Any previously extracted text
    /// belongs to the old document and is dropped.
    pub async fn fetch_document(&mut self, document_id: i64) -> PortResult<Document> {
        self.documents.error = None;
        let result = self.services.documents.get_document(document_id).await;
        let document = self.settle_documents(result)?;
        self.documents.current_document = Some(document.clone());
        self.documents.extracted_text = None;
        Ok(document)
    }

    pub async fn extract_text(&mut self, document_id: i64) -> PortResult<String> {
        self.documents.error = None;
        let result = self.services.documents.extract_text(document_id).await;
        let text = self.settle_documents(result)?;
        debug!("Extracted {} bytes of text for document {}", text.len(), document_id);
        self.documents.extracted_text = Some(text.clone());
        Ok(text)
    }

    /// Validates the file locally and uploads it. A rejected file never
    /// reaches the network.
    pub async fn upload_document(&mut self, file: Option<PickedFile>, title: Option<&str>) -> PortResult<Document> {
        self.documents.error = None;
        let upload = match prepare_upload(file, title) {
            Ok(upload) => upload,
            Err(e) => return self.settle_documents(Err(e)),
        };
        let result = self.services.documents.upload_document(upload).await;
        let document = self.settle_documents(result)?;
        info!("Uploaded document {} '{}'", document.id, document.title);
        self.documents.documents.push(document.clone());
        Ok(document)
    }

    pub async fn delete_document(&mut self, document_id: i64) -> PortResult<()> {
        self.documents.error = None;
        let result = self.services.documents.delete_document(document_id).await;
        self.settle_documents(result)?;
        self.documents.documents.retain(|d| d.id != document_id);
        if self.documents.current_document.as_ref().is_some_and(|d| d.id == document_id) {
            self.clear_current_document();
        }
        info!("Deleted document {}", document_id);
        Ok(())
    }

    pub async fn update_document(&mut self, document_id: i64, patch: &DocumentPatch) -> PortResult<Document> {
        self.documents.error = None;
        let result = self.services.documents.update_document(document_id, patch).await;
        let document = self.settle_documents(result)?;
        self.documents.replace(&document);
        Ok(document)
    }

    pub fn set_current_document(&mut self, document: Document) {
        self.documents.current_document = Some(document);
    }

    pub fn clear_current_document(&mut self) {
        self.documents.current_document = None;
        self.documents.extracted_text = None;
    }
}
