//! services/reader/src/app/annotations.rs
//!
//! The annotations slice: highlights and notes on the current document.

use auraread_core::anchoring::{anchor_selection, Selection};
use auraread_core::domain::{Annotation, NewAnnotation, DEFAULT_HIGHLIGHT_COLOR};
use auraread_core::ports::{PortError, PortResult};
use tracing::{debug, info, warn};

use crate::app::state::AppStore;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationsState {
    pub annotations: Vec<Annotation>,
    pub error: Option<String>,
}

/// What the user entered alongside a selection.
#[derive(Debug, Clone, Default)]
pub struct AnnotationDraft {
    pub note: Option<String>,
    pub highlight_color: Option<String>,
    pub page_number: Option<u32>,
}

impl AppStore {
    fn settle_annotations<T>(&mut self, result: PortResult<T>) -> PortResult<T> {
        let result = self.check_auth(result);
        if let Err(e) = &result {
            self.annotations.error = Some(e.message().to_string());
        }
        result
    }

    pub async fn fetch_annotations(&mut self, document_id: i64) -> PortResult<&[Annotation]> {
        self.annotations.error = None;
        let result = self.services.annotations.list_annotations(document_id).await;
        let annotations = self.settle_annotations(result)?;
        debug!("Fetched {} annotations for document {}", annotations.len(), document_id);
        self.annotations.annotations = annotations;
        Ok(&self.annotations.annotations)
    }

    /// Anchors a selection in `full_text` and saves it as an annotation.
    ///
    /// Returns `Ok(None)` when the selection cannot be located. The selection
    /// is dropped with a warning and nothing is sent to the server.
    pub async fn annotate_selection(
        &mut self,
        document_id: i64,
        full_text: &str,
        selection: &Selection,
        draft: AnnotationDraft,
    ) -> PortResult<Option<Annotation>> {
        self.annotations.error = None;
        let Some(anchor) = anchor_selection(full_text, selection) else {
            warn!(
                "Could not locate selection ({} chars) in document {}; annotation dropped",
                selection.text.chars().count(),
                document_id
            );
            return Ok(None);
        };
        debug!("Anchored selection at {:?} using {:?}", anchor.range, anchor.strategy);

        let new = NewAnnotation {
            document_id,
            selected_text: selection.text.clone(),
            start_offset: anchor.range.start,
            end_offset: anchor.range.end,
            note: draft.note.filter(|n| !n.trim().is_empty()),
            highlight_color: draft
                .highlight_color
                .unwrap_or_else(|| DEFAULT_HIGHLIGHT_COLOR.to_string()),
            page_number: draft.page_number.unwrap_or(1),
        };
        self.create_annotation(&new).await.map(Some)
    }

    pub async fn create_annotation(&mut self, annotation: &NewAnnotation) -> PortResult<Annotation> {
        self.annotations.error = None;
        let result = self.services.annotations.create_annotation(annotation).await;
        let created = self.settle_annotations(result)?;
        info!("Created annotation {} on document {}", created.id, created.document_id);
        self.annotations.annotations.push(created.clone());
        Ok(created)
    }

    /// Changes the note and/or colour of a loaded annotation. `None` leaves a
    /// field as it is; an empty note clears it.
    pub async fn edit_annotation(
        &mut self,
        annotation_id: i64,
        note: Option<String>,
        highlight_color: Option<String>,
    ) -> PortResult<Annotation> {
        self.annotations.error = None;
        let existing = self
            .annotations
            .annotations
            .iter()
            .find(|a| a.id == annotation_id)
            .map(NewAnnotation::from);
        let Some(mut payload) = existing else {
            return self.settle_annotations(Err(PortError::NotFound(format!(
                "Annotation {} is not loaded",
                annotation_id
            ))));
        };
        if let Some(note) = note {
            payload.note = Some(note).filter(|n| !n.trim().is_empty());
        }
        if let Some(color) = highlight_color {
            payload.highlight_color = color;
        }
        self.update_annotation(annotation_id, &payload).await
    }

    pub async fn update_annotation(&mut self, annotation_id: i64, annotation: &NewAnnotation) -> PortResult<Annotation> {
        self.annotations.error = None;
        let result = self
            .services
            .annotations
            .update_annotation(annotation_id, annotation)
            .await;
        let updated = self.settle_annotations(result)?;
        if let Some(slot) = self.annotations.annotations.iter_mut().find(|a| a.id == updated.id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    pub async fn delete_annotation(&mut self, annotation_id: i64) -> PortResult<()> {
        self.annotations.error = None;
        let result = self.services.annotations.delete_annotation(annotation_id).await;
        self.settle_annotations(result)?;
        self.annotations.annotations.retain(|a| a.id != annotation_id);
        Ok(())
    }

    pub fn clear_annotations(&mut self) {
        self.annotations.annotations.clear();
    }
}
