//! services/reader/src/adapters/annotations.rs
//!
//! This module contains the adapter for the backend's annotation endpoints.
//! It implements the `AnnotationService` port from the `core` crate.

use async_trait::async_trait;
use auraread_core::domain::{Annotation, NewAnnotation};
use auraread_core::ports::{AnnotationService, PortResult};
use reqwest::Method;

use crate::adapters::api_client::{ApiClient, AuthScheme};
use crate::adapters::records::{AnnotationPayload, AnnotationRecord};

/// An adapter that implements the `AnnotationService` port over the REST API.
#[derive(Clone)]
pub struct HttpAnnotationAdapter {
    client: ApiClient,
}

impl HttpAnnotationAdapter {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AnnotationService for HttpAnnotationAdapter {
    async fn list_annotations(&self, document_id: i64) -> PortResult<Vec<Annotation>> {
        let records: Vec<AnnotationRecord> = self
            .client
            .get_json(&format!("annotations/?document={}", document_id))
            .await?;
        Ok(records.into_iter().map(AnnotationRecord::to_domain).collect())
    }

    async fn create_annotation(&self, annotation: &NewAnnotation) -> PortResult<Annotation> {
        let body = AnnotationPayload::from_domain(annotation);
        let record: AnnotationRecord = self
            .client
            .write_json(Method::POST, "annotations/", AuthScheme::Token, &body)
            .await?;
        Ok(record.to_domain())
    }

    async fn update_annotation(&self, annotation_id: i64, annotation: &NewAnnotation) -> PortResult<Annotation> {
        let body = AnnotationPayload::from_domain(annotation);
        let record: AnnotationRecord = self
            .client
            .write_json(
                Method::PUT,
                &format!("annotations/{}/", annotation_id),
                AuthScheme::Token,
                &body,
            )
            .await?;
        Ok(record.to_domain())
    }

    async fn delete_annotation(&self, annotation_id: i64) -> PortResult<()> {
        self.client
            .send_empty(Method::DELETE, &format!("annotations/{}/", annotation_id))
            .await
    }
}
