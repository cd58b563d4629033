//! services/reader/src/adapters/ai.rs
//!
//! This module contains the adapter for the backend's AI endpoints
//! (summaries, question answering and tag suggestions). It implements the
//! `AiService` port from the `core` crate.
//!
//! These endpoints live under `/api/ai/` on the backend origin rather than
//! under the REST base, and they expect a `Bearer` authorization header.

use async_trait::async_trait;
use auraread_core::domain::{Answer, SuggestedTag, Summary};
use auraread_core::ports::{AiService, PortResult};
use reqwest::Method;
use tracing::info;

use crate::adapters::api_client::{ApiClient, AuthScheme};
use crate::adapters::records::{
    AnswerRecord, QuestionRequest, SummarizeRequest, SummaryRecord, TagsRecord,
};

pub const SUMMARIZE_PATH: &str = "/api/ai/summarize/";
pub const QUESTION_PATH: &str = "/api/ai/question/";
pub const TAGS_PATH: &str = "/api/ai/generate_tags/";

/// An adapter that implements the `AiService` port over the REST API.
#[derive(Clone)]
pub struct HttpAiAdapter {
    client: ApiClient,
}

impl HttpAiAdapter {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AiService for HttpAiAdapter {
    async fn summarize(&self, document_id: i64, text: &str) -> PortResult<Summary> {
        info!("Requesting summary for document {}", document_id);
        let body = SummarizeRequest { document_id, text };
        let record: SummaryRecord = self
            .client
            .write_json(Method::POST, SUMMARIZE_PATH, AuthScheme::Bearer, &body)
            .await?;
        Ok(record.to_domain())
    }

    async fn ask(&self, document_id: i64, question: &str, text: &str) -> PortResult<Answer> {
        info!("Asking a question about document {}", document_id);
        let body = QuestionRequest {
            document_id,
            question,
            text,
        };
        let record: AnswerRecord = self
            .client
            .write_json(Method::POST, QUESTION_PATH, AuthScheme::Bearer, &body)
            .await?;
        Ok(record.to_domain(question))
    }

    async fn generate_tags(&self, document_id: i64, text: &str) -> PortResult<Vec<SuggestedTag>> {
        let body = SummarizeRequest { document_id, text };
        let record: TagsRecord = self
            .client
            .write_json(Method::POST, TAGS_PATH, AuthScheme::Bearer, &body)
            .await?;
        Ok(record.to_domain())
    }
}
