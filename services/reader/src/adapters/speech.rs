//! services/reader/src/adapters/speech.rs
//!
//! This module contains the adapter for the backend's text-to-speech endpoints.
//! It implements the `SpeechService` port from the `core` crate.
//!
//! Synthesis happens server-side; the adapter only ships the text and the
//! engine preferences and hands the audio blob back untouched.

use async_trait::async_trait;
use auraread_core::domain::{SpeechAudio, SpeechRequest, VoiceCatalog};
use auraread_core::ports::{PortError, PortResult, SpeechService};
use reqwest::header;
use reqwest::multipart::Form;
use reqwest::Method;
use tracing::debug;

use crate::adapters::api_client::{ApiClient, AuthScheme};
use crate::adapters::records::VoiceCatalogRecord;

const DEFAULT_AUDIO_TYPE: &str = "audio/mpeg";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `SpeechService` port over the REST API.
#[derive(Clone)]
pub struct HttpSpeechAdapter {
    client: ApiClient,
}

impl HttpSpeechAdapter {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

fn speech_form(request: &SpeechRequest) -> Form {
    let mut form = Form::new().text("text", request.text.clone());
    if let Some(language) = &request.language {
        form = form.text("language", language.clone());
    }
    form = form.text(
        "prefer_offline",
        if request.prefer_offline { "true" } else { "false" },
    );
    if let Some(voice) = &request.voice_id {
        form = form.text("voice_name", voice.clone());
    }
    form
}

//=========================================================================================
// `SpeechService` Trait Implementation
//=========================================================================================

#[async_trait]
impl SpeechService for HttpSpeechAdapter {
    async fn synthesize(&self, document_id: i64, request: &SpeechRequest) -> PortResult<SpeechAudio> {
        let builder = self
            .client
            .request(
                Method::POST,
                &format!("documents/{}/tts/", document_id),
                AuthScheme::Token,
            )?
            .header(header::ACCEPT, "audio/*")
            .multipart(speech_form(request));
        let response = self.client.send(builder).await?;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_AUDIO_TYPE)
            .to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to read audio: {}", e)))?;
        if bytes.is_empty() {
            return Err(PortError::Unexpected("The server returned no audio".to_string()));
        }
        debug!("Received {} bytes of {}", bytes.len(), content_type);

        Ok(SpeechAudio { bytes, content_type })
    }

    async fn available_voices(&self) -> PortResult<VoiceCatalog> {
        let record: VoiceCatalogRecord = self.client.get_json("documents/available_voices/").await?;
        Ok(record.to_domain())
    }
}
