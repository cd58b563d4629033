//! services/reader/src/app/state.rs
//!
//! Defines the client's shared service handles and its in-memory store.

use std::sync::Arc;

use auraread_core::ports::{
    AiService, AnnotationService, AuthService, DocumentService, PortResult, SessionStorage,
    SpeechService,
};
use tracing::warn;

use crate::adapters::{
    ApiClient, FileSessionStorage, HttpAiAdapter, HttpAnnotationAdapter, HttpAuthAdapter,
    HttpDocumentAdapter, HttpSpeechAdapter,
};
use crate::app::annotations::AnnotationsState;
use crate::app::auth::AuthState;
use crate::app::documents::DocumentsState;
use crate::config::Config;
use crate::error::ReaderError;

//=========================================================================================
// AppState (Service Handles)
//=========================================================================================

/// The shared service handles, created once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub storage: Arc<dyn SessionStorage>,
    pub auth: Arc<dyn AuthService>,
    pub documents: Arc<dyn DocumentService>,
    pub speech: Arc<dyn SpeechService>,
    pub annotations: Arc<dyn AnnotationService>,
    pub ai: Arc<dyn AiService>,
}

impl AppState {
    /// Wires the HTTP adapters and the file-backed session storage.
    pub fn from_config(config: Config) -> Result<Self, ReaderError> {
        let storage: Arc<dyn SessionStorage> = Arc::new(FileSessionStorage::new(&config.state_dir));
        Self::with_storage(config, storage)
    }

    /// Wires the HTTP adapters on top of an arbitrary session storage.
    pub fn with_storage(config: Config, storage: Arc<dyn SessionStorage>) -> Result<Self, ReaderError> {
        let client = ApiClient::new(&config, storage.clone())?;
        Ok(Self {
            config: Arc::new(config),
            storage,
            auth: Arc::new(HttpAuthAdapter::new(client.clone())),
            documents: Arc::new(HttpDocumentAdapter::new(client.clone())),
            speech: Arc::new(HttpSpeechAdapter::new(client.clone())),
            annotations: Arc::new(HttpAnnotationAdapter::new(client.clone())),
            ai: Arc::new(HttpAiAdapter::new(client)),
        })
    }
}

//=========================================================================================
// AppStore (Client-side State)
//=========================================================================================

/// The client-side store: one slice per concern, mutated only by the actions
/// defined in the sibling modules.
pub struct AppStore {
    pub(crate) services: AppState,
    pub auth: AuthState,
    pub documents: DocumentsState,
    pub annotations: AnnotationsState,
}

impl AppStore {
    /// Creates the store, restoring any persisted session.
    pub fn new(services: AppState) -> Self {
        let auth = AuthState::restore(services.storage.as_ref());
        Self {
            services,
            auth,
            documents: DocumentsState::default(),
            annotations: AnnotationsState::default(),
        }
    }

    pub fn services(&self) -> &AppState {
        &self.services
    }

    /// Forces a logout when an authenticated call was rejected, then hands the
    /// result back unchanged.
    pub(crate) fn check_auth<T>(&mut self, result: PortResult<T>) -> PortResult<T> {
        if let Err(e) = &result {
            if e.is_unauthorized() {
                warn!("Session rejected by the server; logging out");
                self.force_logout();
            }
        }
        result
    }
}
