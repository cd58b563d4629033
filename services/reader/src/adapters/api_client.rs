//! services/reader/src/adapters/api_client.rs
//!
//! The shared HTTP plumbing used by every REST adapter: URL resolution against
//! the configured base, attaching the stored token, and turning non-2xx
//! responses into `PortError`s with a human-readable message.

use std::sync::Arc;
use std::time::Duration;

use auraread_core::ports::{PortError, PortResult, SessionStorage};
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::adapters::storage::TOKEN_KEY;
use crate::config::Config;

pub const UNKNOWN_ERROR: &str = "An unknown error occurred";

/// How the stored token is presented in the `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Token <key>`, used by the document, annotation and account endpoints.
    Token,
    /// `Bearer <key>`, used by the AI endpoints.
    Bearer,
    /// No header; login and registration must not send a stale token.
    Anonymous,
}

impl AuthScheme {
    fn header_value(self, token: &str) -> Option<String> {
        match self {
            AuthScheme::Token => Some(format!("Token {}", token)),
            AuthScheme::Bearer => Some(format!("Bearer {}", token)),
            AuthScheme::Anonymous => None,
        }
    }
}

/// A cheaply clonable REST client bound to one backend.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    storage: Arc<dyn SessionStorage>,
}

impl ApiClient {
    /// Creates a client for the backend described by `config`.
    pub fn new(config: &Config, storage: Arc<dyn SessionStorage>) -> Result<Self, reqwest::Error> {
        Self::with_base_url(config.api_url.clone(), config.request_timeout, storage)
    }

    pub fn with_base_url(
        base_url: Url,
        timeout: Duration,
        storage: Arc<dyn SessionStorage>,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            http,
            base_url,
            storage,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves `path` against the base URL. Paths starting with `/` are
    /// origin-relative.
    pub fn url(&self, path: &str) -> PortResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| PortError::Unexpected(format!("Invalid request path '{}': {}", path, e)))
    }

    /// Starts a request, attaching the stored token when there is one.
    pub fn request(&self, method: Method, path: &str, scheme: AuthScheme) -> PortResult<RequestBuilder> {
        let url = self.url(path)?;
        debug!("{} {}", method, url);
        let builder = self.http.request(method, url);
        if scheme == AuthScheme::Anonymous {
            return Ok(builder);
        }
        match self.storage.get_item(TOKEN_KEY)?.and_then(|t| scheme.header_value(&t)) {
            Some(value) => Ok(builder.header(header::AUTHORIZATION, value)),
            None => {
                debug!("No auth token available for request to {}", path);
                Ok(builder)
            }
        }
    }

    /// Sends a request and fails on any non-success status.
    pub async fn send(&self, builder: RequestBuilder) -> PortResult<Response> {
        let response = builder.send().await.map_err(|e| self.transport_error(e))?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(status_error(response).await)
        }
    }

    /// Sends a request and decodes a JSON body.
    pub async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> PortResult<T> {
        let response = self.send(builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to parse response: {}", e)))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> PortResult<T> {
        let builder = self.request(Method::GET, path, AuthScheme::Token)?;
        self.send_json(builder).await
    }

    pub async fn write_json<B, T>(&self, method: Method, path: &str, scheme: AuthScheme, body: &B) -> PortResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(method, path, scheme)?.json(body);
        self.send_json(builder).await
    }

    /// Sends a request whose response body is irrelevant.
    pub async fn send_empty(&self, method: Method, path: &str) -> PortResult<()> {
        let builder = self.request(method, path, AuthScheme::Token)?;
        self.send(builder).await.map(|_| ())
    }

    fn transport_error(&self, e: reqwest::Error) -> PortError {
        warn!("Request to {} failed: {}", self.base_url, e);
        if e.is_connect() {
            PortError::Unexpected(format!("Cannot connect to {}", self.base_url))
        } else if e.is_timeout() {
            PortError::Unexpected("The server took too long to respond".to_string())
        } else {
            PortError::Unexpected(format!("Network error: {}", e))
        }
    }
}

/// Converts a failed response into the matching `PortError` class.
pub async fn status_error(response: Response) -> PortError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        format!("Request failed with status {}", status)
    } else {
        error_message(&body)
    };
    warn!("Server responded {}: {}", status, message);
    match status {
        StatusCode::UNAUTHORIZED => PortError::Unauthorized(message),
        StatusCode::NOT_FOUND => PortError::NotFound(message),
        StatusCode::BAD_REQUEST => PortError::Validation(message),
        _ => PortError::Unexpected(message),
    }
}

/// Extracts the most useful message from an error body.
///
/// Looks at `detail`, `message` and `error` in that order, accepts a bare JSON
/// string, and flattens field-level validation errors. Non-JSON bodies are
/// returned as they are.
pub fn error_message(body: &str) -> String {
    let value = match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(_) => return body.trim().to_string(),
    };
    if let Value::String(s) = &value {
        return s.clone();
    }
    for key in ["detail", "message", "error"] {
        if let Some(found) = value.get(key).and_then(Value::as_str) {
            return found.to_string();
        }
    }
    if let Value::Object(fields) = &value {
        let parts: Vec<String> = fields
            .iter()
            .filter_map(|(field, v)| field_errors(v).map(|msg| format!("{}: {}", field, msg)))
            .collect();
        if !parts.is_empty() {
            return parts.join("; ");
        }
    }
    UNKNOWN_ERROR.to_string()
}

fn field_errors(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let msgs: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            (!msgs.is_empty()).then(|| msgs.join(" "))
        }
        _ => None,
    }
}
