//! services/reader/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use tracing::Level;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the REST backend; always ends with `/`.
    pub api_url: Url,
    pub log_level: Level,
    /// Directory holding the persisted session (the client's local storage).
    pub state_dir: PathBuf,
    pub request_timeout: Duration,
    pub tts_language: Option<String>,
    pub prefer_offline_tts: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to keep tests hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Backend ---
        let api_url_str = lookup("AURAREAD_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = parse_api_url(&api_url_str)
            .map_err(|e| ConfigError::InvalidValue("AURAREAD_API_URL".to_string(), e))?;

        let timeout_secs = match lookup("AURAREAD_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidValue("AURAREAD_TIMEOUT_SECS".to_string(), e.to_string())
            })?,
            None => 30,
        };

        // --- Logging ---
        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Local Session Storage ---
        let state_dir = lookup("AURAREAD_STATE_DIR")
            .map(PathBuf::from)
            .or_else(|| lookup("HOME").map(|home| PathBuf::from(home).join(".auraread")))
            .unwrap_or_else(|| PathBuf::from("./.auraread"));

        // --- Speech Defaults ---
        let tts_language = lookup("AURAREAD_TTS_LANGUAGE").filter(|l| !l.trim().is_empty());
        let prefer_offline_tts = match lookup("AURAREAD_PREFER_OFFLINE") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "AURAREAD_PREFER_OFFLINE".to_string(),
                    format!("'{}' is not true or false", raw),
                )
            })?,
            None => true,
        };

        Ok(Self {
            api_url,
            log_level,
            state_dir,
            request_timeout: Duration::from_secs(timeout_secs),
            tts_language,
            prefer_offline_tts,
        })
    }

    /// Replaces the backend URL, e.g. with a command-line override.
    pub fn with_api_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.api_url = parse_api_url(raw)
            .map_err(|e| ConfigError::InvalidValue("--api-url".to_string(), e))?;
        Ok(self)
    }
}

/// Parses a base URL and makes sure relative joins keep its last path segment.
pub fn parse_api_url(raw: &str) -> Result<Url, String> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    let url = Url::parse(&with_slash).map_err(|e| e.to_string())?;
    if url.cannot_be_a_base() {
        return Err(format!("'{}' cannot be used as a base URL", raw));
    }
    Ok(url)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
