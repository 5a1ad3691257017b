//! Error types for the digest pipeline.
//!
//! - `SourceError`: fetch/parse failures, recovered inside each adapter
//! - `NotificationError`: delivery failures, fatal to the run
//! - `ConfigError`: bad profile/sources files or environment overrides
//! - `PipelineError`: what `Pipeline::run` can return

use thiserror::Error;

use crate::types::SourceStatus;

#[derive(Debug, Error)]
pub enum SourceError {
    /// Network or timeout failure before a response arrived
    #[error("fetch failed ({status}): {message}")]
    Fetch { status: SourceStatus, message: String },

    /// Source answered with a non-success status code
    #[error("HTTP {0}")]
    HttpStatus(u16),

    /// Markup did not have the expected shape
    #[error("parse error: {0}")]
    Parse(String),

    /// A card is missing a required field
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

impl SourceError {
    pub fn fetch(status: SourceStatus, message: impl Into<String>) -> Self {
        Self::Fetch { status, message: message.into() }
    }

    /// Status to report for a source that failed with this error
    pub fn status(&self) -> SourceStatus {
        match self {
            SourceError::Fetch { status, .. } => *status,
            SourceError::HttpStatus(code) => SourceStatus::from_http_code(*code),
            SourceError::Parse(_) | SourceError::MissingField(_) => SourceStatus::ParseError,
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        let status = if err.is_timeout() {
            SourceStatus::Timeout
        } else if let Some(code) = err.status() {
            SourceStatus::from_http_code(code.as_u16())
        } else if err.is_connect() || err.is_request() || err.is_redirect() {
            SourceStatus::NetworkError
        } else {
            SourceStatus::Unknown
        };
        Self::Fetch { status, message: err.to_string() }
    }
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("no notification channel configured")]
    NotConfigured,

    #[error("invalid email address: {0}")]
    Address(String),

    #[error("SMTP delivery failed: {0}")]
    Smtp(String),

    #[error("webhook {channel} returned HTTP {code}")]
    Webhook { channel: &'static str, code: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("digest was not delivered: {0}")]
    Notification(#[from] NotificationError),
}
