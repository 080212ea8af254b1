//! Crate-wide error hierarchy for report-triage.
//!
//! Goals:
//! - Single root `TriageError` for all public functions.
//! - Every per-report failure carries the report id (and the task kind when
//!   one of the three predictions failed) so the batch driver can log it and
//!   move on.
//! - Platform errors are status-aware (401→Unauthorized, 429→RateLimited, 5xx→Server).

use ai_completion_service::CompletionError;
use thiserror::Error;

use crate::prompt::TaskKind;

/// Convenient alias for crate-wide results.
pub type Result<T> = std::result::Result<T, TriageError>;

/// Root error type for the report-triage crate.
#[derive(Debug, Error)]
pub enum TriageError {
    /// One of the three completion calls failed; the report is aborted.
    #[error("report {report_id}: {task} completion failed: {source}")]
    Completion {
        report_id: String,
        task: TaskKind,
        #[source]
        source: CompletionError,
    },

    /// A completed response could not be turned into a JSON object.
    #[error("report {report_id}: {task} response is malformed: {source}")]
    Malformed {
        report_id: String,
        task: TaskKind,
        #[source]
        source: MalformedResponseError,
    },

    /// Report platform (listing / fetch) failure.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// A side effect (comment, field update, CSV row) failed.
    #[error("report {report_id}: action failed: {source}")]
    Action {
        report_id: String,
        #[source]
        source: ActionError,
    },

    /// Missing or invalid configuration; fatal for the whole run.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failure to recover a JSON object from a completion response.
#[derive(Debug, Error)]
pub enum MalformedResponseError {
    /// A backslash escape could not be decoded.
    #[error("invalid escape sequence at byte {offset}: {detail}")]
    Escape { offset: usize, detail: &'static str },

    /// Unescaped bytes are not valid UTF-8.
    #[error("unescaped text is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Strict JSON parsing failed (truncated output, stray braces, ...).
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Parsed JSON is valid but not an object.
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Report platform error used by [`crate::platform::PlatformClient`].
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Unauthorized (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden (HTTP 403).
    #[error("forbidden")]
    Forbidden,

    /// Not found (HTTP 404).
    #[error("not found")]
    NotFound,

    /// Rate limited (HTTP 429).
    #[error("rate limited")]
    RateLimited,

    /// Gateway/Server error (HTTP 5xx).
    #[error("server error: status {0}")]
    Server(u16),

    /// Other non-2xx status.
    #[error("http status error: {0}")]
    HttpStatus(u16),

    /// Timeout at transport level.
    #[error("timeout")]
    Timeout,

    /// Network/transport failure without status (DNS/connect/reset).
    #[error("network error: {0}")]
    Network(String),

    /// Unexpected/invalid shape of platform response.
    #[error("invalid platform response: {0}")]
    InvalidResponse(String),
}

/// Failure of one dispatcher side effect.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Comment or custom-field call failed.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// CSV row could not be written.
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),

    /// File I/O failed (creating the CSV directory, flushing).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration and setup errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing or empty.
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// Ownership reference table could not be read.
    #[error("cannot read ownership reference table {path}: {source}")]
    OwnershipTable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Completion client configuration failed.
    #[error(transparent)]
    Completion(#[from] ai_completion_service::ConfigError),
}

// ===== Mapping from reqwest::Error into PlatformError =====

impl From<reqwest::Error> for PlatformError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return PlatformError::Timeout;
        }

        if let Some(status) = e.status() {
            return PlatformError::from_status(status.as_u16());
        }

        if e.is_decode() {
            return PlatformError::InvalidResponse(e.to_string());
        }

        PlatformError::Network(e.to_string())
    }
}

impl PlatformError {
    /// Maps a non-success HTTP status code onto a variant.
    pub fn from_status(code: u16) -> Self {
        match code {
            401 => PlatformError::Unauthorized,
            403 => PlatformError::Forbidden,
            404 => PlatformError::NotFound,
            429 => PlatformError::RateLimited,
            500..=599 => PlatformError::Server(code),
            _ => PlatformError::HttpStatus(code),
        }
    }
}
