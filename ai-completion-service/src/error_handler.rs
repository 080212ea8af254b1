//! Unified error handling for `ai-completion-service`.
//!
//! This module exposes a single top-level error type [`CompletionError`] for the
//! whole library and keeps configuration problems in the nested [`ConfigError`].
//! Small helpers for reading/validating environment variables return the
//! unified [`Result<T>`] alias.
//!
//! All messages include the suffix `[AI Completion Service]` to simplify
//! attribution in logs.

use reqwest::StatusCode;
use thiserror::Error;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, CompletionError>;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `ai-completion-service` crate.
///
/// Every variant is terminal for the call that produced it: the client never
/// retries a failed submission or status check on its own.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Configuration/validation errors (startup).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Underlying HTTP transport error (connect, reset, timeout, body read).
    #[error("[AI Completion Service] transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream returned a non-successful HTTP status.
    #[error("[AI Completion Service] HTTP {status} from {url}: {snippet}")]
    HttpStatus {
        /// HTTP status code.
        status: StatusCode,
        /// Request URL.
        url: String,
        /// Short snippet of the response body (trimmed).
        snippet: String,
    },

    /// Response body was not JSON or did not carry the completion envelope.
    #[error("[AI Completion Service] decode error: {0}")]
    Decode(String),

    /// The request was rejected locally before anything was sent.
    #[error("[AI Completion Service] invalid request: {0}")]
    InvalidRequest(&'static str),

    /// The service reported the request as failed.
    #[error("[AI Completion Service] completion request {id} failed on the service side")]
    Failed {
        /// Id assigned by the service.
        id: String,
    },

    /// The request never reached `completed` within the polling budget.
    #[error("[AI Completion Service] completion request {id} not completed after {attempts} status checks")]
    PollingExhausted {
        /// Id assigned by the service.
        id: String,
        /// Number of status checks issued.
        attempts: u32,
    },
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for environment/config-driven setup.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing or empty.
    #[error("[AI Completion Service] missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// A number failed to parse (intervals, attempt counts, timeouts).
    #[error("[AI Completion Service] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `HAI_POLL_INTERVAL_SECS`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u64`).
        reason: &'static str,
    },

    /// Value had the wrong format (e.g., invalid URL).
    #[error("[AI Completion Service] invalid format in {var}: {reason}")]
    InvalidFormat {
        /// Variable name (e.g., `H1_API_BASE`).
        var: &'static str,
        /// Explanation (e.g., `must start with http:// or https://`).
        reason: &'static str,
    },
}

/* ------------------------------------------------------------------------- */
/* Env helpers                                                               */
/* ------------------------------------------------------------------------- */

/// Fetches a required, non-empty environment variable.
///
/// # Errors
/// Returns [`ConfigError::MissingVar`] if the variable is absent or empty.
pub fn must_env(name: &'static str) -> std::result::Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

/// Returns the variable's value, or `default` when it is unset or empty.
pub fn env_or(name: &str, default: &str) -> String {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}

/// Parses an optional `u64` from env (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`ConfigError::InvalidNumber`] if the variable is set but not a
/// valid `u64`.
pub fn env_opt_u64(name: &'static str) -> std::result::Result<Option<u64>, ConfigError> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => {
            v.trim()
                .parse::<u64>()
                .map(Some)
                .map_err(|_| ConfigError::InvalidNumber {
                    var: name,
                    reason: "expected u64",
                })
        }
        _ => Ok(None),
    }
}

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
///
/// # Errors
/// Returns [`ConfigError::InvalidFormat`] when the scheme is missing.
pub fn validate_http_endpoint(
    var: &'static str,
    value: &str,
) -> std::result::Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        })
    }
}

/// Trims a response body down to a short single-line snippet for error messages.
pub fn make_snippet(text: &str) -> String {
    const MAX: usize = 240;
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= MAX {
        flat
    } else {
        let cut: String = flat.chars().take(MAX).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_is_flattened_and_capped() {
        let long = "a\n b ".repeat(200);
        let s = make_snippet(&long);
        assert!(!s.contains('\n'));
        assert!(s.ends_with('…'));
        assert_eq!(s.chars().count(), 241);
        assert_eq!(make_snippet("  short\tbody "), "short body");
    }

    #[test]
    fn endpoint_scheme_is_checked() {
        assert!(validate_http_endpoint("X", "https://api.example.com").is_ok());
        assert!(matches!(
            validate_http_endpoint("X", "api.example.com"),
            Err(ConfigError::InvalidFormat { var: "X", .. })
        ));
    }
}
