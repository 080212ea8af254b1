//! Completion config loaded strictly from environment variables.
//!
//! # Environment variables
//!
//! - `H1_API_BASE`            = API root (default `https://api.hackerone.com/v1`)
//! - `API_NAME`               = basic-auth user (mandatory)
//! - `API_KEY`                = basic-auth token (mandatory)
//! - `HAI_POLL_INTERVAL_SECS` = wait between status checks (default 2)
//! - `HAI_MAX_POLL_ATTEMPTS`  = status-check budget (default 150)
//! - `HAI_TIMEOUT_SECS`       = per-request timeout (default 30)

use std::time::Duration;

use crate::{
    config::completion_config::CompletionConfig,
    error_handler::{ConfigError, env_opt_u64, env_or, must_env, validate_http_endpoint},
};

/// Default API root of the report platform.
pub const DEFAULT_API_BASE: &str = "https://api.hackerone.com/v1";

/// Constructs a [`CompletionConfig`] from the environment.
///
/// # Errors
///
/// - [`ConfigError::MissingVar`] if credentials are missing
/// - [`ConfigError::InvalidNumber`] if a numeric variable does not parse
/// - [`ConfigError::InvalidFormat`] if `H1_API_BASE` is not an http(s) URL
pub fn config_from_env() -> Result<CompletionConfig, ConfigError> {
    let base_api = env_or("H1_API_BASE", DEFAULT_API_BASE);
    validate_http_endpoint("H1_API_BASE", &base_api)?;

    let api_name = must_env("API_NAME")?;
    let api_key = must_env("API_KEY")?;

    let mut cfg = CompletionConfig::new(base_api.trim_end_matches('/'), api_name, api_key);

    if let Some(secs) = env_opt_u64("HAI_POLL_INTERVAL_SECS")? {
        cfg.poll_interval = Duration::from_secs(secs);
    }
    if let Some(n) = env_opt_u64("HAI_MAX_POLL_ATTEMPTS")? {
        cfg.max_poll_attempts = u32::try_from(n).map_err(|_| ConfigError::InvalidNumber {
            var: "HAI_MAX_POLL_ATTEMPTS",
            reason: "expected u32",
        })?;
    }
    if let Some(secs) = env_opt_u64("HAI_TIMEOUT_SECS")? {
        cfg.timeout_secs = secs;
    }

    Ok(cfg)
}
