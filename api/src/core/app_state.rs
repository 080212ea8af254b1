use std::path::PathBuf;

use tokio::sync::Mutex;

use crate::error_handler::AppError;

pub const DEFAULT_API_ADDRESS: &str = "0.0.0.0:8000";
pub const DEFAULT_WATCH_FILE: &str = "./data/report_ids.txt";

/// Shared state for all HTTP handlers.
#[derive(Debug)]
pub struct AppState {
    /// Shared secret used to sign webhook deliveries.
    pub webhook_secret: String,
    /// Report id feed tailed by the watcher.
    pub watch_file: PathBuf,
    /// Serialises appends to `watch_file`.
    pub feed_lock: Mutex<()>,
}

impl AppState {
    pub fn new(webhook_secret: impl Into<String>, watch_file: impl Into<PathBuf>) -> Self {
        Self {
            webhook_secret: webhook_secret.into(),
            watch_file: watch_file.into(),
            feed_lock: Mutex::new(()),
        }
    }

    /// Loads `WEBHOOK_SECRET` (required) and `WATCH_FILE`.
    pub fn from_env() -> Result<Self, AppError> {
        let secret = std::env::var("WEBHOOK_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or(AppError::MissingEnv("WEBHOOK_SECRET"))?;
        let watch_file = std::env::var("WATCH_FILE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_WATCH_FILE.to_string());
        Ok(Self::new(secret, watch_file))
    }
}

/// Listen address from `API_ADDRESS`, defaulting to all interfaces on 8000.
pub fn api_address() -> String {
    std::env::var("API_ADDRESS")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_ADDRESS.to_string())
}
