use std::time::Duration;

/// Configuration for the completion client.
///
/// # Fields
///
/// - `base_api`: API root, e.g. `https://api.hackerone.com/v1`. The client
///   appends `/hai/chat/completions`.
/// - `api_name` / `api_key`: basic-auth credentials.
/// - `poll_interval`: fixed wait between status checks.
/// - `max_poll_attempts`: maximum number of status checks before giving up.
/// - `timeout_secs`: per-HTTP-request timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionConfig {
    pub base_api: String,
    pub api_name: String,
    pub api_key: String,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    pub timeout_secs: u64,
}

impl CompletionConfig {
    /// Default wait between status checks.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
    /// Default polling budget (~5 minutes with the default interval).
    pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 150;
    /// Default per-request timeout.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Builds a config with default polling and timeout settings.
    pub fn new(
        base_api: impl Into<String>,
        api_name: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            base_api: base_api.into(),
            api_name: api_name.into(),
            api_key: api_key.into(),
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            max_poll_attempts: Self::DEFAULT_MAX_POLL_ATTEMPTS,
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_poll_attempts(mut self, attempts: u32) -> Self {
        self.max_poll_attempts = attempts;
        self
    }
}
