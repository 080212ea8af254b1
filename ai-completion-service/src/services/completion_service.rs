//! Completion service client with bounded status polling.
//!
//! Endpoints are derived from [`CompletionConfig::base_api`]:
//! - `POST {base}/hai/chat/completions`: create a completion request
//! - `GET  {base}/hai/chat/completions/{id}`: check its state
//!
//! The acknowledgment and every status check share one envelope:
//! `{"data": {"id": .., "attributes": {"state": "..", "response": ".."}}}`.
//! A request is polled at a fixed interval until its state is `completed`,
//! the service reports it `failed`, or the polling budget runs out.

use std::time::{Duration, Instant};

use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    config::completion_config::CompletionConfig,
    error_handler::{CompletionError, Result, make_snippet, validate_http_endpoint},
};

/// Lifecycle state of a completion request as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionState {
    Submitted,
    Pending,
    Completed,
    Failed,
}

impl CompletionState {
    fn from_wire(state: &str) -> Self {
        match state.trim().to_ascii_lowercase().as_str() {
            "completed" => Self::Completed,
            "failed" | "error" | "errored" => Self::Failed,
            "created" | "submitted" => Self::Submitted,
            _ => Self::Pending,
        }
    }
}

/// One outstanding call to the completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Id assigned by the service.
    pub id: String,
    pub state: CompletionState,
    /// Raw response text, present once the request is completed.
    pub response: Option<String>,
}

/// Thin client for the completion API.
///
/// Keeps a preconfigured `reqwest::Client` (timeout, `Accept` header) and the
/// polling policy. Holds no per-request state, so one instance can serve any
/// number of concurrent calls.
#[derive(Debug, Clone)]
pub struct CompletionService {
    client: reqwest::Client,
    cfg: CompletionConfig,
    url_completions: String,
}

impl CompletionService {
    /// Creates a new [`CompletionService`] from the given config.
    ///
    /// # Errors
    /// - [`CompletionError::Config`] if `cfg.base_api` is not an http(s) URL
    /// - [`CompletionError::Transport`] if the HTTP client cannot be built
    pub fn new(cfg: CompletionConfig) -> Result<Self> {
        let base = cfg.base_api.trim().trim_end_matches('/').to_string();
        validate_http_endpoint("H1_API_BASE", &base)?;

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .default_headers(headers)
            .build()?;

        let url_completions = format!("{base}/hai/chat/completions");

        info!(
            endpoint = %url_completions,
            poll_interval_ms = cfg.poll_interval.as_millis() as u64,
            max_poll_attempts = cfg.max_poll_attempts,
            "CompletionService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_completions,
        })
    }

    /// Submits one prompt for one report and waits for the finished response.
    ///
    /// Returns immediately when the acknowledgment already reports
    /// `completed`; otherwise waits [`CompletionConfig::poll_interval`] and
    /// re-checks, at most [`CompletionConfig::max_poll_attempts`] times.
    ///
    /// # Errors
    /// - [`CompletionError::InvalidRequest`] for an empty prompt or report id
    /// - [`CompletionError::Transport`] / [`CompletionError::HttpStatus`] /
    ///   [`CompletionError::Decode`] on the first failing HTTP exchange
    /// - [`CompletionError::Failed`] if the service marks the request failed
    /// - [`CompletionError::PollingExhausted`] when the budget runs out
    #[instrument(name = "completion", skip(self, prompt), fields(prompt_len = prompt.len()))]
    pub async fn complete(&self, prompt: &str, report_id: &str) -> Result<String> {
        let started = Instant::now();
        let mut request = self.submit(prompt, report_id).await?;

        let mut checks = 0u32;
        loop {
            match request.state {
                CompletionState::Completed => {
                    info!(
                        id = %request.id,
                        status_checks = checks,
                        latency_ms = started.elapsed().as_millis() as u64,
                        "completion request finished"
                    );
                    return request.response.ok_or_else(|| {
                        CompletionError::Decode(
                            "completed request carries no `data.attributes.response`".into(),
                        )
                    });
                }
                CompletionState::Failed => {
                    error!(id = %request.id, "service reported completion request as failed");
                    return Err(CompletionError::Failed { id: request.id });
                }
                CompletionState::Submitted | CompletionState::Pending => {}
            }

            if checks >= self.cfg.max_poll_attempts {
                warn!(
                    id = %request.id,
                    attempts = checks,
                    "polling budget exhausted before completion"
                );
                return Err(CompletionError::PollingExhausted {
                    id: request.id,
                    attempts: checks,
                });
            }

            debug!(id = %request.id, state = ?request.state, "waiting for completion");
            tokio::time::sleep(self.cfg.poll_interval).await;
            checks += 1;
            request = self.check_status(&request.id).await?;
        }
    }

    /// Issues the create-request call and returns the acknowledgment.
    ///
    /// # Errors
    /// See [`CompletionService::complete`].
    pub async fn submit(&self, prompt: &str, report_id: &str) -> Result<CompletionRequest> {
        if report_id.trim().is_empty() {
            return Err(CompletionError::InvalidRequest("report id must not be empty"));
        }
        if prompt.trim().is_empty() {
            return Err(CompletionError::InvalidRequest("prompt must not be empty"));
        }

        let body = CreateCompletionBody::new(prompt, report_id);
        debug!(
            url = %self.url_completions,
            report_id,
            body = %serde_json::to_string(&body).unwrap_or_default(),
            "POST completion request"
        );

        let resp = self
            .client
            .post(&self.url_completions)
            .basic_auth(&self.cfg.api_name, Some(&self.cfg.api_key))
            .json(&body)
            .send()
            .await?;

        let request = self.read_envelope(resp, &self.url_completions).await?;
        debug!(id = %request.id, state = ?request.state, "completion request acknowledged");
        Ok(request)
    }

    /// Issues one status check for a previously submitted request.
    ///
    /// # Errors
    /// See [`CompletionService::complete`].
    pub async fn check_status(&self, id: &str) -> Result<CompletionRequest> {
        let url = format!("{}/{}", self.url_completions, id);
        debug!(%url, "GET completion status");

        let resp = self
            .client
            .get(&url)
            .basic_auth(&self.cfg.api_name, Some(&self.cfg.api_key))
            .send()
            .await?;

        self.read_envelope(resp, &url).await
    }

    async fn read_envelope(&self, resp: reqwest::Response, url: &str) -> Result<CompletionRequest> {
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            let snippet = make_snippet(&text);
            error!(%status, %url, %snippet, "completion endpoint returned non-success status");
            return Err(CompletionError::HttpStatus {
                status,
                url: url.to_string(),
                snippet,
            });
        }

        debug!(%url, body = %text, "completion envelope received");

        let envelope: CompletionEnvelope = serde_json::from_str(&text).map_err(|e| {
            error!(error = %e, %url, "received non-JSON response from completion endpoint");
            CompletionError::Decode(format!("{e}; body: {}", make_snippet(&text)))
        })?;

        envelope.into_request()
    }
}

/* ===========================================================================
HTTP payloads
======================================================================== */

#[derive(Debug, Serialize)]
struct CreateCompletionBody<'a> {
    data: CreateCompletionData<'a>,
}

#[derive(Debug, Serialize)]
struct CreateCompletionData<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    attributes: CreateCompletionAttributes<'a>,
}

#[derive(Debug, Serialize)]
struct CreateCompletionAttributes<'a> {
    messages: Vec<ChatMessage<'a>>,
    report_ids: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

impl<'a> CreateCompletionBody<'a> {
    /// Exactly one user message and one report per request.
    fn new(prompt: &'a str, report_id: &'a str) -> Self {
        Self {
            data: CreateCompletionData {
                kind: "completion-request",
                attributes: CreateCompletionAttributes {
                    messages: vec![ChatMessage {
                        role: "user",
                        content: prompt,
                    }],
                    report_ids: vec![report_id],
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompletionEnvelope {
    data: Option<CompletionData>,
}

#[derive(Debug, Deserialize)]
struct CompletionData {
    #[serde(default)]
    id: Value,
    attributes: Option<CompletionAttributes>,
}

#[derive(Debug, Deserialize)]
struct CompletionAttributes {
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    response: Option<String>,
}

impl CompletionEnvelope {
    fn into_request(self) -> Result<CompletionRequest> {
        let data = self
            .data
            .ok_or_else(|| CompletionError::Decode("missing `data` in completion envelope".into()))?;
        let attributes = data.attributes.ok_or_else(|| {
            CompletionError::Decode("missing `data.attributes` in completion envelope".into())
        })?;

        let id = match data.id {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        };

        let state = attributes
            .state
            .as_deref()
            .map(CompletionState::from_wire)
            .unwrap_or(CompletionState::Pending);

        if id.is_empty() && state != CompletionState::Completed {
            return Err(CompletionError::Decode(
                "pending completion envelope carries no `data.id` to poll".into(),
            ));
        }

        Ok(CompletionRequest {
            id,
            state,
            response: attributes.response,
        })
    }
}
