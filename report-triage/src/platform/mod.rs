//! Report platform REST client (listing, fetch, comments, custom fields).
//!
//! Endpoints, relative to `H1_API_BASE`:
//! - GET  /reports                           (paged, filtered)
//! - GET  /reports/:id
//! - POST /reports/:id/activities            (internal comment)
//! - POST /reports/:id/custom_field_values   (one field per call)
//!
//! All calls use basic auth with the API name/key pair.

pub mod types;
pub use types::*;

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde_json::json;
use tracing::{debug, info, instrument};

use crate::errors::PlatformError;

type PResult<T> = std::result::Result<T, PlatformError>;

/// Connection settings for [`PlatformClient`].
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// API base, e.g. "https://api.hackerone.com/v1"
    pub base_api: String,
    pub api_name: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct PlatformClient {
    http: reqwest::Client,
    base_api: String,
    api_name: String,
    api_key: String,
}

impl PlatformClient {
    pub fn new(cfg: PlatformConfig) -> PResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .user_agent("hai-triage/0.1")
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_api: cfg.base_api.trim().trim_end_matches('/').to_string(),
            api_name: cfg.api_name,
            api_key: cfg.api_key,
        })
    }

    /// Fetches one page of reports matching `filter`.
    #[instrument(skip(self, filter), fields(program = %filter.program))]
    pub async fn list_reports(&self, filter: &ReportFilter, page: u32) -> PResult<ReportPage> {
        let url = format!("{}/reports", self.base_api);
        let env: ListEnvelope = self
            .http
            .get(&url)
            .basic_auth(&self.api_name, Some(&self.api_key))
            .query(&filter.query(page))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let has_next = env
            .links
            .and_then(|l| l.next)
            .is_some_and(|n| !n.is_null());
        let reports: Vec<ReportSummary> = env
            .data
            .into_iter()
            .filter_map(ReportResource::into_summary)
            .collect();

        info!(page, count = reports.len(), has_next, "report page fetched");
        Ok(ReportPage {
            number: page,
            reports,
            has_next,
        })
    }

    /// Fetches a single report by id.
    pub async fn fetch_report(&self, report_id: &str) -> PResult<ReportSummary> {
        let url = format!("{}/reports/{}", self.base_api, report_id);
        let env: SingleEnvelope = self
            .http
            .get(&url)
            .basic_auth(&self.api_name, Some(&self.api_key))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        env.data.into_summary().ok_or_else(|| {
            PlatformError::InvalidResponse(format!("report {report_id} has no usable id"))
        })
    }

    /// Posts an internal (private) comment on a report.
    pub async fn post_internal_comment(&self, report_id: &str, message: &str) -> PResult<()> {
        let url = format!("{}/reports/{}/activities", self.base_api, report_id);
        let body = json!({
            "data": {
                "type": "activity-comment",
                "attributes": {
                    "message": message,
                    "internal": true,
                    "attachment_ids": []
                }
            }
        });
        self.post(&url, &body).await
    }

    /// Sets one custom field value on a report.
    pub async fn update_custom_field(&self, report_id: &str, field_id: &str, value: &str) -> PResult<()> {
        let url = format!("{}/reports/{}/custom_field_values", self.base_api, report_id);
        let body = json!({
            "data": {
                "attributes": {
                    "custom_field_attribute_id": field_id,
                    "value": value
                }
            }
        });
        self.post(&url, &body).await
    }

    async fn post(&self, url: &str, body: &serde_json::Value) -> PResult<()> {
        debug!(%url, %body, "POST");
        let resp = self
            .http
            .post(url)
            .basic_auth(&self.api_name, Some(&self.api_key))
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        debug!(status = resp.status().as_u16(), "platform accepted request");
        Ok(())
    }
}
