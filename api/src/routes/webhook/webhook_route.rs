use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::{
    core::{
        app_state::AppState,
        http::response_envelope::ApiResponse,
        signature::{self, SIGNATURE_HEADER},
    },
    error_handler::{AppError, AppResult},
    routes::webhook::webhook_request::{WebhookPayload, is_feed_safe},
};

/// POST /webhook
///
/// Verifies `X-H1-Signature` over the raw body, then appends the delivered
/// report id to the watch file for the watcher to pick up.
pub async fn webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Response> {
    let header = headers
        .get(SIGNATURE_HEADER)
        .ok_or(AppError::MissingSignature)?
        .to_str()
        .map_err(|_| AppError::BadSignature)?;

    if !signature::verify(state.webhook_secret.as_bytes(), &body, header) {
        warn!(len = body.len(), "webhook signature mismatch");
        return Err(AppError::BadSignature);
    }

    let payload: WebhookPayload =
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(e.to_string()))?;

    match payload.report_id() {
        Some(id) if !is_feed_safe(&id) => {
            warn!(report_id = ?id, "rejecting report id with whitespace or control characters");
            return Err(AppError::BadRequest(format!("invalid report id {id:?}")));
        }
        Some(id) => {
            append_id(&state, &id).await?;
            info!(report_id = %id, "report id queued for triage");
        }
        None => debug!("signed delivery without data.report.id"),
    }

    Ok(ApiResponse::ok().into_response_with_status(StatusCode::OK))
}

async fn append_id(state: &AppState, id: &str) -> AppResult<()> {
    let _guard = state.feed_lock.lock().await;

    if let Some(dir) = state.watch_file.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await.map_err(AppError::Feed)?;
    }
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&state.watch_file)
        .await
        .map_err(AppError::Feed)?;
    file.write_all(format!("{id}\n").as_bytes())
        .await
        .map_err(AppError::Feed)?;
    file.flush().await.map_err(AppError::Feed)
}
