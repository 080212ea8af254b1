use axum::{Json, http::StatusCode};
use serde_json::{Value, json};

use crate::core::http::response_envelope::ApiResponse;

/// GET /health
pub async fn health() -> (StatusCode, Json<ApiResponse<Value>>) {
    (
        StatusCode::OK,
        Json(ApiResponse::success(json!({ "status": "ok" }))),
    )
}
