use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::core::http::response_envelope::ApiResponse;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("missing required environment variable: {0}")]
    MissingEnv(&'static str),

    // --- IO / network / server ---
    #[error("failed to bind listener on {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request ---
    #[error("Missing 'X-H1-Signature' header")]
    MissingSignature,

    #[error("Incorrect signature")]
    BadSignature,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("could not record report id")]
    Feed(#[source] std::io::Error),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingSignature | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::BadSignature => StatusCode::UNAUTHORIZED,
            AppError::MissingEnv(_)
            | AppError::Bind { .. }
            | AppError::Server(_)
            | AppError::Feed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        ApiResponse::error(self.to_string()).into_response_with_status(status)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;
