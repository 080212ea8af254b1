//! Asynchronous AI completion client.
//!
//! The remote service accepts a completion request, acknowledges it with an
//! id and a `state`, and finishes it in the background. [`CompletionService`]
//! hides that protocol behind a single call that resolves to the raw response
//! text or a [`CompletionError`].

pub mod config;
pub mod error_handler;
pub mod services;
pub mod telemetry;

pub use config::completion_config::CompletionConfig;
pub use error_handler::{CompletionError, ConfigError, Result};
pub use services::completion_service::{CompletionRequest, CompletionService, CompletionState};
