//! Tails the report id feed written by the webhook and triages each new id.

pub mod cursor;
pub mod errors;
pub mod watcher;

pub use cursor::IngestionCursor;
pub use errors::{Result, WatchError};
pub use watcher::{ReportProcessor, watch};

pub const TARGET: &str = "report_watcher";
