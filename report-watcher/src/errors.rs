use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WatchError>;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("[Report Watcher] cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[Report Watcher] file watcher failed: {0}")]
    Notify(#[from] notify::Error),

    #[error("[Report Watcher] {0} has no parent directory to watch")]
    NoParent(PathBuf),

    #[error("[Report Watcher] event channel closed")]
    ChannelClosed,
}

impl WatchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WatchError::Io {
            path: path.into(),
            source,
        }
    }
}
