//! Line cursor over the append-only report id feed.
//!
//! The cursor counts newline-terminated lines. A trailing line without its
//! newline is still being written and is picked up by a later `advance`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::errors::{Result, WatchError};

/// Number of feed lines already handed out, guarded by a lock held across
/// read, slice and store so overlapping notifications never see the same
/// line twice.
#[derive(Debug)]
pub struct IngestionCursor {
    path: PathBuf,
    processed: Mutex<usize>,
}

impl IngestionCursor {
    /// Starts at the file's current line count; existing lines are skipped.
    /// A missing file counts as empty.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let start = complete_lines(&read_feed(&path).await?).len();
        debug!(path = %path.display(), start, "ingestion cursor opened");
        Ok(Self::at(path, start))
    }

    pub fn at(path: impl Into<PathBuf>, processed: usize) -> Self {
        Self {
            path: path.into(),
            processed: Mutex::new(processed),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn position(&self) -> usize {
        *self.processed.lock().await
    }

    /// Returns ids on lines appended since the last call, trimmed, in file
    /// order. Blank lines are counted but not returned.
    ///
    /// A file shorter than the cursor was truncated or rotated: the cursor
    /// drops to the new length and nothing is returned.
    pub async fn advance(&self) -> Result<Vec<String>> {
        let mut processed = self.processed.lock().await;
        let text = read_feed(&self.path).await?;
        let lines = complete_lines(&text);

        if lines.len() < *processed {
            warn!(
                path = %self.path.display(),
                was = *processed,
                now = lines.len(),
                "feed file shrank, resetting cursor"
            );
            *processed = lines.len();
            return Ok(Vec::new());
        }

        let fresh: Vec<String> = lines[*processed..]
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        *processed = lines.len();
        Ok(fresh)
    }
}

async fn read_feed(path: &Path) -> Result<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(WatchError::io(path, e)),
    }
}

fn complete_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n')
        .filter(|l| l.ends_with('\n'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use std::sync::Arc;

    fn append(path: &Path, text: &str) {
        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .unwrap();
        f.write_all(text.as_bytes()).unwrap();
    }

    #[tokio::test]
    async fn existing_lines_are_skipped_and_appends_are_returned() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.txt");
        append(&path, "1\n2\n");

        let cursor = IngestionCursor::open(&path).await.unwrap();
        assert_eq!(cursor.position().await, 2);
        assert!(cursor.advance().await.unwrap().is_empty());

        append(&path, " 3 \n\n4\n");
        assert_eq!(cursor.advance().await.unwrap(), vec!["3", "4"]);
        assert_eq!(cursor.position().await, 5);
    }

    #[tokio::test]
    async fn partial_line_waits_for_its_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.txt");
        let cursor = IngestionCursor::open(&path).await.unwrap();
        assert_eq!(cursor.position().await, 0);

        append(&path, "10\n11");
        assert_eq!(cursor.advance().await.unwrap(), vec!["10"]);
        append(&path, "\n");
        assert_eq!(cursor.advance().await.unwrap(), vec!["11"]);
    }

    #[tokio::test]
    async fn truncation_resets_without_replay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.txt");
        append(&path, "1\n2\n3\n");
        let cursor = IngestionCursor::open(&path).await.unwrap();

        std::fs::write(&path, "9\n").unwrap();
        assert!(cursor.advance().await.unwrap().is_empty());
        assert_eq!(cursor.position().await, 1);

        append(&path, "10\n");
        assert_eq!(cursor.advance().await.unwrap(), vec!["10"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_advances_hand_out_each_line_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.txt");
        let cursor = Arc::new(IngestionCursor::open(&path).await.unwrap());

        let expected: Vec<String> = (0..50).map(|n| n.to_string()).collect();
        append(&path, &expected.iter().map(|n| format!("{n}\n")).collect::<String>());

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cursor = cursor.clone();
                tokio::spawn(async move { cursor.advance().await.unwrap() })
            })
            .collect();

        let mut seen = Vec::new();
        for t in tasks {
            seen.extend(t.await.unwrap());
        }
        seen.sort_by_key(|s| s.parse::<u32>().unwrap());
        assert_eq!(seen, expected);
        assert_eq!(cursor.position().await, 50);
    }
}
