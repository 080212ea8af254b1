//! Filesystem watch loop over the report id feed.
//!
//! `notify` delivers events on its own thread; they are forwarded into a
//! tokio channel and consumed by a single async loop, so batches are
//! processed one after another in append order.

use std::future::Future;
use std::path::{Path, PathBuf};

use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use report_triage::{BatchSummary, TriageRunner, TriageSink};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cursor::IngestionCursor;
use crate::errors::{Result, WatchError};

/// Handles freshly ingested report ids. The watcher passes one id per call
/// and checks for shutdown in between.
pub trait ReportProcessor: Send + Sync {
    fn process(&self, ids: &[String]) -> impl Future<Output = BatchSummary> + Send;
}

impl<S: TriageSink> ReportProcessor for TriageRunner<S> {
    async fn process(&self, ids: &[String]) -> BatchSummary {
        self.process_ids(ids).await
    }
}

/// Watches `feed` until `shutdown` resolves, passing appended ids to
/// `processor`. Lines present when the watch starts are never processed.
/// An id already handed to `processor` runs to completion before shutdown
/// is honoured; ids behind it in the same batch are logged and dropped.
///
/// The parent directory is watched rather than the file itself so the feed
/// may be created or replaced after startup.
///
/// # Errors
/// [`WatchError`] if the watcher cannot be set up or its channel closes.
/// A feed read failure is logged and the loop waits for the next change.
pub async fn watch<P, F>(feed: &Path, processor: &P, shutdown: F) -> Result<BatchSummary>
where
    P: ReportProcessor,
    F: Future<Output = ()>,
{
    let dir = feed
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| WatchError::io(&dir, e))?;
    let Some(file_name) = feed.file_name().map(|n| n.to_os_string()) else {
        return Err(WatchError::NoParent(feed.to_path_buf()));
    };

    let cursor = IngestionCursor::open(feed).await?;
    let (tx, mut rx) = mpsc::channel::<notify::Result<Event>>(256);
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = tx.blocking_send(res);
        },
        NotifyConfig::default(),
    )?;
    watcher.watch(&dir, RecursiveMode::NonRecursive)?;

    info!(
        feed = %feed.display(),
        skipped = cursor.position().await,
        "watching report id feed"
    );

    let mut total = BatchSummary::default();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!(processed = total.processed, failed = total.failed, "watcher stopping");
                return Ok(total);
            }
            event = rx.recv() => {
                let event = match event {
                    None => return Err(WatchError::ChannelClosed),
                    Some(Ok(event)) => event,
                    Some(Err(e)) => {
                        warn!(error = %e, "file watcher reported an error");
                        continue;
                    }
                };
                if !touches(&event, &file_name) {
                    continue;
                }
                debug!(kind = ?event.kind, "feed changed");

                let ids = match cursor.advance().await {
                    Ok(ids) => ids,
                    Err(e) => {
                        warn!(error = %e, "could not read feed, waiting for the next change");
                        continue;
                    }
                };
                if ids.is_empty() {
                    continue;
                }
                info!(count = ids.len(), "new report ids in feed");

                for (i, id) in ids.iter().enumerate() {
                    let stop = tokio::select! {
                        biased;
                        _ = &mut shutdown => true,
                        _ = std::future::ready(()) => false,
                    };
                    if stop {
                        warn!(unprocessed = ?&ids[i..], "shutdown requested mid-batch");
                        info!(processed = total.processed, failed = total.failed, "watcher stopping");
                        return Ok(total);
                    }
                    total.absorb(processor.process(std::slice::from_ref(id)).await);
                }
            }
        }
    }
}

fn touches(event: &Event, file_name: &std::ffi::OsStr) -> bool {
    matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name))
}
