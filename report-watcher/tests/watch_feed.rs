use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

use pretty_assertions::assert_eq;
use report_triage::BatchSummary;
use report_watcher::{ReportProcessor, watch};
use tokio::sync::{Notify, oneshot};

#[derive(Default)]
struct Collect {
    ids: Mutex<Vec<String>>,
    changed: Notify,
}

impl ReportProcessor for Collect {
    async fn process(&self, ids: &[String]) -> BatchSummary {
        self.ids.lock().unwrap().extend(ids.iter().cloned());
        self.changed.notify_one();
        BatchSummary {
            processed: ids.len(),
            failed: 0,
        }
    }
}

fn append(path: &std::path::Path, text: &str) {
    let mut f = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .unwrap();
    f.write_all(text.as_bytes()).unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn appended_ids_reach_the_processor_once() {
    let dir = tempfile::tempdir().unwrap();
    let feed = dir.path().join("report_ids.txt");
    append(&feed, "old-1\nold-2\n");

    let processor = Collect::default();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let run = async {
        watch(&feed, &processor, async {
            let _ = stop_rx.await;
        })
        .await
    };

    let drive = async {
        // Give the watcher time to register before writing.
        tokio::time::sleep(Duration::from_millis(300)).await;
        append(&feed, "101\n\n102\n");

        tokio::time::timeout(Duration::from_secs(10), async {
            loop {
                if processor.ids.lock().unwrap().len() >= 2 {
                    break;
                }
                processor.changed.notified().await;
            }
        })
        .await
        .expect("ids processed before timeout");

        let _ = stop_tx.send(());
    };

    let (summary, ()) = tokio::join!(run, drive);
    let summary = summary.unwrap();

    assert_eq!(*processor.ids.lock().unwrap(), vec!["101", "102"]);
    assert_eq!(summary.processed, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unreadable_feed_does_not_stop_the_watch() {
    let dir = tempfile::tempdir().unwrap();
    let feed = dir.path().join("report_ids.txt");

    let processor = Collect::default();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let run = async {
        watch(&feed, &processor, async {
            let _ = stop_rx.await;
        })
        .await
    };

    let drive = async {
        tokio::time::sleep(Duration::from_millis(300)).await;
        // A directory under the feed name cannot be read as text.
        std::fs::create_dir(&feed).unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        std::fs::remove_dir(&feed).unwrap();
        append(&feed, "7\n");

        tokio::time::timeout(Duration::from_secs(10), async {
            loop {
                if !processor.ids.lock().unwrap().is_empty() {
                    break;
                }
                processor.changed.notified().await;
            }
        })
        .await
        .expect("id processed before timeout");

        let _ = stop_tx.send(());
    };

    let (summary, ()) = tokio::join!(run, drive);
    let summary = summary.unwrap();

    assert_eq!(*processor.ids.lock().unwrap(), vec!["7"]);
    assert_eq!(summary.processed, 1);
}

/// Requests shutdown from inside the first `process` call.
struct StopAfterFirst {
    ids: Mutex<Vec<String>>,
    stop: Mutex<Option<oneshot::Sender<()>>>,
}

impl ReportProcessor for StopAfterFirst {
    async fn process(&self, ids: &[String]) -> BatchSummary {
        self.ids.lock().unwrap().extend(ids.iter().cloned());
        if let Some(tx) = self.stop.lock().unwrap().take() {
            let _ = tx.send(());
        }
        BatchSummary {
            processed: ids.len(),
            failed: 0,
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn shutdown_is_honoured_between_ids() {
    let dir = tempfile::tempdir().unwrap();
    let feed = dir.path().join("report_ids.txt");

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let processor = StopAfterFirst {
        ids: Mutex::new(Vec::new()),
        stop: Mutex::new(Some(stop_tx)),
    };

    let run = async {
        watch(&feed, &processor, async {
            let _ = stop_rx.await;
        })
        .await
    };

    let drive = async {
        tokio::time::sleep(Duration::from_millis(300)).await;
        append(&feed, "1\n2\n3\n");
    };

    let (summary, ()) = tokio::time::timeout(Duration::from_secs(10), async { tokio::join!(run, drive) })
        .await
        .expect("watcher stopped before timeout");
    let summary = summary.unwrap();

    assert_eq!(*processor.ids.lock().unwrap(), vec!["1"]);
    assert_eq!(summary.processed, 1);
}
