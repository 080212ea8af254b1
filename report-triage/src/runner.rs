//! Batch driver: feeds report ids through triage and dispatch, one report at
//! a time, in ingestion order.
//!
//! A failing report is logged with its cause and counted; the batch moves on.
//! Only a failing listing page stops a run, since later pages cannot be
//! reached without it.

use tracing::{error, info, instrument};

use crate::actions::TriageSink;
use crate::console;
use crate::errors::{Result, TriageError};
use crate::platform::{PlatformClient, ReportFilter};
use crate::triage::{TriageOrchestrator, TriageResult};

/// Processed/failed counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
}

impl BatchSummary {
    fn record(&mut self, outcome: &Result<TriageResult>) {
        match outcome {
            Ok(_) => self.processed += 1,
            Err(_) => self.failed += 1,
        }
    }

    pub fn absorb(&mut self, other: BatchSummary) {
        self.processed += other.processed;
        self.failed += other.failed;
    }
}

#[derive(Debug, Clone)]
pub struct TriageRunner<S> {
    orchestrator: TriageOrchestrator,
    platform: PlatformClient,
    sink: S,
}

impl<S: TriageSink> TriageRunner<S> {
    pub fn new(orchestrator: TriageOrchestrator, platform: PlatformClient, sink: S) -> Self {
        Self {
            orchestrator,
            platform,
            sink,
        }
    }

    /// Triages one report and dispatches its result.
    ///
    /// # Errors
    /// Any [`TriageError`]; nothing is dispatched when triage fails.
    #[instrument(skip(self))]
    pub async fn process_report(&self, report_id: &str) -> Result<TriageResult> {
        console::progress(&format!("Sending report {report_id} to Hai..."));
        let result = self.orchestrator.triage(report_id).await?;
        console::triage_summary(&result);

        self.sink
            .dispatch(&result)
            .await
            .map_err(|source| TriageError::Action {
                report_id: report_id.to_string(),
                source,
            })?;
        Ok(result)
    }

    /// Triages ids as given, without fetching report details first.
    pub async fn process_ids(&self, ids: &[String]) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for (n, id) in ids.iter().enumerate() {
            console::progress(&format!("Processing report {} of {}", n + 1, ids.len()));
            let outcome = self.process_report(id).await;
            report_outcome(id, &outcome);
            summary.record(&outcome);
        }
        summary
    }

    /// Fetches, displays and triages each named report.
    pub async fn run_reports(&self, ids: &[String]) -> BatchSummary {
        console::progress("Retrieving specified reports");
        let mut summary = BatchSummary::default();

        for id in ids {
            let outcome = match self.platform.fetch_report(id).await {
                Ok(report) => {
                    console::report_details(&report);
                    self.process_report(&report.id).await
                }
                Err(e) => Err(e.into()),
            };
            report_outcome(id, &outcome);
            summary.record(&outcome);
            println!("{}", console::RULE);
        }

        finish(summary);
        summary
    }

    /// Pages through the listing and triages every report on every page.
    ///
    /// # Errors
    /// [`TriageError::Platform`] when a page cannot be fetched; counts for
    /// earlier pages are logged before returning.
    pub async fn run_listing(&self, filter: &ReportFilter) -> Result<BatchSummary> {
        console::progress("Retrieving all reports matching criteria");
        let mut summary = BatchSummary::default();
        let mut page_number = 1u32;

        loop {
            let page = match self.platform.list_reports(filter, page_number).await {
                Ok(page) => page,
                Err(e) => {
                    error!(page = page_number, error = %e, processed = summary.processed, failed = summary.failed, "listing failed");
                    return Err(e.into());
                }
            };
            println!("Results Page: {}", page.number);

            for report in &page.reports {
                console::report_details(report);
            }
            let ids: Vec<String> = page.reports.into_iter().map(|r| r.id).collect();
            summary.absorb(self.process_ids(&ids).await);

            if !page.has_next {
                console::progress("No further pages");
                break;
            }
            page_number += 1;
        }

        finish(summary);
        Ok(summary)
    }
}

fn report_outcome(report_id: &str, outcome: &Result<TriageResult>) {
    match outcome {
        Ok(_) => console::success(&format!("Report {report_id} triaged")),
        Err(e) => {
            error!(report_id, error = %e, "report failed");
            console::failure(&e.to_string());
        }
    }
}

fn finish(summary: BatchSummary) {
    info!(processed = summary.processed, failed = summary.failed, "batch finished");
    let line = match summary.processed {
        1 => "1 report has been successfully processed".to_string(),
        n => format!("{n} reports have been successfully processed"),
    };
    console::progress(&line);
    if summary.failed > 0 {
        console::warning(&format!("{} report(s) failed, see log for details", summary.failed));
    }
}
