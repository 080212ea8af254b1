//! Concurrent fan-out of the three triage tasks for one report.
//!
//! Flow:
//! 1. Build the validity, complexity and ownership prompts.
//! 2. Submit all three to the completion service at once and await them
//!    together (`tokio::try_join!`). The first failure cancels the rest.
//! 3. Parse each raw response and normalise it into a prediction.
//!
//! Nothing is dispatched from here; the caller decides what to do with the
//! [`TriageResult`].

use std::time::Instant;

use ai_completion_service::CompletionService;
use serde_json::{Map, Value};
use tracing::{debug, error, info, instrument};

use crate::errors::{Result, TriageError};
use crate::parser::parse_response;
use crate::prompt::{OwnershipReferenceTable, PromptTask, TaskKind, build_prompts};
use crate::triage::{TriageResult, normalize};

/// Runs the three completion requests for a report and aggregates them.
///
/// Cheap to clone; the ownership table is loaded once per run and shared
/// read-only by every report.
#[derive(Debug, Clone)]
pub struct TriageOrchestrator {
    service: CompletionService,
    table: OwnershipReferenceTable,
}

impl TriageOrchestrator {
    pub fn new(service: CompletionService, table: OwnershipReferenceTable) -> Self {
        Self { service, table }
    }

    /// Produces a complete [`TriageResult`] for `report_id`.
    ///
    /// # Errors
    /// - [`TriageError::Completion`] if any of the three requests fails or
    ///   exhausts its polling budget
    /// - [`TriageError::Malformed`] if any completed response cannot be parsed
    ///
    /// Either way no partial result is returned.
    #[instrument(name = "triage", skip(self))]
    pub async fn triage(&self, report_id: &str) -> Result<TriageResult> {
        let started = Instant::now();
        let [validity, complexity, ownership] = build_prompts(report_id, &self.table);

        let (raw_validity, raw_complexity, raw_ownership) = tokio::try_join!(
            self.run(&validity),
            self.run(&complexity),
            self.run(&ownership),
        )?;

        info!(
            report_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "all completion requests finished"
        );

        let validity = parse(report_id, TaskKind::Validity, &raw_validity)?;
        let complexity = parse(report_id, TaskKind::Complexity, &raw_complexity)?;
        let ownership = parse(report_id, TaskKind::Ownership, &raw_ownership)?;

        Ok(TriageResult {
            report_id: report_id.to_string(),
            validity: normalize::validity(report_id, &validity),
            complexity: normalize::complexity(report_id, &complexity),
            ownership: normalize::ownership(report_id, &ownership),
        })
    }

    async fn run(&self, task: &PromptTask) -> Result<String> {
        debug!(report_id = %task.report_id, task = %task.kind, "submitting prompt");
        self.service
            .complete(&task.text, &task.report_id)
            .await
            .map_err(|source| TriageError::Completion {
                report_id: task.report_id.clone(),
                task: task.kind,
                source,
            })
    }
}

fn parse(report_id: &str, task: TaskKind, raw: &str) -> Result<Map<String, Value>> {
    parse_response(raw).map_err(|source| {
        error!(report_id, %task, raw, error = %source, "could not parse completion response");
        TriageError::Malformed {
            report_id: report_id.to_string(),
            task,
            source,
        }
    })
}
