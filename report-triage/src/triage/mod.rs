//! Triage data model and the orchestrator that produces it.

pub mod normalize;
pub mod orchestrator;

use std::fmt;

use serde::Serialize;

pub use orchestrator::TriageOrchestrator;

/// Certainty reported by the model, nominally in `0..=100`.
///
/// Stored as reported; out-of-range values are logged by the normaliser but
/// never clamped.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
#[serde(transparent)]
pub struct CertaintyScore(f64);

impl CertaintyScore {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for CertaintyScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 && self.0.abs() < 1e15 {
            write!(f, "{}", self.0 as i64)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Label prediction (validity or complexity).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriagePrediction {
    /// e.g. `Valid`/`Invalid` or `Low`/`Medium`/`High`.
    pub predicted_value: String,
    pub certainty_score: CertaintyScore,
    pub reasoning: String,
}

/// Ownership prediction resolved against the reference table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnershipPrediction {
    pub product_area: String,
    pub squad_owner: String,
    pub certainty_score: CertaintyScore,
    pub reasoning: String,
}

/// All three predictions for one report.
///
/// Only ever constructed with every prediction resolved; a failed task
/// aborts the report instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriageResult {
    pub report_id: String,
    pub validity: TriagePrediction,
    pub complexity: TriagePrediction,
    pub ownership: OwnershipPrediction,
}
