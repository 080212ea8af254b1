//! Key validation and default filling for parsed predictions.
//!
//! A missing or unusable key never fails the report: labels fall back to
//! `Unknown`, scores to `0`, reasoning to a placeholder, and a warning is
//! logged naming the report, task and key.

use serde_json::{Map, Value};
use tracing::warn;

use crate::prompt::TaskKind;
use crate::triage::{CertaintyScore, OwnershipPrediction, TriagePrediction};

pub const UNKNOWN_LABEL: &str = "Unknown";
pub const NO_REASONING: &str = "No reasoning provided";

/// Validity keys: `predictedValidity`, `validityCertaintyScore`, `validityReasoning`.
pub fn validity(report_id: &str, map: &Map<String, Value>) -> TriagePrediction {
    let ctx = Ctx {
        report_id,
        task: TaskKind::Validity,
        map,
    };
    TriagePrediction {
        predicted_value: ctx.label("predictedValidity"),
        certainty_score: ctx.score("validityCertaintyScore"),
        reasoning: ctx.reasoning("validityReasoning"),
    }
}

/// Complexity keys: `predictedComplexity`, `complexityCertaintyScore`, `complexityReasoning`.
pub fn complexity(report_id: &str, map: &Map<String, Value>) -> TriagePrediction {
    let ctx = Ctx {
        report_id,
        task: TaskKind::Complexity,
        map,
    };
    TriagePrediction {
        predicted_value: ctx.label("predictedComplexity"),
        certainty_score: ctx.score("complexityCertaintyScore"),
        reasoning: ctx.reasoning("complexityReasoning"),
    }
}

/// Ownership keys: `productArea`, `squadOwner`, `ownershipCertaintyScore`, `ownershipReasoning`.
pub fn ownership(report_id: &str, map: &Map<String, Value>) -> OwnershipPrediction {
    let ctx = Ctx {
        report_id,
        task: TaskKind::Ownership,
        map,
    };
    OwnershipPrediction {
        product_area: ctx.label("productArea"),
        squad_owner: ctx.label("squadOwner"),
        certainty_score: ctx.score("ownershipCertaintyScore"),
        reasoning: ctx.reasoning("ownershipReasoning"),
    }
}

struct Ctx<'a> {
    report_id: &'a str,
    task: TaskKind,
    map: &'a Map<String, Value>,
}

impl Ctx<'_> {
    fn present(&self, key: &str) -> Option<&Value> {
        match self.map.get(key) {
            None | Some(Value::Null) => {
                warn!(
                    report_id = self.report_id,
                    task = %self.task,
                    key,
                    "prediction key missing, using default"
                );
                None
            }
            Some(v) => Some(v),
        }
    }

    fn text(&self, key: &str, default: &str) -> String {
        match self.present(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(Value::String(_)) => {
                warn!(report_id = self.report_id, task = %self.task, key, "prediction key empty, using default");
                default.to_string()
            }
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(other @ (Value::Array(_) | Value::Object(_))) => other.to_string(),
            Some(Value::Null) | None => default.to_string(),
        }
    }

    fn label(&self, key: &str) -> String {
        self.text(key, UNKNOWN_LABEL)
    }

    fn reasoning(&self, key: &str) -> String {
        self.text(key, NO_REASONING)
    }

    fn score(&self, key: &str) -> CertaintyScore {
        let parsed = match self.present(key) {
            None => return CertaintyScore::default(),
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
            Some(_) => None,
        };

        match parsed.filter(|v| v.is_finite()) {
            Some(v) => {
                if !(0.0..=100.0).contains(&v) {
                    warn!(report_id = self.report_id, task = %self.task, key, value = v, "certainty score outside 0..=100");
                }
                CertaintyScore::new(v)
            }
            None => {
                warn!(report_id = self.report_id, task = %self.task, key, "certainty score is not numeric, using 0");
                CertaintyScore::default()
            }
        }
    }
}
