//! Markdown body of the internal triage comment.

use crate::triage::TriageResult;

/// Renders the comment posted on a triaged report.
///
/// Section headings are matched by downstream tooling and must stay as they
/// are, including the `Complextity` spelling.
pub fn render_comment(result: &TriageResult) -> String {
    let v = &result.validity;
    let c = &result.complexity;
    let o = &result.ownership;

    format!(
        "# Hai has completed the triage process for this report.\n\
\n\
## Validity\n\
The predicted validity is {} and Hai is {}% sure about this. The reasoning behind it is as follows: {}.\n\
\n\
## Complextity\n\
The predicted complexity is {} and Hai is {}% sure about this. The reasoning behind it is as follows: {}.\n\
\n\
## Ownership\n\
The product area is {} and the squad owner is {}. Hai is {}% sure about the ownership. The reasoning behind it is as follows: {}",
        v.predicted_value,
        v.certainty_score,
        v.reasoning,
        c.predicted_value,
        c.certainty_score,
        c.reasoning,
        o.product_area,
        o.squad_owner,
        o.certainty_score,
        o.reasoning,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triage::{CertaintyScore, OwnershipPrediction, TriagePrediction};

    #[test]
    fn comment_carries_every_prediction() {
        let result = TriageResult {
            report_id: "42".into(),
            validity: TriagePrediction {
                predicted_value: "Valid".into(),
                certainty_score: CertaintyScore::new(91.0),
                reasoning: "clear PoC".into(),
            },
            complexity: TriagePrediction {
                predicted_value: "Low".into(),
                certainty_score: CertaintyScore::new(20.0),
                reasoning: "one request".into(),
            },
            ownership: OwnershipPrediction {
                product_area: "AreaX".into(),
                squad_owner: "SquadY".into(),
                certainty_score: CertaintyScore::new(77.0),
                reasoning: "login flow".into(),
            },
        };

        let body = render_comment(&result);
        assert!(body.starts_with("# Hai has completed the triage process for this report.\n\n## Validity\n"));
        assert!(body.contains(
            "The predicted validity is Valid and Hai is 91% sure about this. The reasoning behind it is as follows: clear PoC."
        ));
        assert!(body.contains("## Complextity\nThe predicted complexity is Low and Hai is 20% sure"));
        assert!(body.ends_with(
            "The product area is AreaX and the squad owner is SquadY. Hai is 77% sure about the ownership. The reasoning behind it is as follows: login flow"
        ));
    }
}
