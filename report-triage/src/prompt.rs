//! Prompt builders for the three triage tasks.
//!
//! Prompt wording is fixed; only the report id and, for ownership, the
//! reference table are interpolated.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::errors::ConfigError;

/// The three predictions requested per report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TaskKind {
    Validity,
    Complexity,
    Ownership,
}

impl TaskKind {
    pub const ALL: [TaskKind; 3] = [TaskKind::Validity, TaskKind::Complexity, TaskKind::Ownership];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::Validity => "validity",
            TaskKind::Complexity => "complexity",
            TaskKind::Ownership => "ownership",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rendered prompt for one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTask {
    pub kind: TaskKind,
    pub report_id: String,
    pub text: String,
}

/// Product area → squad owner mapping used by the ownership prompt.
///
/// Rows are kept verbatim (trimmed, blank lines dropped), header included,
/// in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnershipReferenceTable {
    rows: Vec<String>,
}

impl OwnershipReferenceTable {
    pub fn from_rows<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(Into::into)
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .collect(),
        }
    }

    pub fn parse(text: &str) -> Self {
        Self::from_rows(text.lines())
    }

    /// Loads the table once per run.
    ///
    /// # Errors
    /// [`ConfigError::OwnershipTable`] when the file cannot be read; callers
    /// treat this as fatal before any report is processed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::OwnershipTable {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Rows rendered as a JSON list of strings for embedding in the prompt.
    fn render(&self) -> String {
        serde_json::to_string(&self.rows).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Builds exactly three prompts (validity, complexity, ownership) for `report_id`.
pub fn build_prompts(report_id: &str, table: &OwnershipReferenceTable) -> [PromptTask; 3] {
    TaskKind::ALL.map(|kind| PromptTask {
        kind,
        report_id: report_id.to_string(),
        text: render(kind, report_id, table),
    })
}

const CLOSING: &str = "Please approach the problem methodically and ensure that your reasoning for the decision is clearly outlined. Even if certain information is lacking, use your judgment to make an educated guess to facilitate a streamlined assessment process. Now, take a deep breath and work on this problem step by step. Good luck!";

fn render(kind: TaskKind, report_id: &str, table: &OwnershipReferenceTable) -> String {
    match kind {
        TaskKind::Validity => format!(
            "Based on the provided information your task is to evaluate the validity of the security report with ID {report_id}. \
When assessing validity evaluate if the report is complete, correct, relevant per policy, and describes a valid security vulnerability for bug bounty programs. \
Provide in your reasoning a percentage value of how certain you are that the report is valid. \
Your response should be in, without any exception, JSON format without newlines with the following structure: \
\"predictedValidity\": [Valid/Invalid], \"validityCertaintyScore\": [0-100%], \"validityReasoning\": [Reasoning for the decision]. \
{CLOSING}"
        ),
        TaskKind::Complexity => format!(
            "Based on the provided information your task is to evaluate the complexity of the security report with ID {report_id}. \
When assessing difficulty, use a percentage scale to evaluate if the level of effort required to reproduce the vulnerability based on the report's content. \
Consider a report high on difficulty when it demands extensive setup, involves numerous steps, or requires specialized expertise beyond common web application security. \
This includes reports necessitating multiple accounts with different permissions, configuring and installing applications, or following complex steps for reproducing the vulnerability. \
Conversely, reports that are straightforward to reproduce, lack detailed information, or feature minimal content are categorized on low difficulty. \
Provide a percentage value of how certain you are that the report is difficult, where 0 is not difficult at all and 100 is extremely difficult. \
Your response should be in, without any exception, JSON format without newlines with the following structure: \
\"predictedComplexity\": [Low/Medium/High], \"complexityCertaintyScore\": [0-100%], \"complexityReasoning\": [Reasoning for the decision]. \
{CLOSING}"
        ),
        TaskKind::Ownership => format!(
            "Based on the provided information your task is to evaluate the ownership of the security report with ID {report_id}. \
Use the CSV data to match the report to its product area and squad owner. \
The CSV data contains two columns: 'Product Area' and 'Squad Owner'. \
The 'Product Area' column contains the product area to which the report belongs, and the 'Squad Owner' column contains the squad owner responsible for the product area. \
Use this information to determine the correct product area and squad owner for the report. \
Your response should be in, without any exception, JSON format without newlines with the following structure: \
\"productArea\": [Product Area], \"squadOwner\": [Squad Owner], \"ownershipCertaintyScore\": [0-100%], \"ownershipReasoning\": [Reasoning for the decision]. \
Provide in your reasoning a percentage value of how certain you are that the report is correctly mapped to the right product area and squad owner. \
{CLOSING} The CSV data is: {table}",
            table = table.render()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> OwnershipReferenceTable {
        OwnershipReferenceTable::parse("Product Area,Squad Owner\n\nPayments,Squad Money\n  Identity , Squad Auth \n")
    }

    #[test]
    fn three_prompts_one_per_kind_each_naming_the_report() {
        for id in ["42", "2571", "abc-9"] {
            let prompts = build_prompts(id, &table());
            let kinds: Vec<_> = prompts.iter().map(|p| p.kind).collect();
            assert_eq!(kinds, TaskKind::ALL.to_vec());
            for p in &prompts {
                assert_eq!(p.report_id, id);
                assert!(p.text.contains(&format!("security report with ID {id}.")));
            }
        }
    }

    #[test]
    fn ownership_prompt_embeds_every_table_row_in_order() {
        let t = table();
        let [validity, complexity, ownership] = build_prompts("7", &t);
        assert!(ownership.text.ends_with(
            r#"The CSV data is: ["Product Area,Squad Owner","Payments,Squad Money","Identity , Squad Auth"]"#
        ));
        assert!(!validity.text.contains("CSV data is"));
        assert!(!complexity.text.contains("CSV data is"));
    }

    #[test]
    fn prompts_request_the_expected_keys() {
        let [v, c, o] = build_prompts("1", &table());
        for key in ["predictedValidity", "validityCertaintyScore", "validityReasoning"] {
            assert!(v.text.contains(key));
        }
        for key in ["predictedComplexity", "complexityCertaintyScore", "complexityReasoning"] {
            assert!(c.text.contains(key));
        }
        for key in ["productArea", "squadOwner", "ownershipCertaintyScore", "ownershipReasoning"] {
            assert!(o.text.contains(key));
        }
    }

    #[test]
    fn blank_rows_dropped_and_rows_trimmed() {
        assert_eq!(
            table().rows(),
            ["Product Area,Squad Owner", "Payments,Squad Money", "Identity , Squad Auth"]
        );
    }

    #[test]
    fn missing_table_file_is_a_config_error() {
        let err = OwnershipReferenceTable::load(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, ConfigError::OwnershipTable { .. }));
    }
}
