//! Append-only CSV export of triage results.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::ActionError;
use crate::triage::TriageResult;

pub const CSV_HEADER: [&str; 5] = [
    "Report ID",
    "Predicted Validity",
    "Predicted Difficulty",
    "Product Area",
    "Squad Owner",
];

/// Appends one row per result; the header is written only into an empty file.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    path: PathBuf,
}

impl CsvExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, result: &TriageResult) -> Result<(), ActionError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let empty = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        if empty {
            writer.write_record(CSV_HEADER)?;
        }
        writer.write_record([
            result.report_id.as_str(),
            result.validity.predicted_value.as_str(),
            result.complexity.predicted_value.as_str(),
            result.ownership.product_area.as_str(),
            result.ownership.squad_owner.as_str(),
        ])?;
        writer.flush()?;

        debug!(path = %self.path.display(), report_id = %result.report_id, header = empty, "csv row appended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triage::{CertaintyScore, OwnershipPrediction, TriagePrediction};
    use pretty_assertions::assert_eq;

    fn result(id: &str, area: &str) -> TriageResult {
        let p = |v: &str| TriagePrediction {
            predicted_value: v.into(),
            certainty_score: CertaintyScore::new(50.0),
            reasoning: "r".into(),
        };
        TriageResult {
            report_id: id.into(),
            validity: p("Valid"),
            complexity: p("High"),
            ownership: OwnershipPrediction {
                product_area: area.into(),
                squad_owner: "Squad Auth".into(),
                certainty_score: CertaintyScore::new(10.0),
                reasoning: "r".into(),
            },
        }
    }

    #[test]
    fn header_once_then_rows_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.csv");
        let exporter = CsvExporter::new(&path);

        exporter.append(&result("1", "Identity")).unwrap();
        exporter.append(&result("2", "Payments, EU")).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "Report ID,Predicted Validity,Predicted Difficulty,Product Area,Squad Owner\n\
1,Valid,High,Identity,Squad Auth\n\
2,Valid,High,\"Payments, EU\",Squad Auth\n"
        );
    }

    #[test]
    fn existing_file_gets_no_second_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "Report ID,Predicted Validity,Predicted Difficulty,Product Area,Squad Owner\n").unwrap();

        CsvExporter::new(&path).append(&result("3", "Identity")).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("Report ID").count(), 1);
        assert!(text.ends_with("3,Valid,High,Identity,Squad Auth\n"));
    }
}
