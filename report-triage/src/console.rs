//! Operator-facing console lines. Structured events go through `tracing`.

use colored::Colorize;

use crate::platform::ReportSummary;
use crate::triage::TriageResult;

pub const RULE: &str = "_____________";

pub fn progress(msg: &str) {
    println!("{}", msg.cyan());
}

pub fn success(msg: &str) {
    println!("{}", msg.green());
}

pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

pub fn failure(msg: &str) {
    eprintln!("{} {}", "[error]".red().bold(), msg.red());
}

/// Prints the report header shown before triage.
pub fn report_details(report: &ReportSummary) {
    println!("{RULE}");
    println!("Report ID: {}", report.id);
    println!("Report Title: {}", report.title);
    println!("Report State: {}", report.state);
    println!(
        "Reporter Reputation: {}",
        report.reporter_reputation.as_deref().unwrap_or("N/A")
    );
    println!(
        "Reporter Signal: {}",
        report.reporter_signal.as_deref().unwrap_or("N/A")
    );
}

pub fn triage_summary(result: &TriageResult) {
    println!(
        "{} validity={} ({}%) complexity={} ({}%) area={} squad={} ({}%)",
        format!("Report {}:", result.report_id).bold(),
        result.validity.predicted_value,
        result.validity.certainty_score,
        result.complexity.predicted_value,
        result.complexity.certainty_score,
        result.ownership.product_area,
        result.ownership.squad_owner,
        result.ownership.certainty_score,
    );
}
