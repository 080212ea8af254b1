use clap::{Args, Parser, Subcommand};
use report_triage::{ActionSet, ReportState, Severity};

/// Automated triage of bug-bounty reports.
#[derive(Debug, Parser)]
#[command(name = "hai-triage", version, about)]
pub struct Cli {
    /// Debug logging for the workspace crates, including request bodies.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Triage specific reports, or every report matching the filters.
    Triage(TriageArgs),
    /// Tail the report id feed and triage each appended id.
    Watch(WatchArgs),
    /// Serve the signed webhook that feeds report ids to the watcher.
    Serve,
}

#[derive(Debug, Args)]
pub struct TriageArgs {
    /// Severity filter (none, low, medium, high, critical).
    #[arg(long = "rating", value_name = "SEVERITY")]
    pub rating: Vec<Severity>,

    /// State filter (new, triaged, pending-program-review, needs-more-info,
    /// resolved, not-applicable, informative, duplicate, spam, retesting).
    #[arg(long = "state", value_name = "STATE")]
    pub state: Vec<ReportState>,

    /// Only reports without an issue tracker reference.
    #[arg(long = "reference")]
    pub reference: bool,

    /// Specific report id; repeatable. Filters are ignored when given.
    #[arg(short = 'r', long = "report", value_name = "ID")]
    pub report: Vec<String>,

    #[command(flatten)]
    pub actions: ActionFlags,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub actions: ActionFlags,
}

#[derive(Debug, Clone, Copy, Args)]
pub struct ActionFlags {
    /// Post the predictions as an internal comment.
    #[arg(long = "comment-hai", alias = "comment_hai")]
    pub comment: bool,

    /// Write the predictions into the configured custom fields.
    #[arg(long = "custom-field-hai", alias = "custom_field_hai")]
    pub custom_field: bool,

    /// Append the predictions to the CSV output file.
    #[arg(long = "csv-output", alias = "csv_output")]
    pub csv: bool,
}

impl ActionFlags {
    pub fn to_action_set(self) -> ActionSet {
        ActionSet {
            comment: self.comment,
            custom_fields: self.custom_field,
            csv: self.csv,
        }
    }
}
