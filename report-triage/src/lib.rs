//! Bug-bounty report triage.
//!
//! Each report gets three concurrent completion requests (validity,
//! complexity, ownership). Their responses are parsed into one
//! [`TriageResult`], which the [`ActionDispatcher`] turns into an internal
//! comment, custom-field updates and a CSV row.

pub mod actions;
pub mod config;
pub mod console;
pub mod errors;
pub mod parser;
pub mod platform;
pub mod prompt;
pub mod runner;
pub mod triage;

pub use actions::{ActionDispatcher, ActionSet, CustomFieldIds, TriageSink};
pub use config::TriageSettings;
pub use errors::{ActionError, ConfigError, MalformedResponseError, PlatformError, Result, TriageError};
pub use platform::{PlatformClient, PlatformConfig, ReportFilter, ReportState, Severity};
pub use prompt::{OwnershipReferenceTable, TaskKind};
pub use runner::{BatchSummary, TriageRunner};
pub use triage::{TriageOrchestrator, TriageResult};

/// Tracing target of this crate, for `EnvFilter` directives.
pub const TARGET: &str = "report_triage";
