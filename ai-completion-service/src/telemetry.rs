use std::io::{self, IsTerminal};
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Crate target prefix used for per-crate level directives.
pub const TARGET_PREFIX: &str = "ai_completion_service";

/// RFC3339 UTC timer implemented via `chrono`.
/// Example output: `2025-09-12T10:20:30Z`
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        let s = now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

/// Builds the formatting layer shared by every binary of the workspace.
///
/// - RFC3339 UTC timestamps
/// - Compact single-line format with target
/// - Span close events (duration of instrumented calls such as `completion`)
/// - ANSI colors only when stderr is a terminal
///
/// Logs go to stderr so they never interleave with the console report output.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let use_ansi = io::stderr().is_terminal();

    fmt::layer()
        .with_writer(io::stderr)
        .with_timer(ChronoRfc3339Utc)
        .with_level(true)
        .with_target(true)
        .with_ansi(use_ansi)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(fmt::format().compact())
}

/// Level directive for one crate target, e.g. `report_triage=debug`.
pub fn level_directive(target: &str, level: Level) -> Option<Directive> {
    let s = format!("{target}={}", level.as_str().to_lowercase());
    Directive::from_str(&s).ok()
}

/// Creates an EnvFilter from `RUST_LOG` or `default`, then applies `level`
/// to each of `targets`.
///
/// Example: `default = "info"`, `level = Level::DEBUG` keeps other crates at
/// INFO and shows DEBUG for the listed workspace crates only.
pub fn env_filter_with_level(default: &str, level: Level, targets: &[&str]) -> EnvFilter {
    let base = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    targets
        .iter()
        .filter_map(|t| level_directive(t, level))
        .fold(base, EnvFilter::add_directive)
}
