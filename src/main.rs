mod cli;

use std::process::ExitCode;

use ai_completion_service::{CompletionService, telemetry};
use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use report_triage::{
    ActionDispatcher, ActionSet, BatchSummary, OwnershipReferenceTable, PlatformClient, ReportFilter,
    TriageOrchestrator, TriageRunner, TriageSettings, console,
};
use tracing::{Level, debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command, TriageArgs};

const TARGETS: [&str; 5] = [
    telemetry::TARGET_PREFIX,
    report_triage::TARGET,
    report_watcher::TARGET,
    "api",
    "hai_triage",
];

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Variables may come from the real environment; a missing .env is fine.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("{} {e}", "[warning] could not load .env:".yellow());
        }
    }

    init_tracing(cli.verbose);
    println!("{}", "== hai-triage ==".magenta().bold());

    match run(cli.command).await {
        Ok(summary) if summary.failed == 0 => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(2),
        Err(e) => {
            console::failure(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("info", level, &TARGETS))
        .with(telemetry::layer())
        .init();
}

async fn run(command: Command) -> anyhow::Result<BatchSummary> {
    match command {
        Command::Triage(args) => triage(args).await,
        Command::Watch(args) => {
            let mut actions = args.actions.to_action_set();
            if actions.is_empty() {
                actions = ActionSet::FIELDS_ONLY;
            }
            let settings = TriageSettings::from_env(actions).context("configuration")?;
            let runner = build_runner(&settings, actions)?;

            let summary = report_watcher::watch(&settings.watch_file, &runner, async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await
            .context("report watcher")?;
            Ok(summary)
        }
        Command::Serve => {
            let state = api::AppState::from_env().context("configuration")?;
            api::start(state, &api::api_address()).await?;
            Ok(BatchSummary::default())
        }
    }
}

async fn triage(args: TriageArgs) -> anyhow::Result<BatchSummary> {
    let actions = args.actions.to_action_set();
    if actions.is_empty() {
        console::warning("No actions selected; predictions are only printed.");
    }
    let settings = TriageSettings::from_env(actions).context("configuration")?;
    let runner = build_runner(&settings, actions)?;

    if !args.report.is_empty() {
        if !args.rating.is_empty() || !args.state.is_empty() || args.reference {
            warn!("filters are ignored when specific reports are requested");
        }
        return Ok(runner.run_reports(&args.report).await);
    }

    let filter = ReportFilter {
        program: settings.require_program().context("configuration")?.to_string(),
        severities: args.rating,
        states: args.state,
        without_reference: args.reference,
    };
    Ok(runner.run_listing(&filter).await?)
}

/// Loads the ownership table and wires the clients. Any failure here is a
/// configuration problem and stops the run before a report is touched.
fn build_runner(settings: &TriageSettings, actions: ActionSet) -> anyhow::Result<TriageRunner<ActionDispatcher>> {
    let table = OwnershipReferenceTable::load(&settings.ownership_file)?;
    debug!(rows = table.rows().len(), path = %settings.ownership_file.display(), "ownership table loaded");

    let service = CompletionService::new(settings.completion.clone()).context("completion client")?;
    let platform = PlatformClient::new(settings.platform()).context("platform client")?;
    let dispatcher = ActionDispatcher::new(
        platform.clone(),
        actions,
        settings.fields.clone(),
        &settings.csv_output_file,
    )?;

    Ok(TriageRunner::new(TriageOrchestrator::new(service, table), platform, dispatcher))
}
