//! presence-sim: replay a scenario against the ZY-M100 sensor core.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use presence_runner::{run_scenario, RunnerError, Scenario, ScenarioReport};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// ZY-M100 presence sensor scenario runner.
#[derive(Parser, Debug)]
#[command(name = "presence-sim")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario file (YAML).
    #[arg(short, long)]
    scenario: PathBuf,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the final report as JSON.
    #[arg(long)]
    json: bool,
}

fn print_summary(report: &ScenarioReport) {
    println!("scenario: {}", report.name);
    for step in &report.steps {
        let mark = if step.ok { "ok" } else { "FAIL" };
        println!("  [{:>3}] {:<10} {:<4} {}", step.index, step.kind, mark, step.detail);
    }
    let stats = &report.stats;
    println!(
        "records: {} (applied {}, unknown {}, decode failures {}, action failures {})",
        stats.records_dispatched,
        stats.applied,
        stats.unknown_data_points,
        stats.decode_failures,
        stats.action_failures
    );
    println!("settings writes: {}", stats.settings_writes);
    for (capability, value) in &report.device.boolean {
        println!("  {} = {}", capability, value);
    }
    for (capability, value) in &report.device.numeric {
        println!("  {} = {}", capability, value);
    }
    for (field, text) in &report.device.status {
        println!("  {} = {}", field, text);
    }
}

async fn run(args: &Args) -> Result<(), RunnerError> {
    let scenario = Scenario::load(&args.scenario)?;
    let report = run_scenario(&scenario).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    presence_metrics::describe_metrics();

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
