//! Release Retention CLI
//!
//! The `retention` command loads a deployment history snapshot and reports
//! which releases a cleanup job must keep.
//!
//! ## Commands
//!
//! - `keep`: List the releases to retain
//! - `plan`: Emit a JSON purge plan (retained, purge candidates, decisions)

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{info, Level};

use retention_core::{
    select_parallel, DecisionSink, DeploymentLedger, JsonDirSource, KeepCount, PlanDigest,
    Release, RetentionDecision, RetentionOutcome, RetentionSelector, SnapshotSource, TracingSink,
};

#[derive(Parser)]
#[command(name = "retention")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Decide which releases survive a cleanup pass", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct SelectionArgs {
    /// Directory holding Projects.json, Environments.json, Releases.json, Deployments.json
    #[arg(short, long, env = "RETENTION_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    /// Releases to keep per project and environment (negative means none)
    #[arg(short = 'n', long, env = "RETENTION_COUNT", allow_negative_numbers = true)]
    count: i64,

    /// Rank project/environment pairs concurrently
    #[arg(long)]
    parallel: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the releases to retain
    Keep {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Print a JSON purge plan: retained ids, purge candidates, decisions, digest
    Plan {
        #[command(flatten)]
        selection: SelectionArgs,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct PurgePlan<'a> {
    keep: KeepCount,
    digest: PlanDigest,
    retained: Vec<&'a str>,
    purge: Vec<&'a str>,
    decisions: &'a [RetentionDecision],
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    retention_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Keep { selection, output } => cmd_keep(&selection, output).await,
        Commands::Plan { selection } => cmd_plan(&selection).await,
    }
}

async fn load_ledger(data_dir: &Path) -> Result<DeploymentLedger> {
    JsonDirSource::new(data_dir)
        .load()
        .await
        .with_context(|| {
            format!(
                "could not load deployment history from {}",
                data_dir.display()
            )
        })
}

async fn run_selection(
    ledger: Arc<DeploymentLedger>,
    args: &SelectionArgs,
) -> Result<RetentionOutcome> {
    let keep = KeepCount::from_signed(args.count);
    if args.count < 0 {
        tracing::warn!(requested = args.count, "negative retention count, keeping none");
    }

    if args.parallel {
        let outcome = select_parallel(Arc::clone(&ledger), keep)
            .await
            .context("parallel retention selection failed")?;
        let mut sink = TracingSink::new();
        for decision in &outcome.decisions {
            sink.record(decision);
        }
        Ok(outcome)
    } else {
        Ok(RetentionSelector::new(&ledger).evaluate_with(keep, &mut TracingSink::new()))
    }
}

async fn cmd_keep(args: &SelectionArgs, output: OutputFormat) -> Result<()> {
    let ledger = Arc::new(load_ledger(&args.data_dir).await?);
    let outcome = run_selection(Arc::clone(&ledger), args).await?;

    info!(
        retained = outcome.retained.len(),
        total = ledger.releases().len(),
        digest = %outcome.digest().short(),
        "retention pass complete"
    );

    match output {
        OutputFormat::Text => {
            for release in &outcome.retained {
                println!("{}", format_release(release));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&outcome.retained)
                .context("Failed to serialize retained releases")?;
            println!("{}", json);
        }
    }

    Ok(())
}

async fn cmd_plan(args: &SelectionArgs) -> Result<()> {
    let ledger = Arc::new(load_ledger(&args.data_dir).await?);
    let outcome = run_selection(Arc::clone(&ledger), args).await?;

    let plan = PurgePlan {
        keep: outcome.keep,
        digest: outcome.digest(),
        retained: outcome.retained_ids(),
        purge: outcome
            .purge_candidates(&ledger)
            .into_iter()
            .map(|r| r.id.as_str())
            .collect(),
        decisions: &outcome.decisions,
    };

    let json = serde_json::to_string_pretty(&plan).context("Failed to serialize purge plan")?;
    println!("{}", json);
    Ok(())
}

fn format_release(release: &Release) -> String {
    format!(
        "{}\t{}\t{}",
        release.id,
        release.project_id,
        release.version.as_deref().unwrap_or("-")
    )
}
