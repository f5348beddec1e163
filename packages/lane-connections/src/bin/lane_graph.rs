//! lane-graph - replay and inspect lane connection scenarios
//!
//! Usage:
//!   lane-graph replay <FILE> [--dump] [--verify] [-v]
//!   lane-graph check <FILE>
//!   lane-graph record <FILE> --node <ID>

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lane_connections::{LaneConnectionManager, LaneConnectionRecord, NodeId, Outcome, Scenario};

#[derive(Parser)]
#[command(name = "lane-graph", version, about = "Replay and inspect lane connection scenarios")]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence when set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply a scenario and print one JSON outcome per operation
    Replay {
        file: PathBuf,
        /// Print the graph dump after replaying
        #[arg(long)]
        dump: bool,
        /// Check invariants after every mutation
        #[arg(long)]
        verify: bool,
    },
    /// Apply a scenario and verify the graph invariants
    Check { file: PathBuf },
    /// Apply a scenario and print the connection records of a node as JSON
    Record {
        file: PathBuf,
        #[arg(long)]
        node: u32,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load(file: &Path, verify: bool) -> Result<(Scenario, LaneConnectionManager)> {
    let mut scenario = Scenario::from_path(file)
        .with_context(|| format!("failed to load scenario {}", file.display()))?;
    scenario.config.verify_after_mutation |= verify;
    let manager = scenario
        .build_manager()
        .with_context(|| format!("invalid network in {}", file.display()))?;
    info!(
        segments = manager.network().segment_count(),
        lanes = manager.network().lane_count(),
        operations = scenario.operations.len(),
        "scenario loaded"
    );
    Ok((scenario, manager))
}

fn replay(scenario: &Scenario, manager: &mut LaneConnectionManager) -> Result<usize> {
    let mut failed = 0;
    for outcome in scenario.run(manager) {
        if let Outcome::Failed { code, message } = &outcome.outcome {
            warn!(index = outcome.index, code = %code, "{}", message);
            failed += 1;
        }
        println!("{}", serde_json::to_string(&outcome)?);
    }
    Ok(failed)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Replay { file, dump, verify } => {
            let (scenario, mut manager) = load(&file, verify)?;
            let failed = replay(&scenario, &mut manager)?;
            if dump {
                for line in manager.dump() {
                    println!("{}", line);
                }
            }
            println!("{}", serde_json::to_string(&manager.stats())?);
            if failed > 0 {
                warn!(failed, "some operations failed");
            }
        }
        Command::Check { file } => {
            let (scenario, mut manager) = load(&file, false)?;
            for outcome in scenario.run(&mut manager) {
                if let Outcome::Failed { code, message } = outcome.outcome {
                    warn!(index = outcome.index, code = %code, "{}", message);
                }
            }
            if let Err(e) = manager.check() {
                bail!("graph invariants violated: {}", e);
            }
            let stats = manager.stats();
            info!(lane_ends = stats.lane_ends, edges = stats.edges, hints = stats.hint_edges, "graph ok");
            println!("ok");
        }
        Command::Record { file, node } => {
            let (scenario, mut manager) = load(&file, false)?;
            scenario.run(&mut manager);
            let records: Vec<LaneConnectionRecord> =
                LaneConnectionRecord::lanes_at_node(manager.network(), NodeId(node))
                    .into_iter()
                    .map(|mut record| {
                        record.record(&manager);
                        record
                    })
                    .collect();
            if records.is_empty() {
                bail!("no lanes at node {}", node);
            }
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }

    Ok(())
}
