//! `codegraph-worker`: the CLI front-end for the orchestrator. Exposes
//! `analyze`, `query` and `check dataflow`.

use anyhow::Context;
use clap::{Parser, Subcommand};
use codegraph_config::Config;
use codegraph_core::{CodeGraphError, GraphStore};
use codegraph_storage::mem::MemoryGraphStore;
use codegraph_worker::{canonical_project_path, InProcessSession, WorkerSession};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "codegraph-worker")]
#[command(about = "Builds and queries the code knowledge graph for a project", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a workspace config YAML (defaults to no config: single implicit root)
    #[arg(long, global = true, env = "CODEGRAPH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline over a project and report counts.
    Analyze {
        /// Root directory of the project to analyze.
        project: String,
    },
    /// Query nodes by attribute equality (`key=value` pairs).
    Query {
        /// Root directory of the project to analyze before querying.
        project: String,
        /// `key=value` filters, ANDed together.
        filters: Vec<String>,
    },
    /// Run the pipeline and print only validation findings.
    Check {
        #[command(subcommand)]
        target: CheckTarget,
    },
}

#[derive(Subcommand)]
enum CheckTarget {
    /// Report variables whose data-flow never reaches a leaf node.
    Dataflow {
        /// Root directory of the project to analyze.
        project: String,
    },
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "codegraph_worker=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_config(path: &Option<PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(p) => Config::load_from_file(p).with_context(|| format!("loading workspace config from {}", p.display())),
        None => Ok(Config::default()),
    }
}

async fn run_analysis(project: &str, config: Config) -> anyhow::Result<codegraph_orchestrator::RunReport> {
    let path = canonical_project_path(project).with_context(|| format!("resolving project path '{project}'"))?;
    let store = Arc::new(MemoryGraphStore::new());
    let session = InProcessSession::new(config, store);
    session.analyze(&path).await.context("running orchestrator")
}

fn parse_filter(raw: &str) -> anyhow::Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| CodeGraphError::InvalidOperation(format!("filter '{raw}' is not key=value")))?;
    Ok((key.to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Analyze { project } => {
            let report = run_analysis(&project, config).await?;
            print_report(&report);
        }
        Commands::Query { project, filters } => {
            let path = canonical_project_path(&project)?;
            let store = Arc::new(MemoryGraphStore::new());
            let session = InProcessSession::new(config, store.clone());
            session.analyze(&path).await.context("running orchestrator")?;

            let mut attrs = std::collections::HashMap::new();
            for raw in &filters {
                let (key, value) = parse_filter(raw)?;
                attrs.insert(key, value);
            }
            let nodes = store.query_nodes(&attrs).await.context("querying nodes")?;
            for node in nodes {
                println!("{} {} {}", node.id, node.node_type, node.name);
            }
        }
        Commands::Check {
            target: CheckTarget::Dataflow { project },
        } => {
            let report = run_analysis(&project, config).await?;
            if report.validation_findings.is_empty() {
                println!("no data-flow findings");
            }
            for finding in &report.validation_findings {
                println!("[{}] {}", finding.code, finding.message);
            }
            if report.validation_findings.iter().any(|f| f.code.starts_with("ERR_")) {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn print_report(report: &codegraph_orchestrator::RunReport) {
    for root in &report.roots {
        println!(
            "{}: {} files discovered, {} analyzed, {} nodes, {} edges",
            root.root.display(),
            root.files_discovered,
            root.files_analyzed,
            root.nodes_written,
            root.edges_written
        );
        for (path, reason) in &root.files_failed {
            println!("  FAILED {}: {}", path.display(), reason);
        }
    }
    println!(
        "enrichment: {} edges added, {} unresolved",
        report.enrichment.edges_added, report.enrichment.unresolved
    );
    println!("validation: {} findings", report.validation_findings.len());
}
