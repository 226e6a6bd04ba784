mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use stride_core::types::SprintStatus;

#[derive(Parser)]
#[command(
    name = "stride",
    about = "Sprint tracking over markdown sprint documents",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .stride/ or .git/)
    #[arg(long, global = true, env = "STRIDE_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List sprints with progress
    List {
        /// Only sprints with this status (proposed, active, review, completed)
        #[arg(long)]
        status: Option<SprintStatus>,
        /// Show stride counts and the current stride
        #[arg(long, short = 'v')]
        verbose: bool,
    },

    /// Project overview, or one sprint's progress
    Status {
        /// Sprint id (omit for the project overview)
        id: Option<String>,
    },

    /// Show a sprint's strides, acceptance criteria, and implementation log
    Show {
        id: String,
        /// Print every recent log entry in full
        #[arg(long)]
        full: bool,
        /// Print one document verbatim (proposal, plan, design, implementation, retrospective)
        #[arg(long, value_name = "DOC")]
        file: Option<String>,
        /// List every task grouped by stride
        #[arg(long)]
        tasks: bool,
        /// Chronological implementation activity
        #[arg(long)]
        timeline: bool,
        /// Only the acceptance criteria
        #[arg(long)]
        acceptance: bool,
    },

    /// Cross-sprint analytics
    Metrics {
        /// Show every metric section
        #[arg(long, short = 'd')]
        detailed: bool,
        /// Recalculate even when the cache is valid
        #[arg(long, short = 'r')]
        refresh: bool,
        /// Delete the analytics cache and exit
        #[arg(long)]
        clear_cache: bool,
        /// Analytics summary for a single sprint
        #[arg(long, value_name = "ID")]
        sprint: Option<String>,
    },

    /// Check sprint documents against the stride templates
    Validate {
        /// Sprint id
        id: Option<String>,
        /// Validate every sprint
        #[arg(long, conflicts_with = "id")]
        all: bool,
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
        /// Also print informational findings
        #[arg(long, short = 'v')]
        verbose: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    tracing::debug!(root = %root.display(), "resolved project root");

    let result = match cli.command {
        Commands::List { status, verbose } => cmd::list::run(&root, status, verbose, cli.json),
        Commands::Status { id } => cmd::status::run(&root, id.as_deref(), cli.json),
        Commands::Show {
            id,
            full,
            file,
            tasks,
            timeline,
            acceptance,
        } => cmd::show::run(
            &root,
            &id,
            cmd::show::ShowOptions {
                full,
                file: file.as_deref(),
                tasks,
                timeline,
                acceptance,
            },
            cli.json,
        ),
        Commands::Metrics {
            detailed,
            refresh,
            clear_cache,
            sprint,
        } => cmd::metrics::run(
            &root,
            cmd::metrics::MetricsOptions {
                detailed,
                refresh,
                clear_cache,
                sprint: sprint.as_deref(),
            },
            cli.json,
        ),
        Commands::Validate {
            id,
            all,
            strict,
            verbose,
        } => cmd::validate::run(&root, id.as_deref(), all, strict, verbose, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
