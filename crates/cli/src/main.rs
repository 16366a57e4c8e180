//! # Ferrous Sweep
//!
//! Concurrent DNS sweep: resolves a generated key set against one nameserver
//! with a fixed pool of workers.

mod bootstrap;
mod di;

use bootstrap::SourceArgs;
use clap::Parser;
use ferrous_sweep_domain::{CliOverrides, IpRange, QueryType, WorkerFailurePolicy};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "ferrous-sweep")]
#[command(version = "0.1.0")]
#[command(about = "Concurrent DNS sweep over generated names and address ranges")]
struct Cli {
    /// Prefix list, one entry per line
    #[arg(short = 'p', long)]
    prefixes: Option<PathBuf>,

    /// Suffix list, one entry per line
    #[arg(short = 's', long)]
    suffixes: Option<PathBuf>,

    /// Host list, one key per line
    #[arg(short = 'f', long)]
    hosts: Option<PathBuf>,

    /// IP ranges in CIDR notation (PTR sweeps)
    #[arg(short = 'r', long = "range", num_args = 1..)]
    ranges: Vec<IpRange>,

    /// Query type: A, NS, MX or PTR
    #[arg(short = 't', long = "type")]
    query_type: Option<QueryType>,

    /// Number of concurrent workers
    #[arg(short = 'w', long)]
    workers: Option<usize>,

    /// Per-query deadline in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Clear the recursion-desired flag
    #[arg(long)]
    no_recursion: bool,

    /// Nameserver (ip or ip:port); defaults to the system resolver
    #[arg(short = 'n', long)]
    nameserver: Option<String>,

    /// What to do with a worker that dies mid-query: respawn or retire
    #[arg(long)]
    on_worker_failure: Option<WorkerFailurePolicy>,

    /// Write results to a file instead of stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Also print no-result and timeout lines
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Verbose output plus debug logging
    #[arg(short = 'd', long)]
    debug: bool,

    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<String>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            workers: self.workers,
            query_type: self.query_type,
            timeout_secs: self.timeout,
            no_recursion: self.no_recursion,
            nameserver: self.nameserver.clone(),
            verbose: self.verbose,
            debug: self.debug,
            worker_failure: self.on_worker_failure,
        }
    }

    fn sources(&self) -> SourceArgs {
        SourceArgs {
            prefixes: self.prefixes.clone(),
            suffixes: self.suffixes.clone(),
            hosts: self.hosts.clone(),
            ranges: self.ranges.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ferrous-sweep: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = bootstrap::load_config(cli.config.as_deref(), cli.overrides())?;
    bootstrap::init_logging(&config);

    info!(
        config_file = cli.config.as_deref().unwrap_or("default"),
        workers = config.sweep.workers,
        query_type = %config.sweep.query_type,
        timeout_secs = config.sweep.timeout_secs,
        recursion = config.sweep.recursion,
        "Configuration loaded"
    );

    let generator = bootstrap::load_sources(&cli.sources(), config.sweep.query_type)?;
    let services = di::SweepServices::build(&config)?;
    let sink = di::open_sink(cli.output.as_deref())?;

    let keys = generator.spawn(config.sweep.generator_buffer);
    let (summary, _sink) = services.use_case.execute(keys, sink).await?;

    info!(
        total = summary.total,
        succeeded = summary.succeeded,
        lost = summary.lost,
        "Sweep finished"
    );

    Ok(())
}
