//! rpc-diff-bench CLI tool
//!
//! Compares a local node's JSON-RPC responses against a reference node.
//!
//! Exit status: 0 when everything matches, 1 when a comparison is flagged,
//! 2 when an endpoint could not be reached or answered garbage.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rpc_diff_bench::report::{render_comparison, render_scan};
use rpc_diff_bench::request::DEFAULT_BLOCK_KEY;
use rpc_diff_bench::{
    block_params, parse_param_template, parse_range, Benchmarker, ClassificationPolicy,
    EndpointConfig, RangeScanner, ScanConfig, ScanStatus,
};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, level_filters::LevelFilter};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const EXIT_FLAGGED: u8 = 1;
const EXIT_UNRESOLVED: u8 = 2;

#[derive(Parser)]
#[command(name = "rpc-diff-bench")]
#[command(about = "Differential testing of a local node's JSON-RPC against a reference node")]
struct Cli {
    #[command(flatten)]
    endpoints: EndpointArgs,

    /// Disable coloured output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct EndpointArgs {
    /// Reference node URL
    #[arg(long, env = "REMOTE_RPC_URL")]
    remote: String,
    /// Candidate node URL
    #[arg(long, env = "LOCAL_RPC_URL")]
    local: String,
    /// Per-request timeout in seconds, 0 waits indefinitely
    #[arg(long, env = "RPC_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,
}

#[derive(Args)]
struct MethodArgs {
    /// RPC method under test
    #[arg(long)]
    method: String,
    /// JSON object the block number is injected into
    #[arg(long, default_value = "{}")]
    params: String,
    /// Param field holding the block number
    #[arg(long, default_value = DEFAULT_BLOCK_KEY)]
    block_key: String,
    /// Which entries flag a comparison
    #[arg(long, value_enum, default_value_t = ClassificationPolicy::MismatchOnly)]
    policy: ClassificationPolicy,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare a single block
    Compare {
        #[command(flatten)]
        method: MethodArgs,
        /// Block number
        #[arg(long)]
        block: u64,
        /// Also print matching fields
        #[arg(long)]
        show_matches: bool,
    },
    /// Compare every block of a range
    Scan {
        #[command(flatten)]
        method: MethodArgs,
        /// Half-open block range, start:end
        #[arg(long)]
        range: String,
        /// Blocks compared at once
        #[arg(long, default_value_t = 1)]
        concurrency: usize,
        /// Stop after the first flagged or unresolved block
        #[arg(long)]
        fail_fast: bool,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
        /// Print the diff of every flagged block
        #[arg(long)]
        show_reports: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // .env is optional
    let _ = dotenvy::dotenv();
    enable_tracing()?;

    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    let timeout = match cli.endpoints.timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let benchmarker = Benchmarker::from_configs(
        EndpointConfig::new("remote", &cli.endpoints.remote).with_timeout(timeout),
        EndpointConfig::new("local", &cli.endpoints.local).with_timeout(timeout),
    )
    .context("Failed to create RPC clients")?;

    match cli.command {
        Commands::Compare {
            method,
            block,
            show_matches,
        } => {
            let template = parse_param_template(&method.params)?;
            let params = block_params(&template, &method.block_key, block);

            let comparison = match benchmarker.run(&method.method, params).await {
                Ok(comparison) => comparison,
                Err(e) if e.is_transport() => {
                    error!(method = %method.method, block, "{}", e);
                    return Ok(ExitCode::from(EXIT_UNRESOLVED));
                }
                Err(e) => return Err(e.into()),
            };

            print!("{}", render_comparison(&comparison, show_matches));
            if method.policy.flags(&comparison.report) {
                return Ok(ExitCode::from(EXIT_FLAGGED));
            }
        }
        Commands::Scan {
            method,
            range,
            concurrency,
            fail_fast,
            json,
            show_reports,
        } => {
            let config = ScanConfig::new(method.method, parse_range(&range)?)
                .with_template(parse_param_template(&method.params)?)
                .with_block_key(method.block_key)
                .with_policy(method.policy)
                .with_concurrency(concurrency)
                .with_fail_fast(fail_fast);

            let scanner = RangeScanner::new(benchmarker, config)?;
            let outcome = scanner.scan().await.context("Scan aborted")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print!("{}", render_scan(&outcome, show_reports));
            }

            match outcome.status() {
                ScanStatus::Unresolved => return Ok(ExitCode::from(EXIT_UNRESOLVED)),
                ScanStatus::Flagged => return Ok(ExitCode::from(EXIT_FLAGGED)),
                ScanStatus::Clean => {}
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn enable_tracing() -> Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env()
        .context("Invalid RUST_LOG filter")?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to install subscriber")
}
