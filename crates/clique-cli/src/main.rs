//! # clique CLI entry point
//!
//! Parses command-line arguments, resolves configuration, and dispatches to
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use clique_cli::chain::{run_chain, run_genesis, run_header, ChainArgs, GenesisArgs, HeaderArgs};
use clique_cli::commit::{run_commit, run_inspect, CommitArgs};
use clique_cli::config::Config;
use clique_cli::proof::{
    run_prove, run_subset, run_values, run_verify, ProveArgs, SubsetArgs, ValuesArgs, VerifyArgs,
};

/// Clique commitment toolchain.
///
/// Builds keccak-256 Merkle commitments over JSON records, cuts and verifies
/// selective-disclosure proofs, and links per-participant header chains.
#[derive(Parser, Debug)]
#[command(name = "clique", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the signature of the tree over a JSON array of records.
    Commit(CommitArgs),

    /// Render the tree over a JSON array of records.
    Inspect(CommitArgs),

    /// Build a proof revealing the given record indices.
    Prove(ProveArgs),

    /// Check a proof against a published root.
    Verify(VerifyArgs),

    /// Narrow a proof to some of its revealed indices.
    Subset(SubsetArgs),

    /// List the records a proof reveals.
    Values(ValuesArgs),

    /// Encode a header and compute its hash.
    Header(HeaderArgs),

    /// Print a participant's genesis predecessor.
    Genesis(GenesisArgs),

    /// Validate a participant's header chain.
    Chain(ChainArgs),
}

fn env_filter(verbose: u8) -> EnvFilter {
    match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

fn init_tracing(verbose: u8, json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "clique CLI starting");

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::from(1);
        }
    };
    tracing::debug!(?config, "resolved configuration");

    let result = match &cli.command {
        Commands::Commit(args) => run_commit(args, &config),
        Commands::Inspect(args) => run_inspect(args, &config),
        Commands::Prove(args) => run_prove(args, &config),
        Commands::Verify(args) => run_verify(args, &config),
        Commands::Subset(args) => run_subset(args, &config),
        Commands::Values(args) => run_values(args, &config),
        Commands::Header(args) => run_header(args, &config),
        Commands::Genesis(args) => run_genesis(args, &config),
        Commands::Chain(args) => run_chain(args, &config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
