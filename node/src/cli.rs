//! # CLI Interface
//!
//! Defines the command-line argument structure for `polaris-node` using
//! `clap` derive. Supports five subcommands: `run`, `keygen`, `sign`,
//! `status`, and `version`.

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

/// POLARIS star registry node.
///
/// Serves the star-claim notarization ledger over HTTP: challenge
/// issuance, claim admission, chain queries, audit, Prometheus metrics,
/// and a WebSocket event feed. Also ships the wallet-side helpers
/// (`keygen`, `sign`) so a claim can be driven end to end from one
/// binary.
#[derive(Parser, Debug)]
#[command(
    name = "polaris-node",
    about = "POLARIS star registry node",
    version,
    propagate_version = true
)]
pub struct PolarisNodeCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the POLARIS node binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the registry node and serve the API.
    Run(RunArgs),
    /// Generate a wallet keypair — prints the star address and writes
    /// the secret key to a file only the owner can read.
    Keygen(KeygenArgs),
    /// Sign a challenge message with a stored secret key and print the
    /// hex signature.
    Sign(SignArgs),
    /// Query the status of a running node via its API endpoint.
    Status(StatusArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Address and port for the HTTP API.
    #[arg(long, env = "POLARIS_API_ADDR", default_value = "127.0.0.1:7577")]
    pub api_addr: SocketAddr,

    /// Default log filter when `RUST_LOG` is not set.
    ///
    /// Accepts `tracing_subscriber::EnvFilter` directives, e.g.
    /// `polaris_node=debug,polaris_ledger=info`.
    #[arg(
        long,
        env = "POLARIS_LOG",
        default_value = "polaris_node=info,polaris_ledger=info,tower_http=debug"
    )]
    pub log_level: String,

    /// Log output format: `pretty` or `json`.
    #[arg(long, env = "POLARIS_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}

/// Arguments for the `keygen` subcommand.
#[derive(Parser, Debug)]
pub struct KeygenArgs {
    /// File the hex-encoded secret key is written to.
    #[arg(long, short = 'o', env = "POLARIS_KEY_FILE", default_value = "polaris.key")]
    pub output: PathBuf,

    /// Overwrite the output file if it already exists.
    ///
    /// Without this flag, keygen refuses to clobber an existing key.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `sign` subcommand.
#[derive(Parser, Debug)]
pub struct SignArgs {
    /// File holding the hex-encoded secret key.
    #[arg(long, short = 'k', env = "POLARIS_KEY_FILE", default_value = "polaris.key")]
    pub key: PathBuf,

    /// The challenge message to sign, exactly as the node issued it.
    pub message: String,
}

/// Arguments for the `status` subcommand.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// API endpoint of the running node.
    #[arg(long, default_value = "http://127.0.0.1:7577")]
    pub api_url: String,
}
