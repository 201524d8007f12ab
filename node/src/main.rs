// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # POLARIS Registry Node
//!
//! Entry point for the `polaris-node` binary. Parses CLI arguments,
//! initializes logging and metrics, opens the ledger, and serves the
//! HTTP/WS API.
//!
//! The binary supports five subcommands:
//!
//! - `run`     — start the registry node
//! - `keygen`  — generate a wallet keypair and store the secret key
//! - `sign`    — sign a challenge message with a stored key
//! - `status`  — query a running node's status endpoint
//! - `version` — print build version information

mod api;
mod cli;
mod logging;
mod metrics;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::broadcast;

use polaris_ledger::chain::ChainManager;
use polaris_ledger::crypto::keys::WalletKeypair;
use polaris_ledger::identity::StarAddress;

use cli::{Commands, PolarisNodeCli};
use logging::LogFormat;
use metrics::NodeMetrics;

/// Broadcast channel capacity for live event streaming.
/// 256 is large enough to absorb short claim bursts without dropping
/// events for connected WebSocket clients.
const EVENT_CHANNEL_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = PolarisNodeCli::parse();

    match cli.command {
        Commands::Run(args) => run_node(args).await,
        Commands::Keygen(args) => generate_wallet(args),
        Commands::Sign(args) => sign_message(args),
        Commands::Status(args) => query_status(args).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Starts the full registry node: ledger, metrics, and the HTTP/WS API.
async fn run_node(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(&args.log_level, LogFormat::from_str_lossy(&args.log_format));

    tracing::info!(api_addr = %args.api_addr, "starting polaris-node");

    // --- Ledger ---
    let chain = Arc::new(ChainManager::new().await);
    let genesis_hash = chain
        .block_by_height(0)
        .await
        .map(|b| b.hash_hex())
        .unwrap_or_default();
    tracing::info!(genesis_hash = %genesis_hash, "ledger initialized");

    // --- Metrics ---
    let node_metrics = Arc::new(NodeMetrics::new());
    node_metrics.chain_height.set(chain.chain_height().await as i64);

    // --- Event broadcast ---
    let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

    // --- Application state ---
    let app_state = api::AppState {
        version: env!("CARGO_PKG_VERSION").to_string(),
        chain: Arc::clone(&chain),
        metrics: Arc::clone(&node_metrics),
        event_tx,
        started_at: chrono::Utc::now(),
    };

    // --- API server ---
    let router = api::create_router(app_state);
    let listener = tokio::net::TcpListener::bind(args.api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {}", args.api_addr))?;
    tracing::info!("API server listening on {}", args.api_addr);

    tokio::select! {
        res = axum::serve(listener, router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received, draining connections");
        }
    }

    tracing::info!("polaris-node stopped");
    Ok(())
}

/// Generates a fresh wallet keypair and writes the secret key to disk.
fn generate_wallet(args: cli::KeygenArgs) -> Result<()> {
    logging::init_logging("polaris_node=info", LogFormat::Pretty);

    let keypair = WalletKeypair::generate();
    let address = StarAddress::from_public_key(&keypair.public_key());

    write_key_file(&args.output, &keypair, args.force)?;

    tracing::info!(
        address = %address,
        key_path = %args.output.display(),
        "wallet keypair generated"
    );

    println!("Wallet keypair generated.");
    println!("  Key file   : {}", args.output.display());
    println!("  Address    : {}", address);
    println!("  Public key : {}", keypair.public_key().to_hex());

    Ok(())
}

/// Writes the hex-encoded secret key to `path`, refusing to clobber an
/// existing file unless `force` is set.
fn write_key_file(path: &Path, keypair: &WalletKeypair, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "key file {} already exists (pass --force to overwrite)",
            path.display()
        );
    }

    let secret_bytes = keypair.secret_key_bytes();
    std::fs::write(path, hex::encode(secret_bytes))
        .with_context(|| format!("failed to write key file {}", path.display()))?;

    // Restrict permissions on Unix.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

/// Reads a hex-encoded secret key file and reconstructs the keypair.
fn load_keypair(path: &Path) -> Result<WalletKeypair> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read key file {}", path.display()))?;
    WalletKeypair::from_hex(&contents)
        .with_context(|| format!("key file {} does not hold a valid secret key", path.display()))
}

/// Signs a challenge message with a stored wallet key and prints the
/// hex-encoded signature to stdout, ready to paste into a claim.
fn sign_message(args: cli::SignArgs) -> Result<()> {
    let keypair = load_keypair(&args.key)?;
    let signature = keypair.sign(args.message.as_bytes());
    println!("{}", signature.to_hex());
    Ok(())
}

/// Queries a running node's status endpoint and prints the result.
async fn query_status(args: cli::StatusArgs) -> Result<()> {
    let url = format!("{}/status", args.api_url.trim_end_matches('/'));
    let body: String = reqwest_get_stub(&url).await?;
    println!("{}", body);
    Ok(())
}

/// Minimal HTTP GET without pulling in `reqwest` as a dependency.
/// In a real deployment, swap this for a proper HTTP client.
async fn reqwest_get_stub(url: &str) -> Result<String> {
    // Use tokio's TCP stream + raw HTTP/1.1 to avoid adding reqwest.
    let parsed: url::Url = url
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid URL: {}", e))?;

    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow::anyhow!("missing host in URL"))?;
    let port = parsed.port().unwrap_or(80);
    let path = parsed.path();

    let addr = format!("{}:{}", host, port);
    let mut stream = tokio::net::TcpStream::connect(&addr)
        .await
        .with_context(|| format!("failed to connect to {}", addr))?;

    let request = format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        path, host,
    );

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    stream.write_all(request.as_bytes()).await?;
    stream.shutdown().await?;

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await?;
    let response = String::from_utf8_lossy(&buf);

    // Strip HTTP headers; everything after the first blank line is the body.
    let body = response
        .split_once("\r\n\r\n")
        .map(|(_, b)| b.to_string())
        .unwrap_or_else(|| response.to_string());

    Ok(body)
}

/// Prints version information to stdout.
fn print_version() {
    println!("polaris-node {}", env!("CARGO_PKG_VERSION"));
    println!("signing      {}", polaris_ledger::config::SIGNING_ALGORITHM);
    println!("digest       {}", polaris_ledger::config::DIGEST_ALGORITHM);
    println!("rustc        {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Minimal URL parser, just enough to extract host/port/path.
/// Avoids pulling in the `url` crate for a single use.
mod url {
    pub struct Url {
        host: String,
        port: Option<u16>,
        path: String,
    }

    impl Url {
        pub fn host_str(&self) -> Option<&str> {
            Some(&self.host)
        }

        pub fn port(&self) -> Option<u16> {
            self.port
        }

        pub fn path(&self) -> &str {
            &self.path
        }
    }

    impl std::str::FromStr for Url {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            // Strip scheme.
            let rest = s
                .strip_prefix("http://")
                .or_else(|| s.strip_prefix("https://"))
                .unwrap_or(s);

            let (authority, path) = match rest.find('/') {
                Some(i) => (&rest[..i], &rest[i..]),
                None => (rest, "/"),
            };

            let (host, port) = match authority.rfind(':') {
                Some(i) => {
                    let p = authority[i + 1..]
                        .parse::<u16>()
                        .map_err(|e| format!("bad port: {}", e))?;
                    (authority[..i].to_string(), Some(p))
                }
                None => (authority.to_string(), None),
            };

            Ok(Url {
                host,
                port,
                path: path.to_string(),
            })
        }
    }
}
