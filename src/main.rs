//! Open Forest Bot
//!
//! Runs one bot behind the commit-reveal protocol on the chosen transport.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use open_forest_bot::{
    network::{
        http::{serve_http, HttpConfig},
        log_startup, run_stdio, run_websocket, shutdown_signal,
    },
    proof::commitment::verify_reveal,
    AdapterConfig, CommitRevealAdapter, PendingStore, RevealPolicy, Strategy, VERSION,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Built-in strategy to run.
    #[arg(long, value_enum, default_value_t = Strategy::Expansion)]
    strategy: Strategy,

    /// Reject reveals for ticks that were never committed.
    #[arg(long)]
    strict_reveal: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Line-delimited JSON on stdin/stdout.
    Stdio,
    /// HTTP endpoint (`POST /act`).
    Http {
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: SocketAddr,
    },
    /// Connect to a match server WebSocket.
    Ws {
        #[arg(long)]
        url: String,
    },
    /// Check a reveal payload against a commitment and exit.
    Verify {
        #[arg(long)]
        commit: String,
        /// Reveal message, or any object with `actions` and `nonce`.
        #[arg(long)]
        reveal: String,
    },
}

impl Args {
    fn adapter_config(&self) -> AdapterConfig {
        AdapterConfig {
            reveal_policy: if self.strict_reveal {
                RevealPolicy::Strict
            } else {
                RevealPolicy::Lenient
            },
        }
    }
}

fn init_tracing() -> Result<()> {
    // stdout is reserved for protocol lines.
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;
    Ok(())
}

fn verify(commit: &str, reveal: &str) -> Result<()> {
    let payload: Value = serde_json::from_str(reveal).context("reveal is not valid JSON")?;
    let Some(actions) = payload.get("actions") else {
        bail!("reveal has no `actions` field");
    };
    let Some(nonce) = payload.get("nonce").and_then(Value::as_str) else {
        bail!("reveal has no string `nonce` field");
    };

    verify_reveal(commit, actions, nonce)?;
    info!("Reveal matches commitment {}", commit);
    println!("ok");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;
    let args = Args::parse();
    info!("Open Forest Bot v{}", VERSION);

    if let Command::Verify { commit, reveal } = &args.command {
        return verify(commit, reveal);
    }

    let store = Arc::new(PendingStore::new());
    let adapter = Arc::new(CommitRevealAdapter::new(
        Arc::new(args.strategy),
        store,
        args.adapter_config(),
    ));

    match args.command {
        Command::Stdio => {
            log_startup(&adapter, "stdio");
            let stats = run_stdio(&adapter).await?;
            info!(messages = stats.messages, errors = stats.errors, "stdin closed");
        }
        Command::Http { bind } => {
            log_startup(&adapter, "http");
            serve_http(adapter, HttpConfig { bind_addr: bind }).await?;
        }
        Command::Ws { url } => {
            log_startup(&adapter, "ws");
            tokio::select! {
                result = run_websocket(&adapter, &url) => {
                    if let Err(e) = result {
                        error!("WebSocket transport failed: {}", e);
                        return Err(e.into());
                    }
                }
                _ = shutdown_signal() => {}
            }
        }
        Command::Verify { .. } => {}
    }

    Ok(())
}
