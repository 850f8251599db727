//! wattmond - powercap power monitoring daemon
//!
//! Discovers hardware energy sources exposed by the Linux powercap
//! framework, keeps an instantaneous power estimate fresh for each one,
//! and serves the values over a simple text protocol on stdin/stdout.
//!
//! # Usage
//!
//! ```bash
//! # Start the daemon (talks the protocol on stdin/stdout)
//! wattmond
//!
//! # Point it at a different powercap tree (mainly for testing)
//! wattmond --powercap-root /tmp/fake-powercap
//!
//! # Sample the counters every 500 ms instead of every second
//! wattmond --interval-ms 500
//!
//! # Enable debug logging (logs go to stderr, never stdout)
//! RUST_LOG=wattmond=debug wattmond
//! ```
//!
//! # Signal Handling
//!
//! - SIGTERM/SIGINT: graceful shutdown
//! - Closing stdin also ends the daemon

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use wattmond::discovery::{DiscoveryService, DEFAULT_POWERCAP_ROOT};
use wattmond::server::CommandServer;

/// wattmond - powercap energy monitoring daemon
#[derive(Parser, Debug)]
#[command(name = "wattmond", version, about)]
struct Args {
    /// Powercap root directory to scan for energy sources
    #[arg(long, default_value = DEFAULT_POWERCAP_ROOT)]
    powercap_root: PathBuf,

    /// Interval between counter samples, in milliseconds
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    interval_ms: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    run_daemon(args)
}

/// Runs the daemon (async entry point).
#[tokio::main]
async fn run_daemon(args: Args) -> Result<()> {
    // Logs go to stderr so they never interleave with the stdout
    // protocol stream.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("wattmond=info".parse()?)
                .add_directive("wattmon_core=info".parse()?)
                .add_directive("wattmon_protocol=info".parse()?),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        pid = process::id(),
        root = %args.powercap_root.display(),
        interval_ms = args.interval_ms,
        "wattmond starting"
    );

    // Create cancellation token for graceful shutdown
    let cancel_token = CancellationToken::new();

    // Setup signal handlers
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        if let Err(e) = wait_for_shutdown_signal().await {
            error!(error = %e, "Error waiting for shutdown signal");
        }
        info!("Shutdown signal received");
        shutdown_token.cancel();
    });

    // Discover sensors and freeze the registry
    let discovery = DiscoveryService::new(
        args.powercap_root,
        Duration::from_millis(args.interval_ms),
        cancel_token.clone(),
    );
    let (registry, result) = discovery.discover().await;
    info!(
        discovered = result.discovered,
        failed = result.failed,
        "Sensor discovery complete"
    );

    // Serve the protocol on stdin/stdout
    let server = CommandServer::new(Arc::new(registry), cancel_token.clone());
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    if let Err(e) = server.run(stdin, stdout).await {
        error!(error = %e, "Command server error");
        return Err(e.into());
    }

    // Stop the refresh tasks once the command stream ends.
    cancel_token.cancel();
    info!("wattmond stopped");
    Ok(())
}

/// Waits for a shutdown signal (SIGTERM or SIGINT).
async fn wait_for_shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        info!("Received Ctrl+C");
    }

    Ok(())
}
