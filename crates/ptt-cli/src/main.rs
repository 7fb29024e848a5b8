//! ptt-bridge: push-to-talk device bridge for an embedding script host
//!
//! Connects to the configured PTT accessory and writes one JSON line per
//! script host call to stdout. The embedder forwards those into its web view
//! and closes our stdin when the widget screen goes away.

use anyhow::{Context, Result};
use ptt_bridge::{BridgeConfig, BridgeController};
use ptt_host::{StdioHost, host_context};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Resolve once the embedder closes stdin
async fn wait_for_stdin_eof() {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => debug!("Ignoring host input: {}", line),
            Ok(None) | Err(_) => break,
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging; stdout belongs to the host channel
    let filter = EnvFilter::try_from_env("PTT_BRIDGE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let config = if args.len() > 1 {
        let path = PathBuf::from(&args[1]);
        BridgeConfig::from_file(&path)
            .with_context(|| format!("loading config {}", path.display()))?
    } else {
        BridgeConfig::default()
    };

    let runtime = tokio::runtime::Runtime::new().context("starting runtime")?;
    let result = runtime.block_on(run(config));
    // A stdin read may still be parked on the blocking pool
    runtime.shutdown_timeout(Duration::from_secs(1));
    result
}

async fn run(config: BridgeConfig) -> Result<()> {
    info!(
        "Starting ptt-bridge for {} with {} bonded device(s)",
        config.base_location,
        config.devices.len()
    );

    let (handle, executor) = host_context();
    let mut controller = BridgeController::new(
        &config,
        Arc::new(config.registry()),
        Arc::new(config.connector()),
        handle,
        Handle::current(),
    )?;
    controller.start_once();

    // Deliveries run here, on the main task, never on the reader task
    let (host, writer) = StdioHost::spawn(tokio::io::stdout());
    tokio::select! {
        _ = executor.run(host) => {}
        _ = wait_for_stdin_eof() => info!("Host closed stdin, shutting down"),
        _ = tokio::signal::ctrl_c() => info!("Interrupted, shutting down"),
    }

    controller.teardown();
    controller.join().await;
    // Host is gone with the executor; let the writer drain
    let _ = writer.await;
    Ok(())
}
