//! # webchat-bridge
//!
//! Line-oriented driver for the web-chat bridge.
//!
//! - `webchat-bridge` reads host events (one JSON object per line) from
//!   stdin and writes every broadcast wire message as one JSON line to stdout
//! - `webchat-bridge history <server-id> [limit]` prints stored history,
//!   newest first
//!
//! Logs go to stderr so stdout stays a clean message stream.

use std::sync::Arc;

use anyhow::{bail, Context};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use webchat_bridge::{Bridge, BridgeConfig, HostEvent, HostState};
use webchat_shared::builder::build_historic;
use webchat_store::HistoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,webchat_bridge=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting web-chat bridge v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = BridgeConfig::from_env();
    info!(?config, "Loaded configuration");

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None => run(config).await,
        Some("history") => print_history(&config, &args[1..]),
        Some(other) => bail!("unknown command: {other} (expected `history` or no command)"),
    }
}

async fn run(config: BridgeConfig) -> anyhow::Result<()> {
    let host = Arc::new(HostState::default());
    let bridge = Bridge::open(host, config);

    // -----------------------------------------------------------------------
    // 3. Forward broadcasts to stdout
    // -----------------------------------------------------------------------
    let mut rx = bridge.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(message) => match message.to_json() {
                    Ok(line) => println!("{line}"),
                    Err(e) => warn!(error = %e, "failed to serialize wire message"),
                },
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "stdout subscriber lagged, messages dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // -----------------------------------------------------------------------
    // 4. Feed host events until stdin closes or Ctrl+C
    // -----------------------------------------------------------------------
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read host events")? else {
                    info!("Host event stream closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                let result = HostEvent::parse(&line).and_then(|event| bridge.handle(&event));
                if let Err(e) = result {
                    warn!(error = %e, "dropping host event");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
                break;
            }
        }
    }

    // -----------------------------------------------------------------------
    // 5. Drain history and close the store; dropping the bridge ends the printer
    // -----------------------------------------------------------------------
    bridge.shutdown().await;
    printer.await.context("stdout printer failed")?;

    Ok(())
}

fn print_history(config: &BridgeConfig, args: &[String]) -> anyhow::Result<()> {
    let server_id = args
        .first()
        .context("usage: webchat-bridge history <server-id> [limit]")?;
    let limit = match args.get(1) {
        Some(raw) => raw
            .parse::<u32>()
            .with_context(|| format!("invalid limit: {raw}"))?,
        None => config.history_limit,
    };

    let store = HistoryStore::open_in(&config.game_dir).context("failed to open chat history")?;

    for record in store.query(server_id, limit) {
        match build_historic(&record) {
            Ok(message) => println!("{}", message.to_json()?),
            Err(e) => warn!(id = record.id, error = %e, "skipping unreadable history row"),
        }
    }

    store.close()?;
    Ok(())
}
