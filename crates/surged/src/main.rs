//! surged — the Surge autoscaler daemon.
//!
//! Wires the VM service client, the scaling policy, and the alarm
//! intake together. Two modes:
//!
//! ```text
//! surged serve --port 9401          # webhook server, runs until ctrl-c
//! surged handle --event alarm.json  # one-shot: handle a single event, exit
//! ```
//!
//! `handle` with no `--event` reads the notification JSON from stdin,
//! which is how an invocation harness pipes events in. Success is exit
//! code 0 (including no-op); any propagated failure is non-zero.

use std::io::Read;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::info;

use surge_autoscale::Scaler;
use surge_core::ScalerConfig;
use surge_provider::HttpProvider;
use surge_trigger::AlarmWebhook;

#[derive(Parser)]
#[command(name = "surged", about = "Surge autoscaler daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the alarm webhook server.
    Serve {
        /// Port to listen on.
        #[arg(long, default_value = "9401")]
        port: u16,
    },
    /// Handle a single alarm notification and exit.
    Handle {
        /// Path to the notification JSON; stdin when omitted.
        #[arg(long)]
        event: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up a local .env before config loading; absence is fine.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,surged=debug,surge_autoscale=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    // Fail fast: no event is processed on a broken configuration.
    let config = ScalerConfig::from_env().context("configuration error")?;
    let provider = HttpProvider::new(
        config.provider_endpoint.clone(),
        config.region.clone(),
        config.provider_token.clone(),
    );
    let scaler = Arc::new(Scaler::new(provider, config));

    match cli.command {
        Command::Serve { port } => run_serve(scaler, port).await,
        Command::Handle { event } => run_handle(scaler, event).await,
    }
}

async fn run_serve(scaler: Arc<Scaler<HttpProvider>>, port: u16) -> anyhow::Result<()> {
    info!(
        project = %scaler.config().project_name,
        min = scaler.config().bounds.min_workers,
        max = scaler.config().bounds.max_workers,
        "surge daemon starting"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let webhook = AlarmWebhook::new(addr, scaler);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    webhook.serve(shutdown_rx).await
}

async fn run_handle(
    scaler: Arc<Scaler<HttpProvider>>,
    event: Option<PathBuf>,
) -> anyhow::Result<()> {
    let body = match event {
        Some(path) => std::fs::read(&path)
            .with_context(|| format!("failed to read event file {}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read event from stdin")?;
            buf
        }
    };

    let alarm = surge_trigger::parse_notification(&body)?;
    let action = scaler.handle_alarm(&alarm).await?;

    // One machine-readable line for the harness; the human trace went
    // through tracing already.
    println!("{}", serde_json::to_string(&action)?);
    Ok(())
}
