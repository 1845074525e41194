//! Frameline review-room service - Main entry point
//!
//! Hosts one review room per catalog resource: playback session state,
//! timestamped comment threads with timeline pins, highlight/skip
//! coordination, and presence, over an HTTP/SSE control interface.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use frameline_common::config::Config;
use frameline_server::catalog::Catalog;
use frameline_server::{api, SharedState};

/// Command-line arguments for frameline-server
#[derive(Parser, Debug)]
#[command(name = "frameline-server")]
#[command(about = "Review-room service for timestamped media comments")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "FRAMELINE_PORT")]
    port: Option<u16>,

    /// Path to the TOML config file
    #[arg(short, long, env = "FRAMELINE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "frameline_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command-line arguments
    let args = Args::parse();

    let config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    let port = args.port.unwrap_or(config.server.port);

    let catalog = Catalog::from_config(config.resources);
    info!(
        "Starting frameline review-room service on port {} ({} resources)",
        port,
        catalog.all().len()
    );

    let state = Arc::new(SharedState::new(catalog));

    let server = api::run(port, state);
    tokio::select! {
        result = server => result.context("Server error")?,
        _ = shutdown_signal() => {}
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
