//! loxflux - Loxone UDP logs into InfluxDB
//!
//! This application listens for the Loxone controller's UDP log lines,
//! parses each one into a data point and writes it to InfluxDB.

use clap::Parser;
use std::sync::Arc;

use loxflux::{
    Cli, Config, IngestionLoop, InfluxSink, MessageProcessor, Result, UdpSource,
};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        tracing::error!(error = %e, "loxflux stopped");
        eprintln!("loxflux: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run() -> Result<()> {
    // Load configuration from environment, then apply command-line flags
    let mut config = Config::from_env()?;
    Cli::parse().apply(&mut config);

    // Validate configuration
    config.validate()?;

    // Initialize logging/tracing
    loxflux::logging::init_tracing(&config.logging)?;

    // Log configuration (with sensitive data masked)
    config.log_config();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting loxflux");

    let sink = Arc::new(InfluxSink::new(&config.influx)?);
    let source = UdpSource::bind(&config.listener).await?;
    let ingestion = IngestionLoop::new(source, MessageProcessor::new(sink));

    tokio::select! {
        _ = ingestion.run() => {},
        _ = shutdown_signal() => {},
    }

    tracing::info!("loxflux shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }
}
