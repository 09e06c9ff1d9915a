//! # Hydrolink monitor
//!
//! Connects to the tank-level and watering feeds of an irrigation
//! controller, logs every reading with its classification, and keeps
//! both connections alive until Ctrl-C.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use tracing::{info, warn};

use hydrolink::config::HydrolinkConfig;
use hydrolink::error::NetworkError;
use hydrolink::feeds::{TankLevelFeed, WateringFeed};
use hydrolink::logging::init_logging;
use hydrolink::types::{MoistureStatus, Reading, TankStatus};
use hydrolink::ws::TelemetryCallback;

/// Hydrolink - irrigation controller telemetry monitor
#[derive(Parser)]
#[command(name = "hydrolink-monitor")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path; defaults apply when the file is absent
    #[arg(short, long, default_value = "hydrolink.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Logs tank readings with their low/normal/full classification.
struct TankLogger;

#[async_trait]
impl TelemetryCallback for TankLogger {
    async fn on_reading(&self, reading: Reading) {
        let status = TankStatus::classify(reading.value);
        if status.is_low() {
            warn!(level = %reading.value, status = %status, "tank level low");
        } else {
            info!(level = %reading.value, status = %status, "tank level");
        }
    }

    async fn on_error(&self, error: NetworkError) {
        warn!(feed = "tank", error = %error, "feed error");
    }
}

/// Logs moisture readings with their dry/moderate/wet classification.
struct WateringLogger;

#[async_trait]
impl TelemetryCallback for WateringLogger {
    async fn on_reading(&self, reading: Reading) {
        let status = MoistureStatus::classify(reading.value.as_f64());
        info!(moisture = %reading.value, status = %status, "soil moisture");
    }

    async fn on_error(&self, error: NetworkError) {
        warn!(feed = "watering", error = %error, "feed error");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = if std::path::Path::new(&cli.config).exists() {
        HydrolinkConfig::load(&cli.config)
            .with_context(|| format!("failed to load {}", cli.config))?
    } else {
        HydrolinkConfig::default()
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    init_logging(&config.logging).context("failed to initialize logging")?;

    info!(
        tank = %config.tank.url,
        watering = %config.watering.url,
        "starting hydrolink monitor"
    );

    let tank = TankLevelFeed::new(config.tank, Arc::new(TankLogger))
        .context("invalid tank feed configuration")?;
    let watering = WateringFeed::new(config.watering, Arc::new(WateringLogger))
        .context("invalid watering feed configuration")?;

    tank.start();
    watering.start();

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutdown signal received");

    tank.shutdown().await;
    watering.shutdown().await;

    // Give the supervisor tasks a moment to close their sockets.
    tokio::time::sleep(Duration::from_millis(100)).await;
    info!("hydrolink monitor stopped");

    Ok(())
}
