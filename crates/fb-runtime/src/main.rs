//! # FoodBridge Runtime
//!
//! Local demo driver for the FoodBridge donation platform.
//!
//! ## Startup Sequence
//!
//! 1. Install the tracing subscriber (`RUST_LOG`, default `info`)
//! 2. Load configuration from `FB_*` environment variables
//! 3. Initialize subsystems (Lifecycle, then Logistics)
//! 4. Start the event log, seed demo data
//! 5. Run the demo scenario, then shut down gracefully

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use fb_01_donation_lifecycle::{SystemTimeSource, UuidIdGenerator};
use fb_runtime::{FoodBridgeRuntime, RuntimeConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .try_init()
        .map_err(|err| anyhow!("Failed to install tracing subscriber: {err}"))?;

    let config = RuntimeConfig::from_env();
    config.validate().context("Invalid runtime configuration")?;

    let mut runtime = FoodBridgeRuntime::new(
        config,
        Arc::new(SystemTimeSource),
        Arc::new(UuidIdGenerator),
    );

    if let Some(seed) = runtime.start()? {
        let report = runtime.run_demo_scenario(&seed)?;
        info!(
            donation_id = %report.donation_id,
            certificate_id = %report.certificate_id,
            "Scenario report ready"
        );
    } else {
        info!("No demo data loaded. Press Ctrl+C to stop.");
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl+C")?;
    }

    runtime.shutdown().await;
    Ok(())
}
