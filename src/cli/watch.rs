use super::display::RateDisplay;
use crate::client::RateClient;
use crate::core::config::AppConfig;
use anyhow::{Context, Result};
use tracing::info;

/// Polls and renders rates until Ctrl-C.
pub async fn run(client: RateClient, config: &AppConfig) -> Result<()> {
    let mut display = RateDisplay::new(client, config);
    display.activate()?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    info!("Interrupted, stopping");

    display.deactivate();
    Ok(())
}
