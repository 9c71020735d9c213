pub mod cli;
pub mod client;
pub mod core;
pub mod providers;

use crate::client::RateClient;
use crate::core::config::AppConfig;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Watch,
    Once { json: bool },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Rate watch starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let client = RateClient::from_config(&config)?;

    match command {
        AppCommand::Watch => cli::watch::run(client, &config).await,
        AppCommand::Once { json } => cli::once::run(client, &config, json).await,
    }
}
