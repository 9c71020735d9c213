use anyhow::Result;
use clap::{Parser, Subcommand};
use ratewatch::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Poll exchange rates and display them until interrupted
    Watch,
    /// Fetch exchange rates once and print them
    Once {
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command.unwrap_or(Commands::Watch) {
        Commands::Setup => ratewatch::cli::setup::setup(),
        Commands::Watch => {
            ratewatch::run_command(ratewatch::AppCommand::Watch, cli.config_path.as_deref()).await
        }
        Commands::Once { json } => {
            ratewatch::run_command(
                ratewatch::AppCommand::Once { json },
                cli.config_path.as_deref(),
            )
            .await
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
