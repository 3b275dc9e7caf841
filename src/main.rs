//! Kairos - AI-driven on-chain automation CLI
//!
#![doc = "Kairos - AI-driven on-chain automation CLI"]
#![doc = "Main entry point for the Kairos application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kairos::cli::{Cli, Commands};
use kairos::commands;
use kairos::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/kairos.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { classifier } => {
            tracing::info!("Starting interactive automation chat");
            if let Some(endpoint) = &classifier {
                tracing::debug!("Using classifier override: {}", endpoint);
            }
            commands::chat::run_chat(config, classifier).await?;
            Ok(())
        }
        Commands::Cancel { nonce } => {
            tracing::info!("Cancelling registered automation");
            if let Some(nonce) = nonce {
                tracing::debug!("Using nonce override: {}", nonce);
            }
            commands::cancel::run_cancel(config, nonce).await?;
            Ok(())
        }
        Commands::Status => {
            commands::status::run_status(config).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "kairos=debug" } else { "kairos=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
