//! Command-line interface definition for Kairos
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for the interactive automation chat, one-shot
//! cancellation, and lifecycle status inspection.

use clap::{Parser, Subcommand};

/// Kairos - AI-driven on-chain automation CLI
///
/// Describe a conditional on-chain action in plain language and Kairos
/// registers it with the automation registry contract.
#[derive(Parser, Debug, Clone)]
#[command(name = "kairos")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/kairos.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Sender account address (overrides the config file)
    #[arg(short, long, env = "KAIROS_ACCOUNT")]
    pub account: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Kairos
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive automation chat session
    Chat {
        /// Override the classifier endpoint from config
        #[arg(long)]
        classifier: Option<String>,
    },

    /// Cancel the currently registered automation
    Cancel {
        /// Registry nonce of the automation to cancel; when omitted the
        /// latest registered automation for the account is targeted
        #[arg(short, long)]
        nonce: Option<u64>,
    },

    /// Show the automation lifecycle status for the account
    Status,
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/kairos.yaml".to_string()),
            verbose: false,
            account: None,
            command: Commands::Status,
        }
    }
}
