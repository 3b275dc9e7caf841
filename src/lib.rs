//! Kairos - AI-driven on-chain automation library
//!
//! This library turns free-text commands into automations registered with
//! an on-chain workflow registry: a classifier interprets the text, the
//! validator normalizes its untrusted output into a canonical descriptor,
//! the fee calculator and encoder produce the exact registration call, and
//! the lifecycle manager tracks the resulting record.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `classifier`: HTTP client for the free-text → workflow classifier
//! - `workflow`: canonical descriptor, payload validation, calldata encoding
//! - `registry`: registry contract client and fee calculation
//! - `automation`: lifecycle state machine and create/cancel orchestration
//! - `chat`: chat session model and per-turn pipeline orchestration
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//! - `cli`: command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use kairos::config::Config;
//! use kairos::cli::Cli;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/kairos.yaml", &Cli::default())?;
//!     config.validate()?;
//!
//!     // Pipeline usage would go here
//!     Ok(())
//! }
//! ```

pub mod automation;
pub mod chat;
pub mod classifier;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod registry;
pub mod workflow;

// Re-export commonly used types
pub use automation::{AutomationManager, AutomationStatus};
pub use chat::{ChatSession, Message, Role, TurnOutcome};
pub use classifier::{ClassifierClient, ClassifierReply};
pub use config::Config;
pub use error::{KairosError, Result, ValidationError};
pub use registry::{HttpRegistryClient, RegistryClient, TxHandle};
pub use workflow::{ActionType, EncodedAction, WorkflowDescriptor};

#[cfg(test)]
pub mod test_utils;
