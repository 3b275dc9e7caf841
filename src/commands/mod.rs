/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `chat`   — Interactive automation chat session
- `cancel` — One-shot cancellation of the registered automation
- `status` — Lifecycle status inspection

These handlers are intentionally small and use the library components:
the classifier client, the registry client, and the lifecycle manager.
*/

use crate::chat::{ChatSession, Role};

/// In-session commands recognized by the chat REPL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Leave the session
    Quit,
    /// Print command help
    Help,
    /// Print the lifecycle status
    Status,
    /// Cancel the registered automation
    Cancel,
}

/// Parses a slash command typed into the REPL; `None` means plain chat text
pub fn parse_command(line: &str) -> Option<SessionCommand> {
    match line.trim().to_lowercase().as_str() {
        "/quit" | "/exit" | "/q" => Some(SessionCommand::Quit),
        "/help" | "/?" => Some(SessionCommand::Help),
        "/status" => Some(SessionCommand::Status),
        "/cancel" => Some(SessionCommand::Cancel),
        _ => None,
    }
}

/// Prints every non-user message appended after `from`
///
/// The user's own input is already visible on the terminal line they typed
/// it on, so only assistant and error messages are echoed.
fn print_new_messages(session: &ChatSession, from: usize) {
    for message in &session.messages()[from..] {
        if message.role != Role::User {
            println!("{}", message.render());
        }
    }
}

fn print_help() {
    println!("Describe an automation in plain language, e.g.:");
    println!("  send 0.1 ETH to 0xabc... when the price of ETH reaches 2000");
    println!();
    println!("Session commands:");
    println!("  /status   show the automation lifecycle status");
    println!("  /cancel   cancel your scheduled automation");
    println!("  /help     show this help");
    println!("  /quit     leave the session");
}

// Chat command handler
pub mod chat {
    //! Interactive chat session handler.
    //!
    //! Instantiates the classifier and registry clients, creates an
    //! `AutomationManager`, and runs a readline-based loop that submits
    //! user input to the pipeline one turn at a time. Turns are processed
    //! sequentially, which is what serializes sends per session.

    use super::*;
    use crate::automation::AutomationManager;
    use crate::classifier::ClassifierClient;
    use crate::config::Config;
    use crate::error::{KairosError, Result};
    use crate::registry::HttpRegistryClient;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;
    use std::sync::Arc;

    /// Start an interactive automation chat session
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `classifier_override` - Optional endpoint override from the CLI
    ///
    /// # Errors
    ///
    /// Returns error if no account is connected or a client fails to
    /// initialize; in-session failures surface as chat error messages and
    /// never end the loop.
    pub async fn run_chat(config: Config, classifier_override: Option<String>) -> Result<()> {
        let account = config.sender_account()?;

        let mut classifier_config = config.classifier.clone();
        if let Some(endpoint) = classifier_override {
            classifier_config.endpoint = endpoint;
        }
        let classifier = ClassifierClient::new(&classifier_config)?;

        let registry = Arc::new(HttpRegistryClient::new(&config.chain, &config.registry)?);
        let manager = AutomationManager::new(registry, account);
        let tokens = config.token_table()?;
        let mut session = ChatSession::new(account);

        println!("{} v{}", "kairos".green().bold(), env!("CARGO_PKG_VERSION"));
        println!("Connected account: {}", account);
        println!("Type /help for session commands.");
        println!();

        let mut editor = DefaultEditor::new()
            .map_err(|e| KairosError::Config(format!("Failed to initialize readline: {}", e)))?;

        loop {
            match editor.readline(">> ") {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = editor.add_history_entry(&line);

                    match parse_command(&line) {
                        Some(SessionCommand::Quit) => break,
                        Some(SessionCommand::Help) => {
                            print_help();
                            continue;
                        }
                        Some(SessionCommand::Status) => {
                            println!("Automation status: {}", manager.status().await);
                            continue;
                        }
                        Some(SessionCommand::Cancel) => {
                            let before = session.len();
                            crate::chat::run_cancel(&mut session, &manager).await;
                            print_new_messages(&session, before);
                            continue;
                        }
                        None => {}
                    }

                    let before = session.len();
                    crate::chat::run_turn(&mut session, &classifier, &manager, &tokens, &line)
                        .await;
                    print_new_messages(&session, before);
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => {
                    tracing::error!("Readline error: {}", e);
                    break;
                }
            }
        }

        println!("Goodbye.");
        Ok(())
    }
}

// One-shot cancel command handler
pub mod cancel {
    //! Cancels the account's registered automation without a chat session.
    //!
    //! A fresh process does not know the automation's nonce, so it is
    //! either supplied with `--nonce` or derived from the registry's
    //! next-nonce view (latest registered = next - 1). If that automation
    //! is already settled the registry reverts and the error is surfaced.

    use crate::automation::AutomationManager;
    use crate::config::Config;
    use crate::error::{KairosError, Result};
    use crate::registry::{HttpRegistryClient, RegistryClient};
    use alloy_primitives::U256;
    use std::sync::Arc;

    /// Cancel the registered automation for the configured account
    ///
    /// # Errors
    ///
    /// Returns `NoAccountConnected` without an account, `NoActiveAutomation`
    /// when the account never registered one, and registry-layer errors
    /// from the submission.
    pub async fn run_cancel(config: Config, nonce_override: Option<u64>) -> Result<()> {
        let account = config.sender_account()?;
        let registry = Arc::new(HttpRegistryClient::new(&config.chain, &config.registry)?);

        let nonce = match nonce_override {
            Some(nonce) => U256::from(nonce),
            None => {
                let next = registry.next_action_nonce(account).await?;
                if next.is_zero() {
                    return Err(KairosError::NoActiveAutomation.into());
                }
                next - U256::from(1u64)
            }
        };

        let manager = AutomationManager::with_active(registry, account, nonce);
        let handle = manager.cancel().await?;
        println!("Cancellation submitted: {}", handle.hash);
        Ok(())
    }
}

// Status command handler
pub mod status {
    //! Prints the automation registration state for the account.

    use crate::config::Config;
    use crate::error::Result;
    use crate::registry::{HttpRegistryClient, RegistryClient};
    use alloy_primitives::U256;

    /// Show registration status for the configured account
    pub async fn run_status(config: Config) -> Result<()> {
        let account = config.sender_account()?;
        let registry = HttpRegistryClient::new(&config.chain, &config.registry)?;

        let next = registry.next_action_nonce(account).await?;

        println!("Account:  {}", account);
        println!("Registry: {}", config.registry.address);
        println!(
            "Chain:    {} (chain id {})",
            config.chain.rpc_url, config.chain.chain_id
        );
        if next.is_zero() {
            println!("No automation has been registered by this account.");
        } else {
            println!(
                "Automations registered: {} (latest nonce {})",
                next,
                next - U256::from(1u64)
            );
        }
        Ok(())
    }
}
