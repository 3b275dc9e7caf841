//! Chat session model and per-turn orchestration
//!
//! A [`ChatSession`] owns an ordered, append-only message sequence scoped to
//! one connected account; it holds no state beyond that and dies with the
//! process. [`run_turn`] drives one user turn through the pipeline:
//! classifier → validator → fee/encode/submit via the lifecycle manager.
//! Every failure degrades to an error message in the session, and messages
//! are only ever appended for operations that were actually invoked.

use crate::automation::AutomationManager;
use crate::classifier::{ClassifierClient, ClassifierReply};
use crate::config::TokenTable;
use crate::registry::TxHandle;
use crate::workflow;
use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::fmt;

/// Who produced a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The human operating the session
    User,
    /// Classifier replies and pipeline confirmations
    Assistant,
    /// Failures surfaced into the conversation
    Error,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One immutable chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Message author
    pub role: Role,
    /// Message text
    pub content: String,
    /// Append time
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Creates a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Creates a new error message
    pub fn error(content: impl Into<String>) -> Self {
        Self::new(Role::Error, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Renders the message with a colored role tag for terminal output
    pub fn render(&self) -> String {
        let tag = match self.role {
            Role::User => "you".blue().bold(),
            Role::Assistant => "kairos".green().bold(),
            Role::Error => "error".red().bold(),
        };
        format!("{} {}", tag, self.content)
    }
}

/// Ephemeral conversation scoped to one connected account
///
/// Messages are append-only; nothing is ever edited or removed, so the
/// visible sequence is a faithful record of what was actually invoked.
#[derive(Debug, Clone)]
pub struct ChatSession {
    account: Address,
    messages: Vec<Message>,
}

impl ChatSession {
    /// Creates an empty session for an account
    pub fn new(account: Address) -> Self {
        Self {
            account,
            messages: Vec::new(),
        }
    }

    /// The connected account this session speaks for
    pub fn account(&self) -> Address {
        self.account
    }

    /// All messages in append order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages appended so far
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether no message has been appended yet
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Appends a user message
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    /// Appends an assistant message
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// Appends an error message
    pub fn push_error(&mut self, content: impl Into<String>) {
        self.messages.push(Message::error(content));
    }
}

/// What a completed turn did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Conversational reply only; no registry interaction
    Replied,
    /// An automation or cancellation transaction was submitted
    Submitted(TxHandle),
    /// The turn failed; an error message was appended
    Failed,
}

/// Drives one user turn through the pipeline
///
/// Appends the user message, calls the classifier, and on
/// `automation_ready` runs validation → fee → encode → submit through the
/// lifecycle manager. Any failure appends an error message and leaves all
/// other state as it was before the failed stage; in particular no
/// transaction is submitted after a validation or encoding failure.
pub async fn run_turn(
    session: &mut ChatSession,
    classifier: &ClassifierClient,
    manager: &AutomationManager,
    tokens: &TokenTable,
    text: &str,
) -> TurnOutcome {
    session.push_user(text);

    let reply = match classifier.ask(text, session.account()).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!("Classifier turn failed: {}", e);
            session.push_error("Error contacting the classifier backend.");
            return TurnOutcome::Failed;
        }
    };

    match reply {
        ClassifierReply::Message { text } | ClassifierReply::Incomplete { text } => {
            session.push_assistant(text);
            TurnOutcome::Replied
        }
        ClassifierReply::AutomationReady { prompt, workflow } => {
            session.push_assistant(prompt);

            let descriptor = match workflow::validate(&workflow, tokens) {
                Ok(descriptor) => descriptor,
                Err(e) => {
                    tracing::warn!("Classifier workflow rejected: {}", e);
                    session.push_error(format!("Could not schedule the automation: {}", e));
                    return TurnOutcome::Failed;
                }
            };

            match manager.create(&descriptor).await {
                Ok(handle) => {
                    session.push_assistant(format!(
                        "Automation submitted in transaction {}.",
                        handle.hash
                    ));
                    TurnOutcome::Submitted(handle)
                }
                Err(e) => {
                    session.push_error(format!("Could not schedule the automation: {}", e));
                    TurnOutcome::Failed
                }
            }
        }
    }
}

/// Cancels the session's automation, surfacing the result in the chat
///
/// Bypasses the encoding stages entirely; only the lifecycle manager is
/// involved.
pub async fn run_cancel(session: &mut ChatSession, manager: &AutomationManager) -> TurnOutcome {
    match manager.cancel().await {
        Ok(handle) => {
            session.push_assistant("Your scheduled action has been cancelled.");
            TurnOutcome::Submitted(handle)
        }
        Err(e) => {
            tracing::warn!("Cancellation failed: {}", e);
            session.push_error(format!("Failed to cancel your action: {}", e));
            TurnOutcome::Failed
        }
    }
}
