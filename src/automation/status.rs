//! Automation lifecycle state machine
//!
//! Status is per connected account: `NoAutomation → Pending → Active →
//! {Cancelled, Executed}`. `Pending` covers the window between submitting
//! the create transaction and seeing it mined. Transitions are a pure
//! function so every guard is testable without a manager or a network.

use std::fmt;
use thiserror::Error;

/// Lifecycle status of the account's automation record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomationStatus {
    /// No automation has been registered (or the last one is settled)
    NoAutomation,
    /// A create transaction has been submitted but not yet mined
    Pending,
    /// The automation is registered and its trigger is being evaluated
    Active,
    /// The owner cancelled the automation
    Cancelled,
    /// The registry executed the automation's action
    Executed,
}

impl fmt::Display for AutomationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAutomation => write!(f, "none"),
            Self::Pending => write!(f, "pending"),
            Self::Active => write!(f, "active"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Executed => write!(f, "executed"),
        }
    }
}

/// Observable events that move the lifecycle forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomationEvent {
    /// The create transaction was accepted by the chain client
    CreateSubmitted,
    /// The create transaction was mined
    CreateMined,
    /// The create transaction failed or was dropped before mining
    CreateFailed,
    /// The cancel transaction was mined
    CancelMined,
    /// The registry executed the automation
    TriggerExecuted,
}

impl fmt::Display for AutomationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateSubmitted => write!(f, "create-submitted"),
            Self::CreateMined => write!(f, "create-mined"),
            Self::CreateFailed => write!(f, "create-failed"),
            Self::CancelMined => write!(f, "cancel-mined"),
            Self::TriggerExecuted => write!(f, "trigger-executed"),
        }
    }
}

/// An event arrived that the current status cannot accept
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot apply {event} while status is {from}")]
pub struct TransitionError {
    /// Status the lifecycle was in
    pub from: AutomationStatus,
    /// Event that was rejected
    pub event: AutomationEvent,
}

/// Applies an event to a status, rejecting anything the lifecycle forbids
pub fn transition(
    current: AutomationStatus,
    event: AutomationEvent,
) -> Result<AutomationStatus, TransitionError> {
    use AutomationEvent::*;
    use AutomationStatus::*;

    match (current, event) {
        (NoAutomation | Cancelled | Executed, CreateSubmitted) => Ok(Pending),
        (Pending, CreateMined) => Ok(Active),
        (Pending, CreateFailed) => Ok(NoAutomation),
        (Pending | Active, CancelMined) => Ok(Cancelled),
        (Active, TriggerExecuted) => Ok(Executed),
        _ => Err(TransitionError {
            from: current,
            event,
        }),
    }
}
