//! Canonical workflow descriptor types
//!
//! A [`WorkflowDescriptor`] is the single in-memory shape every automation
//! intent is normalized into before money-moving decisions are made. The
//! registry historically grew three incompatible encodings of the same
//! intent; everything downstream of the validator speaks only this type.

use alloy_primitives::{Address, U256};
use std::fmt;

/// Reserved address denoting the chain's native asset rather than a token
/// contract
pub const NATIVE_TOKEN: Address = Address::ZERO;

/// Trigger variant of an automation, with the registry's `uint8` wire
/// discriminants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ActionType {
    /// Fires when an asset price crosses the trigger value
    PriceTrigger = 0,
    /// Fires when the owner receives at least the trigger value
    ReceiveTrigger = 1,
    /// Fires once the trigger value (unix seconds) has passed
    TimeTrigger = 2,
}

impl ActionType {
    /// The `uint8` discriminant the registry contract expects
    pub fn discriminant(self) -> u8 {
        self as u8
    }

    /// Maps a wire discriminant back onto the enum
    ///
    /// Returns `None` for anything outside the three supported variants;
    /// callers must treat that as a hard failure, never a default.
    pub fn from_discriminant(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::PriceTrigger),
            1 => Some(Self::ReceiveTrigger),
            2 => Some(Self::TimeTrigger),
            _ => None,
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PriceTrigger => write!(f, "price"),
            Self::ReceiveTrigger => write!(f, "receive"),
            Self::TimeTrigger => write!(f, "time"),
        }
    }
}

/// Canonical, fully validated automation intent
///
/// Invariants guaranteed by the validator: `amount > 0`, `recipient` is a
/// well-formed non-zero address, `token` is a well-formed address or
/// [`NATIVE_TOKEN`], and `amount` is already expanded to the asset's
/// smallest unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowDescriptor {
    /// Which trigger variant the registry should evaluate
    pub action_type: ActionType,
    /// Asset to move; [`NATIVE_TOKEN`] for the chain's native currency
    pub token: Address,
    /// Destination of the transfer once the trigger fires
    pub recipient: Address,
    /// Transfer amount in the asset's smallest unit
    pub amount: U256,
    /// Trigger threshold: price level, minimum received amount, or unix
    /// timestamp depending on `action_type`
    pub trigger_value: U256,
    /// Comparison direction for price triggers; meaningless otherwise
    pub greater_than: bool,
}

impl WorkflowDescriptor {
    /// Whether this automation moves the chain's native asset
    pub fn is_native(&self) -> bool {
        self.token == NATIVE_TOKEN
    }
}
