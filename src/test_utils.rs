//! Shared helpers for unit tests
//!
//! Fixed addresses and descriptor builders used across module test suites.

use crate::config::{TokenConfig, TokenTable};
use crate::workflow::{ActionType, WorkflowDescriptor, NATIVE_TOKEN};
use alloy_primitives::{Address, U256};
use std::str::FromStr;

/// Well-known recipient address used throughout the tests
pub const RECIPIENT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

/// Token contract address standing in for USDC (6 decimals)
pub const USDC: &str = "0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238";

/// Sender account address used throughout the tests
pub const ACCOUNT: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

/// The test sender account, parsed
pub fn account() -> Address {
    Address::from_str(ACCOUNT).unwrap()
}

/// A token table with the native asset and one 6-decimal token
pub fn sample_tokens() -> TokenTable {
    TokenTable::from_config(&[
        TokenConfig {
            symbol: "ETH".to_string(),
            address: "0x0000000000000000000000000000000000000000".to_string(),
            decimals: 18,
        },
        TokenConfig {
            symbol: "USDC".to_string(),
            address: USDC.to_string(),
            decimals: 6,
        },
    ])
    .unwrap()
}

/// A valid native-asset descriptor: 0.1 ETH to [`RECIPIENT`] at trigger 2000
pub fn sample_descriptor(action_type: ActionType) -> WorkflowDescriptor {
    WorkflowDescriptor {
        action_type,
        token: NATIVE_TOKEN,
        recipient: Address::from_str(RECIPIENT).unwrap(),
        amount: U256::from(10u64).pow(U256::from(17)),
        trigger_value: U256::from(2000u64),
        greater_than: true,
    }
}
