//! Protocol fee and attached-value calculation
//!
//! The registration call must carry the protocol fee, and for native-asset
//! automations also the principal itself. Token principal is moved by the
//! registry through a separate allowance mechanism, so token registrations
//! attach only the fee.

use crate::error::{KairosError, Result};
use crate::workflow::WorkflowDescriptor;
use alloy_primitives::U256;

/// A fee quote paired with the value the registration call must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeQuote {
    /// Protocol fee quoted by the registry for this amount
    pub fee: U256,
    /// Native value to attach to the `addAction` call
    pub attached_value: U256,
}

/// Computes the value to attach to a registration call
///
/// For the native asset the call carries both the principal and the fee;
/// for tokens only the fee. The fee must come from a fresh
/// [`RegistryClient::calculate_fee`](crate::registry::RegistryClient::calculate_fee)
/// read; fee schedules may change between registrations, so quotes are
/// never cached.
///
/// # Errors
///
/// Returns `FeeQuoteUnavailable` if `amount + fee` overflows; arithmetic
/// never wraps.
pub fn compute_value(descriptor: &WorkflowDescriptor, fee: U256) -> Result<FeeQuote> {
    let attached_value = if descriptor.is_native() {
        descriptor.amount.checked_add(fee).ok_or_else(|| {
            KairosError::FeeQuoteUnavailable(
                "attached value overflows uint256".to_string(),
            )
        })?
    } else {
        fee
    };

    Ok(FeeQuote {
        fee,
        attached_value,
    })
}
