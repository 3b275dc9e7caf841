//! Registry calldata encoding for workflow descriptors
//!
//! Serializes a [`WorkflowDescriptor`] into the exact ordered parameter
//! tuple the registry's `addAction` entry point expects. This is the
//! compatibility-critical boundary: get the field order or width wrong and
//! funds move to the wrong place, so the encoding is a pure function of the
//! descriptor and every variant has a decode counterpart for round-trip
//! verification.
//!
//! Trigger payload layouts (ABI head-encoded 32-byte words):
//!
//! - `PriceTrigger`:   (address recipient, uint96 triggerValue, uint256 amount, bool greaterThan)
//! - `ReceiveTrigger`: (address recipient, uint96 triggerValue, uint256 amount)
//! - `TimeTrigger`:    (address recipient, uint96 triggerValue, uint256 amount)

use crate::error::ValidationError;
use crate::workflow::descriptor::{ActionType, WorkflowDescriptor};
use alloy_primitives::{Address, Bytes, U256};

/// Width of one ABI word
const WORD: usize = 32;

/// Maximum bit width of the registry's packed trigger value
const TRIGGER_BITS: usize = 96;

/// The exact parameter tuple passed to the registry's `addAction` entry
/// point, tagged with the `actionType` discriminant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAction {
    /// ABI-encoded trigger payload (`userWorkflow` parameter)
    pub workflow: Bytes,
    /// `ActionType` wire discriminant (`uint8` parameter)
    pub action_type: u8,
    /// Transfer amount in the asset's smallest unit (`uint256` parameter)
    pub amount: U256,
    /// Asset address, zero for native (`address` parameter)
    pub token: Address,
}

/// Encodes a descriptor into the registry parameter tuple
///
/// Encoding is deterministic: identical descriptors always produce identical
/// encodings. The supported variants are matched exhaustively; a new
/// `ActionType` cannot be added without extending this function.
///
/// # Errors
///
/// Returns `ValueOutOfRange` if the trigger value does not fit the uint96
/// wire width. Nothing is ever truncated.
pub fn encode(descriptor: &WorkflowDescriptor) -> Result<EncodedAction, ValidationError> {
    if descriptor.trigger_value.bit_len() > TRIGGER_BITS {
        return Err(ValidationError::ValueOutOfRange {
            field: "trigger_value",
            value: descriptor.trigger_value.to_string(),
        });
    }

    let mut payload = Vec::with_capacity(4 * WORD);
    push_address(&mut payload, descriptor.recipient);
    push_u256(&mut payload, descriptor.trigger_value);
    push_u256(&mut payload, descriptor.amount);

    match descriptor.action_type {
        ActionType::PriceTrigger => push_bool(&mut payload, descriptor.greater_than),
        ActionType::ReceiveTrigger | ActionType::TimeTrigger => {}
    }

    Ok(EncodedAction {
        workflow: Bytes::from(payload),
        action_type: descriptor.action_type.discriminant(),
        amount: descriptor.amount,
        token: descriptor.token,
    })
}

/// Decodes a registry parameter tuple back into a descriptor
///
/// The inverse of [`encode`], used to verify round-trip stability. The
/// payload amount must agree with the tuple's top-level amount; a mismatch
/// means the tuple was not produced by this encoder.
///
/// # Errors
///
/// Returns a [`ValidationError`] for unknown discriminants, payloads of the
/// wrong length, dirty address or bool words, or trigger values outside the
/// wire width.
pub fn decode(action: &EncodedAction) -> Result<WorkflowDescriptor, ValidationError> {
    let action_type = ActionType::from_discriminant(action.action_type).ok_or_else(|| {
        ValidationError::UnsupportedAction(format!(
            "action type discriminant {}",
            action.action_type
        ))
    })?;

    let words = match action_type {
        ActionType::PriceTrigger => 4,
        ActionType::ReceiveTrigger | ActionType::TimeTrigger => 3,
    };
    if action.workflow.len() != words * WORD {
        return Err(ValidationError::TypeMismatch {
            field: "workflow".to_string(),
            expected: "head-encoded trigger payload",
        });
    }

    let recipient = read_address(&action.workflow[..WORD])?;

    let trigger_value = U256::from_be_slice(&action.workflow[WORD..2 * WORD]);
    if trigger_value.bit_len() > TRIGGER_BITS {
        return Err(ValidationError::ValueOutOfRange {
            field: "trigger_value",
            value: trigger_value.to_string(),
        });
    }

    let amount = U256::from_be_slice(&action.workflow[2 * WORD..3 * WORD]);
    if amount != action.amount {
        return Err(ValidationError::TypeMismatch {
            field: "amount".to_string(),
            expected: "payload amount matching the tuple amount",
        });
    }

    let greater_than = match action_type {
        ActionType::PriceTrigger => read_bool(&action.workflow[3 * WORD..4 * WORD])?,
        ActionType::ReceiveTrigger | ActionType::TimeTrigger => true,
    };

    Ok(WorkflowDescriptor {
        action_type,
        token: action.token,
        recipient,
        amount,
        trigger_value,
        greater_than,
    })
}

fn push_address(payload: &mut Vec<u8>, address: Address) {
    payload.extend_from_slice(address.into_word().as_slice());
}

fn push_u256(payload: &mut Vec<u8>, value: U256) {
    payload.extend_from_slice(&value.to_be_bytes::<WORD>());
}

fn push_bool(payload: &mut Vec<u8>, value: bool) {
    let mut word = [0u8; WORD];
    word[WORD - 1] = value as u8;
    payload.extend_from_slice(&word);
}

fn read_address(word: &[u8]) -> Result<Address, ValidationError> {
    if word[..12].iter().any(|byte| *byte != 0) {
        return Err(ValidationError::InvalidAddress(
            "address word carries dirty upper bytes".to_string(),
        ));
    }
    Ok(Address::from_slice(&word[12..]))
}

fn read_bool(word: &[u8]) -> Result<bool, ValidationError> {
    if word[..WORD - 1].iter().any(|byte| *byte != 0) || word[WORD - 1] > 1 {
        return Err(ValidationError::TypeMismatch {
            field: "greater_than".to_string(),
            expected: "bool word",
        });
    }
    Ok(word[WORD - 1] == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_descriptor;
    use crate::workflow::descriptor::NATIVE_TOKEN;
    use std::str::FromStr;

    #[test]
    fn test_encode_is_deterministic() {
        let descriptor = sample_descriptor(ActionType::PriceTrigger);
        assert_eq!(encode(&descriptor).unwrap(), encode(&descriptor).unwrap());
    }

    #[test]
    fn test_encode_price_trigger_layout() {
        let descriptor = sample_descriptor(ActionType::PriceTrigger);
        let action = encode(&descriptor).unwrap();

        assert_eq!(action.action_type, 0);
        assert_eq!(action.amount, descriptor.amount);
        assert_eq!(action.token, NATIVE_TOKEN);
        assert_eq!(action.workflow.len(), 4 * 32);

        // Word 0: recipient, left-padded
        assert_eq!(&action.workflow[..12], &[0u8; 12]);
        assert_eq!(&action.workflow[12..32], descriptor.recipient.as_slice());
        // Word 1: trigger value
        assert_eq!(
            U256::from_be_slice(&action.workflow[32..64]),
            descriptor.trigger_value
        );
        // Word 2: amount
        assert_eq!(
            U256::from_be_slice(&action.workflow[64..96]),
            descriptor.amount
        );
        // Word 3: comparison flag
        assert_eq!(action.workflow[127], 1);
        assert_eq!(&action.workflow[96..127], &[0u8; 31]);
    }

    #[test]
    fn test_encode_receive_and_time_drop_comparison_word() {
        for action_type in [ActionType::ReceiveTrigger, ActionType::TimeTrigger] {
            let action = encode(&sample_descriptor(action_type)).unwrap();
            assert_eq!(action.workflow.len(), 3 * 32);
            assert_eq!(action.action_type, action_type.discriminant());
        }
    }

    #[test]
    fn test_encode_rejects_trigger_beyond_uint96() {
        let mut descriptor = sample_descriptor(ActionType::PriceTrigger);
        descriptor.trigger_value = U256::from(1u64) << 96;
        let err = encode(&descriptor).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::ValueOutOfRange {
                field: "trigger_value",
                ..
            }
        ));
    }

    #[test]
    fn test_encode_accepts_max_uint96_trigger() {
        let mut descriptor = sample_descriptor(ActionType::PriceTrigger);
        descriptor.trigger_value = (U256::from(1u64) << 96) - U256::from(1u64);
        assert!(encode(&descriptor).is_ok());
    }

    #[test]
    fn test_round_trip_all_variants() {
        for action_type in [
            ActionType::PriceTrigger,
            ActionType::ReceiveTrigger,
            ActionType::TimeTrigger,
        ] {
            let descriptor = sample_descriptor(action_type);
            let encoded = encode(&descriptor).unwrap();
            let decoded = decode(&encoded).unwrap();
            // encode(decode(encode(d))) == encode(d)
            assert_eq!(encode(&decoded).unwrap(), encoded);
        }
    }

    #[test]
    fn test_price_round_trip_preserves_descriptor() {
        let mut descriptor = sample_descriptor(ActionType::PriceTrigger);
        descriptor.greater_than = false;
        let decoded = decode(&encode(&descriptor).unwrap()).unwrap();
        assert_eq!(decoded, descriptor);
    }

    #[test]
    fn test_decode_rejects_unknown_discriminant() {
        let mut action = encode(&sample_descriptor(ActionType::PriceTrigger)).unwrap();
        action.action_type = 3;
        let err = decode(&action).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedAction(_)));
    }

    #[test]
    fn test_decode_rejects_truncated_payload() {
        let mut action = encode(&sample_descriptor(ActionType::PriceTrigger)).unwrap();
        action.workflow = Bytes::from(action.workflow[..96].to_vec());
        let err = decode(&action).unwrap_err();
        assert!(matches!(err, ValidationError::TypeMismatch { .. }));
    }

    #[test]
    fn test_decode_rejects_dirty_address_word() {
        let action = encode(&sample_descriptor(ActionType::PriceTrigger)).unwrap();
        let mut payload = action.workflow.to_vec();
        payload[0] = 0xff;
        let action = EncodedAction {
            workflow: Bytes::from(payload),
            ..action
        };
        let err = decode(&action).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidAddress(_)));
    }

    #[test]
    fn test_decode_rejects_dirty_bool_word() {
        let action = encode(&sample_descriptor(ActionType::PriceTrigger)).unwrap();
        let mut payload = action.workflow.to_vec();
        payload[127] = 2;
        let action = EncodedAction {
            workflow: Bytes::from(payload),
            ..action
        };
        let err = decode(&action).unwrap_err();
        assert!(matches!(err, ValidationError::TypeMismatch { .. }));
    }

    #[test]
    fn test_decode_rejects_amount_mismatch() {
        let mut action = encode(&sample_descriptor(ActionType::PriceTrigger)).unwrap();
        action.amount = action.amount + U256::from(1u64);
        let err = decode(&action).unwrap_err();
        assert!(matches!(err, ValidationError::TypeMismatch { .. }));
    }

    #[test]
    fn test_encoding_matches_known_vector() {
        // Mirrors the ethers AbiCoder.encode(["address","uint96","uint256","bool"], ...)
        // layout the deployed registry consumes.
        let descriptor = WorkflowDescriptor {
            action_type: ActionType::PriceTrigger,
            token: NATIVE_TOKEN,
            recipient: Address::from_str("0x70997970C51812dc3A010C7d01b50e0d17dc79C8").unwrap(),
            amount: U256::from(100_000_000_000_000_000u64),
            trigger_value: U256::from(2000u64),
            greater_than: true,
        };
        let action = encode(&descriptor).unwrap();
        let expected = concat!(
            "00000000000000000000000070997970c51812dc3a010c7d01b50e0d17dc79c8",
            "00000000000000000000000000000000000000000000000000000000000007d0",
            "000000000000000000000000000000000000000000000000016345785d8a0000",
            "0000000000000000000000000000000000000000000000000000000000000001",
        );
        assert_eq!(alloy_primitives::hex::encode(&action.workflow), expected);
    }
}
