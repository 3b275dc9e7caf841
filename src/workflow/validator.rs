//! Validation of untrusted classifier workflow payloads
//!
//! The classifier returns a flat, loosely-typed JSON object (`trigger_type`,
//! `trigger_operator`, `trigger_value`, `action_amount`, `action_to`,
//! `action_token`, ...). This module is the only place that payload is
//! touched: every field is checked, amounts are expanded to the asset's
//! smallest unit, and anything outside its allowed domain is a hard failure.
//! No field is ever coerced or silently defaulted into something usable.

use crate::config::TokenTable;
use crate::error::ValidationError;
use crate::workflow::descriptor::{ActionType, WorkflowDescriptor, NATIVE_TOKEN};
use alloy_primitives::{Address, U256};
use serde_json::{Map, Value};
use std::str::FromStr;

/// Validates and normalizes a raw classifier workflow into the canonical
/// descriptor
///
/// # Arguments
///
/// * `raw` - The untrusted `workflow` object from an `automation_ready` reply
/// * `tokens` - Token table used to resolve asset symbols and decimals
///
/// # Errors
///
/// Returns a [`ValidationError`] naming the first offending field. The
/// caller surfaces this as a chat error message; nothing downstream of this
/// function ever sees an unvalidated value.
pub fn validate(raw: &Value, tokens: &TokenTable) -> Result<WorkflowDescriptor, ValidationError> {
    let workflow = raw
        .as_object()
        .ok_or_else(|| ValidationError::TypeMismatch {
            field: "workflow".to_string(),
            expected: "object",
        })?;

    let action_type = parse_trigger_type(required_str(workflow, "trigger_type")?)?;

    let recipient = parse_address(required_str(workflow, "action_to")?, "action_to")?;
    if recipient == Address::ZERO {
        return Err(ValidationError::InvalidAddress(
            "recipient is the zero address".to_string(),
        ));
    }

    let (token, decimals) = resolve_token(workflow, tokens)?;

    let amount_text = numeric_field(workflow, "action_amount")?;
    let amount = parse_decimal(&amount_text, decimals)
        .map_err(|reason| ValidationError::InvalidAmount(format!("{}: {}", amount_text, reason)))?;
    if amount.is_zero() {
        return Err(ValidationError::InvalidAmount(
            "amount must be greater than zero".to_string(),
        ));
    }

    let trigger_text = numeric_field(workflow, "trigger_value")?;
    let trigger_value =
        parse_decimal(&trigger_text, 0).map_err(|_| ValidationError::TypeMismatch {
            field: "trigger_value".to_string(),
            expected: "unsigned integer",
        })?;

    let greater_than = match action_type {
        ActionType::PriceTrigger => {
            parse_operator(required_str(workflow, "trigger_operator")?)?
        }
        // Comparison direction is meaningless for receive/time triggers
        _ => true,
    };

    Ok(WorkflowDescriptor {
        action_type,
        token,
        recipient,
        amount,
        trigger_value,
        greater_than,
    })
}

/// Maps the classifier's trigger vocabulary onto [`ActionType`]
fn parse_trigger_type(raw: &str) -> Result<ActionType, ValidationError> {
    match raw.to_lowercase().as_str() {
        "price" => Ok(ActionType::PriceTrigger),
        "balance" | "receive" => Ok(ActionType::ReceiveTrigger),
        "time" => Ok(ActionType::TimeTrigger),
        other => Err(ValidationError::UnsupportedAction(format!(
            "trigger type `{}`",
            other
        ))),
    }
}

/// Maps a comparison operator onto the price trigger's direction flag
///
/// Equality is representable in the classifier vocabulary but not on the
/// registry wire, so it is rejected rather than approximated.
fn parse_operator(raw: &str) -> Result<bool, ValidationError> {
    match raw {
        ">=" | ">" => Ok(true),
        "<=" | "<" => Ok(false),
        other => Err(ValidationError::UnsupportedAction(format!(
            "comparison operator `{}`",
            other
        ))),
    }
}

/// Resolves the `action_token` field to an address and decimal precision
///
/// An absent or empty token field means the native asset (the classifier
/// omits it for plain native transfers). A hex value is parsed as an
/// address; anything else is treated as a symbol and must resolve through
/// the token table.
fn resolve_token(
    workflow: &Map<String, Value>,
    tokens: &TokenTable,
) -> Result<(Address, u8), ValidationError> {
    let raw = match workflow.get("action_token") {
        None | Some(Value::Null) => return Ok((NATIVE_TOKEN, 18)),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok((NATIVE_TOKEN, 18)),
        Some(Value::String(s)) => s.trim(),
        Some(_) => {
            return Err(ValidationError::TypeMismatch {
                field: "action_token".to_string(),
                expected: "string",
            })
        }
    };

    if raw.starts_with("0x") || raw.starts_with("0X") {
        let address = parse_address(raw, "action_token")?;
        return Ok((address, tokens.decimals_for(&address)));
    }

    let entry = tokens.resolve(raw).ok_or_else(|| {
        ValidationError::InvalidAddress(format!("unknown token symbol `{}`", raw))
    })?;
    Ok((entry.address, entry.decimals))
}

/// Extracts a required, non-empty string field
///
/// The classifier emits `""` for values it could not determine, so an empty
/// string is reported as missing rather than malformed.
fn required_str<'a>(
    workflow: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a str, ValidationError> {
    match workflow.get(field) {
        None | Some(Value::Null) => Err(ValidationError::MissingField(field.to_string())),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Err(ValidationError::MissingField(field.to_string()))
            } else {
                Ok(trimmed)
            }
        }
        Some(_) => Err(ValidationError::TypeMismatch {
            field: field.to_string(),
            expected: "string",
        }),
    }
}

/// Extracts a required numeric field as its decimal text form
///
/// The classifier is inconsistent about emitting numbers vs numeric strings;
/// both are accepted, everything else is a type mismatch.
fn numeric_field(workflow: &Map<String, Value>, field: &str) -> Result<String, ValidationError> {
    match workflow.get(field) {
        None | Some(Value::Null) => Err(ValidationError::MissingField(field.to_string())),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Err(ValidationError::MissingField(field.to_string()))
            } else {
                Ok(trimmed.to_string())
            }
        }
        Some(_) => Err(ValidationError::TypeMismatch {
            field: field.to_string(),
            expected: "number or numeric string",
        }),
    }
}

fn parse_address(raw: &str, field: &str) -> Result<Address, ValidationError> {
    Address::from_str(raw)
        .map_err(|e| ValidationError::InvalidAddress(format!("{}: {}", field, e)))
}

/// Expands a decimal text value into an integer scaled by `decimals`
///
/// The expansion is exact: fractional digits beyond the asset's precision
/// are an error, never rounded away. Trailing fractional zeros are
/// insignificant and accepted.
pub(crate) fn parse_decimal(text: &str, decimals: u8) -> Result<U256, String> {
    let text = text.trim();
    if text.is_empty() {
        return Err("empty value".to_string());
    }
    if text.starts_with('-') {
        return Err("negative values are not allowed".to_string());
    }
    if text.starts_with('+') {
        return Err("explicit sign is not allowed".to_string());
    }

    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (text, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err("no digits".to_string());
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err("not a decimal number".to_string());
    }

    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.len() > decimals as usize {
        return Err(format!("more than {} decimal places", decimals));
    }

    let scale = U256::from(10u64)
        .checked_pow(U256::from(decimals))
        .ok_or_else(|| "decimal precision too large".to_string())?;

    let int_value = if int_part.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(int_part, 10).map_err(|_| "integer part too large".to_string())?
    };

    let frac_value = if frac_part.is_empty() {
        U256::ZERO
    } else {
        let digits =
            U256::from_str_radix(frac_part, 10).map_err(|_| "fraction too large".to_string())?;
        let shift = U256::from(10u64)
            .checked_pow(U256::from(decimals as usize - frac_part.len()))
            .ok_or_else(|| "decimal precision too large".to_string())?;
        digits
            .checked_mul(shift)
            .ok_or_else(|| "value too large".to_string())?
    };

    int_value
        .checked_mul(scale)
        .and_then(|scaled| scaled.checked_add(frac_value))
        .ok_or_else(|| "value too large".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenTable;
    use crate::test_utils::{sample_tokens, RECIPIENT, USDC};
    use serde_json::json;

    fn tokens() -> TokenTable {
        sample_tokens()
    }

    fn price_workflow() -> Value {
        json!({
            "trigger_type": "price",
            "trigger_asset": "ETH",
            "trigger_operator": ">=",
            "trigger_value": "2000",
            "action_type": "transfer",
            "action_amount": 0.1,
            "action_to": RECIPIENT,
        })
    }

    #[test]
    fn test_validate_price_workflow_native() {
        let descriptor = validate(&price_workflow(), &tokens()).unwrap();
        assert_eq!(descriptor.action_type, ActionType::PriceTrigger);
        assert!(descriptor.is_native());
        assert_eq!(descriptor.amount, U256::from(10u64).pow(U256::from(17)));
        assert_eq!(descriptor.trigger_value, U256::from(2000u64));
        assert!(descriptor.greater_than);
        assert_eq!(descriptor.recipient, Address::from_str(RECIPIENT).unwrap());
    }

    #[test]
    fn test_validate_maps_balance_to_receive_trigger() {
        let mut workflow = price_workflow();
        workflow["trigger_type"] = json!("balance");
        workflow["trigger_value"] = json!("5");
        let descriptor = validate(&workflow, &tokens()).unwrap();
        assert_eq!(descriptor.action_type, ActionType::ReceiveTrigger);
    }

    #[test]
    fn test_validate_maps_time_trigger() {
        let mut workflow = price_workflow();
        workflow["trigger_type"] = json!("time");
        workflow["trigger_value"] = json!(1_750_000_000u64);
        let descriptor = validate(&workflow, &tokens()).unwrap();
        assert_eq!(descriptor.action_type, ActionType::TimeTrigger);
        assert_eq!(descriptor.trigger_value, U256::from(1_750_000_000u64));
    }

    #[test]
    fn test_validate_rejects_event_trigger() {
        let mut workflow = price_workflow();
        workflow["trigger_type"] = json!("event");
        let err = validate(&workflow, &tokens()).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedAction(_)));
    }

    #[test]
    fn test_validate_rejects_missing_recipient() {
        let mut workflow = price_workflow();
        workflow.as_object_mut().unwrap().remove("action_to");
        let err = validate(&workflow, &tokens()).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("action_to".to_string()));
    }

    #[test]
    fn test_validate_treats_empty_string_as_missing() {
        let mut workflow = price_workflow();
        workflow["action_to"] = json!("");
        let err = validate(&workflow, &tokens()).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("action_to".to_string()));
    }

    #[test]
    fn test_validate_rejects_malformed_recipient() {
        let mut workflow = price_workflow();
        workflow["action_to"] = json!("0x1234");
        let err = validate(&workflow, &tokens()).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidAddress(_)));
    }

    #[test]
    fn test_validate_rejects_zero_address_recipient() {
        let mut workflow = price_workflow();
        workflow["action_to"] = json!("0x0000000000000000000000000000000000000000");
        let err = validate(&workflow, &tokens()).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidAddress(_)));
    }

    #[test]
    fn test_validate_rejects_zero_amount() {
        let mut workflow = price_workflow();
        workflow["action_amount"] = json!(0);
        let err = validate(&workflow, &tokens()).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidAmount(_)));
    }

    #[test]
    fn test_validate_rejects_wrong_typed_amount() {
        let mut workflow = price_workflow();
        workflow["action_amount"] = json!({"value": 1});
        let err = validate(&workflow, &tokens()).unwrap_err();
        assert!(matches!(err, ValidationError::TypeMismatch { .. }));
    }

    #[test]
    fn test_validate_resolves_token_symbol() {
        let mut workflow = price_workflow();
        workflow["action_token"] = json!("usdc");
        workflow["action_amount"] = json!("12.5");
        let descriptor = validate(&workflow, &tokens()).unwrap();
        assert_eq!(descriptor.token, Address::from_str(USDC).unwrap());
        // 12.5 at 6 decimals
        assert_eq!(descriptor.amount, U256::from(12_500_000u64));
    }

    #[test]
    fn test_validate_rejects_unknown_symbol() {
        let mut workflow = price_workflow();
        workflow["action_token"] = json!("DOGE");
        let err = validate(&workflow, &tokens()).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidAddress(_)));
    }

    #[test]
    fn test_validate_accepts_token_hex_address() {
        let mut workflow = price_workflow();
        workflow["action_token"] = json!(USDC);
        let descriptor = validate(&workflow, &tokens()).unwrap();
        assert_eq!(descriptor.token, Address::from_str(USDC).unwrap());
    }

    #[test]
    fn test_validate_rejects_over_precise_token_amount() {
        // 7 fractional digits against USDC's 6 decimals
        let mut workflow = price_workflow();
        workflow["action_token"] = json!("USDC");
        workflow["action_amount"] = json!("1.0000001");
        let err = validate(&workflow, &tokens()).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidAmount(_)));
    }

    #[test]
    fn test_validate_operator_less_than() {
        let mut workflow = price_workflow();
        workflow["trigger_operator"] = json!("<=");
        let descriptor = validate(&workflow, &tokens()).unwrap();
        assert!(!descriptor.greater_than);
    }

    #[test]
    fn test_validate_rejects_equality_operator() {
        let mut workflow = price_workflow();
        workflow["trigger_operator"] = json!("==");
        let err = validate(&workflow, &tokens()).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedAction(_)));
    }

    #[test]
    fn test_validate_price_requires_operator() {
        let mut workflow = price_workflow();
        workflow.as_object_mut().unwrap().remove("trigger_operator");
        let err = validate(&workflow, &tokens()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField("trigger_operator".to_string())
        );
    }

    #[test]
    fn test_validate_time_trigger_ignores_operator() {
        let mut workflow = price_workflow();
        workflow["trigger_type"] = json!("time");
        workflow.as_object_mut().unwrap().remove("trigger_operator");
        assert!(validate(&workflow, &tokens()).is_ok());
    }

    #[test]
    fn test_validate_rejects_fractional_trigger_value() {
        let mut workflow = price_workflow();
        workflow["trigger_value"] = json!("2000.5");
        let err = validate(&workflow, &tokens()).unwrap_err();
        assert!(matches!(err, ValidationError::TypeMismatch { .. }));
    }

    #[test]
    fn test_validate_rejects_non_object_payload() {
        let err = validate(&json!([1, 2, 3]), &tokens()).unwrap_err();
        assert!(matches!(err, ValidationError::TypeMismatch { .. }));
    }

    #[test]
    fn test_parse_decimal_expands_tenth_of_ether() {
        let wei = parse_decimal("0.1", 18).unwrap();
        assert_eq!(wei, U256::from(10u64).pow(U256::from(17)));
    }

    #[test]
    fn test_parse_decimal_exact_full_precision() {
        let wei = parse_decimal("1.000000000000000001", 18).unwrap();
        assert_eq!(wei, U256::from(10u64).pow(U256::from(18)) + U256::from(1u64));
    }

    #[test]
    fn test_parse_decimal_rejects_excess_precision() {
        assert!(parse_decimal("0.0000000000000000001", 18).is_err());
    }

    #[test]
    fn test_parse_decimal_accepts_trailing_zeros() {
        assert_eq!(parse_decimal("2000.000", 0).unwrap(), U256::from(2000u64));
        assert_eq!(parse_decimal("1.50", 2).unwrap(), U256::from(150u64));
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        assert!(parse_decimal("abc", 18).is_err());
        assert!(parse_decimal("-1", 18).is_err());
        assert!(parse_decimal("+1", 18).is_err());
        assert!(parse_decimal("1.2.3", 18).is_err());
        assert!(parse_decimal(".", 18).is_err());
        assert!(parse_decimal("", 18).is_err());
    }

    #[test]
    fn test_parse_decimal_zero_is_zero() {
        // The zero rejection lives in validate(), not the parser
        assert_eq!(parse_decimal("0", 18).unwrap(), U256::ZERO);
        assert_eq!(parse_decimal("0.000", 18).unwrap(), U256::ZERO);
    }
}
