//! Error types for Kairos
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling. The taxonomy separates
//! bad classifier output (recoverable, surfaced in the chat), network and
//! blockchain failures (recoverable, never silently retried), and local
//! state-machine guard violations (rejected before any network call).

use thiserror::Error;

/// Main error type for Kairos operations
///
/// This enum encompasses all possible errors that can occur while turning a
/// classifier reply into a registered on-chain automation: configuration
/// loading, classifier calls, workflow validation, fee quoting, encoding,
/// and registry submissions.
#[derive(Error, Debug)]
pub enum KairosError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Classifier service failure (network error, non-2xx, malformed reply)
    #[error("Classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    /// Classifier produced a workflow that failed validation
    #[error("Workflow validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The registry fee quote read failed or timed out
    #[error("Fee quote unavailable: {0}")]
    FeeQuoteUnavailable(String),

    /// The registry contract rejected the call
    #[error("Registry call reverted: {0}")]
    ContractRevert(String),

    /// The chain client refused to sign or submit the transaction
    #[error("Transaction submission rejected: {0}")]
    SubmissionRejected(String),

    /// Cancel was requested but no automation is pending or active
    #[error("No active automation to cancel")]
    NoActiveAutomation,

    /// Create was requested while an automation is already pending or active
    #[error("An automation is already registered for account {0}")]
    AutomationExists(String),

    /// A create or cancel submission is already in flight
    #[error("Another registry operation is in progress")]
    OperationInProgress,

    /// No sender account is configured; checked before any network call
    #[error("No sender account connected")]
    NoAccountConnected,

    /// A lifecycle transition was attempted that the state machine forbids
    #[error("Invalid lifecycle transition: {0}")]
    Lifecycle(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Validation failures for untrusted classifier workflow payloads
///
/// Every variant is a hard failure: the validator never coerces a field that
/// is outside its allowed domain into something usable. These surface as a
/// chat error message and leave the session otherwise untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is absent from the classifier payload
    #[error("missing field `{0}` in classifier workflow")]
    MissingField(String),

    /// A field is present but carries the wrong JSON type
    #[error("field `{field}` has the wrong type, expected {expected}")]
    TypeMismatch {
        /// The offending field name
        field: String,
        /// Human-readable description of the expected type
        expected: &'static str,
    },

    /// The amount is zero or cannot be expanded exactly to the asset's
    /// decimal precision
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// An address field failed format validation or symbol resolution
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The trigger/action type is outside the supported set
    #[error("unsupported action: {0}")]
    UnsupportedAction(String),

    /// A value does not fit the wire width the registry expects
    #[error("value out of range for `{field}`: {value}")]
    ValueOutOfRange {
        /// The field whose wire width was exceeded
        field: &'static str,
        /// The offending value, rendered for diagnostics
        value: String,
    },
}

/// Result type alias for Kairos operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
