//! Registry contract client over JSON-RPC
//!
//! This module defines the [`RegistryClient`] trait the lifecycle manager
//! depends on, and its HTTP JSON-RPC implementation. Writes go through an
//! `eth_estimateGas` preflight so contract reverts surface before the
//! wallet is asked to sign, then `eth_sendTransaction`; signing itself is
//! performed by the node or its attached wallet.
//!
//! Function selectors are recomputed with keccak-256 from the configured
//! signatures at construction time; the deployed registry's ABI has
//! already changed across iterations, so no selector is a literal.

use crate::config::{ChainConfig, RegistryConfig};
use crate::error::{KairosError, Result};
use crate::workflow::EncodedAction;
use alloy_primitives::{hex, keccak256, Address, U256};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Handle to a submitted (not yet mined) transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxHandle {
    /// Transaction hash as returned by the node
    pub hash: String,
}

/// Boundary trait for everything the pipeline asks of the registry
///
/// The lifecycle manager holds this trait object; tests substitute a
/// recording mock, production uses [`HttpRegistryClient`].
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Quote the protocol fee for registering `amount`
    ///
    /// # Errors
    ///
    /// Returns `FeeQuoteUnavailable` on any transport or decode failure;
    /// the quote is never cached or retried here.
    async fn calculate_fee(&self, amount: U256) -> Result<U256>;

    /// Read the nonce the next registered automation for `owner` will get
    async fn next_action_nonce(&self, owner: Address) -> Result<U256>;

    /// Submit the registration transaction carrying `value`
    ///
    /// # Errors
    ///
    /// Returns `ContractRevert` when the registry rejects the call and
    /// `SubmissionRejected` when the chain client refuses to sign or relay.
    async fn add_action(
        &self,
        action: &EncodedAction,
        from: Address,
        value: U256,
    ) -> Result<TxHandle>;

    /// Submit the cancellation transaction for the automation `nonce`
    async fn cancel_action(&self, nonce: U256, from: Address) -> Result<TxHandle>;
}

/// Computes the 4-byte function selector for a canonical signature
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Selectors derived from the configured registry function signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrySelectors {
    /// `addAction` selector
    pub add_action: [u8; 4],
    /// `cancelAction` selector
    pub cancel_action: [u8; 4],
    /// `calculateFee` selector
    pub calculate_fee: [u8; 4],
    /// next-nonce view selector
    pub next_nonce: [u8; 4],
}

impl RegistrySelectors {
    /// Derive all selectors from a registry configuration
    pub fn from_config(config: &RegistryConfig) -> Self {
        Self {
            add_action: function_selector(&config.add_action_signature),
            cancel_action: function_selector(&config.cancel_action_signature),
            calculate_fee: function_selector(&config.calculate_fee_signature),
            next_nonce: function_selector(&config.next_nonce_signature),
        }
    }
}

/// A failed JSON-RPC exchange
#[derive(Debug)]
struct RpcFailure {
    code: Option<i64>,
    message: String,
}

impl fmt::Display for RpcFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code {})", self.message, code),
            None => write!(f, "{}", self.message),
        }
    }
}

impl RpcFailure {
    fn transport(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// Whether the node reported a contract revert rather than a transport
    /// or signing problem. Code 3 is the standard execution-revert error.
    fn is_revert(&self) -> bool {
        self.code == Some(3) || self.message.to_lowercase().contains("revert")
    }
}

/// Registry client speaking JSON-RPC to a node that signs for the sender
pub struct HttpRegistryClient {
    client: reqwest::Client,
    rpc_url: String,
    registry: Address,
    selectors: RegistrySelectors,
}

impl HttpRegistryClient {
    /// Create a new registry client
    ///
    /// # Arguments
    ///
    /// * `chain` - RPC endpoint and timeout configuration
    /// * `registry` - Deployed registry address and function signatures
    ///
    /// # Errors
    ///
    /// Returns error if the registry address fails to parse or HTTP client
    /// initialization fails
    pub fn new(chain: &ChainConfig, registry: &RegistryConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(chain.timeout_seconds))
            .user_agent("kairos/0.2.0")
            .build()
            .map_err(|e| KairosError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let address = Address::from_str(&registry.address)
            .map_err(|e| KairosError::Config(format!("Invalid registry address: {}", e)))?;

        tracing::info!(
            "Initialized registry client: rpc={}, registry={}, chain_id={}",
            chain.rpc_url,
            registry.address,
            chain.chain_id
        );

        Ok(Self {
            client,
            rpc_url: chain.rpc_url.clone(),
            registry: address,
            selectors: RegistrySelectors::from_config(registry),
        })
    }

    /// The selectors this client submits with
    pub fn selectors(&self) -> &RegistrySelectors {
        &self.selectors
    }

    async fn rpc_call(&self, method: &str, params: Value) -> std::result::Result<Value, RpcFailure> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        tracing::debug!("Dispatching {} to {}", method, self.rpc_url);

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcFailure::transport(format!("{} request failed: {}", method, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("RPC returned {} for {}: {}", status, method, error_text);
            return Err(RpcFailure::transport(format!(
                "{} returned {}: {}",
                method, status, error_text
            )));
        }

        let payload: Value = response.json().await.map_err(|e| {
            RpcFailure::transport(format!("failed to parse {} response: {}", method, e))
        })?;

        if let Some(error) = payload.get("error") {
            let code = error.get("code").and_then(Value::as_i64);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            tracing::warn!("{} failed: {} (code {:?})", method, message, code);
            return Err(RpcFailure { code, message });
        }

        payload
            .get("result")
            .cloned()
            .ok_or_else(|| RpcFailure::transport(format!("{} result was missing", method)))
    }

    async fn eth_call(&self, calldata: String) -> std::result::Result<U256, RpcFailure> {
        let result = self
            .rpc_call(
                "eth_call",
                json!([{"to": address_hex(&self.registry), "data": calldata}, "latest"]),
            )
            .await?;
        let raw = result
            .as_str()
            .ok_or_else(|| RpcFailure::transport("eth_call result was missing".to_string()))?;
        parse_hex_u256(raw).map_err(RpcFailure::transport)
    }

    /// Submit a transaction after an `eth_estimateGas` preflight
    async fn submit(&self, from: Address, value: U256, data: String) -> Result<TxHandle> {
        let tx = json!({
            "from": address_hex(&from),
            "to": address_hex(&self.registry),
            "value": format!("{:#x}", value),
            "data": data,
        });

        self.rpc_call("eth_estimateGas", json!([tx]))
            .await
            .map_err(map_submission_failure)?;

        let result = self
            .rpc_call("eth_sendTransaction", json!([tx]))
            .await
            .map_err(map_submission_failure)?;

        let hash = result
            .as_str()
            .ok_or_else(|| {
                KairosError::SubmissionRejected("transaction hash was missing".to_string())
            })?
            .to_string();

        tracing::info!("Submitted registry transaction: {}", hash);
        Ok(TxHandle { hash })
    }

    fn add_action_calldata(&self, action: &EncodedAction) -> String {
        // addAction(bytes userWorkflow, uint8 actionType, uint256 amount, address token)
        // Head: offset to the bytes tail, then the three static words.
        let mut data = Vec::with_capacity(4 + 5 * 32 + action.workflow.len() + 32);
        data.extend_from_slice(&self.selectors.add_action);
        data.extend_from_slice(&U256::from(4u64 * 32).to_be_bytes::<32>());
        data.extend_from_slice(&U256::from(action.action_type).to_be_bytes::<32>());
        data.extend_from_slice(&action.amount.to_be_bytes::<32>());
        data.extend_from_slice(action.token.into_word().as_slice());
        data.extend_from_slice(&U256::from(action.workflow.len()).to_be_bytes::<32>());
        data.extend_from_slice(&action.workflow);
        let padding = (32 - action.workflow.len() % 32) % 32;
        data.resize(data.len() + padding, 0);
        format!("0x{}", hex::encode(data))
    }

    fn single_word_calldata(&self, selector: [u8; 4], word: [u8; 32]) -> String {
        let mut data = Vec::with_capacity(4 + 32);
        data.extend_from_slice(&selector);
        data.extend_from_slice(&word);
        format!("0x{}", hex::encode(data))
    }
}

#[async_trait]
impl RegistryClient for HttpRegistryClient {
    async fn calculate_fee(&self, amount: U256) -> Result<U256> {
        let calldata =
            self.single_word_calldata(self.selectors.calculate_fee, amount.to_be_bytes::<32>());
        let fee = self
            .eth_call(calldata)
            .await
            .map_err(|e| KairosError::FeeQuoteUnavailable(e.to_string()))?;
        tracing::debug!("Fee quote for {}: {}", amount, fee);
        Ok(fee)
    }

    async fn next_action_nonce(&self, owner: Address) -> Result<U256> {
        let calldata = self.single_word_calldata(self.selectors.next_nonce, owner.into_word().0);
        self.eth_call(calldata).await.map_err(|e| {
            KairosError::SubmissionRejected(format!("next-nonce read failed: {}", e)).into()
        })
    }

    async fn add_action(
        &self,
        action: &EncodedAction,
        from: Address,
        value: U256,
    ) -> Result<TxHandle> {
        let calldata = self.add_action_calldata(action);
        tracing::debug!(
            "Registering automation: action_type={}, amount={}, value={}",
            action.action_type,
            action.amount,
            value
        );
        self.submit(from, value, calldata).await
    }

    async fn cancel_action(&self, nonce: U256, from: Address) -> Result<TxHandle> {
        let calldata =
            self.single_word_calldata(self.selectors.cancel_action, nonce.to_be_bytes::<32>());
        tracing::debug!("Cancelling automation nonce {}", nonce);
        self.submit(from, U256::ZERO, calldata).await
    }
}

fn map_submission_failure(failure: RpcFailure) -> anyhow::Error {
    if failure.is_revert() {
        KairosError::ContractRevert(failure.message).into()
    } else {
        KairosError::SubmissionRejected(failure.to_string()).into()
    }
}

fn address_hex(address: &Address) -> String {
    format!("0x{}", hex::encode(address.as_slice()))
}

fn parse_hex_u256(raw: &str) -> std::result::Result<U256, String> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() {
        return Err("empty hex quantity".to_string());
    }
    U256::from_str_radix(digits, 16).map_err(|e| format!("invalid hex quantity `{}`: {}", raw, e))
}
