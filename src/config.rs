//! Configuration management for Kairos
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//! The registry function signatures live here on purpose: selectors are a
//! property of the deployed registry version and must never be hardcoded.

use crate::error::{KairosError, Result};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

/// Main configuration structure for Kairos
///
/// This structure holds everything needed to run the pipeline: the sender
/// account, classifier endpoint, chain transport, registry deployment, and
/// the token table used to resolve classifier asset symbols.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Sender account address (hex). May also come from the CLI or
    /// `KAIROS_ACCOUNT`; absence is a precondition failure at call time.
    #[serde(default)]
    pub account: Option<String>,

    /// Classifier backend configuration
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Chain JSON-RPC transport configuration
    #[serde(default)]
    pub chain: ChainConfig,

    /// Registry contract deployment configuration
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Known tokens, resolvable by classifier symbol
    #[serde(default = "default_tokens")]
    pub tokens: Vec<TokenConfig>,
}

/// Classifier backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Base URL of the classifier service (the `/ask` route is appended)
    #[serde(default = "default_classifier_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_classifier_timeout")]
    pub timeout_seconds: u64,
}

fn default_classifier_endpoint() -> String {
    "http://localhost:5000".to_string()
}

fn default_classifier_timeout() -> u64 {
    30
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: default_classifier_endpoint(),
            timeout_seconds: default_classifier_timeout(),
        }
    }
}

/// Chain JSON-RPC transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// JSON-RPC endpoint of a node (or node+wallet) that signs for the
    /// sender account
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Chain id the registry is deployed on
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// Request timeout in seconds
    #[serde(default = "default_rpc_timeout")]
    pub timeout_seconds: u64,
}

fn default_rpc_url() -> String {
    "https://rpc.sepolia.org".to_string()
}

fn default_chain_id() -> u64 {
    // Sepolia
    11_155_111
}

fn default_rpc_timeout() -> u64 {
    30
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            chain_id: default_chain_id(),
            timeout_seconds: default_rpc_timeout(),
        }
    }
}

/// Registry contract deployment configuration
///
/// The function signatures are configuration because the deployed registry's
/// ABI has already changed across iterations; 4-byte selectors are recomputed
/// from these strings at client construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Deployed registry contract address (hex)
    #[serde(default = "default_registry_address")]
    pub address: String,

    /// Signature of the payable registration entry point
    #[serde(default = "default_add_action_signature")]
    pub add_action_signature: String,

    /// Signature of the cancellation entry point
    #[serde(default = "default_cancel_action_signature")]
    pub cancel_action_signature: String,

    /// Signature of the fee quote view
    #[serde(default = "default_calculate_fee_signature")]
    pub calculate_fee_signature: String,

    /// Signature of the per-owner next-nonce view
    #[serde(default = "default_next_nonce_signature")]
    pub next_nonce_signature: String,
}

fn default_registry_address() -> String {
    "0x6D2E351Ea84BF281237f1b512b0F5ddFA131acc2".to_string()
}

fn default_add_action_signature() -> String {
    "addAction(bytes,uint8,uint256,address)".to_string()
}

fn default_cancel_action_signature() -> String {
    "cancelAction(uint256)".to_string()
}

fn default_calculate_fee_signature() -> String {
    "calculateFee(uint256)".to_string()
}

fn default_next_nonce_signature() -> String {
    "nextActionNonce(address)".to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            address: default_registry_address(),
            add_action_signature: default_add_action_signature(),
            cancel_action_signature: default_cancel_action_signature(),
            calculate_fee_signature: default_calculate_fee_signature(),
            next_nonce_signature: default_next_nonce_signature(),
        }
    }
}

/// A known token the classifier may reference by symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Classifier-facing symbol, e.g. "ETH" or "USDC"
    pub symbol: String,
    /// Token contract address; the zero address denotes the native asset
    pub address: String,
    /// Decimal precision used for amount expansion
    pub decimals: u8,
}

fn default_tokens() -> Vec<TokenConfig> {
    vec![TokenConfig {
        symbol: "ETH".to_string(),
        address: "0x0000000000000000000000000000000000000000".to_string(),
        decimals: 18,
    }]
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    /// Load configuration from a file with env and CLI overrides applied
    ///
    /// Falls back to defaults when the file does not exist, matching how a
    /// fresh checkout runs against the public Sepolia deployment.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    /// * `cli` - Parsed CLI arguments whose overrides take precedence
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default_config()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn default_config() -> Self {
        Self {
            account: None,
            classifier: ClassifierConfig::default(),
            chain: ChainConfig::default(),
            registry: RegistryConfig::default(),
            tokens: default_tokens(),
        }
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| KairosError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| KairosError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(account) = std::env::var("KAIROS_ACCOUNT") {
            self.account = Some(account);
        }

        if let Ok(endpoint) = std::env::var("KAIROS_CLASSIFIER_ENDPOINT") {
            self.classifier.endpoint = endpoint;
        }

        if let Ok(rpc_url) = std::env::var("KAIROS_RPC_URL") {
            self.chain.rpc_url = rpc_url;
        }

        if let Ok(registry) = std::env::var("KAIROS_REGISTRY_ADDRESS") {
            self.registry.address = registry;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(account) = &cli.account {
            self.account = Some(account.clone());
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if let Some(account) = &self.account {
            Address::from_str(account).map_err(|e| {
                KairosError::Config(format!("Invalid account address `{}`: {}", account, e))
            })?;
        }

        url::Url::parse(&self.classifier.endpoint).map_err(|e| {
            KairosError::Config(format!(
                "Invalid classifier endpoint `{}`: {}",
                self.classifier.endpoint, e
            ))
        })?;

        if self.classifier.timeout_seconds == 0 {
            return Err(KairosError::Config(
                "classifier.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        url::Url::parse(&self.chain.rpc_url).map_err(|e| {
            KairosError::Config(format!("Invalid rpc url `{}`: {}", self.chain.rpc_url, e))
        })?;

        if self.chain.chain_id == 0 {
            return Err(
                KairosError::Config("chain.chain_id must be greater than 0".to_string()).into(),
            );
        }

        if self.chain.timeout_seconds == 0 {
            return Err(KairosError::Config(
                "chain.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        Address::from_str(&self.registry.address).map_err(|e| {
            KairosError::Config(format!(
                "Invalid registry address `{}`: {}",
                self.registry.address, e
            ))
        })?;

        for signature in [
            &self.registry.add_action_signature,
            &self.registry.cancel_action_signature,
            &self.registry.calculate_fee_signature,
            &self.registry.next_nonce_signature,
        ] {
            check_signature(signature)?;
        }

        if self.tokens.is_empty() {
            return Err(KairosError::Config(
                "at least one token entry is required".to_string(),
            )
            .into());
        }

        for token in &self.tokens {
            if token.symbol.trim().is_empty() {
                return Err(
                    KairosError::Config("token symbol cannot be empty".to_string()).into(),
                );
            }
            Address::from_str(&token.address).map_err(|e| {
                KairosError::Config(format!(
                    "Invalid address for token `{}`: {}",
                    token.symbol, e
                ))
            })?;
            if token.decimals > 36 {
                return Err(KairosError::Config(format!(
                    "token `{}` decimals must be at most 36",
                    token.symbol
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Parse the configured sender account
    ///
    /// # Errors
    ///
    /// Returns `NoAccountConnected` when no account is configured; this is
    /// the precondition check performed before any network call.
    pub fn sender_account(&self) -> Result<Address> {
        let account = self
            .account
            .as_deref()
            .ok_or(KairosError::NoAccountConnected)?;
        Address::from_str(account)
            .map_err(|e| KairosError::Config(format!("Invalid account address: {}", e)).into())
    }

    /// Parse the configured registry contract address
    pub fn registry_address(&self) -> Result<Address> {
        Address::from_str(&self.registry.address)
            .map_err(|e| KairosError::Config(format!("Invalid registry address: {}", e)).into())
    }

    /// Build the parsed token table from the configured entries
    pub fn token_table(&self) -> Result<TokenTable> {
        TokenTable::from_config(&self.tokens)
    }
}

/// Checks that a function signature string is well formed enough to derive a
/// selector from: `name(type,type,...)` with no whitespace.
fn check_signature(signature: &str) -> Result<()> {
    let well_formed = signature.ends_with(')')
        && signature.find('(').map(|i| i > 0).unwrap_or(false)
        && !signature.chars().any(char::is_whitespace);
    if !well_formed {
        return Err(KairosError::Config(format!(
            "Malformed registry function signature: `{}`",
            signature
        ))
        .into());
    }
    Ok(())
}

/// A resolved token table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenEntry {
    /// Token contract address; zero address denotes the native asset
    pub address: Address,
    /// Decimal precision used for amount expansion
    pub decimals: u8,
}

/// Parsed symbol → token lookup used by the workflow validator
///
/// Symbols are matched case-insensitively. An unknown symbol is a validation
/// failure at the caller, never a guess.
#[derive(Debug, Clone, Default)]
pub struct TokenTable {
    entries: BTreeMap<String, TokenEntry>,
}

impl TokenTable {
    /// Build a table from configuration entries
    ///
    /// # Errors
    ///
    /// Returns error if a token address fails to parse
    pub fn from_config(tokens: &[TokenConfig]) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for token in tokens {
            let address = Address::from_str(&token.address).map_err(|e| {
                KairosError::Config(format!(
                    "Invalid address for token `{}`: {}",
                    token.symbol, e
                ))
            })?;
            entries.insert(
                token.symbol.trim().to_uppercase(),
                TokenEntry {
                    address,
                    decimals: token.decimals,
                },
            );
        }
        Ok(Self { entries })
    }

    /// Resolve a classifier asset symbol to its token entry
    pub fn resolve(&self, symbol: &str) -> Option<&TokenEntry> {
        self.entries.get(&symbol.trim().to_uppercase())
    }

    /// Decimal precision for a token address, defaulting to 18 for addresses
    /// outside the table
    pub fn decimals_for(&self, address: &Address) -> u8 {
        self.entries
            .values()
            .find(|entry| entry.address == *address)
            .map(|entry| entry.decimals)
            .unwrap_or(18)
    }
}
