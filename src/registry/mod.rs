//! Registry contract boundary
//!
//! Everything that talks to (or reasons about) the on-chain automation
//! registry lives here: the [`RegistryClient`] trait seam, its JSON-RPC
//! implementation, and the fee/attached-value calculator. The deployed
//! registry's address and function signatures are injected configuration,
//! never literals, because both have changed across registry iterations.

pub mod client;
pub mod fee;

pub use client::{function_selector, HttpRegistryClient, RegistryClient, RegistrySelectors, TxHandle};
pub use fee::{compute_value, FeeQuote};
