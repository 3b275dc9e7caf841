//! Automation lifecycle manager
//!
//! Orchestrates create/cancel calls against the registry and enforces the
//! single-active-automation invariant on the client side, before any network
//! call is made. Operations are fire-and-submit: they return once the
//! transaction is accepted, and confirmation is settled later through the
//! `confirm_*` hooks driven by whatever polls the chain.

use crate::automation::status::{transition, AutomationEvent, AutomationStatus};
use crate::error::{KairosError, Result};
use crate::registry::{compute_value, RegistryClient, TxHandle};
use crate::workflow::{encode, WorkflowDescriptor};
use alloy_primitives::{Address, U256};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy)]
struct ManagerState {
    status: AutomationStatus,
    nonce: Option<U256>,
    in_flight: bool,
}

/// Per-account orchestrator for registry create/cancel operations
///
/// Holds the registry client as an injected trait object so deployments and
/// tests can swap the transport without touching pipeline logic. All state
/// lives behind one async mutex; the `in_flight` flag serializes concurrent
/// create/cancel attempts with `OperationInProgress` instead of racing the
/// contract's single-active invariant.
pub struct AutomationManager {
    registry: Arc<dyn RegistryClient>,
    account: Address,
    state: Mutex<ManagerState>,
}

impl AutomationManager {
    /// Creates a manager with no known automation
    ///
    /// # Arguments
    ///
    /// * `registry` - Registry client used for all reads and submissions
    /// * `account` - Owner account; sender of every transaction
    pub fn new(registry: Arc<dyn RegistryClient>, account: Address) -> Self {
        Self {
            registry,
            account,
            state: Mutex::new(ManagerState {
                status: AutomationStatus::NoAutomation,
                nonce: None,
                in_flight: false,
            }),
        }
    }

    /// Creates a manager hydrated with an already-active automation
    ///
    /// Used by the one-shot cancel command, where the automation was
    /// registered by an earlier process and only its nonce is known.
    pub fn with_active(registry: Arc<dyn RegistryClient>, account: Address, nonce: U256) -> Self {
        Self {
            registry,
            account,
            state: Mutex::new(ManagerState {
                status: AutomationStatus::Active,
                nonce: Some(nonce),
                in_flight: false,
            }),
        }
    }

    /// The owner account this manager submits for
    pub fn account(&self) -> Address {
        self.account
    }

    /// Current lifecycle status
    pub async fn status(&self) -> AutomationStatus {
        self.state.lock().await.status
    }

    /// Registry nonce of the tracked automation, if one exists
    pub async fn nonce(&self) -> Option<U256> {
        self.state.lock().await.nonce
    }

    /// Registers a new automation: fee quote → encode → submit
    ///
    /// Guard checks run before any network call: a second create while one
    /// is pending or active fails locally with `AutomationExists`, and a
    /// create racing an in-flight operation fails with
    /// `OperationInProgress`.
    ///
    /// # Errors
    ///
    /// Propagates `FeeQuoteUnavailable`, validation errors from encoding,
    /// `ContractRevert`, and `SubmissionRejected`. On any failure the
    /// lifecycle state is left exactly as it was.
    pub async fn create(&self, descriptor: &WorkflowDescriptor) -> Result<TxHandle> {
        {
            let mut state = self.state.lock().await;
            if state.in_flight {
                return Err(KairosError::OperationInProgress.into());
            }
            if matches!(
                state.status,
                AutomationStatus::Pending | AutomationStatus::Active
            ) {
                return Err(KairosError::AutomationExists(self.account.to_string()).into());
            }
            state.in_flight = true;
        }

        let result = self.submit_create(descriptor).await;

        let mut state = self.state.lock().await;
        state.in_flight = false;
        match result {
            Ok((handle, nonce)) => {
                state.status = transition(state.status, AutomationEvent::CreateSubmitted)
                    .map_err(|e| KairosError::Lifecycle(e.to_string()))?;
                state.nonce = Some(nonce);
                tracing::info!(
                    "Automation registered: account={}, nonce={}, tx={}",
                    self.account,
                    nonce,
                    handle.hash
                );
                Ok(handle)
            }
            Err(e) => {
                tracing::warn!("Automation registration failed: {}", e);
                Err(e)
            }
        }
    }

    async fn submit_create(&self, descriptor: &WorkflowDescriptor) -> Result<(TxHandle, U256)> {
        // Fresh quote on every registration; fee schedules may change
        let fee = self.registry.calculate_fee(descriptor.amount).await?;
        let quote = compute_value(descriptor, fee)?;
        let action = encode(descriptor).map_err(KairosError::from)?;
        let nonce = self.registry.next_action_nonce(self.account).await?;
        let handle = self
            .registry
            .add_action(&action, self.account, quote.attached_value)
            .await?;
        Ok((handle, nonce))
    }

    /// Cancels the tracked automation using its stored nonce
    ///
    /// # Errors
    ///
    /// Fails with `NoActiveAutomation` (no network call) unless an
    /// automation is pending or active, `OperationInProgress` while another
    /// submission is in flight, and `ContractRevert`/`SubmissionRejected`
    /// from the registry; on failure the status is left untouched.
    pub async fn cancel(&self) -> Result<TxHandle> {
        let nonce = {
            let mut state = self.state.lock().await;
            if state.in_flight {
                return Err(KairosError::OperationInProgress.into());
            }
            if !matches!(
                state.status,
                AutomationStatus::Pending | AutomationStatus::Active
            ) {
                return Err(KairosError::NoActiveAutomation.into());
            }
            let nonce = state.nonce.ok_or(KairosError::NoActiveAutomation)?;
            state.in_flight = true;
            nonce
        };

        let result = self.registry.cancel_action(nonce, self.account).await;

        let mut state = self.state.lock().await;
        state.in_flight = false;
        match &result {
            // Status moves to Cancelled only once the transaction is mined
            Ok(handle) => tracing::info!(
                "Cancellation submitted: nonce={}, tx={}",
                nonce,
                handle.hash
            ),
            Err(e) => tracing::warn!("Cancellation failed: {}", e),
        }
        result
    }

    /// Settles a mined create transaction: `Pending → Active`
    pub async fn confirm_active(&self) -> Result<()> {
        self.apply(AutomationEvent::CreateMined).await
    }

    /// Rolls back a failed create transaction: `Pending → NoAutomation`
    pub async fn mark_create_failed(&self) -> Result<()> {
        self.apply(AutomationEvent::CreateFailed).await?;
        self.state.lock().await.nonce = None;
        Ok(())
    }

    /// Settles a mined cancel transaction: `→ Cancelled`
    pub async fn confirm_cancelled(&self) -> Result<()> {
        self.apply(AutomationEvent::CancelMined).await
    }

    async fn apply(&self, event: AutomationEvent) -> Result<()> {
        let mut state = self.state.lock().await;
        state.status = transition(state.status, event)
            .map_err(|e| KairosError::Lifecycle(e.to_string()))?;
        tracing::debug!("Lifecycle now {} after {}", state.status, event);
        Ok(())
    }
}
