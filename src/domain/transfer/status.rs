//! Transfer status reconciliation.
//!
//! Drives one non-terminal transfer a step closer to a terminal state by consulting
//! the ledger. A transfer is only ever marked failed after all of the following hold:
//!
//! 1. the ledger has no status for its signature
//! 2. its blockhash is no longer valid
//! 3. the finalized block height has reached the transfer's expiry height
//! 4. a full history status search finds nothing
//! 5. a direct transaction lookup finds nothing
//!
//! Every ledger call carries a timeout; a timeout is "no answer", never a negative one.
use std::{future::Future, str::FromStr, sync::Arc, time::Duration};

use solana_sdk::{hash::Hash, signature::Signature};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::utils::{decode_transfer_transaction, map_ledger_status};
use crate::{
    metrics::STATUS_TRANSITIONS_TOTAL,
    models::{RepositoryError, SettlementNotification, TransferRecord, TransferStatus},
    repositories::TransferRepository,
    services::{
        LedgerProviderError, LedgerProviderTrait, LedgerTransactionStatus, SettlementNotifier,
    },
};

const EXECUTION_ERROR_REASON: &str = "transaction finalized with an execution error";
const EXPIRED_REASON: &str = "blockhash expired and transaction was not found on the ledger";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Nothing to do this cycle.
    Unchanged,
    /// The record moved to the given state.
    Advanced(TransferStatus),
    /// Broadcast again while the record was already submitted.
    Rebroadcast,
    /// Blockhash expired but the finalized height is still below the expiry height.
    AwaitingExpiry,
}

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Ledger call {call} timed out")]
    Timeout { call: &'static str },

    #[error("Ledger call {call} failed: {source}")]
    Ledger {
        call: &'static str,
        #[source]
        source: LedgerProviderError,
    },

    #[error("Stored transfer is corrupt: {0}")]
    CorruptRecord(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl ReconcileError {
    /// Whether the same call can be expected to succeed on a later cycle.
    pub fn is_transient(&self) -> bool {
        match self {
            ReconcileError::Timeout { .. } | ReconcileError::Repository(_) => true,
            ReconcileError::Ledger { source, .. } => source.is_transient(),
            ReconcileError::CorruptRecord(_) => false,
        }
    }

    /// Metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            ReconcileError::Timeout { .. } => "timeout",
            ReconcileError::Ledger { source, .. } if source.is_transient() => "ledger",
            ReconcileError::Ledger { .. } => "ledger_permanent",
            ReconcileError::CorruptRecord(_) => "corrupt_record",
            ReconcileError::Repository(_) => "repository",
        }
    }
}

pub struct TransferReconciler<P, TR, N>
where
    P: LedgerProviderTrait,
    TR: TransferRepository,
    N: SettlementNotifier,
{
    provider: Arc<P>,
    transfer_repository: Arc<TR>,
    notifier: Arc<N>,
    rpc_timeout: Duration,
}

impl<P, TR, N> TransferReconciler<P, TR, N>
where
    P: LedgerProviderTrait,
    TR: TransferRepository,
    N: SettlementNotifier,
{
    pub fn new(
        provider: Arc<P>,
        transfer_repository: Arc<TR>,
        notifier: Arc<N>,
        rpc_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            transfer_repository,
            notifier,
            rpc_timeout,
        }
    }

    pub fn transfer_repository(&self) -> &Arc<TR> {
        &self.transfer_repository
    }

    pub async fn reconcile_transfer(
        &self,
        record: &TransferRecord,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        if record.status.is_terminal() {
            return Ok(ReconcileOutcome::Unchanged);
        }

        let signature = Signature::from_str(&record.signature).map_err(|e| {
            ReconcileError::CorruptRecord(format!("invalid signature {}: {e}", record.signature))
        })?;

        let status = self
            .ledger_call(
                "get_signature_status",
                self.provider.get_signature_status(&signature),
            )
            .await?;

        match status {
            Some(status) => self.apply_ledger_status(record, status).await,
            None => self.handle_unknown_transaction(record, &signature).await,
        }
    }

    async fn ledger_call<T, F>(&self, call: &'static str, fut: F) -> Result<T, ReconcileError>
    where
        F: Future<Output = Result<T, LedgerProviderError>>,
    {
        match tokio::time::timeout(self.rpc_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => Err(ReconcileError::Ledger { call, source }),
            Err(_) => Err(ReconcileError::Timeout { call }),
        }
    }

    async fn apply_ledger_status(
        &self,
        record: &TransferRecord,
        status: LedgerTransactionStatus,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let target = map_ledger_status(status);
        if !record.status.can_transition_to(target) {
            debug!(
                tx_id = %record.id,
                current = %record.status,
                observed = %target,
                "ledger status is not stronger than recorded status"
            );
            return Ok(ReconcileOutcome::Unchanged);
        }

        let reason = (target == TransferStatus::Failed).then(|| EXECUTION_ERROR_REASON.to_string());
        self.advance(record, target, reason).await
    }

    async fn handle_unknown_transaction(
        &self,
        record: &TransferRecord,
        signature: &Signature,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let blockhash = Hash::from_str(&record.recent_blockhash).map_err(|e| {
            ReconcileError::CorruptRecord(format!(
                "invalid blockhash {}: {e}",
                record.recent_blockhash
            ))
        })?;

        let blockhash_valid = self
            .ledger_call(
                "is_blockhash_valid",
                self.provider.is_blockhash_valid(&blockhash),
            )
            .await?;

        if blockhash_valid {
            self.broadcast(record).await
        } else {
            self.determine_failure(record, signature).await
        }
    }

    async fn broadcast(&self, record: &TransferRecord) -> Result<ReconcileOutcome, ReconcileError> {
        let transaction = decode_transfer_transaction(&record.encoded_transaction)
            .map_err(ReconcileError::CorruptRecord)?;

        match self
            .ledger_call(
                "send_transaction",
                self.provider.send_transaction(&transaction),
            )
            .await
        {
            Ok(_) => {
                debug!(tx_id = %record.id, signature = %record.signature, "transfer broadcast");
            }
            Err(ReconcileError::Ledger {
                source: LedgerProviderError::AlreadyProcessed(msg),
                ..
            }) => {
                debug!(
                    tx_id = %record.id,
                    "broadcast reported already processed, ignoring: {}",
                    msg
                );
            }
            Err(e) => return Err(e),
        }

        if record.status == TransferStatus::Accepted {
            self.advance(record, TransferStatus::Submitted, None).await
        } else {
            Ok(ReconcileOutcome::Rebroadcast)
        }
    }

    async fn determine_failure(
        &self,
        record: &TransferRecord,
        signature: &Signature,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let finalized_height = self
            .ledger_call(
                "get_finalized_block_height",
                self.provider.get_finalized_block_height(),
            )
            .await?;

        if finalized_height < record.expiry_height {
            debug!(
                tx_id = %record.id,
                finalized_height,
                expiry_height = record.expiry_height,
                "blockhash expired but finalized height has not reached expiry height"
            );
            return Ok(ReconcileOutcome::AwaitingExpiry);
        }

        let history_status = self
            .ledger_call(
                "get_signature_status_with_history",
                self.provider.get_signature_status_with_history(signature),
            )
            .await?;
        if let Some(status) = history_status {
            info!(
                tx_id = %record.id,
                status = ?status,
                "transfer found in ledger history after expiry"
            );
            return self.apply_ledger_status(record, status).await;
        }

        let ledger_record = self
            .ledger_call(
                "get_transaction_record",
                self.provider.get_transaction_record(signature),
            )
            .await?;
        if let Some(found) = ledger_record {
            info!(
                tx_id = %record.id,
                slot = found.slot,
                "transfer found by direct lookup after expiry"
            );
            let status = if found.error.is_some() {
                LedgerTransactionStatus::Failed
            } else {
                LedgerTransactionStatus::Finalized
            };
            return self.apply_ledger_status(record, status).await;
        }

        warn!(
            tx_id = %record.id,
            signature = %record.signature,
            finalized_height,
            expiry_height = record.expiry_height,
            "transfer expired without landing, marking failed"
        );
        self.advance(record, TransferStatus::Failed, Some(EXPIRED_REASON.to_string()))
            .await
    }

    /// Writes the transition and, if this call is the one that finalized the
    /// transfer, emits the settlement notification.
    async fn advance(
        &self,
        record: &TransferRecord,
        status: TransferStatus,
        reason: Option<String>,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let Some(updated) = self
            .transfer_repository
            .advance_status(&record.id, status, reason)
            .await?
        else {
            debug!(tx_id = %record.id, status = %status, "transition already applied elsewhere");
            return Ok(ReconcileOutcome::Unchanged);
        };

        STATUS_TRANSITIONS_TOTAL
            .with_label_values(&[&status.to_string()])
            .inc();
        info!(
            tx_id = %updated.id,
            from = %record.status,
            to = %updated.status,
            "transfer status updated"
        );

        if updated.status.is_settled() {
            if let Err(e) = self
                .notifier
                .notify_settled(SettlementNotification::from(&updated))
                .await
            {
                error!(tx_id = %updated.id, error = %e, "settlement notification failed");
            }
        }

        Ok(ReconcileOutcome::Advanced(updated.status))
    }
}
