//! Transfer lifecycle models.
//!
//! A [`TransferRecord`] is created exactly once by the admission gate and afterwards
//! only its `status`, `status_reason` and `updated_at` fields ever change.

mod request;
pub use request::*;

mod response;
pub use response::*;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use solana_sdk::transaction::Transaction as SolanaTransaction;
use strum::Display;

use crate::utils::{base64_decode, base64_encode};

/// Lifecycle state of a sponsored transfer.
///
/// Ordering for the non-failed states is
/// `Accepted < Submitted < Processed < Confirmed < Finalized`.
/// `Finalized` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum TransferStatus {
    #[serde(rename = "ACCEPTED")]
    #[strum(serialize = "ACCEPTED")]
    Accepted,
    #[serde(rename = "SUBMITTED")]
    #[strum(serialize = "SUBMITTED")]
    Submitted,
    #[serde(rename = "OBSERVED_PROCESSED")]
    #[strum(serialize = "OBSERVED_PROCESSED")]
    Processed,
    #[serde(rename = "OBSERVED_CONFIRMED")]
    #[strum(serialize = "OBSERVED_CONFIRMED")]
    Confirmed,
    #[serde(rename = "OBSERVED_FINALIZED")]
    #[strum(serialize = "OBSERVED_FINALIZED")]
    Finalized,
    #[serde(rename = "FAILED")]
    #[strum(serialize = "FAILED")]
    Failed,
}

impl TransferStatus {
    /// Position in the forward ordering. `Failed` sits outside the ordering.
    fn rank(&self) -> Option<u8> {
        match self {
            TransferStatus::Accepted => Some(0),
            TransferStatus::Submitted => Some(1),
            TransferStatus::Processed => Some(2),
            TransferStatus::Confirmed => Some(3),
            TransferStatus::Finalized => Some(4),
            TransferStatus::Failed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStatus::Finalized | TransferStatus::Failed)
    }

    /// Whether `next` is a legal transition from `self`.
    ///
    /// Terminal states never move. `Failed` is reachable from every non-terminal state.
    /// Otherwise only strictly stronger states are accepted, which allows skipping
    /// intermediate states but never regressing.
    pub fn can_transition_to(&self, next: TransferStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self.rank(), next.rank()) {
            (_, None) => true,
            (Some(current), Some(target)) => target > current,
            (None, Some(_)) => false,
        }
    }

    /// Whether the sending client can already treat the transfer as successful.
    ///
    /// This is the fast path: a supermajority confirmation is enough for client
    /// feedback while settlement still waits for finalization.
    pub fn is_client_success(&self) -> bool {
        matches!(self, TransferStatus::Confirmed | TransferStatus::Finalized)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, TransferStatus::Finalized)
    }
}

/// Base64 encoded, bincode serialized Solana transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedSerializedTransaction(String);

impl EncodedSerializedTransaction {
    pub fn new(encoded: String) -> Self {
        Self(encoded)
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<&SolanaTransaction> for EncodedSerializedTransaction {
    type Error = String;

    fn try_from(transaction: &SolanaTransaction) -> Result<Self, Self::Error> {
        let serialized = bincode::serialize(transaction)
            .map_err(|e| format!("Failed to serialize transaction: {e}"))?;
        Ok(Self(base64_encode(&serialized)))
    }
}

impl TryFrom<EncodedSerializedTransaction> for SolanaTransaction {
    type Error = String;

    fn try_from(encoded: EncodedSerializedTransaction) -> Result<Self, Self::Error> {
        let bytes =
            base64_decode(&encoded.0).map_err(|e| format!("Invalid base64 encoding: {e}"))?;
        bincode::deserialize(&bytes).map_err(|e| format!("Failed to deserialize transaction: {e}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRecord {
    /// Base58 sender signature; stable store key.
    pub id: String,
    /// Base58 fee payer signature the ledger indexes the transaction by.
    pub signature: String,
    /// Fully signed transaction snapshot as accepted.
    pub encoded_transaction: String,
    pub sender: String,
    pub recipient: String,
    pub mint: String,
    pub amount: u64,
    pub recent_blockhash: String,
    pub expiry_height: u64,
    pub status: TransferStatus,
    pub status_reason: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Values known at admission time.
#[derive(Debug, Clone)]
pub struct NewTransferRecord {
    pub id: String,
    pub signature: String,
    pub encoded_transaction: String,
    pub sender: String,
    pub recipient: String,
    pub mint: String,
    pub amount: u64,
    pub recent_blockhash: String,
    pub expiry_height: u64,
}

impl From<NewTransferRecord> for TransferRecord {
    fn from(new: NewTransferRecord) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: new.id,
            signature: new.signature,
            encoded_transaction: new.encoded_transaction,
            sender: new.sender,
            recipient: new.recipient,
            mint: new.mint,
            amount: new.amount,
            recent_blockhash: new.recent_blockhash,
            expiry_height: new.expiry_height,
            status: TransferStatus::Accepted,
            status_reason: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
