//! Helpers shared by admission and reconciliation.
use solana_sdk::{
    sanitize::Sanitize, signature::Signature, transaction::Transaction as SolanaTransaction,
};

use crate::{
    models::{EncodedSerializedTransaction, TransferStatus},
    services::LedgerTransactionStatus,
};

/// Position of the sender in the signer list; the relayer is always first.
pub const SENDER_SIGNER_INDEX: usize = 1;

/// Decodes a base64 wire transaction and checks that its indices are self-consistent.
pub fn decode_transfer_transaction(encoded: &str) -> Result<SolanaTransaction, String> {
    let transaction =
        SolanaTransaction::try_from(EncodedSerializedTransaction::new(encoded.to_string()))?;
    transaction
        .sanitize()
        .map_err(|e| format!("Transaction failed sanitization: {e}"))?;
    Ok(transaction)
}

/// Transfer id: base58 of the sender signature. The client can compute it locally
/// right after signing.
pub fn transfer_id(transaction: &SolanaTransaction) -> Option<String> {
    transaction
        .signatures
        .get(SENDER_SIGNER_INDEX)
        .filter(|signature| **signature != Signature::default())
        .map(|signature| signature.to_string())
}

/// Maps the ledger commitment level onto the transfer lifecycle.
pub fn map_ledger_status(status: LedgerTransactionStatus) -> TransferStatus {
    match status {
        LedgerTransactionStatus::Processed => TransferStatus::Processed,
        LedgerTransactionStatus::Confirmed => TransferStatus::Confirmed,
        LedgerTransactionStatus::Finalized => TransferStatus::Finalized,
        LedgerTransactionStatus::Failed => TransferStatus::Failed,
    }
}
