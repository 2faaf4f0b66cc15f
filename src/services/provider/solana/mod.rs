//! Solana Ledger Provider
//!
//! Thin wrapper over the non-blocking Solana `RpcClient` exposing exactly the
//! primitives the relay needs: broadcast, point-in-time and historical signature
//! status, blockhash validity, finalized block height and a full transaction lookup.
//!
//! Every method distinguishes a negative answer (`Ok(None)` / `Ok(false)`) from no
//! answer (`Err`).
use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::Url;
use serde::Serialize;
use serde_json::json;
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    nonblocking::rpc_client::RpcClient,
    rpc_request::RpcRequest,
};
use solana_sdk::{
    commitment_config::CommitmentConfig, hash::Hash, signature::Signature,
    transaction::Transaction,
};
use thiserror::Error;

/// Normalises both strings before matching so "already processed" also matches
/// "AlreadyProcessed".
fn matches_error_pattern(error_msg: &str, pattern: &str) -> bool {
    let normalized_msg = error_msg.to_lowercase().replace(' ', "");
    let normalized_pattern = pattern.to_lowercase().replace(' ', "");
    normalized_msg.contains(&normalized_pattern)
}

/// Errors that can occur when talking to the ledger.
///
/// `is_transient()` separates conditions expected to clear by the next cycle from
/// ones that will not; reconciliation logs and counts the two differently.
#[derive(Error, Debug, Serialize)]
pub enum LedgerProviderError {
    /// Network/IO error (transient)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// RPC protocol error (transient)
    #[error("RPC error: {0}")]
    RpcError(String),

    /// HTTP request error with status code
    #[error("Request error (HTTP {status_code}): {error}")]
    RequestError { error: String, status_code: u16 },

    /// Blockhash not found or expired
    #[error("Blockhash not found or expired: {0}")]
    BlockhashNotFound(String),

    /// Invalid transaction structure or execution (permanent)
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// Transaction already processed (permanent - duplicate)
    #[error("Transaction already processed: {0}")]
    AlreadyProcessed(String),

    /// Invalid endpoint or other configuration problem (permanent)
    #[error("Network configuration error: {0}")]
    NetworkConfiguration(String),
}

impl LedgerProviderError {
    pub fn is_transient(&self) -> bool {
        match self {
            LedgerProviderError::NetworkError(_)
            | LedgerProviderError::RpcError(_)
            | LedgerProviderError::BlockhashNotFound(_) => true,

            LedgerProviderError::RequestError { status_code, .. } => match *status_code {
                501 | 505 => false,
                500 | 502..=504 | 506..=599 => true,
                408 | 425 | 429 => true,
                _ => false,
            },

            LedgerProviderError::InvalidTransaction(_)
            | LedgerProviderError::AlreadyProcessed(_)
            | LedgerProviderError::NetworkConfiguration(_) => false,
        }
    }

    /// Classifies a Solana RPC client error into the appropriate variant.
    pub fn from_rpc_error(error: ClientError) -> Self {
        match error.kind() {
            ClientErrorKind::Io(_) => LedgerProviderError::NetworkError(error.to_string()),

            ClientErrorKind::Reqwest(reqwest_err) => match reqwest_err.status() {
                Some(status) => LedgerProviderError::RequestError {
                    error: error.to_string(),
                    status_code: status.as_u16(),
                },
                None => LedgerProviderError::NetworkError(error.to_string()),
            },

            ClientErrorKind::RpcError(rpc_err) => {
                let rpc_err_str = format!("{rpc_err}");
                Self::from_rpc_response_error(&rpc_err_str, &error)
            }

            ClientErrorKind::TransactionError(tx_error) => {
                use solana_sdk::transaction::TransactionError as TxErr;
                match tx_error {
                    TxErr::AlreadyProcessed => {
                        LedgerProviderError::AlreadyProcessed(error.to_string())
                    }
                    TxErr::BlockhashNotFound => {
                        LedgerProviderError::BlockhashNotFound(error.to_string())
                    }
                    TxErr::AccountInUse | TxErr::ClusterMaintenance => {
                        LedgerProviderError::RpcError(error.to_string())
                    }
                    _ => LedgerProviderError::InvalidTransaction(error.to_string()),
                }
            }

            ClientErrorKind::Custom(msg) => Self::from_rpc_response_error(msg, &error),

            _ => LedgerProviderError::RpcError(error.to_string()),
        }
    }

    /// Classifies JSON-RPC error responses by code, then by message.
    ///
    /// * `-32002` simulation failed: inspected for duplicate or stale blockhash
    /// * `-32003` signature verification failure (permanent)
    /// * `-32004`, `-32005`, `-32014`, `-32016` node lagging (transient)
    /// * `-32009` already processed
    fn from_rpc_response_error(rpc_err: &str, full_error: &ClientError) -> Self {
        let message = full_error.to_string();
        if rpc_err.contains("-32002") {
            if matches_error_pattern(rpc_err, "already been processed")
                || matches_error_pattern(rpc_err, "already processed")
            {
                LedgerProviderError::AlreadyProcessed(message)
            } else if matches_error_pattern(rpc_err, "blockhash not found") {
                LedgerProviderError::BlockhashNotFound(message)
            } else {
                LedgerProviderError::InvalidTransaction(message)
            }
        } else if rpc_err.contains("-32003") {
            LedgerProviderError::InvalidTransaction(message)
        } else if ["-32004", "-32005", "-32014", "-32016"]
            .iter()
            .any(|code| rpc_err.contains(code))
        {
            LedgerProviderError::RpcError(message)
        } else if rpc_err.contains("-32009") {
            LedgerProviderError::AlreadyProcessed(message)
        } else if matches_error_pattern(rpc_err, "already processed")
            || matches_error_pattern(rpc_err, "already been processed")
        {
            LedgerProviderError::AlreadyProcessed(message)
        } else if matches_error_pattern(rpc_err, "blockhash not found") {
            LedgerProviderError::BlockhashNotFound(message)
        } else {
            LedgerProviderError::RpcError(message)
        }
    }
}

/// Commitment level the ledger reports for a known signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerTransactionStatus {
    Processed,
    Confirmed,
    Finalized,
    /// Finalized, but execution failed.
    Failed,
}

/// Summary of a full transaction lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerTransactionRecord {
    pub slot: u64,
    /// Execution error recorded by the ledger, if any.
    pub error: Option<String>,
}

#[async_trait]
#[cfg_attr(test, automock)]
pub trait LedgerProviderTrait: Send + Sync {
    /// Broadcasts a fully signed transaction.
    async fn send_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, LedgerProviderError>;

    /// Status from the recent status cache. `None` when the ledger has no knowledge of it.
    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<LedgerTransactionStatus>, LedgerProviderError>;

    /// Same as `get_signature_status` but searching the full ledger history.
    async fn get_signature_status_with_history(
        &self,
        signature: &Signature,
    ) -> Result<Option<LedgerTransactionStatus>, LedgerProviderError>;

    /// Whether the blockhash can still be used for inclusion.
    async fn is_blockhash_valid(&self, hash: &Hash) -> Result<bool, LedgerProviderError>;

    /// Block height at finalized commitment.
    async fn get_finalized_block_height(&self) -> Result<u64, LedgerProviderError>;

    /// Full finalized transaction lookup. `None` when not found.
    async fn get_transaction_record(
        &self,
        signature: &Signature,
    ) -> Result<Option<LedgerTransactionRecord>, LedgerProviderError>;
}

pub struct SolanaLedgerProvider {
    client: RpcClient,
}

impl SolanaLedgerProvider {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, LedgerProviderError> {
        Url::parse(url).map_err(|e| {
            LedgerProviderError::NetworkConfiguration(format!("Invalid RPC URL {url}: {e}"))
        })?;

        let client = RpcClient::new_with_timeout_and_commitment(
            url.to_string(),
            timeout,
            CommitmentConfig::confirmed(),
        );
        Ok(Self { client })
    }

    pub fn url(&self) -> String {
        self.client.url()
    }

    async fn signature_status(
        &self,
        signature: &Signature,
        search_history: bool,
    ) -> Result<Option<LedgerTransactionStatus>, LedgerProviderError> {
        let response = if search_history {
            self.client
                .get_signature_statuses_with_history(&[*signature])
                .await
        } else {
            self.client.get_signature_statuses(&[*signature]).await
        }
        .map_err(LedgerProviderError::from_rpc_error)?;

        let status = response.value.into_iter().next().flatten().map(|status| {
            classify_signature_status(
                status.satisfies_commitment(CommitmentConfig::finalized()),
                status.satisfies_commitment(CommitmentConfig::confirmed()),
                status.err.is_some(),
            )
        });
        Ok(status)
    }
}

#[async_trait]
impl LedgerProviderTrait for SolanaLedgerProvider {
    async fn send_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, LedgerProviderError> {
        self.client
            .send_transaction(transaction)
            .await
            .map_err(LedgerProviderError::from_rpc_error)
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<LedgerTransactionStatus>, LedgerProviderError> {
        self.signature_status(signature, false).await
    }

    async fn get_signature_status_with_history(
        &self,
        signature: &Signature,
    ) -> Result<Option<LedgerTransactionStatus>, LedgerProviderError> {
        self.signature_status(signature, true).await
    }

    async fn is_blockhash_valid(&self, hash: &Hash) -> Result<bool, LedgerProviderError> {
        self.client
            .is_blockhash_valid(hash, CommitmentConfig::processed())
            .await
            .map_err(LedgerProviderError::from_rpc_error)
    }

    async fn get_finalized_block_height(&self) -> Result<u64, LedgerProviderError> {
        self.client
            .get_block_height_with_commitment(CommitmentConfig::finalized())
            .await
            .map_err(LedgerProviderError::from_rpc_error)
    }

    async fn get_transaction_record(
        &self,
        signature: &Signature,
    ) -> Result<Option<LedgerTransactionRecord>, LedgerProviderError> {
        let params = json!([
            signature.to_string(),
            {
                "encoding": "json",
                "commitment": "finalized",
                "maxSupportedTransactionVersion": 0
            }
        ]);
        let result: Option<serde_json::Value> = self
            .client
            .send(RpcRequest::GetTransaction, params)
            .await
            .map_err(LedgerProviderError::from_rpc_error)?;

        Ok(result.map(|value| parse_transaction_record(&value)))
    }
}

/// Maps commitment and execution result onto the reported status.
///
/// An execution error is only conclusive once finalized. Before that a failed
/// transaction is reported as `Processed`, never as `Confirmed`, so it cannot be
/// taken for a successful transfer.
fn classify_signature_status(
    finalized: bool,
    confirmed: bool,
    execution_failed: bool,
) -> LedgerTransactionStatus {
    match (finalized, confirmed, execution_failed) {
        (true, _, true) => LedgerTransactionStatus::Failed,
        (true, _, false) => LedgerTransactionStatus::Finalized,
        (false, true, false) => LedgerTransactionStatus::Confirmed,
        _ => LedgerTransactionStatus::Processed,
    }
}

fn parse_transaction_record(value: &serde_json::Value) -> LedgerTransactionRecord {
    let slot = value.get("slot").and_then(|s| s.as_u64()).unwrap_or_default();
    let error = value
        .get("meta")
        .and_then(|meta| meta.get("err"))
        .filter(|err| !err.is_null())
        .map(|err| err.to_string());
    LedgerTransactionRecord { slot, error }
}
