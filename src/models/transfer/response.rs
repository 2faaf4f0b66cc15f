use serde::{Deserialize, Serialize};

use super::TransferStatus;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmitTransferResponse {
    pub id: String,
}

/// Coarse outcome as seen by the sending client.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransferOutcome {
    Pending,
    Succeeded,
    Failed,
}

impl From<TransferStatus> for TransferOutcome {
    fn from(status: TransferStatus) -> Self {
        match status {
            TransferStatus::Failed => TransferOutcome::Failed,
            s if s.is_client_success() => TransferOutcome::Succeeded,
            _ => TransferOutcome::Pending,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransferStatusResponse {
    pub id: String,
    pub status: TransferStatus,
    pub outcome: TransferOutcome,
    /// True only once the ledger reports the transfer finalized.
    pub settled: bool,
}

impl TransferStatusResponse {
    pub fn new(id: String, status: TransferStatus) -> Self {
        Self {
            id,
            status,
            outcome: status.into(),
            settled: status.is_settled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_mapping() {
        assert_eq!(
            TransferOutcome::from(TransferStatus::Accepted),
            TransferOutcome::Pending
        );
        assert_eq!(
            TransferOutcome::from(TransferStatus::Processed),
            TransferOutcome::Pending
        );
        assert_eq!(
            TransferOutcome::from(TransferStatus::Confirmed),
            TransferOutcome::Succeeded
        );
        assert_eq!(
            TransferOutcome::from(TransferStatus::Finalized),
            TransferOutcome::Succeeded
        );
        assert_eq!(
            TransferOutcome::from(TransferStatus::Failed),
            TransferOutcome::Failed
        );
    }

    #[test]
    fn test_confirmed_is_successful_but_not_settled() {
        let response = TransferStatusResponse::new("abc".to_string(), TransferStatus::Confirmed);
        assert_eq!(response.outcome, TransferOutcome::Succeeded);
        assert!(!response.settled);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "OBSERVED_CONFIRMED");
        assert_eq!(json["outcome"], "succeeded");
    }
}
