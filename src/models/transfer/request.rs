use serde::{Deserialize, Serialize};
use validator::Validate;

/// Client request to relay a partially signed stablecoin transfer.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SubmitTransferRequest {
    /// Base64 encoded transaction carrying the sender's signature.
    #[validate(length(min = 1, message = "transaction must not be empty"))]
    pub transaction: String,
    /// Last ledger height at which the transaction's blockhash is honoured.
    #[validate(range(min = 1, message = "expiry_height must be positive"))]
    pub expiry_height: u64,
}
