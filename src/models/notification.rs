use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{TransferRecord, TransferStatus};

pub const TRANSFER_SETTLED_EVENT: &str = "transfer_settled";

/// Payload emitted once per transfer on its first transition into the finalized state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementNotification {
    pub transfer_id: String,
    pub signature: String,
    pub sender: String,
    pub recipient: String,
    pub mint: String,
    pub amount: u64,
    pub status: TransferStatus,
    pub settled_at: String,
}

impl From<&TransferRecord> for SettlementNotification {
    fn from(record: &TransferRecord) -> Self {
        Self {
            transfer_id: record.id.clone(),
            signature: record.signature.clone(),
            sender: record.sender.clone(),
            recipient: record.recipient.clone(),
            mint: record.mint.clone(),
            amount: record.amount,
            status: record.status,
            settled_at: record.updated_at.clone(),
        }
    }
}

/// Envelope posted to webhook subscribers.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WebhookNotification {
    pub id: String,
    pub event: String,
    pub payload: SettlementNotification,
    pub timestamp: String,
}

impl WebhookNotification {
    pub fn new(event: String, payload: SettlementNotification) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event,
            payload,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
