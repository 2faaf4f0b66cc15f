//! Transfer record persistence.
//!
//! Records are inserted once by the admission gate and afterwards only move
//! forward through their lifecycle via [`TransferRepository::advance_status`].
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::models::{RepositoryError, TransferRecord, TransferStatus};

mod transfer_in_memory;
pub use transfer_in_memory::*;

/// Result of an idempotent insert.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    Created(TransferRecord),
    /// A record with the same id was already stored; it is returned untouched.
    Existing(TransferRecord),
}

impl CreateOutcome {
    pub fn record(&self) -> &TransferRecord {
        match self {
            CreateOutcome::Created(record) | CreateOutcome::Existing(record) => record,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, CreateOutcome::Created(_))
    }
}

#[async_trait]
#[cfg_attr(test, automock)]
pub trait TransferRepository: Send + Sync {
    /// Stores `record` unless its id is already present. Never overwrites.
    async fn create_if_absent(&self, record: TransferRecord)
        -> Result<CreateOutcome, RepositoryError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<TransferRecord>, RepositoryError>;

    /// Moves the record to `status` if that is a legal lifecycle transition.
    ///
    /// Returns the updated record when this call changed it, `None` when the
    /// transition was not legal (stale or terminal) and nothing was written.
    async fn advance_status(
        &self,
        id: &str,
        status: TransferStatus,
        reason: Option<String>,
    ) -> Result<Option<TransferRecord>, RepositoryError>;

    async fn list_non_terminal(&self) -> Result<Vec<TransferRecord>, RepositoryError>;

    async fn count(&self) -> Result<usize, RepositoryError>;
}
