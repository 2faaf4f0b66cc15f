//! In-memory transfer store.
//!
//! A single async mutex serialises every write, which makes insert-if-absent and
//! status advancement atomic per record.
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, MutexGuard};

use super::{CreateOutcome, TransferRepository};
use crate::models::{RepositoryError, TransferRecord, TransferStatus};

#[derive(Debug)]
pub struct InMemoryTransferRepository {
    store: Mutex<HashMap<String, TransferRecord>>,
}

impl InMemoryTransferRepository {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
        }
    }

    async fn acquire_lock<T>(lock: &Mutex<T>) -> Result<MutexGuard<T>, RepositoryError> {
        Ok(lock.lock().await)
    }
}

impl Default for InMemoryTransferRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransferRepository for InMemoryTransferRepository {
    async fn create_if_absent(
        &self,
        record: TransferRecord,
    ) -> Result<CreateOutcome, RepositoryError> {
        let mut store = Self::acquire_lock(&self.store).await?;
        if let Some(existing) = store.get(&record.id) {
            return Ok(CreateOutcome::Existing(existing.clone()));
        }
        store.insert(record.id.clone(), record.clone());
        Ok(CreateOutcome::Created(record))
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<TransferRecord>, RepositoryError> {
        let store = Self::acquire_lock(&self.store).await?;
        Ok(store.get(id).cloned())
    }

    async fn advance_status(
        &self,
        id: &str,
        status: TransferStatus,
        reason: Option<String>,
    ) -> Result<Option<TransferRecord>, RepositoryError> {
        let mut store = Self::acquire_lock(&self.store).await?;
        let record = store.get_mut(id).ok_or_else(|| {
            RepositoryError::NotFound(format!("Transfer with id {id} not found"))
        })?;

        if !record.status.can_transition_to(status) {
            return Ok(None);
        }

        record.status = status;
        record.status_reason = reason;
        record.updated_at = Utc::now().to_rfc3339();
        Ok(Some(record.clone()))
    }

    async fn list_non_terminal(&self) -> Result<Vec<TransferRecord>, RepositoryError> {
        let store = Self::acquire_lock(&self.store).await?;
        Ok(store
            .values()
            .filter(|record| !record.status.is_terminal())
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        let store = Self::acquire_lock(&self.store).await?;
        Ok(store.len())
    }
}
