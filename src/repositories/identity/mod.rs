//! Registered identities and their compliance screening result.
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::models::RepositoryError;

mod identity_in_memory;
pub use identity_in_memory::*;

#[async_trait]
#[cfg_attr(test, automock)]
pub trait IdentityRegistry: Send + Sync {
    async fn is_registered(&self, address: &str) -> Result<bool, RepositoryError>;

    /// Unregistered identities are never compliant.
    async fn is_compliant(&self, address: &str) -> Result<bool, RepositoryError>;
}
