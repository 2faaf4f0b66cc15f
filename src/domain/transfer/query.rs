use crate::{
    models::{RepositoryError, TransferStatusResponse},
    repositories::TransferRepository,
};

/// Read-only status lookup. `None` when no transfer with `id` was ever admitted.
pub async fn query_transfer_status<TR>(
    transfer_repository: &TR,
    id: &str,
) -> Result<Option<TransferStatusResponse>, RepositoryError>
where
    TR: TransferRepository + ?Sized,
{
    let record = transfer_repository.get_by_id(id).await?;
    Ok(record.map(|record| TransferStatusResponse::new(record.id, record.status)))
}
