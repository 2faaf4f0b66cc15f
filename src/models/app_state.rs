//! Application state shared with the HTTP handlers.
use std::sync::Arc;

use crate::{domain::AdmissionGateTrait, repositories::TransferRepository};

#[derive(Clone)]
pub struct AppState {
    pub admission_gate: Arc<dyn AdmissionGateTrait>,
    pub transfer_repository: Arc<dyn TransferRepository>,
}

impl AppState {
    pub fn new(
        admission_gate: Arc<dyn AdmissionGateTrait>,
        transfer_repository: Arc<dyn TransferRepository>,
    ) -> Self {
        Self {
            admission_gate,
            transfer_repository,
        }
    }
}
