//! Transfer controller.
//!
//! Thin glue between the HTTP routes and the admission gate / status query.
use actix_web::{web, HttpResponse};
use tracing::debug;
use validator::Validate;

use crate::{
    domain::query_transfer_status,
    models::{ApiError, ApiResponse, AppState, SubmitTransferRequest, SubmitTransferResponse},
};

/// Admits a sender-signed transfer and returns its id.
pub async fn submit_transfer(
    request: SubmitTransferRequest,
    state: web::ThinData<AppState>,
) -> Result<HttpResponse, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("INVALID_REQUEST: {e}")))?;

    let id = state
        .admission_gate
        .admit(&request.transaction, request.expiry_height)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(SubmitTransferResponse { id })))
}

/// Returns the lifecycle state of a transfer.
pub async fn get_transfer_status(
    transfer_id: String,
    state: web::ThinData<AppState>,
) -> Result<HttpResponse, ApiError> {
    let response = query_transfer_status(state.transfer_repository.as_ref(), &transfer_id)
        .await?
        .ok_or_else(|| {
            debug!(tx_id = %transfer_id, "transfer status requested for unknown id");
            ApiError::NotFound(format!("Transfer {transfer_id} not found"))
        })?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}
