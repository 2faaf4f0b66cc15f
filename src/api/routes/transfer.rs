//! This module defines the HTTP routes for sponsored transfers.
//! Submission goes through the admission gate, lookups through the status query.
use actix_web::{get, post, web, Responder};

use crate::{
    api::controllers::transfer,
    models::{AppState, SubmitTransferRequest},
};

/// Submits a sender-signed stablecoin transfer for sponsorship.
#[post("/transfers")]
async fn submit_transfer(
    request: web::Json<SubmitTransferRequest>,
    data: web::ThinData<AppState>,
) -> impl Responder {
    transfer::submit_transfer(request.into_inner(), data).await
}

/// Retrieves the lifecycle state of a transfer by id.
#[get("/transfers/{transfer_id}")]
async fn get_transfer_status(
    transfer_id: web::Path<String>,
    data: web::ThinData<AppState>,
) -> impl Responder {
    transfer::get_transfer_status(transfer_id.into_inner(), data).await
}

/// Initializes the routes for the transfer module.
pub fn init(cfg: &mut web::ServiceConfig) {
    cfg.service(submit_transfer);
    cfg.service(get_transfer_status);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        domain::{InstructionValidationError, MockAdmissionGateTrait},
        models::{
            AdmissionError, ApiResponse, NewTransferRecord, RepositoryError,
            SubmitTransferResponse, TransferRecord, TransferStatus, TransferStatusResponse,
        },
        repositories::MockTransferRepository,
    };
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;

    fn app_state(gate: MockAdmissionGateTrait, repo: MockTransferRepository) -> AppState {
        AppState::new(Arc::new(gate), Arc::new(repo))
    }

    fn record(status: TransferStatus) -> TransferRecord {
        let mut record = TransferRecord::from(NewTransferRecord {
            id: "transfer-1".to_string(),
            signature: "sig".to_string(),
            encoded_transaction: "AQ==".to_string(),
            sender: "alice".to_string(),
            recipient: "bob".to_string(),
            mint: "mint".to_string(),
            amount: 10,
            recent_blockhash: "hash".to_string(),
            expiry_height: 1000,
        });
        record.status = status;
        record
    }

    #[actix_web::test]
    async fn test_submit_transfer_success() {
        let mut gate = MockAdmissionGateTrait::new();
        gate.expect_admit()
            .withf(|tx, expiry| tx == "AQID" && *expiry == 1000)
            .times(1)
            .returning(|_, _| Box::pin(async { Ok("transfer-1".to_string()) }));

        let app = test::init_service(
            App::new()
                .app_data(web::ThinData(app_state(gate, MockTransferRepository::new())))
                .configure(init),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/transfers")
            .set_json(json!({ "transaction": "AQID", "expiry_height": 1000 }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: ApiResponse<SubmitTransferResponse> = test::read_body_json(resp).await;
        assert!(body.success);
        assert_eq!(body.data.unwrap().id, "transfer-1");
    }

    #[actix_web::test]
    async fn test_submit_transfer_policy_rejection_is_bad_request() {
        let mut gate = MockAdmissionGateTrait::new();
        gate.expect_admit().returning(|_, _| {
            Box::pin(async {
                Err(AdmissionError::InvalidInstructions(
                    InstructionValidationError::InstructionCount(3),
                ))
            })
        });

        let app = test::init_service(
            App::new()
                .app_data(web::ThinData(app_state(gate, MockTransferRepository::new())))
                .configure(init),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/transfers")
            .set_json(json!({ "transaction": "AQID", "expiry_height": 1000 }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ApiResponse<()> = test::read_body_json(resp).await;
        assert!(!body.success);
        assert!(body.error.unwrap().starts_with("INSTRUCTION_COUNT"));
    }

    #[actix_web::test]
    async fn test_submit_transfer_internal_failure_is_server_error() {
        let mut gate = MockAdmissionGateTrait::new();
        gate.expect_admit().returning(|_, _| {
            Box::pin(async {
                Err(AdmissionError::Repository(RepositoryError::ConnectionError(
                    "store down".to_string(),
                )))
            })
        });

        let app = test::init_service(
            App::new()
                .app_data(web::ThinData(app_state(gate, MockTransferRepository::new())))
                .configure(init),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/transfers")
            .set_json(json!({ "transaction": "AQID", "expiry_height": 1000 }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn test_submit_transfer_invalid_body_never_reaches_gate() {
        let mut gate = MockAdmissionGateTrait::new();
        gate.expect_admit().never();

        let app = test::init_service(
            App::new()
                .app_data(web::ThinData(app_state(gate, MockTransferRepository::new())))
                .configure(init),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/transfers")
            .set_json(json!({ "transaction": "", "expiry_height": 1000 }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_get_transfer_status_confirmed() {
        let mut repo = MockTransferRepository::new();
        repo.expect_get_by_id()
            .withf(|id| id == "transfer-1")
            .returning(|_| Box::pin(async { Ok(Some(record(TransferStatus::Confirmed))) }));

        let app = test::init_service(
            App::new()
                .app_data(web::ThinData(app_state(MockAdmissionGateTrait::new(), repo)))
                .configure(init),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/transfers/transfer-1")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: ApiResponse<TransferStatusResponse> = test::read_body_json(resp).await;
        let data = body.data.unwrap();
        assert_eq!(data.status, TransferStatus::Confirmed);
        assert!(!data.settled);
    }

    #[actix_web::test]
    async fn test_get_transfer_status_unknown_id() {
        let mut repo = MockTransferRepository::new();
        repo.expect_get_by_id()
            .returning(|_| Box::pin(async { Ok(None) }));

        let app = test::init_service(
            App::new()
                .app_data(web::ThinData(app_state(MockAdmissionGateTrait::new(), repo)))
                .configure(init),
        )
        .await;

        let req = test::TestRequest::get().uri("/transfers/missing").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
