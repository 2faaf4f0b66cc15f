use serde::Serialize;
use thiserror::Error;

use super::{ApiError, RepositoryError, SignerError};
use crate::domain::InstructionValidationError;

/// Rejection taxonomy exposed to callers of the admission gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Undecodable or structurally wrong input. Never stored.
    MalformedInput,
    /// Well formed but not allowed by relay policy. Never stored.
    PolicyViolation,
    /// Relay side failure; the caller may retry unchanged.
    Internal,
}

#[derive(Error, Debug)]
pub enum AdmissionError {
    #[error("Malformed transaction: {0}")]
    MalformedTransaction(String),

    #[error("Invalid instructions: {0}")]
    InvalidInstructions(#[from] InstructionValidationError),

    #[error("Fee payer {found} does not match relayer address {expected}")]
    FeePayerMismatch { expected: String, found: String },

    #[error("Transaction has no recent blockhash")]
    MissingRecencyMarker,

    #[error("Unexpected signer set: {0}")]
    UnexpectedSigner(String),

    #[error("Account {0} is not allowed to be writable")]
    UnexpectedWritableAccount(String),

    #[error("Sender {0} is not registered")]
    SenderNotRegistered(String),

    #[error("Recipient {0} is not registered")]
    RecipientNotRegistered(String),

    #[error("Sender {0} failed compliance screening")]
    SenderNotCompliant(String),

    #[error("Recipient {0} failed compliance screening")]
    RecipientNotCompliant(String),

    #[error("Sender signature is missing")]
    MissingSenderSignature,

    #[error("Sender signature does not verify against {0}")]
    InvalidSenderSignature(String),

    #[error("Transaction is already signed by the relayer")]
    PrematureRelayerSignature,

    #[error("Signer error: {0}")]
    Signer(#[from] SignerError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl AdmissionError {
    /// Stable machine readable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            AdmissionError::MalformedTransaction(_) => "MALFORMED_TRANSACTION",
            AdmissionError::InvalidInstructions(err) => err.code(),
            AdmissionError::FeePayerMismatch { .. } => "FEE_PAYER_MISMATCH",
            AdmissionError::MissingRecencyMarker => "MISSING_RECENCY_MARKER",
            AdmissionError::UnexpectedSigner(_) => "UNEXPECTED_SIGNER",
            AdmissionError::UnexpectedWritableAccount(_) => "UNEXPECTED_WRITABLE_ACCOUNT",
            AdmissionError::SenderNotRegistered(_) => "SENDER_NOT_REGISTERED",
            AdmissionError::RecipientNotRegistered(_) => "RECIPIENT_NOT_REGISTERED",
            AdmissionError::SenderNotCompliant(_) => "SENDER_NOT_COMPLIANT",
            AdmissionError::RecipientNotCompliant(_) => "RECIPIENT_NOT_COMPLIANT",
            AdmissionError::MissingSenderSignature => "MISSING_SENDER_SIGNATURE",
            AdmissionError::InvalidSenderSignature(_) => "INVALID_SENDER_SIGNATURE",
            AdmissionError::PrematureRelayerSignature => "PREMATURE_RELAYER_SIGNATURE",
            AdmissionError::Signer(_) => "SIGNER_ERROR",
            AdmissionError::Repository(_) => "REPOSITORY_ERROR",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AdmissionError::MalformedTransaction(_)
            | AdmissionError::InvalidInstructions(_)
            | AdmissionError::MissingRecencyMarker => ErrorCategory::MalformedInput,

            AdmissionError::FeePayerMismatch { .. }
            | AdmissionError::UnexpectedSigner(_)
            | AdmissionError::UnexpectedWritableAccount(_)
            | AdmissionError::SenderNotRegistered(_)
            | AdmissionError::RecipientNotRegistered(_)
            | AdmissionError::SenderNotCompliant(_)
            | AdmissionError::RecipientNotCompliant(_)
            | AdmissionError::MissingSenderSignature
            | AdmissionError::InvalidSenderSignature(_)
            | AdmissionError::PrematureRelayerSignature => ErrorCategory::PolicyViolation,

            AdmissionError::Signer(_) | AdmissionError::Repository(_) => ErrorCategory::Internal,
        }
    }
}

impl From<AdmissionError> for ApiError {
    fn from(error: AdmissionError) -> Self {
        match error.category() {
            ErrorCategory::MalformedInput | ErrorCategory::PolicyViolation => {
                ApiError::BadRequest(format!("{}: {}", error.code(), error))
            }
            ErrorCategory::Internal => ApiError::InternalError(error.to_string()),
        }
    }
}
