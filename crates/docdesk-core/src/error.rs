//! Error types for DocDesk Core.

use thiserror::Error;

use crate::edit_request::EditRequestStatus;
use crate::types::RequestId;

/// Core errors raised by domain operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("edit request {id} is already {status}")]
    AlreadyResolved {
        id: RequestId,
        status: EditRequestStatus,
    },

    #[error("invalid edit request transition: {from} -> {to}")]
    InvalidTransition {
        from: EditRequestStatus,
        to: EditRequestStatus,
    },

    #[error("edit request must reference exactly one document, found {0}")]
    InvalidDocumentRef(usize),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}

/// Validation errors for user-supplied action input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("a document id is required")]
    MissingDocumentId,

    #[error("a reason for the edit request is required")]
    MissingRequestMessage,

    #[error("a reason (responseMessage) is required for rejection")]
    MissingRejectionReason,

    #[error("a name for the saved search is required")]
    MissingSearchName,

    #[error("search parameters must be a JSON object")]
    InvalidSearchParams,
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
