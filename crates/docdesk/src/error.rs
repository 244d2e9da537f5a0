//! Error types for the portal session.

use docdesk_core::{CoreError, ValidationError};
use docdesk_live::LiveError;
use docdesk_perms::PermsError;
use thiserror::Error;

use crate::fetch::FetchError;

/// Errors that can occur during portal operations.
#[derive(Debug, Error)]
pub enum PortalError {
    /// Domain model error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Input rejected before reaching the backend.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Edit refused by the permission policy.
    #[error("permission error: {0}")]
    Permission(#[from] PermsError),

    /// Push channel error.
    #[error("live update error: {0}")]
    Live(#[from] LiveError),

    /// List fetch failed.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// The backend rejected the session; it has been logged out.
    #[error("session expired or invalid")]
    Unauthorized,

    /// No identity is logged in.
    #[error("not logged in")]
    NotLoggedIn,

    /// Operation not allowed for the current identity.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result type for portal operations.
pub type Result<T> = std::result::Result<T, PortalError>;
