//! Error types for the permissions module.

use thiserror::Error;

use docdesk_core::Timestamp;

/// Why an edit was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermsError {
    /// Only the owner (or an admin) may edit.
    #[error("permission denied: not the owner of this document")]
    NotOwner,

    /// The initial window has passed and no grant exists.
    #[error("edit window has closed; an edit request is required")]
    WindowClosed,

    /// A grant existed but has run out.
    #[error("edit grant expired at {expired_at}; an edit request is required")]
    GrantExpired { expired_at: Timestamp },
}

impl PermsError {
    /// True if the owner should be pointed at the edit-request flow.
    pub fn needs_edit_request(&self) -> bool {
        matches!(self, PermsError::WindowClosed | PermsError::GrantExpired { .. })
    }
}

/// Result type for permission checks.
pub type Result<T> = std::result::Result<T, PermsError>;
