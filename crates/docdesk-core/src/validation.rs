//! Client-side checks on edit-request and saved-search input.
//!
//! The backend enforces the same rules; these run first so an obviously
//! incomplete action never leaves the client.

use crate::error::ValidationError;
use crate::search::SavedSearchForm;
use crate::types::DocumentId;

/// Validate an owner's edit request before submission.
///
/// Both the document id and a non-blank reason are required.
pub fn validate_submission(document: &DocumentId, reason: &str) -> Result<(), ValidationError> {
    if document.is_blank() {
        return Err(ValidationError::MissingDocumentId);
    }
    if reason.trim().is_empty() {
        return Err(ValidationError::MissingRequestMessage);
    }
    Ok(())
}

/// Validate an admin rejection. Approvals take an optional message; a
/// rejection must say why.
pub fn validate_rejection(response_message: &str) -> Result<(), ValidationError> {
    if response_message.trim().is_empty() {
        return Err(ValidationError::MissingRejectionReason);
    }
    Ok(())
}

/// Validate the save-search form.
pub fn validate_saved_search(form: &SavedSearchForm) -> Result<(), ValidationError> {
    if form.name.trim().is_empty() {
        return Err(ValidationError::MissingSearchName);
    }
    if !form.search_params.is_object() {
        return Err(ValidationError::InvalidSearchParams);
    }
    Ok(())
}
