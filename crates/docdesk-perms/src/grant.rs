//! Admin-issued edit grants.
//!
//! A grant is the pair (`allowEditing`, `editableUntil`) stored on every
//! document. The owner never writes it; an admin sets it when approving an
//! edit request.

use serde::{Deserialize, Serialize};

use docdesk_core::Timestamp;

/// Edit grant state of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditGrant {
    /// Whether an admin has granted edit rights.
    pub allow_editing: bool,

    /// When the grant runs out. `None` with `allow_editing` never expires.
    pub editable_until: Option<Timestamp>,
}

impl EditGrant {
    /// No grant.
    pub const fn none() -> Self {
        Self {
            allow_editing: false,
            editable_until: None,
        }
    }

    /// A grant with no expiry.
    pub const fn unbounded() -> Self {
        Self {
            allow_editing: true,
            editable_until: None,
        }
    }

    /// A grant valid strictly before `until`.
    pub const fn until(until: Timestamp) -> Self {
        Self {
            allow_editing: true,
            editable_until: Some(until),
        }
    }

    /// Build from the raw document columns.
    pub const fn from_fields(allow_editing: bool, editable_until: Option<Timestamp>) -> Self {
        Self {
            allow_editing,
            editable_until,
        }
    }

    /// True if the grant allows editing at `now`.
    ///
    /// `now == editable_until` already counts as expired.
    pub fn is_active(&self, now: Timestamp) -> bool {
        if !self.allow_editing {
            return false;
        }
        match self.editable_until {
            Some(until) => now < until,
            None => true,
        }
    }

    /// True if a bounded grant has run out at `now`.
    ///
    /// A missing grant is not "expired"; it never existed.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        match self.editable_until {
            Some(until) => self.allow_editing && now >= until,
            None => false,
        }
    }
}
