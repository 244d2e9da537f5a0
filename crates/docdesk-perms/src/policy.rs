//! Edit-permission evaluation.
//!
//! Everything here is a pure function of the document's four permission
//! fields, the acting identity and the supplied `now`.

use docdesk_core::{Document, Identity, Invoice, PurchaseOrder, StockRegister, Timestamp, UserId};

use crate::error::{PermsError, Result};
use crate::grant::EditGrant;

/// How long an owner may edit a new document without a grant (24 hours).
pub const INITIAL_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

/// The permission-relevant shape shared by all document kinds.
pub trait Editable {
    /// The user who created (and owns) the document.
    fn owner_id(&self) -> &UserId;

    /// When the document was created.
    fn created_at(&self) -> Timestamp;

    /// The current admin grant.
    fn grant(&self) -> EditGrant;
}

/// What a list row should offer the current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditAffordance {
    /// Show the edit action.
    Edit,
    /// Show the "request edit" action.
    RequestEdit,
    /// Show neither.
    None,
}

/// True while `now` is less than 24 hours after creation.
///
/// A creation time in the future of `now` counts as inside the window.
pub fn within_initial_window<D: Editable + ?Sized>(doc: &D, now: Timestamp) -> bool {
    now.millis_since(doc.created_at()) < INITIAL_WINDOW_MS
}

/// Check if `identity` may edit `doc` at `now`.
pub fn can_edit<D: Editable + ?Sized>(doc: &D, identity: &Identity, now: Timestamp) -> bool {
    if identity.is_admin() {
        return true;
    }
    if &identity.user_id != doc.owner_id() {
        return false;
    }

    within_initial_window(doc, now) || doc.grant().is_active(now)
}

/// Check if the "request edit" action should be offered.
///
/// Only non-admin owners whose initial window has lapsed, and who hold no
/// grant or an expired one, are offered the request.
pub fn should_offer_edit_request<D: Editable + ?Sized>(
    doc: &D,
    identity: &Identity,
    now: Timestamp,
) -> bool {
    if identity.is_admin() || &identity.user_id != doc.owner_id() {
        return false;
    }
    if within_initial_window(doc, now) {
        return false;
    }

    let grant = doc.grant();
    !grant.allow_editing || grant.is_expired(now)
}

/// Combine both checks into the action a list row should show.
pub fn affordance<D: Editable + ?Sized>(
    doc: &D,
    identity: &Identity,
    now: Timestamp,
) -> EditAffordance {
    if can_edit(doc, identity, now) {
        EditAffordance::Edit
    } else if should_offer_edit_request(doc, identity, now) {
        EditAffordance::RequestEdit
    } else {
        EditAffordance::None
    }
}

/// Like [`can_edit`], but explains a refusal.
pub fn authorize_edit<D: Editable + ?Sized>(
    doc: &D,
    identity: &Identity,
    now: Timestamp,
) -> Result<()> {
    if can_edit(doc, identity, now) {
        return Ok(());
    }
    if &identity.user_id != doc.owner_id() {
        return Err(PermsError::NotOwner);
    }

    let grant = doc.grant();
    match grant.editable_until {
        Some(expired_at) if grant.is_expired(now) => Err(PermsError::GrantExpired { expired_at }),
        _ => Err(PermsError::WindowClosed),
    }
}

macro_rules! impl_editable {
    ($($ty:ty),+) => {
        $(
            impl Editable for $ty {
                fn owner_id(&self) -> &UserId {
                    &self.user_id
                }

                fn created_at(&self) -> Timestamp {
                    self.created_at
                }

                fn grant(&self) -> EditGrant {
                    EditGrant::from_fields(self.allow_editing, self.editable_until)
                }
            }
        )+
    };
}

impl_editable!(Invoice, PurchaseOrder, StockRegister);

impl Editable for Document {
    fn owner_id(&self) -> &UserId {
        match self {
            Document::Invoice(d) => d.owner_id(),
            Document::PurchaseOrder(d) => d.owner_id(),
            Document::StockRegister(d) => d.owner_id(),
        }
    }

    fn created_at(&self) -> Timestamp {
        match self {
            Document::Invoice(d) => d.created_at,
            Document::PurchaseOrder(d) => d.created_at,
            Document::StockRegister(d) => d.created_at,
        }
    }

    fn grant(&self) -> EditGrant {
        match self {
            Document::Invoice(d) => d.grant(),
            Document::PurchaseOrder(d) => d.grant(),
            Document::StockRegister(d) => d.grant(),
        }
    }
}
