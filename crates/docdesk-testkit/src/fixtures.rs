//! Test fixtures and helpers.
//!
//! Documents here are all created at [`T0`] so timelines read as offsets.

use std::sync::Arc;

use docdesk::{ManualClock, MemoryFetcher, Portal, PortalConfig};
use docdesk_core::{
    Document, DocumentId, DocumentKind, DocumentRef, EditRequest, Identity, Invoice,
    PurchaseOrder, StockRegister, Timestamp, UserInfo,
};
use docdesk_live::{MemoryHub, MemoryTransport};
use docdesk_perms::EditGrant;

/// Creation time of every fixture document: 2024-03-01T09:00:00Z.
pub const T0: Timestamp = Timestamp::from_millis(1_709_283_600_000);

pub fn alice() -> Identity {
    Identity::user("alice")
}

pub fn bob() -> Identity {
    Identity::user("bob")
}

pub fn admin() -> Identity {
    Identity::admin("root")
}

/// An invoice owned by `owner`, created at `T0`, without a grant.
pub fn invoice(id: &str, owner: &Identity) -> Invoice {
    Invoice {
        id: DocumentId::new(id),
        user_id: owner.user_id.clone(),
        company_name: "Acme Traders".into(),
        vendor_name: "Globex Supplies".into(),
        total_amount: 1250.0,
        allow_editing: false,
        editable_until: None,
        created_at: T0,
        updated_at: T0,
    }
}

/// A purchase order owned by `owner`, created at `T0`, without a grant.
pub fn purchase_order(id: &str, owner: &Identity) -> PurchaseOrder {
    PurchaseOrder {
        id: DocumentId::new(id),
        user_id: owner.user_id.clone(),
        purchase_order_number: format!("PO-{id}"),
        vendor_name: "Globex Supplies".into(),
        total_amount: 830.5,
        allow_editing: false,
        editable_until: None,
        created_at: T0,
        updated_at: T0,
    }
}

/// A stock register entry owned by `owner`, created at `T0`, without a grant.
pub fn stock_register(id: &str, owner: &Identity) -> StockRegister {
    StockRegister {
        id: DocumentId::new(id),
        user_id: owner.user_id.clone(),
        article_name: "A4 paper, 80gsm".into(),
        voucher_or_bill_number: format!("VB-{id}"),
        total_rate: 42.0,
        allow_editing: false,
        editable_until: None,
        created_at: T0,
        updated_at: T0,
    }
}

/// A document of `kind` owned by `owner`, created at `T0`.
pub fn document(kind: DocumentKind, id: &str, owner: &Identity) -> Document {
    match kind {
        DocumentKind::Invoice => invoice(id, owner).into(),
        DocumentKind::PurchaseOrder => purchase_order(id, owner).into(),
        DocumentKind::StockRegister => stock_register(id, owner).into(),
    }
}

/// Apply an admin grant to any document.
pub fn with_grant(document: Document, grant: EditGrant) -> Document {
    match document {
        Document::Invoice(mut d) => {
            d.allow_editing = grant.allow_editing;
            d.editable_until = grant.editable_until;
            d.into()
        }
        Document::PurchaseOrder(mut d) => {
            d.allow_editing = grant.allow_editing;
            d.editable_until = grant.editable_until;
            d.into()
        }
        Document::StockRegister(mut d) => {
            d.allow_editing = grant.allow_editing;
            d.editable_until = grant.editable_until;
            d.into()
        }
    }
}

/// A pending request by `requester` for `document`, submitted at `at`.
pub fn edit_request(
    id: &str,
    document: DocumentRef,
    requester: &Identity,
    at: Timestamp,
) -> EditRequest {
    EditRequest::pending(
        id,
        document,
        UserInfo::new(requester.user_id.clone(), requester.user_id.as_str()),
        "figures need correcting",
        at,
    )
}

/// A hub, a fetcher and a clock shared by every portal made from it.
pub struct TestFixture {
    pub hub: Arc<MemoryHub>,
    pub fetcher: Arc<MemoryFetcher>,
    pub clock: ManualClock,
}

impl TestFixture {
    /// Fixture with the clock at `T0`.
    pub fn new() -> Self {
        Self {
            hub: MemoryHub::new(),
            fetcher: Arc::new(MemoryFetcher::new()),
            clock: ManualClock::new(T0),
        }
    }

    /// A logged-out portal on the shared hub and clock.
    pub fn portal(&self) -> Portal<MemoryTransport, ManualClock> {
        Portal::new(self.hub.transport(), self.clock.clone(), PortalConfig::default())
    }

    /// Set the clock to `T0 + hours`.
    pub fn at_hours(&self, hours: i64) {
        self.clock.set(T0.plus_hours(hours));
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
