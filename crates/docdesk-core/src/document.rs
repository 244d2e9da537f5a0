//! The three document kinds managed by the portal.
//!
//! Every document is owned by the user who created it and carries the same
//! four permission fields: owner, creation time, `allowEditing` and
//! `editableUntil`. The last two are written only by an admin grant.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::time::Timestamp;
use crate::types::{DocumentId, UserId};

/// Discriminator for the document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentKind {
    Invoice,
    PurchaseOrder,
    StockRegister,
}

impl DocumentKind {
    /// All kinds, in display order.
    pub const ALL: [DocumentKind; 3] = [
        DocumentKind::Invoice,
        DocumentKind::PurchaseOrder,
        DocumentKind::StockRegister,
    ];

    /// The wire name (`INVOICE`, `PURCHASE_ORDER`, `STOCK_REGISTER`).
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "INVOICE",
            DocumentKind::PurchaseOrder => "PURCHASE_ORDER",
            DocumentKind::StockRegister => "STOCK_REGISTER",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "Invoice",
            DocumentKind::PurchaseOrder => "Purchase Order",
            DocumentKind::StockRegister => "Stock Register",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DocumentKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INVOICE" => Ok(DocumentKind::Invoice),
            "PURCHASE_ORDER" => Ok(DocumentKind::PurchaseOrder),
            "STOCK_REGISTER" => Ok(DocumentKind::StockRegister),
            other => Err(CoreError::UnknownVariant {
                kind: "document type",
                value: other.to_owned(),
            }),
        }
    }
}

/// A typed reference to exactly one document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentRef {
    Invoice(DocumentId),
    PurchaseOrder(DocumentId),
    StockRegister(DocumentId),
}

impl DocumentRef {
    pub fn new(kind: DocumentKind, id: impl Into<DocumentId>) -> Self {
        let id = id.into();
        match kind {
            DocumentKind::Invoice => DocumentRef::Invoice(id),
            DocumentKind::PurchaseOrder => DocumentRef::PurchaseOrder(id),
            DocumentKind::StockRegister => DocumentRef::StockRegister(id),
        }
    }

    pub fn kind(&self) -> DocumentKind {
        match self {
            DocumentRef::Invoice(_) => DocumentKind::Invoice,
            DocumentRef::PurchaseOrder(_) => DocumentKind::PurchaseOrder,
            DocumentRef::StockRegister(_) => DocumentKind::StockRegister,
        }
    }

    pub fn id(&self) -> &DocumentId {
        match self {
            DocumentRef::Invoice(id)
            | DocumentRef::PurchaseOrder(id)
            | DocumentRef::StockRegister(id) => id,
        }
    }

    /// Build from the three nullable id columns used on the wire.
    ///
    /// Exactly one of them must be present.
    pub fn from_columns(
        invoice_id: Option<DocumentId>,
        purchase_order_id: Option<DocumentId>,
        stock_register_id: Option<DocumentId>,
    ) -> Result<Self, CoreError> {
        match (invoice_id, purchase_order_id, stock_register_id) {
            (Some(id), None, None) => Ok(DocumentRef::Invoice(id)),
            (None, Some(id), None) => Ok(DocumentRef::PurchaseOrder(id)),
            (None, None, Some(id)) => Ok(DocumentRef::StockRegister(id)),
            (a, b, c) => {
                let present = [a.is_some(), b.is_some(), c.is_some()]
                    .iter()
                    .filter(|p| **p)
                    .count();
                Err(CoreError::InvalidDocumentRef(present))
            }
        }
    }

    /// Split into the three nullable id columns used on the wire.
    pub fn to_columns(&self) -> (Option<DocumentId>, Option<DocumentId>, Option<DocumentId>) {
        match self {
            DocumentRef::Invoice(id) => (Some(id.clone()), None, None),
            DocumentRef::PurchaseOrder(id) => (None, Some(id.clone()), None),
            DocumentRef::StockRegister(id) => (None, None, Some(id.clone())),
        }
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.id())
    }
}

/// A purchase invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: DocumentId,
    /// The owner (creator) of the invoice.
    pub user_id: UserId,
    pub company_name: String,
    pub vendor_name: String,
    pub total_amount: f64,
    pub allow_editing: bool,
    #[serde(default)]
    pub editable_until: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A purchase order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    pub id: DocumentId,
    pub user_id: UserId,
    pub purchase_order_number: String,
    pub vendor_name: String,
    pub total_amount: f64,
    pub allow_editing: bool,
    #[serde(default)]
    pub editable_until: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A stock register entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRegister {
    pub id: DocumentId,
    pub user_id: UserId,
    pub article_name: String,
    pub voucher_or_bill_number: String,
    pub total_rate: f64,
    pub allow_editing: bool,
    #[serde(default)]
    pub editable_until: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Any document, tagged by `documentType` as in search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "documentType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Document {
    Invoice(Invoice),
    PurchaseOrder(PurchaseOrder),
    StockRegister(StockRegister),
}

impl Document {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Document::Invoice(_) => DocumentKind::Invoice,
            Document::PurchaseOrder(_) => DocumentKind::PurchaseOrder,
            Document::StockRegister(_) => DocumentKind::StockRegister,
        }
    }

    pub fn id(&self) -> &DocumentId {
        match self {
            Document::Invoice(d) => &d.id,
            Document::PurchaseOrder(d) => &d.id,
            Document::StockRegister(d) => &d.id,
        }
    }

    pub fn owner(&self) -> &UserId {
        match self {
            Document::Invoice(d) => &d.user_id,
            Document::PurchaseOrder(d) => &d.user_id,
            Document::StockRegister(d) => &d.user_id,
        }
    }

    pub fn document_ref(&self) -> DocumentRef {
        DocumentRef::new(self.kind(), self.id().clone())
    }
}

impl From<Invoice> for Document {
    fn from(d: Invoice) -> Self {
        Document::Invoice(d)
    }
}

impl From<PurchaseOrder> for Document {
    fn from(d: PurchaseOrder) -> Self {
        Document::PurchaseOrder(d)
    }
}

impl From<StockRegister> for Document {
    fn from(d: StockRegister) -> Self {
        Document::StockRegister(d)
    }
}
