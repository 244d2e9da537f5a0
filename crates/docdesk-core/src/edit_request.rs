//! Edit requests.
//!
//! A non-admin owner whose initial edit window has lapsed petitions an admin
//! for a new grant. The admin resolves the request exactly once; resolved
//! requests never change again.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::document::DocumentRef;
use crate::error::{CoreError, Result};
use crate::time::Timestamp;
use crate::types::{DocumentId, RequestId, UserId, UserInfo};

/// Lifecycle status of an edit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EditRequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl EditRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditRequestStatus::Pending => "PENDING",
            EditRequestStatus::Approved => "APPROVED",
            EditRequestStatus::Rejected => "REJECTED",
        }
    }

    /// Approved and Rejected are terminal.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EditRequestStatus::Pending)
    }
}

impl fmt::Display for EditRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditRequestStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(EditRequestStatus::Pending),
            "APPROVED" => Ok(EditRequestStatus::Approved),
            "REJECTED" => Ok(EditRequestStatus::Rejected),
            other => Err(CoreError::UnknownVariant {
                kind: "edit request status",
                value: other.to_owned(),
            }),
        }
    }
}

/// An owner's petition for edit rights on a single document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EditRequestWire", into = "EditRequestWire")]
pub struct EditRequest {
    pub id: RequestId,
    pub document: DocumentRef,
    pub requested_by: UserInfo,
    pub status: EditRequestStatus,
    pub request_message: Option<String>,
    pub response_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub admin_user: Option<UserInfo>,
}

impl EditRequest {
    /// Create a pending request.
    pub fn pending(
        id: impl Into<RequestId>,
        document: DocumentRef,
        requested_by: UserInfo,
        request_message: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            document,
            requested_by,
            status: EditRequestStatus::Pending,
            request_message: Some(request_message.into()),
            response_message: None,
            created_at: now,
            updated_at: now,
            admin_user: None,
        }
    }

    pub fn requested_by_user_id(&self) -> &UserId {
        &self.requested_by.id
    }

    pub fn document_id(&self) -> &DocumentId {
        self.document.id()
    }

    pub fn is_pending(&self) -> bool {
        self.status == EditRequestStatus::Pending
    }

    /// Move a pending request to a terminal status.
    ///
    /// Fails if the request is already resolved or if `status` is `Pending`.
    pub fn resolve(
        &mut self,
        status: EditRequestStatus,
        admin: UserInfo,
        response_message: Option<String>,
        now: Timestamp,
    ) -> Result<()> {
        if self.status.is_terminal() {
            return Err(CoreError::AlreadyResolved {
                id: self.id.clone(),
                status: self.status,
            });
        }
        if !status.is_terminal() {
            return Err(CoreError::InvalidTransition {
                from: self.status,
                to: status,
            });
        }

        self.status = status;
        self.admin_user = Some(admin);
        self.response_message = response_message;
        self.updated_at = now;
        Ok(())
    }
}

/// Backend JSON shape: the document reference is three nullable columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditRequestWire {
    id: RequestId,
    status: EditRequestStatus,
    #[serde(default)]
    request_message: Option<String>,
    #[serde(default)]
    response_message: Option<String>,
    created_at: Timestamp,
    updated_at: Timestamp,
    #[serde(default)]
    invoice_id: Option<DocumentId>,
    #[serde(default)]
    purchase_order_id: Option<DocumentId>,
    #[serde(default)]
    stock_register_id: Option<DocumentId>,
    requested_by: UserInfo,
    #[serde(default)]
    admin_user: Option<UserInfo>,
}

impl TryFrom<EditRequestWire> for EditRequest {
    type Error = CoreError;

    fn try_from(wire: EditRequestWire) -> Result<Self> {
        let document = DocumentRef::from_columns(
            wire.invoice_id,
            wire.purchase_order_id,
            wire.stock_register_id,
        )?;
        Ok(Self {
            id: wire.id,
            document,
            requested_by: wire.requested_by,
            status: wire.status,
            request_message: wire.request_message,
            response_message: wire.response_message,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
            admin_user: wire.admin_user,
        })
    }
}

impl From<EditRequest> for EditRequestWire {
    fn from(req: EditRequest) -> Self {
        let (invoice_id, purchase_order_id, stock_register_id) = req.document.to_columns();
        Self {
            id: req.id,
            status: req.status,
            request_message: req.request_message,
            response_message: req.response_message,
            created_at: req.created_at,
            updated_at: req.updated_at,
            invoice_id,
            purchase_order_id,
            stock_register_id,
            requested_by: req.requested_by,
            admin_user: req.admin_user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentKind;

    fn sample() -> EditRequest {
        EditRequest::pending(
            "req-1",
            DocumentRef::new(DocumentKind::Invoice, "INV-1"),
            UserInfo::new("u-1", "alice"),
            "typo in vendor name",
            Timestamp::from_millis(1_000),
        )
    }

    #[test]
    fn test_resolve_once() {
        let mut req = sample();
        req.resolve(
            EditRequestStatus::Approved,
            UserInfo::new("admin", "root"),
            None,
            Timestamp::from_millis(2_000),
        )
        .unwrap();
        assert_eq!(req.status, EditRequestStatus::Approved);
        assert_eq!(req.updated_at, Timestamp::from_millis(2_000));

        let again = req.resolve(
            EditRequestStatus::Rejected,
            UserInfo::new("admin", "root"),
            Some("no".into()),
            Timestamp::from_millis(3_000),
        );
        assert!(matches!(again, Err(CoreError::AlreadyResolved { .. })));
        assert_eq!(req.status, EditRequestStatus::Approved);
    }

    #[test]
    fn test_resolve_to_pending_is_invalid() {
        let mut req = sample();
        let result = req.resolve(
            EditRequestStatus::Pending,
            UserInfo::new("admin", "root"),
            None,
            Timestamp::from_millis(2_000),
        );
        assert!(matches!(result, Err(CoreError::InvalidTransition { .. })));
        assert!(req.is_pending());
    }

    #[test]
    fn test_wire_shape() {
        let json = r#"{
            "id": "req-9",
            "status": "PENDING",
            "requestMessage": "please",
            "createdAt": "2024-05-02T10:00:00.000Z",
            "updatedAt": "2024-05-02T10:00:00.000Z",
            "invoiceId": null,
            "purchaseOrderId": "PO-3",
            "stockRegisterId": null,
            "requestedBy": { "id": "u-2", "username": "bob" }
        }"#;
        let req: EditRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.document.kind(), DocumentKind::PurchaseOrder);
        assert_eq!(req.document_id().as_str(), "PO-3");
        assert_eq!(req.requested_by_user_id().as_str(), "u-2");

        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["purchaseOrderId"], "PO-3");
        assert!(value["invoiceId"].is_null());
    }

    #[test]
    fn test_wire_rejects_missing_document() {
        let json = r#"{
            "id": "req-9",
            "status": "PENDING",
            "createdAt": "2024-05-02T10:00:00.000Z",
            "updatedAt": "2024-05-02T10:00:00.000Z",
            "requestedBy": { "id": "u-2", "username": "bob" }
        }"#;
        assert!(serde_json::from_str::<EditRequest>(json).is_err());
    }
}
