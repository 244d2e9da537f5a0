//! Saved searches.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::DocumentKind;
use crate::time::Timestamp;
use crate::types::{SavedSearchId, UserId};

/// A named set of search criteria stored for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSearch {
    pub id: SavedSearchId,
    pub name: String,
    pub document_type: DocumentKind,
    pub search_params: Map<String, Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub user_id: UserId,
}

/// Input for creating or updating a saved search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSearchForm {
    pub name: String,
    pub document_type: DocumentKind,
    pub search_params: Value,
}

impl SavedSearchForm {
    pub fn new(name: impl Into<String>, document_type: DocumentKind, search_params: Value) -> Self {
        Self {
            name: name.into(),
            document_type,
            search_params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_search_wire_shape() {
        let json = r#"{
            "id": "s-1",
            "name": "Acme invoices",
            "documentType": "INVOICE",
            "searchParams": { "companyName": "Acme" },
            "createdAt": "2024-05-01T10:00:00.000Z",
            "updatedAt": "2024-05-01T10:00:00.000Z",
            "userId": "u-1"
        }"#;
        let search: SavedSearch = serde_json::from_str(json).unwrap();
        assert_eq!(search.document_type, DocumentKind::Invoice);
        assert_eq!(search.search_params["companyName"], "Acme");
    }
}
