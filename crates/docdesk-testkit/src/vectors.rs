//! Timeline vectors for the edit-permission policy.
//!
//! Each vector fixes a grant and a point in time relative to the
//! document's creation, and records what the owner should see.

use serde::{Deserialize, Serialize};

use docdesk_core::{DocumentKind, Identity, HOUR_MS};
use docdesk_perms::{affordance, can_edit, should_offer_edit_request, EditAffordance, EditGrant};

use crate::fixtures::{document, with_grant, T0};

/// Expected owner view at one point in a document's life.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineVector {
    /// Human-readable name for the vector.
    pub name: String,
    /// Milliseconds since creation.
    pub elapsed_ms: i64,
    /// Grant on the document, if any.
    pub grant: EditGrant,
    /// Expected `can_edit` for the owner.
    pub can_edit: bool,
    /// Expected `should_offer_edit_request` for the owner.
    pub should_offer_edit_request: bool,
}

impl TimelineVector {
    fn new(name: &str, elapsed_ms: i64, grant: EditGrant, can_edit: bool, offer: bool) -> Self {
        Self {
            name: name.to_owned(),
            elapsed_ms,
            grant,
            can_edit,
            should_offer_edit_request: offer,
        }
    }

    /// Affordance implied by the two expected predicates.
    pub fn expected_affordance(&self) -> EditAffordance {
        match (self.can_edit, self.should_offer_edit_request) {
            (true, _) => EditAffordance::Edit,
            (false, true) => EditAffordance::RequestEdit,
            (false, false) => EditAffordance::None,
        }
    }
}

/// The owner timeline: free window, lapse, grant, expiry.
pub fn all_vectors() -> Vec<TimelineVector> {
    let grant = EditGrant::until(T0.plus_hours(30));
    vec![
        TimelineVector::new("fresh document", HOUR_MS, EditGrant::none(), true, false),
        TimelineVector::new(
            "last millisecond of the window",
            24 * HOUR_MS - 1,
            EditGrant::none(),
            true,
            false,
        ),
        TimelineVector::new("window just closed", 24 * HOUR_MS, EditGrant::none(), false, true),
        TimelineVector::new("window closed, no grant", 25 * HOUR_MS, EditGrant::none(), false, true),
        TimelineVector::new("inside admin grant", 26 * HOUR_MS, grant, true, false),
        TimelineVector::new("grant expires at its instant", 30 * HOUR_MS, grant, false, true),
        TimelineVector::new("grant expired", 31 * HOUR_MS, grant, false, true),
        TimelineVector::new(
            "unbounded grant",
            90 * 24 * HOUR_MS,
            EditGrant::unbounded(),
            true,
            false,
        ),
    ]
}

/// Check one vector against every document kind. Returns the mismatches.
pub fn check_vector(vector: &TimelineVector) -> Vec<String> {
    let owner = Identity::user("owner");
    let now = T0.plus_millis(vector.elapsed_ms);
    let mut failures = Vec::new();

    for kind in DocumentKind::ALL {
        let doc = with_grant(document(kind, "doc-1", &owner), vector.grant);
        let got_edit = can_edit(&doc, &owner, now);
        let got_offer = should_offer_edit_request(&doc, &owner, now);
        let got_affordance = affordance(&doc, &owner, now);

        if got_edit != vector.can_edit
            || got_offer != vector.should_offer_edit_request
            || got_affordance != vector.expected_affordance()
        {
            failures.push(format!(
                "{} ({}): can_edit={} offer={} affordance={:?}",
                vector.name,
                kind.label(),
                got_edit,
                got_offer,
                got_affordance
            ));
        }
    }

    failures
}

/// Check every vector. Returns all mismatches.
pub fn verify_all_vectors() -> Vec<String> {
    all_vectors().iter().flat_map(check_vector).collect()
}
