//! Proptest generators for property-based testing.

use proptest::prelude::*;

use docdesk_core::{DocumentKind, Identity, Role, Timestamp, HOUR_MS};
use docdesk_perms::EditGrant;

use crate::fixtures::{document, with_grant, T0};

/// Generate a role.
pub fn role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::User), Just(Role::Admin)]
}

/// Generate a document kind.
pub fn document_kind() -> impl Strategy<Value = DocumentKind> {
    prop_oneof![
        Just(DocumentKind::Invoice),
        Just(DocumentKind::PurchaseOrder),
        Just(DocumentKind::StockRegister),
    ]
}

/// Generate an identity drawn from a small pool, so owners collide.
pub fn identity() -> impl Strategy<Value = Identity> {
    (prop::sample::select(vec!["alice", "bob", "carol"]), role())
        .prop_map(|(user, role)| Identity::new(user, role))
}

/// Generate an offset from `T0`, between a day before and four days after.
pub fn offset_ms() -> impl Strategy<Value = i64> {
    -24 * HOUR_MS..=96 * HOUR_MS
}

/// Generate a grant: none, unbounded, or expiring around `T0`.
pub fn edit_grant() -> impl Strategy<Value = EditGrant> {
    prop_oneof![
        Just(EditGrant::none()),
        Just(EditGrant::unbounded()),
        offset_ms().prop_map(|off| EditGrant::until(T0.plus_millis(off))),
        // Stale expiry left behind on a revoked grant
        offset_ms().prop_map(|off| EditGrant::from_fields(false, Some(T0.plus_millis(off)))),
    ]
}

/// A document, a viewer and an evaluation time.
#[derive(Debug, Clone)]
pub struct PermissionCase {
    pub document: docdesk_core::Document,
    pub owner: Identity,
    pub viewer: Identity,
    pub now: Timestamp,
}

impl Arbitrary for PermissionCase {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            document_kind(),
            prop::sample::select(vec!["alice", "bob", "carol"]),
            identity(),
            edit_grant(),
            offset_ms(),
        )
            .prop_map(|(kind, owner, viewer, grant, now)| {
                let owner = Identity::user(owner);
                PermissionCase {
                    document: with_grant(document(kind, "doc-1", &owner), grant),
                    owner,
                    viewer,
                    now: T0.plus_millis(now),
                }
            })
            .boxed()
    }
}
