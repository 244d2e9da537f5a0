//! # DocDesk Permissions
//!
//! The edit-permission policy shared by every document kind.
//!
//! ## Overview
//!
//! An owner may edit a document freely for [`INITIAL_WINDOW_MS`] after
//! creating it. Afterwards, editing needs an admin grant: `allowEditing`
//! set, optionally bounded by `editableUntil`. Admins may always edit;
//! other users never may.
//!
//! The policy is written once against the [`Editable`] trait, which the
//! invoice, purchase order and stock register types all implement.
//!
//! ## Key Concepts
//!
//! - **Initial window**: 24 hours from creation, owner only
//! - **Grant**: admin-issued extension, unbounded or with an expiry
//! - **Edit request**: offered to an owner once both of the above have lapsed
//!
//! All functions are pure. The caller supplies `now`.
//!
//! ## Usage
//!
//! ```rust
//! use docdesk_core::{Identity, Timestamp};
//! use docdesk_perms::{affordance, EditAffordance, EditGrant, Editable};
//! # use docdesk_core::UserId;
//! # struct Note { owner: UserId, created: Timestamp }
//! # impl Editable for Note {
//! #     fn owner_id(&self) -> &UserId { &self.owner }
//! #     fn created_at(&self) -> Timestamp { self.created }
//! #     fn grant(&self) -> EditGrant { EditGrant::none() }
//! # }
//!
//! let t0 = Timestamp::from_millis(0);
//! let note = Note { owner: "alice".into(), created: t0 };
//! let alice = Identity::user("alice");
//!
//! assert_eq!(affordance(&note, &alice, t0.plus_hours(1)), EditAffordance::Edit);
//! assert_eq!(affordance(&note, &alice, t0.plus_hours(25)), EditAffordance::RequestEdit);
//! ```

pub mod error;
pub mod grant;
pub mod policy;

pub use error::{PermsError, Result};
pub use grant::EditGrant;
pub use policy::{
    affordance, authorize_edit, can_edit, should_offer_edit_request, within_initial_window,
    EditAffordance, Editable, INITIAL_WINDOW_MS,
};
