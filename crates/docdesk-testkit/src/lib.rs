//! # DocDesk Testkit
//!
//! Testing utilities for DocDesk.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Timeline vectors**: owner permissions at fixed offsets from creation
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: documents created at [`T0`](fixtures::T0), identities,
//!   and a shared hub/fetcher/clock for multi-portal scenarios
//!
//! ## Timeline Vectors
//!
//! ```rust
//! use docdesk_testkit::vectors::{all_vectors, check_vector};
//!
//! for vector in all_vectors() {
//!     assert!(check_vector(&vector).is_empty(), "{}", vector.name);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use docdesk_perms::can_edit;
//! use docdesk_testkit::generators::PermissionCase;
//!
//! proptest! {
//!     #[test]
//!     fn admins_always_edit(case: PermissionCase) {
//!         let admin = docdesk_testkit::fixtures::admin();
//!         prop_assert!(can_edit(&case.document, &admin, case.now));
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use docdesk_testkit::fixtures::{bob, invoice, TestFixture};
//!
//! let fixture = TestFixture::new();
//! let portal = fixture.portal();
//! let inv = invoice("INV-1", &bob());
//! fixture.at_hours(25);
//! assert!(!portal.can_edit(&inv)); // logged out
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{TestFixture, T0};
pub use generators::PermissionCase;
pub use vectors::{all_vectors, check_vector, verify_all_vectors, TimelineVector};
