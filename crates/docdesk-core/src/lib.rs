//! # DocDesk Core
//!
//! Pure domain types for the DocDesk portal: documents, edit requests,
//! identities, saved searches and paginated lists.
//!
//! This crate contains no I/O, no networking and no clock. Anything that
//! depends on "now" takes a [`Timestamp`] argument.
//!
//! ## Key Types
//!
//! - [`Identity`] - The acting user and their [`Role`]
//! - [`Invoice`], [`PurchaseOrder`], [`StockRegister`] - The three document kinds
//! - [`Document`] - Any of the above, tagged by `documentType`
//! - [`EditRequest`] - An owner's petition for a new edit grant
//! - [`Page`] - One page of a pull-based list
//!
//! ## Wire Format
//!
//! All types serialize to the backend's JSON shape: camelCase field names,
//! upper-case enum names and RFC 3339 timestamps.

pub mod document;
pub mod edit_request;
pub mod error;
pub mod page;
pub mod search;
pub mod time;
pub mod types;
pub mod validation;

pub use document::{Document, DocumentKind, DocumentRef, Invoice, PurchaseOrder, StockRegister};
pub use edit_request::{EditRequest, EditRequestStatus};
pub use error::{CoreError, Result, ValidationError};
pub use page::{paginate, Page, PageQuery, StatusFilter, EDIT_REQUEST_PAGE_SIZE};
pub use search::{SavedSearch, SavedSearchForm};
pub use time::{Timestamp, HOUR_MS};
pub use types::{DocumentId, Identity, RequestId, Role, SavedSearchId, UserId, UserInfo};
pub use validation::{validate_rejection, validate_saved_search, validate_submission};
