//! # DocDesk
//!
//! The session kernel of the DocDesk document portal: who may edit what,
//! and keeping lists current while admins and users act on edit requests.
//!
//! ## Overview
//!
//! - **Permissions**: owners edit freely for 24 hours, then need an admin grant
//! - **Edit requests**: offered once the window and any grant have lapsed
//! - **Live updates**: a push channel per session turns server events into
//!   notifications and marks affected lists stale
//! - **Lists**: stale lists are refetched through a [`ListFetcher`]
//!
//! ## Usage
//!
//! ```rust,no_run
//! use docdesk::{admin_queue, MemoryFetcher, Portal, PortalConfig, SystemClock};
//! use docdesk::core::{Identity, StatusFilter};
//! use docdesk::live::MemoryHub;
//!
//! async fn example() {
//!     let hub = MemoryHub::new();
//!     let fetcher = MemoryFetcher::new();
//!     let mut portal = Portal::new(hub.transport(), SystemClock, PortalConfig::default());
//!
//!     portal.login(Identity::admin("root")).await;
//!     portal.open_list(&fetcher, admin_queue(StatusFilter::Pending)).await.unwrap();
//!
//!     // Later, on each tick:
//!     portal.poll_events().await;
//!     for note in portal.notifications() {
//!         println!("{:?}: {}", note.tone, note.message);
//!     }
//!     portal.refresh_stale(&fetcher).await.unwrap();
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `docdesk::core` - Domain types (documents, edit requests, pages)
//! - `docdesk::perms` - Edit-permission policy
//! - `docdesk::live` - Push connection and reconciliation

pub mod clock;
pub mod config;
pub mod error;
pub mod fetch;
pub mod portal;

// Re-export component crates
pub use docdesk_core as core;
pub use docdesk_live as live;
pub use docdesk_perms as perms;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{PortalConfig, API_BASE_URL_ENV, WS_URL_ENV};
pub use error::{PortalError, Result};
pub use fetch::{FetchError, ListFetcher, MemoryFetcher};
pub use portal::{admin_queue, document_list, ListPage, Portal};

// Commonly used types
pub use docdesk_core::{Document, DocumentKind, EditRequest, Identity, Role, Timestamp};
pub use docdesk_live::{ConnectOutcome, Notification, Tone};
pub use docdesk_perms::{EditAffordance, EditGrant, Editable};
