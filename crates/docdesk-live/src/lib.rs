//! # DocDesk Live
//!
//! Real-time edit-request notifications over a persistent push channel.
//!
//! ## Overview
//!
//! One push connection is kept per authenticated session. The server sends
//! two kinds of events: a new edit request (to admins) and a resolved edit
//! request (to the requester). Each event becomes a transient notification
//! and may mark currently mounted lists stale so they are refetched.
//!
//! ## Key Properties
//!
//! - **At most one connection**: connecting twice as the same identity is a no-op
//! - **No cross-talk**: connecting as another user tears the old connection down first
//! - **Non-fatal**: connect failures and drops become warnings, never errors in the UI path
//! - **Stateless reconciliation**: every event is handled on its own
//!
//! ## Usage
//!
//! ```rust,no_run
//! use docdesk_core::Identity;
//! use docdesk_live::{LiveConfig, LiveConnection, MemoryHub, MountedLists, Reconciler};
//!
//! async fn example() {
//!     let hub = MemoryHub::new();
//!     let mut live = LiveConnection::new(hub.transport(), LiveConfig::default());
//!     let admin = Identity::admin("root");
//!
//!     live.connect(admin.clone()).await;
//!
//!     let mut lists = MountedLists::new();
//!     for event in live.drain().await {
//!         let outcome = Reconciler::reconcile(&admin, &event, &lists);
//!         outcome.apply(&mut lists);
//!     }
//! }
//! ```
//!
//! ## Connection Lifecycle
//!
//! ```text
//!               connect(id)               connect ok
//! Disconnected ------------> Connecting ------------> Connected
//!      ^                         |                        |
//!      |      connect failed     |   disconnect / drop    |
//!      +-------------------------+------------------------+
//! ```

pub mod connection;
pub mod error;
pub mod lists;
pub mod messages;
pub mod reconciler;
pub mod transport;

pub use connection::{
    ConnectOutcome, ConnectionInput, ConnectionMachine, ConnectionState, Directive, LiveConfig,
    LiveConnection,
};
pub use error::{LiveError, Result};
pub use lists::{ListKey, MountedLists, RowId};
pub use messages::{
    AdminRoomAck, ClientMessage, ConnectionId, EditRequestResolvedEvent, EventKind,
    NewEditRequestEvent, ServerEvent,
};
pub use reconciler::{ConnectionNotice, Notification, Reconciler, Reconciliation, Tone};
pub use transport::{
    memory::{MemoryChannel, MemoryHub, MemoryTransport, Room},
    Channel, Transport,
};
