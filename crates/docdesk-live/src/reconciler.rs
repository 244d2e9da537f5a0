//! Translation of push events into notifications and list staleness.
//!
//! [`Reconciler::reconcile`] only decides. Showing the notification and
//! marking the lists stale is left to the caller, so the decision can be
//! tested without any UI.

use docdesk_core::{EditRequestStatus, Identity};

use crate::lists::{ListKey, MountedLists, RowId};
use crate::messages::{EditRequestResolvedEvent, NewEditRequestEvent, ServerEvent};

/// Visual tone of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient, user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub tone: Tone,
    pub message: String,
    /// Notifications with the same key replace each other.
    pub key: Option<&'static str>,
}

impl Notification {
    pub fn new(tone: Tone, message: impl Into<String>) -> Self {
        Self {
            tone,
            message: message.into(),
            key: None,
        }
    }

    pub fn keyed(mut self, key: &'static str) -> Self {
        self.key = Some(key);
        self
    }
}

/// The decided effect of one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub notification: Option<Notification>,
    pub stale: Vec<ListKey>,
}

impl Reconciliation {
    /// An event that has no visible effect.
    pub fn ignore() -> Self {
        Self::default()
    }

    pub fn is_noop(&self) -> bool {
        self.notification.is_none() && self.stale.is_empty()
    }

    /// Mark the decided lists stale.
    pub fn apply(&self, lists: &mut MountedLists) {
        for key in &self.stale {
            lists.mark_stale(key);
        }
    }
}

/// Connection lifecycle events that may deserve a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionNotice {
    Connected,
    ConnectFailed(String),
    Dropped(String),
    /// Logout or identity change.
    ClosedByClient,
}

/// Stateless event reconciler.
pub struct Reconciler;

impl Reconciler {
    /// Decide what `event` means for `identity` given the mounted lists.
    pub fn reconcile(identity: &Identity, event: &ServerEvent, lists: &MountedLists) -> Reconciliation {
        match event {
            ServerEvent::NewEditRequest(event) => Self::new_request(identity, event, lists),
            ServerEvent::EditRequestResolved(event) => Self::resolved(identity, event, lists),
            ServerEvent::AdminRoomAck(ack) => {
                if ack.success {
                    tracing::debug!("admin room joined");
                } else {
                    tracing::warn!(
                        "failed to join admin room: {}",
                        ack.message.as_deref().unwrap_or("N/A")
                    );
                }
                Reconciliation::ignore()
            }
        }
    }

    fn new_request(
        identity: &Identity,
        event: &NewEditRequestEvent,
        lists: &MountedLists,
    ) -> Reconciliation {
        if !identity.is_admin() {
            tracing::debug!(user = %identity.user_id, "discarding admin event for non-admin");
            return Reconciliation::ignore();
        }

        Reconciliation {
            notification: Some(Notification::new(Tone::Info, event.display_message())),
            stale: lists.pending_request_queues(),
        }
    }

    fn resolved(
        identity: &Identity,
        event: &EditRequestResolvedEvent,
        lists: &MountedLists,
    ) -> Reconciliation {
        if let Some(request) = &event.edit_request {
            if request.requested_by_user_id() != &identity.user_id {
                tracing::debug!(
                    request = %event.request_id,
                    user = %identity.user_id,
                    "discarding resolution addressed to another user"
                );
                return Reconciliation::ignore();
            }
        }

        let tone = match event.status {
            EditRequestStatus::Approved => Tone::Success,
            EditRequestStatus::Rejected => Tone::Error,
            EditRequestStatus::Pending => Tone::Info,
        };

        let mut stale = lists.lists_showing(&RowId::Request(event.request_id.clone()));
        let document = match &event.edit_request {
            Some(request) => Some(&request.document),
            None => lists.document_of(&event.request_id),
        };
        if let Some(document) = document {
            for key in lists.lists_showing(&RowId::Document(document.clone())) {
                if !stale.contains(&key) {
                    stale.push(key);
                }
            }
        }

        Reconciliation {
            notification: Some(Notification::new(tone, event.display_message())),
            stale,
        }
    }

    /// Notification for a connection lifecycle event, if any.
    ///
    /// Client-initiated closes stay silent.
    pub fn connection_notice(notice: &ConnectionNotice) -> Option<Notification> {
        match notice {
            ConnectionNotice::Connected => Some(
                Notification::new(Tone::Success, "Real-time link active.").keyed("socket-status"),
            ),
            ConnectionNotice::ConnectFailed(_) => Some(
                Notification::new(Tone::Error, "Cannot connect for real-time updates.")
                    .keyed("socket-connect-error"),
            ),
            ConnectionNotice::Dropped(reason) => Some(
                Notification::new(Tone::Warning, format!("Real-time link lost: {reason}"))
                    .keyed("socket-status"),
            ),
            ConnectionNotice::ClosedByClient => None,
        }
    }
}
