//! Push-channel message types.
//!
//! Frames are JSON objects `{"event": <name>, "data": <payload>}`. Payloads
//! carry a human-readable `message` plus structured fields.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use docdesk_core::{EditRequest, EditRequestStatus, RequestId, UserId};

use crate::error::Result;

/// Identifier of one channel instance, assigned on connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub u64);

impl ConnectionId {
    /// Generate a random connection ID.
    pub fn random() -> Self {
        use rand::Rng;
        Self(rand::thread_rng().gen())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Messages sent by the client after connecting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Associate the channel with a user.
    IdentifyUser(UserId),
    /// Subscribe to events addressed to this user.
    JoinUserRoom(UserId),
    /// Subscribe to the admin broadcast group. Admins only.
    JoinAdminRoom,
}

impl ClientMessage {
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(frame: &str) -> Result<Self> {
        Ok(serde_json::from_str(frame)?)
    }
}

/// Events pushed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// A user submitted an edit request. Sent to admins.
    #[serde(rename = "new-edit-request")]
    NewEditRequest(NewEditRequestEvent),

    /// An admin approved or rejected a request. Sent to the requester.
    #[serde(rename = "edit-request-update")]
    EditRequestResolved(EditRequestResolvedEvent),

    /// Reply to [`ClientMessage::JoinAdminRoom`].
    #[serde(rename = "joined-admin-room-ack")]
    AdminRoomAck(AdminRoomAck),
}

impl ServerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ServerEvent::NewEditRequest(_) => EventKind::NewEditRequest,
            ServerEvent::EditRequestResolved(_) => EventKind::EditRequestResolved,
            ServerEvent::AdminRoomAck(_) => EventKind::AdminRoomAck,
        }
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(frame: &str) -> Result<Self> {
        Ok(serde_json::from_str(frame)?)
    }
}

/// Discriminator used for handler subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    NewEditRequest,
    EditRequestResolved,
    AdminRoomAck,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [
        EventKind::NewEditRequest,
        EventKind::EditRequestResolved,
        EventKind::AdminRoomAck,
    ];
}

/// Payload of `new-edit-request`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEditRequestEvent {
    #[serde(default)]
    pub message: String,
    #[serde(
        default,
        deserialize_with = "lenient_edit_request",
        skip_serializing_if = "Option::is_none"
    )]
    pub edit_request: Option<EditRequest>,
}

impl NewEditRequestEvent {
    /// The server's message, or a generic one if it sent none.
    pub fn display_message(&self) -> String {
        if self.message.trim().is_empty() {
            "New edit request submitted!".to_owned()
        } else {
            self.message.clone()
        }
    }
}

/// Payload of `edit-request-update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequestResolvedEvent {
    pub request_id: RequestId,
    pub status: EditRequestStatus,
    #[serde(default)]
    pub message: String,
    #[serde(
        default,
        deserialize_with = "lenient_edit_request",
        skip_serializing_if = "Option::is_none"
    )]
    pub edit_request: Option<EditRequest>,
}

impl EditRequestResolvedEvent {
    /// The server's message, or one built from the id and status.
    pub fn display_message(&self) -> String {
        if self.message.trim().is_empty() {
            format!(
                "Edit request {} {}.",
                self.request_id,
                self.status.as_str().to_lowercase()
            )
        } else {
            self.message.clone()
        }
    }
}

/// Read the optional `editRequest` payload. One that does not parse is
/// dropped so the event's id, status and message still get through.
fn lenient_edit_request<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<EditRequest>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match serde_json::from_value(value) {
        Ok(request) => Some(request),
        Err(e) => {
            tracing::debug!("ignoring unreadable editRequest payload: {}", e);
            None
        }
    }))
}

/// Payload of `joined-admin-room-ack`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRoomAck {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
