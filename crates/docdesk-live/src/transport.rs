//! Transport abstraction for the push channel.
//!
//! A [`Transport`] opens channels; a [`Channel`] is one live connection.
//! Implementations may use WebSockets, Socket.IO or anything else that can
//! carry [`ClientMessage`] frames out and [`ServerEvent`] frames in.

use std::time::Duration;

use async_trait::async_trait;

use docdesk_core::UserId;

use crate::error::Result;
use crate::messages::{ClientMessage, ConnectionId, ServerEvent};

/// Opens push channels.
#[async_trait]
pub trait Transport: Send + Sync {
    /// The channel type produced by [`Transport::connect`].
    type Channel: Channel;

    /// Open a channel on behalf of `user_id`.
    async fn connect(&self, user_id: &UserId) -> Result<Self::Channel>;
}

/// One open push channel.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Identity of this channel instance.
    fn id(&self) -> ConnectionId;

    /// Send a control message to the server.
    async fn send(&self, message: ClientMessage) -> Result<()>;

    /// Receive the next event, waiting at most `timeout`.
    ///
    /// Returns `Ok(None)` on timeout and `Err(TransportDropped)` once the
    /// server side has gone away.
    async fn recv_timeout(&self, timeout: Duration) -> Result<Option<ServerEvent>>;

    /// Close the channel. Closing twice is harmless.
    async fn close(&self) -> Result<()>;
}

/// A simple in-memory transport for testing.
///
/// A [`MemoryHub`] plays the server: it tracks which channels joined which
/// rooms and lets tests push events to a user or to all admins.
pub mod memory {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::{mpsc, RwLock};

    use crate::error::LiveError;
    use crate::messages::AdminRoomAck;

    /// Per-channel mailbox size.
    pub const MAILBOX_CAPACITY: usize = 1000;

    /// A broadcast group on the hub.
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub enum Room {
        User(UserId),
        Admins,
    }

    /// What the hub hands to a channel.
    #[derive(Debug)]
    enum Delivery {
        Event(ServerEvent),
        Dropped(String),
    }

    /// Server-side view of one channel.
    struct Registration {
        user_id: UserId,
        identified: Option<UserId>,
        rooms: HashSet<Room>,
        sender: mpsc::Sender<Delivery>,
    }

    /// Shared state of the in-memory push server.
    pub struct MemoryHub {
        connections: RwLock<HashMap<ConnectionId, Registration>>,
        refuse_connections: AtomicBool,
    }

    impl MemoryHub {
        /// Create a new hub.
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        /// Create a transport that opens channels on this hub.
        pub fn transport(self: &Arc<Self>) -> MemoryTransport {
            MemoryTransport {
                hub: Arc::clone(self),
            }
        }

        /// Make subsequent connects fail (or succeed again).
        pub fn refuse_connections(&self, refuse: bool) {
            self.refuse_connections.store(refuse, Ordering::SeqCst);
        }

        /// Push an event to every channel in `room`.
        ///
        /// Returns the number of channels it was delivered to.
        pub async fn emit(&self, room: &Room, event: ServerEvent) -> usize {
            let connections = self.connections.read().await;
            let mut delivered = 0;
            for registration in connections.values() {
                if registration.rooms.contains(room) {
                    // Full or closed mailboxes miss the event
                    match registration.sender.try_send(Delivery::Event(event.clone())) {
                        Ok(()) => delivered += 1,
                        Err(e) => {
                            tracing::debug!(user = %registration.user_id, "event not delivered: {}", e)
                        }
                    }
                }
            }
            delivered
        }

        /// Push an event to the user's room.
        pub async fn emit_to_user(&self, user_id: &UserId, event: ServerEvent) -> usize {
            self.emit(&Room::User(user_id.clone()), event).await
        }

        /// Push an event to the admin room.
        pub async fn emit_to_admins(&self, event: ServerEvent) -> usize {
            self.emit(&Room::Admins, event).await
        }

        /// Simulate the server losing a channel.
        pub async fn drop_connection(&self, id: ConnectionId, reason: &str) -> bool {
            let removed = self.connections.write().await.remove(&id);
            match removed {
                Some(registration) => {
                    let _ = registration
                        .sender
                        .send(Delivery::Dropped(reason.to_owned()))
                        .await;
                    true
                }
                None => false,
            }
        }

        /// Number of open channels.
        pub async fn connection_count(&self) -> usize {
            self.connections.read().await.len()
        }

        /// Open channels belonging to `user_id`.
        pub async fn connections_for(&self, user_id: &UserId) -> Vec<ConnectionId> {
            self.connections
                .read()
                .await
                .iter()
                .filter(|(_, r)| &r.user_id == user_id)
                .map(|(id, _)| *id)
                .collect()
        }

        /// Rooms joined by a channel.
        pub async fn rooms_of(&self, id: ConnectionId) -> HashSet<Room> {
            self.connections
                .read()
                .await
                .get(&id)
                .map(|r| r.rooms.clone())
                .unwrap_or_default()
        }

        /// The user a channel identified as, if it did.
        pub async fn identified_as(&self, id: ConnectionId) -> Option<UserId> {
            self.connections
                .read()
                .await
                .get(&id)
                .and_then(|r| r.identified.clone())
        }

        async fn handle(&self, id: ConnectionId, message: ClientMessage) -> Result<()> {
            let mut connections = self.connections.write().await;
            let registration = connections
                .get_mut(&id)
                .ok_or_else(|| LiveError::TransportDropped("connection closed".into()))?;

            match message {
                ClientMessage::IdentifyUser(user_id) => {
                    registration.identified = Some(user_id);
                }
                ClientMessage::JoinUserRoom(user_id) => {
                    registration.rooms.insert(Room::User(user_id));
                }
                ClientMessage::JoinAdminRoom => {
                    registration.rooms.insert(Room::Admins);
                    let ack = ServerEvent::AdminRoomAck(AdminRoomAck {
                        success: true,
                        message: None,
                    });
                    let _ = registration.sender.try_send(Delivery::Event(ack));
                }
            }
            Ok(())
        }
    }

    impl Default for MemoryHub {
        fn default() -> Self {
            Self {
                connections: RwLock::new(HashMap::new()),
                refuse_connections: AtomicBool::new(false),
            }
        }
    }

    /// Opens [`MemoryChannel`]s on a [`MemoryHub`].
    #[derive(Clone)]
    pub struct MemoryTransport {
        hub: Arc<MemoryHub>,
    }

    #[async_trait]
    impl Transport for MemoryTransport {
        type Channel = MemoryChannel;

        async fn connect(&self, user_id: &UserId) -> Result<MemoryChannel> {
            if self.hub.refuse_connections.load(Ordering::SeqCst) {
                return Err(LiveError::ConnectFailed("connection refused".into()));
            }

            let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
            let id = ConnectionId::random();

            self.hub.connections.write().await.insert(
                id,
                Registration {
                    user_id: user_id.clone(),
                    identified: None,
                    rooms: HashSet::new(),
                    sender: tx,
                },
            );

            Ok(MemoryChannel {
                id,
                hub: Arc::clone(&self.hub),
                receiver: RwLock::new(rx),
            })
        }
    }

    /// In-memory channel implementation.
    pub struct MemoryChannel {
        id: ConnectionId,
        hub: Arc<MemoryHub>,
        receiver: RwLock<mpsc::Receiver<Delivery>>,
    }

    #[async_trait]
    impl Channel for MemoryChannel {
        fn id(&self) -> ConnectionId {
            self.id
        }

        async fn send(&self, message: ClientMessage) -> Result<()> {
            self.hub.handle(self.id, message).await
        }

        async fn recv_timeout(&self, timeout: Duration) -> Result<Option<ServerEvent>> {
            let mut rx = self.receiver.write().await;
            match tokio::time::timeout(timeout, rx.recv()).await {
                Ok(Some(Delivery::Event(event))) => Ok(Some(event)),
                Ok(Some(Delivery::Dropped(reason))) => Err(LiveError::TransportDropped(reason)),
                Ok(None) => Err(LiveError::TransportDropped("channel closed".into())),
                Err(_) => Ok(None), // Timeout
            }
        }

        async fn close(&self) -> Result<()> {
            self.hub.connections.write().await.remove(&self.id);
            self.receiver.write().await.close();
            Ok(())
        }
    }
}
