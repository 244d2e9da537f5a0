//! Push-channel connection lifecycle.
//!
//! [`ConnectionMachine`] is the pure state machine; [`LiveConnection`] drives
//! it against a [`Transport`] and owns the open channel.

use std::collections::HashSet;
use std::time::Duration;

use docdesk_core::Identity;

use crate::error::LiveError;
use crate::messages::{ClientMessage, ConnectionId, EventKind, ServerEvent};
use crate::reconciler::ConnectionNotice;
use crate::transport::{Channel, Transport};

/// Configuration for the push connection.
#[derive(Debug, Clone)]
pub struct LiveConfig {
    /// Push server URL, handed to transports that need one.
    pub ws_url: String,
    /// Give up on a connect attempt after this long.
    pub connect_timeout: Duration,
    /// Upper bound on events returned by one [`LiveConnection::drain`].
    pub max_events_per_drain: usize,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            ws_url: "http://localhost:3001".to_owned(),
            connect_timeout: Duration::from_secs(10),
            max_events_per_drain: 100,
        }
    }
}

/// Connection state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting {
        identity: Identity,
    },
    Connected {
        identity: Identity,
        connection_id: ConnectionId,
    },
}

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionInput {
    ConnectRequested(Identity),
    ConnectSucceeded(ConnectionId),
    ConnectFailed(String),
    DisconnectRequested,
    TransportDropped(String),
}

/// What the driver must do after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Nothing,
    Open(Identity),
    Teardown,
    TeardownThenOpen(Identity),
}

/// Pure connection state machine.
#[derive(Debug, Default)]
pub struct ConnectionMachine {
    state: ConnectionState,
}

impl ConnectionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, ConnectionState::Connected { .. })
    }

    /// The identity the connection is (being) established for.
    pub fn tracked_identity(&self) -> Option<&Identity> {
        match &self.state {
            ConnectionState::Disconnected => None,
            ConnectionState::Connecting { identity }
            | ConnectionState::Connected { identity, .. } => Some(identity),
        }
    }

    /// Apply an input and return the directive for the driver.
    pub fn apply(&mut self, input: ConnectionInput) -> Directive {
        use ConnectionInput as In;
        use ConnectionState as St;

        match (&self.state, input) {
            (St::Disconnected, In::ConnectRequested(identity)) => {
                self.state = St::Connecting {
                    identity: identity.clone(),
                };
                Directive::Open(identity)
            }
            (St::Connecting { identity: current }, In::ConnectRequested(identity))
            | (St::Connected { identity: current, .. }, In::ConnectRequested(identity)) => {
                if *current == identity {
                    return Directive::Nothing;
                }
                self.state = St::Connecting {
                    identity: identity.clone(),
                };
                Directive::TeardownThenOpen(identity)
            }
            (St::Connecting { identity }, In::ConnectSucceeded(connection_id)) => {
                self.state = St::Connected {
                    identity: identity.clone(),
                    connection_id,
                };
                Directive::Nothing
            }
            (St::Connecting { .. }, In::ConnectFailed(_)) => {
                self.state = St::Disconnected;
                Directive::Nothing
            }
            (St::Connecting { .. }, In::DisconnectRequested)
            | (St::Connected { .. }, In::DisconnectRequested)
            | (St::Connected { .. }, In::TransportDropped(_)) => {
                self.state = St::Disconnected;
                Directive::Teardown
            }
            (_, input) => {
                tracing::debug!(?input, state = ?self.state, "ignoring connection input");
                Directive::Nothing
            }
        }
    }
}

/// Result of [`LiveConnection::connect`]. Failures are not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// Already connected (or connecting) as this identity.
    Unchanged,
    Connected(ConnectionId),
    Failed,
}

/// Owns the push channel for one session.
pub struct LiveConnection<T: Transport> {
    transport: T,
    config: LiveConfig,
    machine: ConnectionMachine,
    channel: Option<T::Channel>,
    subscriptions: HashSet<EventKind>,
    notices: Vec<ConnectionNotice>,
}

impl<T: Transport> LiveConnection<T> {
    pub fn new(transport: T, config: LiveConfig) -> Self {
        Self {
            transport,
            config,
            machine: ConnectionMachine::new(),
            channel: None,
            subscriptions: HashSet::new(),
            notices: Vec::new(),
        }
    }

    pub fn state(&self) -> &ConnectionState {
        self.machine.state()
    }

    pub fn is_connected(&self) -> bool {
        self.machine.is_connected()
    }

    pub fn tracked_identity(&self) -> Option<&Identity> {
        self.machine.tracked_identity()
    }

    /// Id of the open channel, if any.
    pub fn connection_id(&self) -> Option<ConnectionId> {
        self.channel.as_ref().map(|c| c.id())
    }

    pub fn is_subscribed(&self, kind: EventKind) -> bool {
        self.subscriptions.contains(&kind)
    }

    /// Lifecycle notices recorded since the last call.
    pub fn take_notices(&mut self) -> Vec<ConnectionNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Connect as `identity`.
    ///
    /// A no-op if already connected as the same identity. A different
    /// identity tears the current channel down before opening a new one.
    pub async fn connect(&mut self, identity: Identity) -> ConnectOutcome {
        match self.machine.apply(ConnectionInput::ConnectRequested(identity)) {
            Directive::Open(identity) => self.open(identity).await,
            Directive::TeardownThenOpen(identity) => {
                self.teardown().await;
                self.open(identity).await
            }
            Directive::Teardown => {
                self.teardown().await;
                ConnectOutcome::Failed
            }
            Directive::Nothing => ConnectOutcome::Unchanged,
        }
    }

    /// Disconnect on logout. Idempotent.
    pub async fn disconnect(&mut self) {
        if self.machine.apply(ConnectionInput::DisconnectRequested) == Directive::Teardown {
            self.teardown().await;
            self.notices.push(ConnectionNotice::ClosedByClient);
        }
    }

    /// Wait up to `timeout` for the next event.
    ///
    /// Returns `None` when not connected, on timeout, on a receive error,
    /// or when the channel drops (which is recorded as a notice).
    pub async fn poll(&mut self, timeout: Duration) -> Option<ServerEvent> {
        loop {
            let result = match &self.channel {
                Some(channel) => channel.recv_timeout(timeout).await,
                None => return None,
            };

            match result {
                Ok(Some(event)) => {
                    if let Some(event) = self.accept(event) {
                        return Some(event);
                    }
                }
                Ok(None) => return None,
                Err(LiveError::TransportDropped(reason)) => {
                    tracing::warn!("real-time link lost: {}", reason);
                    if self.machine.apply(ConnectionInput::TransportDropped(reason.clone()))
                        == Directive::Teardown
                    {
                        self.teardown().await;
                    }
                    self.notices.push(ConnectionNotice::Dropped(reason));
                    return None;
                }
                Err(e) => {
                    tracing::warn!("push channel receive failed: {}", e);
                    return None;
                }
            }
        }
    }

    /// Collect every event that is already waiting.
    pub async fn drain(&mut self) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while events.len() < self.config.max_events_per_drain {
            match self.poll(Duration::ZERO).await {
                Some(event) => events.push(event),
                None => break,
            }
        }
        events
    }

    /// Filter an inbound event: only subscribed kinds pass, and only while
    /// connected.
    pub fn accept(&self, event: ServerEvent) -> Option<ServerEvent> {
        if !self.machine.is_connected() || !self.subscriptions.contains(&event.kind()) {
            tracing::debug!(kind = ?event.kind(), "discarding event without a live handler");
            return None;
        }
        Some(event)
    }

    async fn open(&mut self, identity: Identity) -> ConnectOutcome {
        tracing::info!(
            user = %identity.user_id,
            url = %self.config.ws_url,
            "opening real-time link"
        );

        let connecting = self.transport.connect(&identity.user_id);
        let result = match tokio::time::timeout(self.config.connect_timeout, connecting).await {
            Ok(result) => result,
            Err(_) => Err(LiveError::ConnectFailed("timed out".into())),
        };

        let channel = match result {
            Ok(channel) => channel,
            Err(e) => return self.fail(e),
        };

        if let Err(e) = handshake(&channel, &identity).await {
            let _ = channel.close().await;
            return self.fail(e);
        }

        let connection_id = channel.id();
        self.machine
            .apply(ConnectionInput::ConnectSucceeded(connection_id));
        self.subscriptions.extend(EventKind::ALL);
        self.channel = Some(channel);
        self.notices.push(ConnectionNotice::Connected);

        tracing::info!(user = %identity.user_id, %connection_id, "real-time link active");
        ConnectOutcome::Connected(connection_id)
    }

    fn fail(&mut self, error: LiveError) -> ConnectOutcome {
        tracing::warn!("real-time connection failed: {}", error);
        let reason = error.to_string();
        self.machine
            .apply(ConnectionInput::ConnectFailed(reason.clone()));
        self.notices.push(ConnectionNotice::ConnectFailed(reason));
        ConnectOutcome::Failed
    }

    /// Remove handlers first, then close the channel.
    async fn teardown(&mut self) {
        self.subscriptions.clear();
        if let Some(channel) = self.channel.take() {
            tracing::info!(connection_id = %channel.id(), "closing real-time link");
            if let Err(e) = channel.close().await {
                tracing::warn!("error closing real-time link: {}", e);
            }
        }
    }
}

/// Identify, then join the user's room and (for admins) the admin room.
async fn handshake<C: Channel>(channel: &C, identity: &Identity) -> crate::error::Result<()> {
    channel
        .send(ClientMessage::IdentifyUser(identity.user_id.clone()))
        .await?;
    if identity.is_admin() {
        channel.send(ClientMessage::JoinAdminRoom).await?;
    }
    channel
        .send(ClientMessage::JoinUserRoom(identity.user_id.clone()))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{EditRequestResolvedEvent, NewEditRequestEvent};
    use crate::transport::memory::{MemoryHub, Room};
    use docdesk_core::{EditRequestStatus, RequestId, UserId};

    fn new_request() -> ServerEvent {
        ServerEvent::NewEditRequest(NewEditRequestEvent {
            message: "new request".into(),
            edit_request: None,
        })
    }

    fn resolved(id: &str) -> ServerEvent {
        ServerEvent::EditRequestResolved(EditRequestResolvedEvent {
            request_id: RequestId::new(id),
            status: EditRequestStatus::Approved,
            message: "approved".into(),
            edit_request: None,
        })
    }

    // ── State machine ────────────────────────────────────────────────────

    #[test]
    fn test_machine_happy_path() {
        let mut machine = ConnectionMachine::new();
        let alice = Identity::user("alice");

        assert_eq!(
            machine.apply(ConnectionInput::ConnectRequested(alice.clone())),
            Directive::Open(alice.clone())
        );
        assert_eq!(machine.tracked_identity(), Some(&alice));

        let id = ConnectionId(7);
        assert_eq!(machine.apply(ConnectionInput::ConnectSucceeded(id)), Directive::Nothing);
        assert!(machine.is_connected());

        assert_eq!(
            machine.apply(ConnectionInput::DisconnectRequested),
            Directive::Teardown
        );
        assert_eq!(machine.state(), &ConnectionState::Disconnected);
        assert_eq!(
            machine.apply(ConnectionInput::DisconnectRequested),
            Directive::Nothing
        );
    }

    #[test]
    fn test_machine_same_identity_is_noop() {
        let mut machine = ConnectionMachine::new();
        let alice = Identity::user("alice");
        machine.apply(ConnectionInput::ConnectRequested(alice.clone()));
        machine.apply(ConnectionInput::ConnectSucceeded(ConnectionId(1)));

        assert_eq!(
            machine.apply(ConnectionInput::ConnectRequested(alice)),
            Directive::Nothing
        );
        assert!(machine.is_connected());
    }

    #[test]
    fn test_machine_identity_change_tears_down() {
        let mut machine = ConnectionMachine::new();
        machine.apply(ConnectionInput::ConnectRequested(Identity::user("alice")));
        machine.apply(ConnectionInput::ConnectSucceeded(ConnectionId(1)));

        let bob = Identity::user("bob");
        assert_eq!(
            machine.apply(ConnectionInput::ConnectRequested(bob.clone())),
            Directive::TeardownThenOpen(bob.clone())
        );
        assert_eq!(
            machine.state(),
            &ConnectionState::Connecting { identity: bob }
        );
    }

    #[test]
    fn test_machine_failure_and_drop() {
        let mut machine = ConnectionMachine::new();
        machine.apply(ConnectionInput::ConnectRequested(Identity::user("alice")));
        assert_eq!(
            machine.apply(ConnectionInput::ConnectFailed("refused".into())),
            Directive::Nothing
        );
        assert_eq!(machine.state(), &ConnectionState::Disconnected);

        machine.apply(ConnectionInput::ConnectRequested(Identity::user("alice")));
        machine.apply(ConnectionInput::ConnectSucceeded(ConnectionId(2)));
        assert_eq!(
            machine.apply(ConnectionInput::TransportDropped("ping timeout".into())),
            Directive::Teardown
        );
        assert_eq!(machine.tracked_identity(), None);
    }

    #[test]
    fn test_machine_ignores_stray_success() {
        let mut machine = ConnectionMachine::new();
        assert_eq!(
            machine.apply(ConnectionInput::ConnectSucceeded(ConnectionId(3))),
            Directive::Nothing
        );
        assert_eq!(machine.state(), &ConnectionState::Disconnected);
    }

    // ── Driver ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_connect_twice_keeps_one_connection() {
        let hub = MemoryHub::new();
        let mut live = LiveConnection::new(hub.transport(), LiveConfig::default());
        let alice = Identity::user("alice");

        let first = live.connect(alice.clone()).await;
        assert!(matches!(first, ConnectOutcome::Connected(_)));
        assert_eq!(live.connect(alice).await, ConnectOutcome::Unchanged);
        assert_eq!(hub.connection_count().await, 1);
    }

    #[tokio::test]
    async fn test_switch_user_tears_down_first() {
        let hub = MemoryHub::new();
        let mut live = LiveConnection::new(hub.transport(), LiveConfig::default());
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");

        live.connect(Identity::user("alice")).await;
        live.connect(Identity::user("bob")).await;

        assert!(hub.connections_for(&alice).await.is_empty());
        assert_eq!(hub.connections_for(&bob).await.len(), 1);

        // Events for alice no longer reach this session
        assert_eq!(hub.emit_to_user(&alice, resolved("r-a")).await, 0);
        assert_eq!(hub.emit_to_user(&bob, resolved("r-b")).await, 1);
        assert_eq!(live.drain().await, vec![resolved("r-b")]);
    }

    #[tokio::test]
    async fn test_handshake_joins_rooms() {
        let hub = MemoryHub::new();
        let mut admin = LiveConnection::new(hub.transport(), LiveConfig::default());
        let mut user = LiveConnection::new(hub.transport(), LiveConfig::default());

        admin.connect(Identity::admin("root")).await;
        user.connect(Identity::user("alice")).await;

        let admin_rooms = hub.rooms_of(admin.connection_id().unwrap()).await;
        assert!(admin_rooms.contains(&Room::Admins));
        assert!(admin_rooms.contains(&Room::User(UserId::new("root"))));

        let user_id = user.connection_id().unwrap();
        assert!(!hub.rooms_of(user_id).await.contains(&Room::Admins));
        assert_eq!(hub.identified_as(user_id).await, Some(UserId::new("alice")));

        assert_eq!(hub.emit_to_admins(new_request()).await, 1);
        let events = admin.drain().await;
        assert_eq!(events.len(), 2); // ack + request
        assert!(matches!(events[0], ServerEvent::AdminRoomAck(_)));
        assert_eq!(events[1], new_request());
        assert!(user.drain().await.is_empty());
    }

    #[tokio::test]
    async fn test_connect_failure_is_non_fatal() {
        let hub = MemoryHub::new();
        hub.refuse_connections(true);
        let mut live = LiveConnection::new(hub.transport(), LiveConfig::default());

        assert_eq!(live.connect(Identity::user("alice")).await, ConnectOutcome::Failed);
        assert_eq!(live.state(), &ConnectionState::Disconnected);
        assert!(matches!(
            live.take_notices().as_slice(),
            [ConnectionNotice::ConnectFailed(_)]
        ));

        hub.refuse_connections(false);
        assert!(matches!(
            live.connect(Identity::user("alice")).await,
            ConnectOutcome::Connected(_)
        ));
    }

    #[tokio::test]
    async fn test_transport_drop() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let hub = MemoryHub::new();
        let mut live = LiveConnection::new(hub.transport(), LiveConfig::default());
        live.connect(Identity::user("alice")).await;
        live.take_notices();

        let id = live.connection_id().unwrap();
        hub.drop_connection(id, "transport close").await;

        assert!(live.poll(Duration::from_millis(50)).await.is_none());
        assert!(!live.is_connected());
        assert_eq!(live.connection_id(), None);
        assert_eq!(
            live.take_notices(),
            vec![ConnectionNotice::Dropped("transport close".into())]
        );
    }

    #[tokio::test]
    async fn test_disconnect_removes_handlers_and_discards_events() {
        let hub = MemoryHub::new();
        let mut live = LiveConnection::new(hub.transport(), LiveConfig::default());
        live.connect(Identity::admin("root")).await;
        assert!(live.is_subscribed(EventKind::NewEditRequest));

        live.disconnect().await;
        assert!(!live.is_subscribed(EventKind::NewEditRequest));
        assert_eq!(hub.connection_count().await, 0);

        // Simulated late delivery
        assert_eq!(live.accept(new_request()), None);
        assert!(live.poll(Duration::from_millis(10)).await.is_none());
        assert_eq!(
            live.take_notices().last(),
            Some(&ConnectionNotice::ClosedByClient)
        );
    }

    /// A channel whose receive always fails without dropping.
    struct FailingChannel;

    #[async_trait::async_trait]
    impl Channel for FailingChannel {
        fn id(&self) -> ConnectionId {
            ConnectionId(7)
        }

        async fn send(&self, _message: ClientMessage) -> crate::error::Result<()> {
            Ok(())
        }

        async fn recv_timeout(
            &self,
            _timeout: Duration,
        ) -> crate::error::Result<Option<ServerEvent>> {
            Err(LiveError::NotConnected)
        }

        async fn close(&self) -> crate::error::Result<()> {
            Ok(())
        }
    }

    struct FailingTransport;

    #[async_trait::async_trait]
    impl Transport for FailingTransport {
        type Channel = FailingChannel;

        async fn connect(&self, _user_id: &UserId) -> crate::error::Result<FailingChannel> {
            Ok(FailingChannel)
        }
    }

    #[tokio::test]
    async fn test_receive_errors_end_the_drain() {
        let mut live = LiveConnection::new(FailingTransport, LiveConfig::default());
        assert_eq!(
            live.connect(Identity::user("alice")).await,
            ConnectOutcome::Connected(ConnectionId(7))
        );

        let drained = tokio::time::timeout(Duration::from_secs(1), live.drain())
            .await
            .expect("drain must return on a repeating receive error");
        assert!(drained.is_empty());
        assert!(live.poll(Duration::ZERO).await.is_none());

        // Not a drop: the link stays up
        assert!(live.is_connected());
    }
}
