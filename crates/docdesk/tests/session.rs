//! End-to-end session scenarios: permissions over time, live updates
//! between an admin and a user, and connection lifecycle.

use std::sync::Arc;

use docdesk::core::{
    DocumentRef, EditRequestStatus, Invoice, RequestId, StatusFilter, UserId, UserInfo,
};
use docdesk::live::{
    ConnectionState, EditRequestResolvedEvent, ListKey, MemoryHub, MemoryTransport,
    NewEditRequestEvent, ServerEvent,
};
use docdesk::perms::PermsError;
use docdesk::{
    admin_queue, document_list, ConnectOutcome, Document, DocumentKind, EditAffordance,
    EditRequest, Identity, ListPage, ManualClock, MemoryFetcher, Portal, PortalConfig,
    PortalError, Timestamp, Tone,
};

/// 2024-03-01T09:00:00Z
const T0: Timestamp = Timestamp::from_millis(1_709_283_600_000);

fn invoice(id: &str, owner: &str) -> Invoice {
    Invoice {
        id: id.into(),
        user_id: owner.into(),
        company_name: "Acme Traders".into(),
        vendor_name: "Globex Supplies".into(),
        total_amount: 1250.0,
        allow_editing: false,
        editable_until: None,
        created_at: T0,
        updated_at: T0,
    }
}

fn portal(hub: &Arc<MemoryHub>, clock: &ManualClock) -> Portal<MemoryTransport, ManualClock> {
    Portal::new(hub.transport(), clock.clone(), PortalConfig::default())
}

fn request_for(inv: &Invoice, requester: &str) -> EditRequest {
    EditRequest::pending(
        "req-1",
        DocumentRef::new(DocumentKind::Invoice, inv.id.clone()),
        UserInfo::new(requester, requester),
        "wrong vendor name",
        T0.plus_hours(25),
    )
}

#[tokio::test]
async fn test_edit_window_timeline() {
    let hub = MemoryHub::new();
    let clock = ManualClock::new(T0);
    let mut bob = portal(&hub, &clock);
    let mut admin = portal(&hub, &clock);
    bob.login(Identity::user("bob")).await;
    admin.login(Identity::admin("root")).await;

    let mut inv = invoice("INV-1", "bob");

    clock.set(T0.plus_hours(1));
    assert!(bob.can_edit(&inv));
    assert!(!bob.should_offer_edit_request(&inv));
    assert_eq!(bob.affordance(&inv), EditAffordance::Edit);

    clock.set(T0.plus_hours(25));
    assert!(!bob.can_edit(&inv));
    assert!(bob.should_offer_edit_request(&inv));
    assert!(matches!(
        bob.authorize_edit(&inv),
        Err(PortalError::Permission(PermsError::WindowClosed))
    ));
    assert!(admin.can_edit(&inv));

    // Admin grants edits until T0+30h
    inv.allow_editing = true;
    inv.editable_until = Some(T0.plus_hours(30));

    clock.set(T0.plus_hours(26));
    assert!(bob.can_edit(&inv));
    assert!(!bob.should_offer_edit_request(&inv));

    clock.set(T0.plus_hours(30));
    assert!(!bob.can_edit(&inv));

    clock.set(T0.plus_hours(31));
    assert_eq!(bob.affordance(&inv), EditAffordance::RequestEdit);
    assert!(matches!(
        bob.authorize_edit(&inv),
        Err(PortalError::Permission(PermsError::GrantExpired { .. }))
    ));
}

#[tokio::test]
async fn test_new_request_reaches_admin_queue() {
    let hub = MemoryHub::new();
    let clock = ManualClock::new(T0.plus_hours(25));
    let fetcher = MemoryFetcher::new();
    let inv = invoice("INV-1", "bob");
    fetcher.upsert_document(inv.clone()).await;

    let mut admin = portal(&hub, &clock);
    admin.login(Identity::admin("root")).await;
    admin.notifications();

    let queue = admin_queue(StatusFilter::Pending);
    let approved = admin_queue(StatusFilter::Approved);
    let opened = admin.open_list(&fetcher, queue).await.unwrap();
    assert!(matches!(opened, ListPage::EditRequests(ref page) if page.results.is_empty()));
    admin.open_list(&fetcher, approved).await.unwrap();

    // Bob submits; the backend stores it and broadcasts
    let mut bob = portal(&hub, &clock);
    bob.login(Identity::user("bob")).await;
    bob.validate_edit_request(&Document::from(inv.clone()), "wrong vendor name")
        .unwrap();

    let request = request_for(&inv, "bob");
    fetcher.upsert_edit_request(request.clone()).await;
    let delivered = hub
        .emit_to_admins(ServerEvent::NewEditRequest(NewEditRequestEvent {
            message: String::new(),
            edit_request: Some(request),
        }))
        .await;
    assert_eq!(delivered, 1);

    // The ack from joining the admin room is also handled
    assert_eq!(admin.poll_events().await, 2);
    let notes = admin.notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].tone, Tone::Info);
    assert_eq!(notes[0].message, "New edit request submitted!");

    assert!(admin.lists().is_stale(&queue));
    assert!(!admin.lists().is_stale(&approved));

    let refreshed = admin.refresh_stale(&fetcher).await.unwrap();
    assert_eq!(refreshed.len(), 1);
    let (key, ListPage::EditRequests(page)) = &refreshed[0] else {
        panic!("expected the edit-request queue");
    };
    assert_eq!(*key, queue);
    assert_eq!(page.results[0].id, RequestId::new("req-1"));
    assert!(!admin.lists().is_stale(&queue));

    // Bob is not an admin and hears nothing
    assert_eq!(bob.poll_events().await, 0);
    assert!(bob
        .notifications()
        .iter()
        .all(|n| n.message == "Real-time link active."));
}

#[tokio::test]
async fn test_resolution_refreshes_requester_lists() {
    let hub = MemoryHub::new();
    let clock = ManualClock::new(T0.plus_hours(26));
    let fetcher = MemoryFetcher::new();
    let inv = invoice("INV-1", "bob");
    fetcher.upsert_document(inv.clone()).await;

    let mut bob = portal(&hub, &clock);
    bob.login(Identity::user("bob")).await;
    let invoices = document_list(DocumentKind::Invoice);
    let mine = ListKey::MyEditRequests { page: 1 };
    bob.open_list(&fetcher, invoices).await.unwrap();
    bob.open_list(&fetcher, mine).await.unwrap();
    bob.notifications();

    let mut request = request_for(&inv, "bob");
    request
        .resolve(
            EditRequestStatus::Rejected,
            UserInfo::new("root", "root"),
            Some("totals match the receipt".into()),
            T0.plus_hours(26),
        )
        .unwrap();

    hub.emit_to_user(
        &UserId::new("bob"),
        ServerEvent::EditRequestResolved(EditRequestResolvedEvent {
            request_id: request.id.clone(),
            status: EditRequestStatus::Rejected,
            message: String::new(),
            edit_request: Some(request),
        }),
    )
    .await;

    assert_eq!(bob.poll_events().await, 1);
    let notes = bob.notifications();
    assert_eq!(notes[0].tone, Tone::Error);
    assert_eq!(notes[0].message, "Edit request req-1 rejected.");

    // The invoice list shows the document; "my requests" was empty when mounted
    assert!(bob.lists().is_stale(&invoices));
    assert!(!bob.lists().is_stale(&mine));
}

#[tokio::test]
async fn test_bare_resolution_refreshes_document_list() {
    let hub = MemoryHub::new();
    let clock = ManualClock::new(T0.plus_hours(26));
    let fetcher = MemoryFetcher::new();
    let inv = invoice("INV-1", "bob");
    fetcher.upsert_document(inv.clone()).await;
    fetcher.upsert_edit_request(request_for(&inv, "bob")).await;

    let mut bob = portal(&hub, &clock);
    bob.login(Identity::user("bob")).await;
    let invoices = document_list(DocumentKind::Invoice);
    let mine = ListKey::MyEditRequests { page: 1 };
    bob.open_list(&fetcher, mine).await.unwrap();
    bob.open_list(&fetcher, invoices).await.unwrap();

    // Only id and status: the portal knows req-1 is about INV-1
    hub.emit_to_user(
        &UserId::new("bob"),
        ServerEvent::EditRequestResolved(EditRequestResolvedEvent {
            request_id: RequestId::new("req-1"),
            status: EditRequestStatus::Approved,
            message: String::new(),
            edit_request: None,
        }),
    )
    .await;

    assert_eq!(bob.poll_events().await, 1);
    assert!(bob.lists().is_stale(&mine));
    assert!(bob.lists().is_stale(&invoices));
    assert_eq!(bob.refresh_stale(&fetcher).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_login_is_idempotent() {
    let hub = MemoryHub::new();
    let clock = ManualClock::new(T0);
    let mut session = portal(&hub, &clock);

    let first = session.login(Identity::user("bob")).await;
    assert!(matches!(first, ConnectOutcome::Connected(_)));
    assert_eq!(session.login(Identity::user("bob")).await, ConnectOutcome::Unchanged);

    assert_eq!(hub.connection_count().await, 1);
    let notes = session.notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].tone, Tone::Success);
}

#[tokio::test]
async fn test_switching_users_has_no_cross_talk() {
    let hub = MemoryHub::new();
    let clock = ManualClock::new(T0);
    let fetcher = MemoryFetcher::new();
    let mut session = portal(&hub, &clock);

    session.login(Identity::user("bob")).await;
    session
        .open_list(&fetcher, document_list(DocumentKind::Invoice))
        .await
        .unwrap();

    session.switch_identity(Identity::user("carol")).await;
    assert_eq!(session.identity(), Some(&Identity::user("carol")));
    assert!(hub.connections_for(&UserId::new("bob")).await.is_empty());
    assert_eq!(session.lists().keys().count(), 0);

    let for_bob = ServerEvent::EditRequestResolved(EditRequestResolvedEvent {
        request_id: RequestId::new("req-b"),
        status: EditRequestStatus::Approved,
        message: "approved".into(),
        edit_request: None,
    });
    assert_eq!(hub.emit_to_user(&UserId::new("bob"), for_bob).await, 0);
    assert_eq!(session.poll_events().await, 0);
}

#[tokio::test]
async fn test_events_after_logout_are_discarded() {
    let hub = MemoryHub::new();
    let clock = ManualClock::new(T0);
    let mut session = portal(&hub, &clock);

    session.login(Identity::admin("root")).await;
    session.notifications();
    session.logout().await;

    assert_eq!(session.connection_state(), &ConnectionState::Disconnected);
    assert_eq!(
        hub.emit_to_admins(ServerEvent::NewEditRequest(NewEditRequestEvent::default()))
            .await,
        0
    );
    assert_eq!(session.poll_events().await, 0);
    // A manual disconnect is silent
    assert!(session.notifications().is_empty());
}

#[tokio::test]
async fn test_connection_problems_are_non_fatal() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let hub = MemoryHub::new();
    let clock = ManualClock::new(T0);
    let inv = invoice("INV-1", "bob");

    hub.refuse_connections(true);
    let mut session = portal(&hub, &clock);
    assert_eq!(session.login(Identity::user("bob")).await, ConnectOutcome::Failed);
    assert!(session.can_edit(&inv));
    let notes = session.notifications();
    assert_eq!(notes[0].tone, Tone::Error);
    assert_eq!(notes[0].message, "Cannot connect for real-time updates.");

    hub.refuse_connections(false);
    assert!(matches!(
        session.login(Identity::user("bob")).await,
        ConnectOutcome::Connected(_)
    ));
    session.notifications();

    let id = session.live().connection_id().unwrap();
    hub.drop_connection(id, "transport close").await;
    session.poll_events().await;

    let notes = session.notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].tone, Tone::Warning);
    assert_eq!(notes[0].message, "Real-time link lost: transport close");
    assert_eq!(session.identity(), Some(&Identity::user("bob")));
}

#[tokio::test]
async fn test_expired_session_logs_out() {
    let hub = MemoryHub::new();
    let clock = ManualClock::new(T0);
    let fetcher = MemoryFetcher::new();
    let mut session = portal(&hub, &clock);

    session.login(Identity::user("bob")).await;
    let invoices = document_list(DocumentKind::Invoice);
    session.open_list(&fetcher, invoices).await.unwrap();
    session.lists_mut().mark_stale(&invoices);

    fetcher.expire_session(true);
    let result = session.refresh_stale(&fetcher).await;
    assert!(matches!(result, Err(PortalError::Unauthorized)));

    assert_eq!(session.identity(), None);
    assert_eq!(hub.connection_count().await, 0);
    let notes = session.notifications();
    assert_eq!(notes.last().unwrap().key, Some("session-expired"));
    assert!(matches!(
        session.open_list(&fetcher, invoices).await,
        Err(PortalError::NotLoggedIn)
    ));
}

#[tokio::test]
async fn test_resolution_input_checks() {
    let hub = MemoryHub::new();
    let clock = ManualClock::new(T0.plus_hours(25));
    let inv = invoice("INV-1", "bob");
    let request = request_for(&inv, "bob");

    let mut admin = portal(&hub, &clock);
    admin.login(Identity::admin("root")).await;
    assert!(admin
        .validate_resolution(&request, EditRequestStatus::Approved, "")
        .is_ok());
    assert!(matches!(
        admin.validate_resolution(&request, EditRequestStatus::Rejected, "  "),
        Err(PortalError::Validation(_))
    ));

    let mut bob = portal(&hub, &clock);
    bob.login(Identity::user("bob")).await;
    assert!(matches!(
        bob.validate_resolution(&request, EditRequestStatus::Approved, ""),
        Err(PortalError::InvalidOperation(_))
    ));
    assert!(matches!(
        bob.validate_edit_request(&Document::from(inv.clone()), ""),
        Err(PortalError::Validation(_))
    ));

    let mut carol = portal(&hub, &clock);
    carol.login(Identity::user("carol")).await;
    assert!(matches!(
        carol.validate_edit_request(&Document::from(inv), "please"),
        Err(PortalError::Permission(PermsError::NotOwner))
    ));
}
