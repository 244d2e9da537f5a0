//! The Portal: one authenticated session.
//!
//! Owns the push connection, the mounted-list registry and the queue of
//! notifications waiting to be shown. Login connects, logout tears down.

use docdesk_core::{
    validate_rejection, validate_submission, Document, DocumentKind, EditRequest,
    EditRequestStatus, Identity, Page, PageQuery, StatusFilter, Timestamp,
};
use docdesk_live::{
    ConnectOutcome, ConnectionNotice, ConnectionState, ListKey, LiveConnection, MountedLists,
    Notification, Reconciler, RowId, Tone, Transport,
};
use docdesk_perms::{EditAffordance, Editable};

use crate::clock::Clock;
use crate::config::PortalConfig;
use crate::error::{PortalError, Result};
use crate::fetch::{FetchError, ListFetcher};

/// Rows loaded for one mounted list.
#[derive(Debug, Clone, PartialEq)]
pub enum ListPage {
    Documents(Page<Document>),
    EditRequests(Page<EditRequest>),
}

impl ListPage {
    /// Row ids the list displays. A request row also shows its document.
    pub fn row_ids(&self) -> Vec<RowId> {
        match self {
            ListPage::Documents(page) => page
                .results
                .iter()
                .map(|d| RowId::Document(d.document_ref()))
                .collect(),
            ListPage::EditRequests(page) => page
                .results
                .iter()
                .flat_map(|r| {
                    [
                        RowId::Request(r.id.clone()),
                        RowId::Document(r.document.clone()),
                    ]
                })
                .collect(),
        }
    }
}

/// Session context.
pub struct Portal<T: Transport, C: Clock> {
    config: PortalConfig,
    clock: C,
    live: LiveConnection<T>,
    identity: Option<Identity>,
    lists: MountedLists,
    notifications: Vec<Notification>,
}

impl<T: Transport, C: Clock> Portal<T, C> {
    pub fn new(transport: T, clock: C, config: PortalConfig) -> Self {
        let live = LiveConnection::new(transport, config.live.clone());
        Self {
            config,
            clock,
            live,
            identity: None,
            lists: MountedLists::new(),
            notifications: Vec::new(),
        }
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn connection_state(&self) -> &ConnectionState {
        self.live.state()
    }

    pub fn live(&self) -> &LiveConnection<T> {
        &self.live
    }

    pub fn lists(&self) -> &MountedLists {
        &self.lists
    }

    pub fn lists_mut(&mut self) -> &mut MountedLists {
        &mut self.lists
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Session
    // ─────────────────────────────────────────────────────────────────────────

    /// Start a session and open the push connection.
    ///
    /// Logging in again as the same identity is a no-op. A different
    /// identity drops the previous user's lists and connection first.
    pub async fn login(&mut self, identity: Identity) -> ConnectOutcome {
        if self.identity.as_ref() != Some(&identity) {
            if let Some(previous) = &self.identity {
                tracing::info!(from = %previous.user_id, to = %identity.user_id, "switching identity");
            }
            self.lists.clear();
            self.identity = Some(identity.clone());
        }

        let outcome = self.live.connect(identity).await;
        self.collect_connection_notices();
        outcome
    }

    /// End the session. Idempotent.
    pub async fn logout(&mut self) {
        if let Some(identity) = self.identity.take() {
            tracing::info!(user = %identity.user_id, "logging out");
        }
        self.live.disconnect().await;
        self.lists.clear();
        self.collect_connection_notices();
    }

    /// Log out, then log in as `identity`.
    pub async fn switch_identity(&mut self, identity: Identity) -> ConnectOutcome {
        self.logout().await;
        self.login(identity).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Permissions
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether the session may edit `doc` now. False when logged out.
    pub fn can_edit<D: Editable + ?Sized>(&self, doc: &D) -> bool {
        self.identity
            .as_ref()
            .map(|identity| docdesk_perms::can_edit(doc, identity, self.now()))
            .unwrap_or(false)
    }

    /// Whether to offer a "request edit" action for `doc` now.
    pub fn should_offer_edit_request<D: Editable + ?Sized>(&self, doc: &D) -> bool {
        self.identity
            .as_ref()
            .map(|identity| docdesk_perms::should_offer_edit_request(doc, identity, self.now()))
            .unwrap_or(false)
    }

    /// The action a list row should show for `doc`.
    pub fn affordance<D: Editable + ?Sized>(&self, doc: &D) -> EditAffordance {
        match &self.identity {
            Some(identity) => docdesk_perms::affordance(doc, identity, self.now()),
            None => EditAffordance::None,
        }
    }

    /// Check an edit before sending it.
    pub fn authorize_edit<D: Editable + ?Sized>(&self, doc: &D) -> Result<()> {
        let identity = self.identity.as_ref().ok_or(PortalError::NotLoggedIn)?;
        docdesk_perms::authorize_edit(doc, identity, self.now())?;
        Ok(())
    }

    /// Check an edit request submission for `doc` before sending it.
    pub fn validate_edit_request(&self, doc: &Document, reason: &str) -> Result<()> {
        let identity = self.identity.as_ref().ok_or(PortalError::NotLoggedIn)?;
        if identity.is_admin() {
            return Err(PortalError::InvalidOperation(
                "admins edit directly and cannot request edit access".into(),
            ));
        }
        if doc.owner() != &identity.user_id {
            return Err(docdesk_perms::PermsError::NotOwner.into());
        }
        validate_submission(doc.id(), reason)?;
        Ok(())
    }

    /// Check an admin decision before sending it. Rejections need a reason.
    pub fn validate_resolution(
        &self,
        request: &EditRequest,
        status: EditRequestStatus,
        response_message: &str,
    ) -> Result<()> {
        let identity = self.identity.as_ref().ok_or(PortalError::NotLoggedIn)?;
        if !identity.is_admin() {
            return Err(PortalError::InvalidOperation(
                "only admins resolve edit requests".into(),
            ));
        }
        if !request.is_pending() {
            return Err(docdesk_core::CoreError::AlreadyResolved {
                id: request.id.clone(),
                status: request.status,
            }
            .into());
        }
        match status {
            EditRequestStatus::Rejected => validate_rejection(response_message)?,
            EditRequestStatus::Approved => {}
            EditRequestStatus::Pending => {
                return Err(docdesk_core::CoreError::InvalidTransition {
                    from: request.status,
                    to: status,
                }
                .into())
            }
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Live updates
    // ─────────────────────────────────────────────────────────────────────────

    /// Receive and reconcile pending push events.
    ///
    /// Returns the number of events handled.
    pub async fn poll_events(&mut self) -> usize {
        let Some(identity) = self.identity.clone() else {
            return 0;
        };

        let mut events: Vec<_> = self
            .live
            .poll(self.config.receive_timeout)
            .await
            .into_iter()
            .collect();
        events.extend(self.live.drain().await);

        for event in &events {
            let outcome = Reconciler::reconcile(&identity, event, &self.lists);
            outcome.apply(&mut self.lists);
            if let Some(notification) = outcome.notification {
                self.notify(notification);
            }
        }

        self.collect_connection_notices();
        events.len()
    }

    /// Notifications waiting to be shown, oldest first.
    pub fn notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn notify(&mut self, notification: Notification) {
        if let Some(key) = notification.key {
            if let Some(existing) = self.notifications.iter_mut().find(|n| n.key == Some(key)) {
                *existing = notification;
                return;
            }
        }
        self.notifications.push(notification);
    }

    fn collect_connection_notices(&mut self) {
        for notice in self.live.take_notices() {
            if let Some(notification) = Reconciler::connection_notice(&notice) {
                self.notify(notification);
            }
            if let ConnectionNotice::Dropped(reason) = &notice {
                tracing::debug!(%reason, "push channel dropped; lists refresh on next fetch");
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lists
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch a list and mount it.
    pub async fn open_list<F: ListFetcher + ?Sized>(
        &mut self,
        fetcher: &F,
        key: ListKey,
    ) -> Result<ListPage> {
        let identity = self.identity.clone().ok_or(PortalError::NotLoggedIn)?;
        match self.fetch(fetcher, &identity, key).await {
            Ok(page) => {
                self.mount(key, &page);
                Ok(page)
            }
            Err(e) => Err(self.fetch_failed(e).await),
        }
    }

    /// Refetch every stale mounted list.
    ///
    /// Lists that fail for reasons other than an expired session stay stale.
    pub async fn refresh_stale<F: ListFetcher + ?Sized>(
        &mut self,
        fetcher: &F,
    ) -> Result<Vec<(ListKey, ListPage)>> {
        let identity = self.identity.clone().ok_or(PortalError::NotLoggedIn)?;
        let mut refreshed = Vec::new();

        for key in self.lists.take_stale() {
            match self.fetch(fetcher, &identity, key).await {
                Ok(page) => {
                    self.mount(key, &page);
                    refreshed.push((key, page));
                }
                Err(FetchError::Unauthorized) => {
                    return Err(self.fetch_failed(FetchError::Unauthorized).await);
                }
                Err(e) => {
                    tracing::warn!(?key, "failed to refresh list: {}", e);
                    self.lists.mark_stale(&key);
                }
            }
        }

        Ok(refreshed)
    }

    /// Mount a fetched page, remembering which document each request is
    /// about so payload-less resolutions still reach document lists.
    fn mount(&mut self, key: ListKey, page: &ListPage) {
        self.lists.mount(key, page.row_ids());
        if let ListPage::EditRequests(requests) = page {
            for request in &requests.results {
                self.lists
                    .link_request(request.id.clone(), request.document.clone());
            }
        }
    }

    async fn fetch<F: ListFetcher + ?Sized>(
        &self,
        fetcher: &F,
        identity: &Identity,
        key: ListKey,
    ) -> std::result::Result<ListPage, FetchError> {
        let fetching = async {
            match key {
                ListKey::Documents { kind, page } => fetcher
                    .fetch_documents(kind, self.document_query(page))
                    .await
                    .map(ListPage::Documents),
                ListKey::AdminEditRequests { filter, page } => fetcher
                    .fetch_edit_requests(filter, self.edit_request_query(page))
                    .await
                    .map(ListPage::EditRequests),
                ListKey::MyEditRequests { page } => fetcher
                    .fetch_my_edit_requests(&identity.user_id, self.edit_request_query(page))
                    .await
                    .map(ListPage::EditRequests),
            }
        };

        tokio::time::timeout(self.config.request_timeout, fetching)
            .await
            .unwrap_or(Err(FetchError::Timeout))
    }

    /// Turn a fetch failure into a portal error. An expired session logs out.
    async fn fetch_failed(&mut self, error: FetchError) -> PortalError {
        if error != FetchError::Unauthorized {
            return error.into();
        }

        tracing::warn!("backend rejected the session; logging out");
        self.logout().await;
        self.notify(
            Notification::new(Tone::Error, "Session expired or invalid. Please log in.")
                .keyed("session-expired"),
        );
        PortalError::Unauthorized
    }

    fn document_query(&self, page: u32) -> PageQuery {
        PageQuery::new(page, self.config.document_page_size)
    }

    fn edit_request_query(&self, page: u32) -> PageQuery {
        PageQuery::new(page, self.config.edit_request_page_size)
    }
}

/// Key of the first page of a document list.
pub fn document_list(kind: DocumentKind) -> ListKey {
    ListKey::Documents { kind, page: 1 }
}

/// Key of the first page of the admin queue under `filter`.
pub fn admin_queue(filter: StatusFilter) -> ListKey {
    ListKey::AdminEditRequests { filter, page: 1 }
}
