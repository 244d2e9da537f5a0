//! Pull-based list fetching.
//!
//! Lists are loaded from the backend through a [`ListFetcher`]. The push
//! channel only says *which* lists are out of date; the data always comes
//! from here.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use docdesk_core::{
    paginate, Document, DocumentKind, EditRequest, Page, PageQuery, StatusFilter, UserId,
};

/// Errors a fetcher can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The backend rejected the session (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    #[error("request timed out")]
    Timeout,

    #[error("backend error: {0}")]
    Backend(String),
}

/// Loads list pages from the backend.
#[async_trait]
pub trait ListFetcher: Send + Sync {
    /// One page of documents of `kind` visible to the session.
    async fn fetch_documents(
        &self,
        kind: DocumentKind,
        query: PageQuery,
    ) -> Result<Page<Document>, FetchError>;

    /// One page of all edit requests matching `filter`. Admin only.
    async fn fetch_edit_requests(
        &self,
        filter: StatusFilter,
        query: PageQuery,
    ) -> Result<Page<EditRequest>, FetchError>;

    /// One page of the edit requests submitted by `user_id`.
    async fn fetch_my_edit_requests(
        &self,
        user_id: &UserId,
        query: PageQuery,
    ) -> Result<Page<EditRequest>, FetchError>;
}

/// In-memory fetcher backed by plain vectors.
#[derive(Default)]
pub struct MemoryFetcher {
    documents: RwLock<Vec<Document>>,
    edit_requests: RwLock<Vec<EditRequest>>,
    unauthorized: AtomicBool,
    fetches: AtomicUsize,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document by kind and id.
    pub async fn upsert_document(&self, document: impl Into<Document>) {
        let document = document.into();
        let mut documents = self.documents.write().await;
        match documents
            .iter_mut()
            .find(|d| d.document_ref() == document.document_ref())
        {
            Some(existing) => *existing = document,
            None => documents.push(document),
        }
    }

    /// Insert or replace an edit request by id.
    pub async fn upsert_edit_request(&self, request: EditRequest) {
        let mut requests = self.edit_requests.write().await;
        match requests.iter_mut().find(|r| r.id == request.id) {
            Some(existing) => *existing = request,
            None => requests.push(request),
        }
    }

    /// Answer every subsequent fetch with [`FetchError::Unauthorized`].
    pub fn expire_session(&self, expired: bool) {
        self.unauthorized.store(expired, Ordering::SeqCst);
    }

    /// Number of fetches served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn begin(&self) -> Result<(), FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.unauthorized.load(Ordering::SeqCst) {
            return Err(FetchError::Unauthorized);
        }
        Ok(())
    }
}

#[async_trait]
impl ListFetcher for MemoryFetcher {
    async fn fetch_documents(
        &self,
        kind: DocumentKind,
        query: PageQuery,
    ) -> Result<Page<Document>, FetchError> {
        self.begin()?;
        let documents = self.documents.read().await;
        let matching: Vec<Document> = documents
            .iter()
            .filter(|d| d.kind() == kind)
            .cloned()
            .collect();
        Ok(paginate(&matching, query))
    }

    async fn fetch_edit_requests(
        &self,
        filter: StatusFilter,
        query: PageQuery,
    ) -> Result<Page<EditRequest>, FetchError> {
        self.begin()?;
        let requests = self.edit_requests.read().await;
        let matching: Vec<EditRequest> = requests
            .iter()
            .filter(|r| filter.matches(r.status))
            .cloned()
            .collect();
        Ok(paginate(&matching, query))
    }

    async fn fetch_my_edit_requests(
        &self,
        user_id: &UserId,
        query: PageQuery,
    ) -> Result<Page<EditRequest>, FetchError> {
        self.begin()?;
        let requests = self.edit_requests.read().await;
        let matching: Vec<EditRequest> = requests
            .iter()
            .filter(|r| r.requested_by_user_id() == user_id)
            .cloned()
            .collect();
        Ok(paginate(&matching, query))
    }
}
