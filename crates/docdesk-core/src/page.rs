//! Paginated list responses and list filters.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::edit_request::EditRequestStatus;

/// Default page size for the admin edit-request list.
pub const EDIT_REQUEST_PAGE_SIZE: u32 = 15;

/// One page of a list, as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub results: Vec<T>,
    pub total_pages: u32,
    pub current_page: u32,
    pub limit: u32,
    pub total_results: u64,
}

impl<T> Page<T> {
    /// An empty page for the given query.
    pub fn empty(query: PageQuery) -> Self {
        Self {
            results: Vec::new(),
            total_pages: 0,
            current_page: query.page,
            limit: query.limit,
            total_results: 0,
        }
    }

    pub fn is_last(&self) -> bool {
        self.current_page >= self.total_pages
    }

    /// Map the rows, keeping the pagination metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            results: self.results.into_iter().map(f).collect(),
            total_pages: self.total_pages,
            current_page: self.current_page,
            limit: self.limit,
            total_results: self.total_results,
        }
    }
}

/// Which page to fetch. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageQuery {
    pub page: u32,
    pub limit: u32,
}

impl PageQuery {
    /// Create a query; a page of 0 is treated as 1 and a limit of 0 as 1.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    pub fn first(limit: u32) -> Self {
        Self::new(1, limit)
    }

    /// Index of the first row on this page.
    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self::first(10)
    }
}

/// Slice an in-memory list into a page.
pub fn paginate<T: Clone>(items: &[T], query: PageQuery) -> Page<T> {
    let total = items.len();
    let limit = query.limit as usize;
    let total_pages = total.div_ceil(limit) as u32;
    let results = items
        .iter()
        .skip(query.offset())
        .take(limit)
        .cloned()
        .collect();

    Page {
        results,
        total_pages,
        current_page: query.page,
        limit: query.limit,
        total_results: total as u64,
    }
}

/// Status filter of the admin edit-request list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatusFilter {
    #[default]
    Pending,
    Approved,
    Rejected,
    All,
}

impl StatusFilter {
    /// True if newly submitted (pending) requests show up under this filter.
    pub fn includes_pending(&self) -> bool {
        matches!(self, StatusFilter::Pending | StatusFilter::All)
    }

    pub fn matches(&self, status: EditRequestStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => status == EditRequestStatus::Pending,
            StatusFilter::Approved => status == EditRequestStatus::Approved,
            StatusFilter::Rejected => status == EditRequestStatus::Rejected,
        }
    }

    /// Value of the `status` query parameter; `All` sends none.
    pub fn as_query_param(&self) -> Option<&'static str> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Pending => Some("PENDING"),
            StatusFilter::Approved => Some("APPROVED"),
            StatusFilter::Rejected => Some("REJECTED"),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query_param().unwrap_or("ALL"))
    }
}
