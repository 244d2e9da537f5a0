//! Registry of currently mounted lists and their staleness.
//!
//! A list is "mounted" while it is on screen. The reconciler marks lists
//! stale; the owner of the list clears the flag by refetching.

use std::collections::{HashMap, HashSet};

use docdesk_core::{DocumentKind, DocumentRef, RequestId, StatusFilter};

/// Which list (and which page of it) is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKey {
    /// The admin's edit-request queue.
    AdminEditRequests { filter: StatusFilter, page: u32 },
    /// A document list page.
    Documents { kind: DocumentKind, page: u32 },
    /// The current user's own edit requests.
    MyEditRequests { page: u32 },
}

/// A row shown by a mounted list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowId {
    Document(DocumentRef),
    Request(RequestId),
}

#[derive(Debug, Default)]
struct MountedList {
    rows: HashSet<RowId>,
    stale: bool,
}

/// Mounted lists keyed by [`ListKey`].
#[derive(Debug, Default)]
pub struct MountedLists {
    lists: HashMap<ListKey, MountedList>,
    /// Document each seen request is about.
    request_documents: HashMap<RequestId, DocumentRef>,
}

impl MountedLists {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a list with the rows it displays.
    ///
    /// Mounting an already mounted key replaces its rows and clears the
    /// stale flag, which is what a refetch does.
    pub fn mount(&mut self, key: ListKey, rows: impl IntoIterator<Item = RowId>) {
        self.lists.insert(
            key,
            MountedList {
                rows: rows.into_iter().collect(),
                stale: false,
            },
        );
    }

    /// Remember which document a request row refers to.
    pub fn link_request(&mut self, request: RequestId, document: DocumentRef) {
        self.request_documents.insert(request, document);
    }

    /// The document a request is about, if a mounted page has shown it.
    pub fn document_of(&self, request: &RequestId) -> Option<&DocumentRef> {
        self.request_documents.get(request)
    }

    pub fn unmount(&mut self, key: &ListKey) -> bool {
        self.lists.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.lists.clear();
        self.request_documents.clear();
    }

    pub fn is_mounted(&self, key: &ListKey) -> bool {
        self.lists.contains_key(key)
    }

    pub fn is_stale(&self, key: &ListKey) -> bool {
        self.lists.get(key).map(|l| l.stale).unwrap_or(false)
    }

    pub fn keys(&self) -> impl Iterator<Item = &ListKey> {
        self.lists.keys()
    }

    /// Mark a mounted list stale. Returns false if it is not mounted.
    pub fn mark_stale(&mut self, key: &ListKey) -> bool {
        match self.lists.get_mut(key) {
            Some(list) => {
                list.stale = true;
                true
            }
            None => false,
        }
    }

    /// Return all stale keys and clear their flags.
    pub fn take_stale(&mut self) -> Vec<ListKey> {
        let mut stale = Vec::new();
        for (key, list) in self.lists.iter_mut() {
            if list.stale {
                list.stale = false;
                stale.push(*key);
            }
        }
        stale
    }

    /// Mounted admin queues whose filter shows pending requests.
    pub fn pending_request_queues(&self) -> Vec<ListKey> {
        self.lists
            .keys()
            .filter(|key| match key {
                ListKey::AdminEditRequests { filter, .. } => filter.includes_pending(),
                _ => false,
            })
            .copied()
            .collect()
    }

    /// Mounted lists that display `row`.
    pub fn lists_showing(&self, row: &RowId) -> Vec<ListKey> {
        self.lists
            .iter()
            .filter(|(_, list)| list.rows.contains(row))
            .map(|(key, _)| *key)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice(id: &str) -> RowId {
        RowId::Document(DocumentRef::new(DocumentKind::Invoice, id))
    }

    #[test]
    fn test_mark_and_take_stale() {
        let mut lists = MountedLists::new();
        let key = ListKey::Documents {
            kind: DocumentKind::Invoice,
            page: 1,
        };
        lists.mount(key, [invoice("INV-1")]);

        assert!(lists.mark_stale(&key));
        assert!(lists.is_stale(&key));
        assert_eq!(lists.take_stale(), vec![key]);
        assert!(!lists.is_stale(&key));
        assert!(lists.take_stale().is_empty());
    }

    #[test]
    fn test_unmounted_list_cannot_go_stale() {
        let mut lists = MountedLists::new();
        let key = ListKey::MyEditRequests { page: 1 };
        assert!(!lists.mark_stale(&key));
        assert!(!lists.is_stale(&key));
    }

    #[test]
    fn test_remount_clears_stale() {
        let mut lists = MountedLists::new();
        let key = ListKey::MyEditRequests { page: 2 };
        lists.mount(key, [RowId::Request(RequestId::new("r-1"))]);
        lists.mark_stale(&key);
        lists.mount(key, [RowId::Request(RequestId::new("r-2"))]);
        assert!(!lists.is_stale(&key));
        assert!(lists
            .lists_showing(&RowId::Request(RequestId::new("r-1")))
            .is_empty());
    }

    #[test]
    fn test_request_links_survive_remount_but_not_clear() {
        let mut lists = MountedLists::new();
        let key = ListKey::MyEditRequests { page: 1 };
        let r1 = RequestId::new("r1");
        lists.mount(key, [RowId::Request(r1.clone()), invoice("INV-1")]);
        lists.link_request(r1.clone(), DocumentRef::new(DocumentKind::Invoice, "INV-1"));

        lists.mount(key, []);
        assert_eq!(
            lists.document_of(&r1),
            Some(&DocumentRef::new(DocumentKind::Invoice, "INV-1"))
        );

        lists.clear();
        assert_eq!(lists.document_of(&r1), None);
    }

    #[test]
    fn test_pending_request_queues() {
        let mut lists = MountedLists::new();
        let pending = ListKey::AdminEditRequests {
            filter: StatusFilter::Pending,
            page: 1,
        };
        let all = ListKey::AdminEditRequests {
            filter: StatusFilter::All,
            page: 3,
        };
        let rejected = ListKey::AdminEditRequests {
            filter: StatusFilter::Rejected,
            page: 1,
        };
        lists.mount(pending, []);
        lists.mount(all, []);
        lists.mount(rejected, []);

        let mut queues = lists.pending_request_queues();
        queues.sort_by_key(|k| format!("{k:?}"));
        assert_eq!(queues, vec![all, pending]);
    }

    #[test]
    fn test_lists_showing() {
        let mut lists = MountedLists::new();
        let page1 = ListKey::Documents {
            kind: DocumentKind::Invoice,
            page: 1,
        };
        let page2 = ListKey::Documents {
            kind: DocumentKind::Invoice,
            page: 2,
        };
        lists.mount(page1, [invoice("INV-1"), invoice("INV-2")]);
        lists.mount(page2, [invoice("INV-3")]);

        assert_eq!(lists.lists_showing(&invoice("INV-2")), vec![page1]);
        assert!(lists.lists_showing(&invoice("INV-9")).is_empty());
    }
}
