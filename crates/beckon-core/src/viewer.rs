//! Document viewer collaborator and the slot the dispatcher reaches it through.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, Weak};

use beckon_types::DocumentSource;

use crate::error::DocumentError;

/// Paging capability of a loaded document. Pages are 1-based.
pub trait DocumentViewer: Send + Sync {
    /// Returns whether the page changed
    fn next_page(&self) -> bool;
    fn prev_page(&self) -> bool;
    /// Pages outside `1..=page_count` are ignored
    fn go_to_page(&self, page: u32) -> bool;
    fn page_count(&self) -> u32;
    fn current_page(&self) -> u32;
}

/// Owner of viewers: opens a document and tears it down
pub trait DocumentHost: Send + Sync {
    fn load(&self, source: &DocumentSource) -> Result<Arc<dyn DocumentViewer>, DocumentError>;
    fn close(&self);
}

/// Viewer with a fixed page count that only tracks the current page
#[derive(Debug)]
pub struct PagedViewer {
    source: DocumentSource,
    page_count: u32,
    current: AtomicU32,
}

impl PagedViewer {
    pub fn new(source: DocumentSource, page_count: u32) -> Result<Self, DocumentError> {
        if page_count == 0 {
            return Err(DocumentError::Empty(source.to_string()));
        }
        Ok(Self {
            source,
            page_count,
            current: AtomicU32::new(1),
        })
    }

    pub fn source(&self) -> &DocumentSource {
        &self.source
    }
}

impl DocumentViewer for PagedViewer {
    fn next_page(&self) -> bool {
        let current = self.current_page();
        current < self.page_count && self.go_to_page(current + 1)
    }

    fn prev_page(&self) -> bool {
        let current = self.current_page();
        current > 1 && self.go_to_page(current - 1)
    }

    fn go_to_page(&self, page: u32) -> bool {
        if page < 1 || page > self.page_count {
            return false;
        }
        self.current.store(page, Ordering::SeqCst);
        tracing::debug!("[VIEWER] {} page {}/{}", self.source, page, self.page_count);
        true
    }

    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn current_page(&self) -> u32 {
        self.current.load(Ordering::SeqCst)
    }
}

/// Non-owning reference to the viewer of the loaded document.
///
/// A viewer released by its host reads as detached.
#[derive(Default)]
pub struct ViewerSlot {
    viewer: Mutex<Option<Weak<dyn DocumentViewer>>>,
}

impl ViewerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, viewer: &Arc<dyn DocumentViewer>) {
        *self.viewer.lock().unwrap_or_else(|p| p.into_inner()) = Some(Arc::downgrade(viewer));
    }

    pub fn detach(&self) {
        *self.viewer.lock().unwrap_or_else(|p| p.into_inner()) = None;
    }

    pub fn get(&self) -> Option<Arc<dyn DocumentViewer>> {
        self.viewer
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .as_ref()
            .and_then(Weak::upgrade)
    }

    pub fn is_attached(&self) -> bool {
        self.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewer(pages: u32) -> PagedViewer {
        PagedViewer::new(DocumentSource::new("doc.pdf"), pages).unwrap()
    }

    #[test]
    fn paging_stays_in_bounds() {
        let v = viewer(3);
        assert_eq!(v.current_page(), 1);
        assert!(!v.prev_page());
        assert!(v.next_page());
        assert!(v.next_page());
        assert!(!v.next_page());
        assert_eq!(v.current_page(), 3);

        assert!(!v.go_to_page(0));
        assert!(!v.go_to_page(4));
        assert_eq!(v.current_page(), 3);
        assert!(v.go_to_page(2));
        assert_eq!(v.current_page(), 2);
    }

    #[test]
    fn empty_document_is_rejected() {
        assert!(matches!(
            PagedViewer::new(DocumentSource::new("empty.pdf"), 0),
            Err(DocumentError::Empty(_))
        ));
    }

    #[test]
    fn slot_detaches_when_owner_drops_viewer() {
        let slot = ViewerSlot::new();
        assert!(!slot.is_attached());

        let owned: Arc<dyn DocumentViewer> = Arc::new(viewer(2));
        slot.attach(&owned);
        assert_eq!(slot.get().map(|v| v.page_count()), Some(2));

        drop(owned);
        assert!(slot.get().is_none());
    }

    #[test]
    fn explicit_detach() {
        let slot = ViewerSlot::new();
        let owned: Arc<dyn DocumentViewer> = Arc::new(viewer(2));
        slot.attach(&owned);
        slot.detach();
        assert!(!slot.is_attached());
    }
}
