use std::path::Path;
use std::sync::{Arc, LazyLock, Mutex};

use beckon_core::error::DocumentError;
use beckon_core::viewer::{DocumentHost, DocumentViewer, PagedViewer};
use beckon_types::DocumentSource;
use regex::bytes::Regex;

/// Page objects in a PDF body; `/Pages` tree nodes do not match
static PDF_PAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/Type\s*/Page\b").unwrap());

/// Opens documents from disk, one at a time.
///
/// The configured sample document is always available and falls back to
/// `default_page_count` pages when it is not present on disk.
pub struct LocalDocumentHost {
    sample: DocumentSource,
    default_page_count: u32,
    open: Mutex<Option<Arc<PagedViewer>>>,
}

impl LocalDocumentHost {
    pub fn new(sample: DocumentSource, default_page_count: u32) -> Self {
        Self {
            sample,
            default_page_count,
            open: Mutex::new(None),
        }
    }

    fn page_count(&self, source: &DocumentSource) -> Result<u32, DocumentError> {
        let path = Path::new(source.as_str());
        if path.is_file() {
            let bytes = std::fs::read(path)
                .map_err(|e| DocumentError::NotFound(format!("{}: {}", source, e)))?;
            let pages = PDF_PAGE.find_iter(&bytes).count();
            return Ok(u32::try_from(pages).unwrap_or(u32::MAX));
        }

        if *source == self.sample {
            tracing::debug!(
                "[HOST] Sample {} not on disk, assuming {} pages",
                source,
                self.default_page_count
            );
            return Ok(self.default_page_count);
        }

        Err(DocumentError::NotFound(source.to_string()))
    }
}

impl DocumentHost for LocalDocumentHost {
    fn load(&self, source: &DocumentSource) -> Result<Arc<dyn DocumentViewer>, DocumentError> {
        let pages = self.page_count(source)?;
        let viewer = Arc::new(PagedViewer::new(source.clone(), pages)?);

        // replacing the previous viewer releases it
        *self.open.lock().unwrap_or_else(|p| p.into_inner()) = Some(Arc::clone(&viewer));
        tracing::info!("[HOST] Opened {} ({} pages)", source, pages);
        let viewer: Arc<dyn DocumentViewer> = viewer;
        Ok(viewer)
    }

    fn close(&self) {
        if let Some(viewer) = self.open.lock().unwrap_or_else(|p| p.into_inner()).take() {
            tracing::info!("[HOST] Closed {}", viewer.source());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> LocalDocumentHost {
        LocalDocumentHost::new(DocumentSource::new("/samples/Benchmark 1.pdf"), 10)
    }

    #[test]
    fn sample_falls_back_to_default_page_count() {
        let viewer = host().load(&DocumentSource::new("/samples/Benchmark 1.pdf")).unwrap();
        assert_eq!(viewer.page_count(), 10);
        assert_eq!(viewer.current_page(), 1);
    }

    #[test]
    fn unknown_document_is_not_found() {
        let err = host().load(&DocumentSource::new("/nope/missing.pdf")).err().unwrap();
        assert!(matches!(err, DocumentError::NotFound(_)));
    }

    #[test]
    fn counts_pages_of_pdf_on_disk() {
        let path = std::env::temp_dir().join(format!("beckon-host-{}.pdf", std::process::id()));
        std::fs::write(
            &path,
            b"%PDF-1.4\n1 0 obj << /Type /Pages /Count 3 >> endobj\n\
              2 0 obj << /Type /Page >> endobj\n3 0 obj << /Type/Page >> endobj\n\
              4 0 obj << /Type /Page /Parent 1 0 R >> endobj\n",
        )
        .unwrap();

        let source = DocumentSource::new(path.to_string_lossy());
        let viewer = host().load(&source).unwrap();
        assert_eq!(viewer.page_count(), 3);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn file_without_pages_is_empty() {
        let path = std::env::temp_dir().join(format!("beckon-host-empty-{}.pdf", std::process::id()));
        std::fs::write(&path, b"%PDF-1.4\n").unwrap();

        let source = DocumentSource::new(path.to_string_lossy());
        let err = host().load(&source).err().unwrap();
        assert!(matches!(err, DocumentError::Empty(_)));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn close_releases_viewer() {
        let host = host();
        let viewer = host.load(&DocumentSource::new("/samples/Benchmark 1.pdf")).unwrap();
        let weak = Arc::downgrade(&viewer);
        drop(viewer);
        assert!(weak.upgrade().is_some());

        host.close();
        assert!(weak.upgrade().is_none());
    }
}
