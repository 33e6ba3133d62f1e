use crate::page::ElementId;

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("Element {0:?} is no longer in the document")]
    StaleElement(ElementId),

    #[error("Element {0:?} cannot receive focus")]
    NotFocusable(ElementId),
}

#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("Camera unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to decode frame: {0}")]
    Decode(String),

    #[error("Camera stream is closed")]
    Closed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Document has no pages: {0}")]
    Empty(String),
}
