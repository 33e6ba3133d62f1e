pub mod dispatch;
pub mod dom;
pub mod error;
pub mod feedback;
pub mod focus;
pub mod gesture;
pub mod page;
pub mod preprocess;
pub mod viewer;
pub mod voice;
