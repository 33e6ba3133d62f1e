use std::path::PathBuf;
use std::sync::Arc;

use beckon_capture::{DirectoryCamera, SolidCamera};
use beckon_config::Config;
use beckon_core::dom::MemoryDocument;
use beckon_core::gesture::Camera;

use crate::status::AppStatus;

/// Where gesture frames come from
#[derive(Debug, Clone)]
pub enum CameraSource {
    Directory(PathBuf),
    Solid(u8),
}

impl CameraSource {
    /// A fresh, unopened camera
    pub fn camera(&self) -> Box<dyn Camera> {
        match self {
            CameraSource::Directory(dir) => Box::new(DirectoryCamera::new(dir.clone())),
            CameraSource::Solid(level) => Box::new(SolidCamera::new(*level)),
        }
    }
}

pub struct AppState {
    pub config: Config,
    pub status: AppStatus,
    pub page: Arc<MemoryDocument>,
    pub camera: CameraSource,
}

impl AppState {
    pub fn new(config: Config, page: MemoryDocument, camera: CameraSource) -> Self {
        Self {
            config,
            status: AppStatus::new(),
            page: Arc::new(page),
            camera,
        }
    }
}
