use std::sync::Arc;

use beckon_core::gesture::SamplerState;
use beckon_types::GestureLabel;
use serde::Serialize;
use tokio::sync::RwLock;

/// User-facing control status
#[derive(Clone, Debug, Default, Serialize)]
pub struct ControlStatus {
    pub voice_active: bool,
    pub listening: bool,
    pub gesture: SamplerState,
    pub message: String,
    pub last_gesture: Option<GestureLabel>,
    pub dispatched: u64,
    pub misses: u64,
}

/// Application status
pub struct AppStatus {
    pub control: Arc<RwLock<ControlStatus>>,
}

impl AppStatus {
    pub fn new() -> Self {
        Self {
            control: Arc::new(RwLock::new(ControlStatus::default())),
        }
    }

    pub async fn snapshot(&self) -> ControlStatus {
        self.control.read().await.clone()
    }

    pub async fn set_message(&self, message: impl Into<String>) {
        self.control.write().await.message = message.into();
    }
}

impl Default for AppStatus {
    fn default() -> Self {
        Self::new()
    }
}
