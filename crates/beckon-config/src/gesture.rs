use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_cooldown_ms() -> u64 {
    2000
}

fn default_frame_interval_ms() -> u64 {
    16
}

fn default_frame_width() -> u32 {
    200
}

fn default_frame_height() -> u32 {
    150
}

fn default_start_delay_ms() -> u64 {
    1000
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GestureConfig {
    /// Minimum gap between two emitted gestures
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    /// Frame loop cadence, ~60Hz by default
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    #[serde(default = "default_frame_width")]
    pub frame_width: u32,
    #[serde(default = "default_frame_height")]
    pub frame_height: u32,
    /// Camera warm-up before the first frame is sampled
    #[serde(default = "default_start_delay_ms")]
    pub start_delay_ms: u64,
}

impl GestureConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }

    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: default_cooldown_ms(),
            frame_interval_ms: default_frame_interval_ms(),
            frame_width: default_frame_width(),
            frame_height: default_frame_height(),
            start_delay_ms: default_start_delay_ms(),
        }
    }
}
