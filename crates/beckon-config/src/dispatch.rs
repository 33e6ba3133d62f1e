use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_feedback_clear_ms() -> u64 {
    2000
}

fn default_scroll_step() -> f64 {
    100.0
}

fn default_zoom_in_factor() -> f64 {
    1.2
}

fn default_zoom_out_factor() -> f64 {
    0.8
}

fn default_min_zoom() -> f64 {
    0.5
}

fn default_max_zoom() -> f64 {
    3.0
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DispatchConfig {
    /// How long the last executed command stays on screen
    #[serde(default = "default_feedback_clear_ms")]
    pub feedback_clear_ms: u64,
    /// Pixels per scroll command
    #[serde(default = "default_scroll_step")]
    pub scroll_step: f64,
    #[serde(default = "default_zoom_in_factor")]
    pub zoom_in_factor: f64,
    #[serde(default = "default_zoom_out_factor")]
    pub zoom_out_factor: f64,
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f64,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f64,
}

impl DispatchConfig {
    pub fn feedback_clear(&self) -> Duration {
        Duration::from_millis(self.feedback_clear_ms)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            feedback_clear_ms: default_feedback_clear_ms(),
            scroll_step: default_scroll_step(),
            zoom_in_factor: default_zoom_in_factor(),
            zoom_out_factor: default_zoom_out_factor(),
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
        }
    }
}
