use std::env;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use self::dispatch::DispatchConfig;
use self::document::DocumentConfig;
use self::focus::FocusConfig;
use self::gesture::GestureConfig;
use self::voice::VoiceConfig;

pub mod dispatch;
pub mod document;
pub mod focus;
pub mod gesture;
pub mod voice;

fn default_event_capacity() -> usize {
    64
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub focus: FocusConfig,
    pub voice: VoiceConfig,
    pub gesture: GestureConfig,
    pub dispatch: DispatchConfig,
    pub document: DocumentConfig,

    /// Capacity of the channel feeding the event loop
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl Config {
    /// Defaults with `BECKON_*` environment overrides applied
    pub fn new() -> Self {
        let mut config = Config::default();
        config.apply_overrides(|key| env::var(key).ok());
        config
    }

    /// JSON file merged over defaults, then environment overrides
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let mut config: Config = serde_json::from_str(&raw)?;
        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from any key lookup; unparsable values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_value(&lookup, "BECKON_INCLUDE_HEADINGS") {
            self.focus.include_headings = v;
        }
        if let Some(v) = parse_value(&lookup, "BECKON_REQUIRE_LISTENING") {
            self.voice.require_listening = v;
        }
        if let Some(v) = parse_value(&lookup, "BECKON_TRANSCRIPT_FRAGMENTS") {
            self.voice.max_fragments = v;
        }
        if let Some(v) = parse_value(&lookup, "BECKON_GESTURE_COOLDOWN_MS") {
            self.gesture.cooldown_ms = v;
        }
        if let Some(v) = parse_value(&lookup, "BECKON_FRAME_INTERVAL_MS") {
            self.gesture.frame_interval_ms = v;
        }
        if let Some(v) = parse_value(&lookup, "BECKON_FEEDBACK_CLEAR_MS") {
            self.dispatch.feedback_clear_ms = v;
        }
        if let Some(v) = parse_value(&lookup, "BECKON_SCROLL_STEP") {
            self.dispatch.scroll_step = v;
        }
        if let Some(v) = lookup("BECKON_SAMPLE_DOCUMENT") {
            self.document.sample_source = v;
        }
        if let Some(v) = parse_value(&lookup, "BECKON_PAGE_COUNT") {
            self.document.default_page_count = v;
        }
        if let Some(v) = parse_value(&lookup, "BECKON_EVENT_CAPACITY") {
            self.event_capacity = v;
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            focus: FocusConfig::default(),
            voice: VoiceConfig::default(),
            gesture: GestureConfig::default(),
            dispatch: DispatchConfig::default(),
            document: DocumentConfig::default(),

            event_capacity: default_event_capacity(),
        }
    }
}

fn parse_value<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|raw| raw.trim().parse().ok())
}
