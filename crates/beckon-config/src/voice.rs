use serde::{Deserialize, Serialize};

fn default_require_listening() -> bool {
    true
}

fn default_max_fragments() -> usize {
    8
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct VoiceConfig {
    /// Ignore transcripts that arrive while the recognizer is not listening
    #[serde(default = "default_require_listening")]
    pub require_listening: bool,
    /// Transcript fragments kept while no command has matched
    #[serde(default = "default_max_fragments")]
    pub max_fragments: usize,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            require_listening: default_require_listening(),
            max_fragments: default_max_fragments(),
        }
    }
}
