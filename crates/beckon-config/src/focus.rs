use serde::{Deserialize, Serialize};

fn default_include_headings() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct FocusConfig {
    /// Page-wide scan: headings count as focus targets
    #[serde(default = "default_include_headings")]
    pub include_headings: bool,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            include_headings: default_include_headings(),
        }
    }
}
