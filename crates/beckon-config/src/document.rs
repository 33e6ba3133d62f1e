use beckon_types::DocumentSource;
use serde::{Deserialize, Serialize};

fn default_sample_source() -> String {
    "/samples/Benchmark 1.pdf".to_string()
}

fn default_page_count() -> u32 {
    10
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DocumentConfig {
    /// Document opened by "load pdf"
    #[serde(default = "default_sample_source")]
    pub sample_source: String,
    /// Page count reported by the headless viewer
    #[serde(default = "default_page_count")]
    pub default_page_count: u32,
}

impl DocumentConfig {
    pub fn sample(&self) -> DocumentSource {
        DocumentSource::new(self.sample_source.clone())
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            sample_source: default_sample_source(),
            default_page_count: default_page_count(),
        }
    }
}
