use unicode_normalization::UnicodeNormalization;

pub trait Preprocessor {
    // Default transcript preprocessor
    fn process(&self, text: &str) -> String {
        let text = text.trim();

        if text.is_empty() {
            return String::new();
        }

        // Unicode normalization (NFKC), folds full-width digits and letters
        let text: String = text.nfkc().collect();

        // Streaming recognizers may break lines mid-phrase
        text.replace(['\n', '\r'], " ").trim().to_lowercase()
    }
}

pub struct TranscriptPreprocessor;
impl Preprocessor for TranscriptPreprocessor {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_width_and_whitespace() {
        let p = TranscriptPreprocessor;
        assert_eq!(p.process("  ZOOM OUT \n"), "zoom out");
        assert_eq!(p.process("Ｏｐｅｎ ｌｉｎｋ ３"), "open link 3");
        assert_eq!(p.process("next\npage"), "next page");
        assert_eq!(p.process("   "), "");
    }
}
