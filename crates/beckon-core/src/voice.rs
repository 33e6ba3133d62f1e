//! Voice Intent Classifier and the speech collaborator boundary.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{LazyLock, Mutex, MutexGuard};

use beckon_types::{DocumentSource, NavigationAction, NavigationIntent, ScrollDirection, ZoomDirection};
use regex::Regex;

use crate::preprocess::{Preprocessor, TranscriptPreprocessor};

static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

#[derive(Debug, Clone, Copy)]
enum Command {
    ScrollUp,
    ScrollDown,
    ZoomIn,
    ZoomOut,
    OpenLink,
    ToggleLinks,
    Activate,
    LoadSample,
    CloseDocument,
    NextPage,
    PrevPage,
    GoToPage,
}

impl Command {
    /// `None` when the command needs a number and the transcript has none
    fn build(self, number: Option<u32>, sample: &DocumentSource) -> Option<NavigationAction> {
        let action = match self {
            Command::ScrollUp => NavigationAction::Scroll {
                direction: ScrollDirection::Up,
            },
            Command::ScrollDown => NavigationAction::Scroll {
                direction: ScrollDirection::Down,
            },
            Command::ZoomIn => NavigationAction::Zoom {
                direction: ZoomDirection::In,
            },
            Command::ZoomOut => NavigationAction::Zoom {
                direction: ZoomDirection::Out,
            },
            Command::OpenLink => NavigationAction::OpenLink { index: number? },
            Command::ToggleLinks => NavigationAction::ToggleLinks,
            Command::Activate => NavigationAction::Activate,
            Command::LoadSample => NavigationAction::LoadDocument {
                source: sample.clone(),
            },
            Command::CloseDocument => NavigationAction::CloseDocument,
            Command::NextPage => NavigationAction::NextPage,
            Command::PrevPage => NavigationAction::PrevPage,
            Command::GoToPage => NavigationAction::GoToPage { page: number? },
        };
        Some(action)
    }
}

struct Rule {
    phrases: &'static [&'static str],
    command: Command,
}

/// Evaluated top to bottom; the first rule that produces an action wins.
const RULES: &[Rule] = &[
    Rule { phrases: &["scroll up"], command: Command::ScrollUp },
    Rule { phrases: &["scroll down"], command: Command::ScrollDown },
    Rule { phrases: &["zoom in", "zoomin"], command: Command::ZoomIn },
    Rule { phrases: &["zoom out", "zoomout"], command: Command::ZoomOut },
    Rule { phrases: &["open link", "link"], command: Command::OpenLink },
    Rule { phrases: &["show links", "toggle links", "show link"], command: Command::ToggleLinks },
    Rule { phrases: &["activate", "click", "enter"], command: Command::Activate },
    Rule {
        phrases: &["load pdf", "open pdf", "load sample pdf", "sample pdf"],
        command: Command::LoadSample,
    },
    Rule { phrases: &["close pdf", "exit pdf"], command: Command::CloseDocument },
    Rule { phrases: &["next page", "page next"], command: Command::NextPage },
    Rule { phrases: &["previous page", "page previous"], command: Command::PrevPage },
    Rule { phrases: &["page"], command: Command::GoToPage },
];

/// First run of decimal digits, if it fits in a `u32`
fn first_number(text: &str) -> Option<u32> {
    NUMBER.find(text).and_then(|m| m.as_str().parse().ok())
}

pub struct VoiceClassifier {
    sample: DocumentSource,
    preprocessor: TranscriptPreprocessor,
}

impl VoiceClassifier {
    /// `sample` is the document opened by "load pdf"
    pub fn new(sample: DocumentSource) -> Self {
        Self {
            sample,
            preprocessor: TranscriptPreprocessor,
        }
    }

    pub fn classify(&self, transcript: &str) -> Option<NavigationIntent> {
        let text = self.preprocessor.process(transcript);
        if text.is_empty() {
            return None;
        }
        let number = first_number(&text);

        let action = RULES
            .iter()
            .filter(|rule| rule.phrases.iter().any(|p| text.contains(p)))
            .find_map(|rule| rule.command.build(number, &self.sample));

        match action {
            Some(action) => {
                tracing::debug!("[VOICE] '{}' -> {}", text, action.name());
                Some(NavigationIntent::voice(action, transcript.trim()))
            }
            None => {
                tracing::debug!("[VOICE] No command in '{}'", text);
                None
            }
        }
    }
}

/// Live speech recognizer as seen by the engine
pub trait SpeechInput: Send + Sync {
    fn transcript(&self) -> String;
    fn is_listening(&self) -> bool;
    fn reset_transcript(&self);
    fn start_listening(&self);
    fn stop_listening(&self);
}

/// Fragments kept by a default `TranscriptBuffer`
pub const DEFAULT_MAX_FRAGMENTS: usize = 8;

#[derive(Debug, Default)]
struct BufferState {
    fragments: VecDeque<String>,
    listening: bool,
}

/// Transcript fed by the host, one recognized fragment at a time.
///
/// Only the newest `max_fragments` fragments are kept, so text that never
/// matched ages out instead of pairing with later phrases.
#[derive(Debug)]
pub struct TranscriptBuffer {
    state: Mutex<BufferState>,
    max_fragments: usize,
}

impl Default for TranscriptBuffer {
    fn default() -> Self {
        Self::with_max_fragments(DEFAULT_MAX_FRAGMENTS)
    }
}

impl TranscriptBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_fragments(max_fragments: usize) -> Self {
        Self {
            state: Mutex::new(BufferState::default()),
            max_fragments: max_fragments.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BufferState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a fragment; the transcript joins fragments with a single space
    pub fn push(&self, fragment: &str) {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return;
        }
        let mut state = self.lock();
        state.fragments.push_back(fragment.to_string());
        while state.fragments.len() > self.max_fragments {
            state.fragments.pop_front();
        }
    }
}

impl SpeechInput for TranscriptBuffer {
    fn transcript(&self) -> String {
        let state = self.lock();
        let parts: Vec<&str> = state.fragments.iter().map(String::as_str).collect();
        parts.join(" ")
    }

    fn is_listening(&self) -> bool {
        self.lock().listening
    }

    fn reset_transcript(&self) {
        self.lock().fragments.clear();
    }

    fn start_listening(&self) {
        self.lock().listening = true;
    }

    fn stop_listening(&self) {
        self.lock().listening = false;
    }
}

/// Re-classifies the transcript after every emission
pub struct VoiceSession<S: SpeechInput> {
    input: S,
    classifier: VoiceClassifier,
    require_listening: bool,
    misses: AtomicU64,
}

impl<S: SpeechInput> VoiceSession<S> {
    pub fn new(input: S, classifier: VoiceClassifier, require_listening: bool) -> Self {
        Self {
            input,
            classifier,
            require_listening,
            misses: AtomicU64::new(0),
        }
    }

    pub fn input(&self) -> &S {
        &self.input
    }

    /// Classify the current transcript; a match clears it so partial updates
    /// of the same utterance cannot fire the command again.
    pub fn poll(&self) -> Option<NavigationIntent> {
        if self.require_listening && !self.input.is_listening() {
            return None;
        }

        let transcript = self.input.transcript();
        if transcript.trim().is_empty() {
            return None;
        }

        match self.classifier.classify(&transcript) {
            Some(intent) => {
                self.input.reset_transcript();
                Some(intent)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Transcripts that matched no command
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use beckon_types::InputSource;

    use super::*;

    fn classifier() -> VoiceClassifier {
        VoiceClassifier::new(DocumentSource::new("/samples/doc.pdf"))
    }

    fn action(text: &str) -> Option<NavigationAction> {
        classifier().classify(text).map(|i| i.action)
    }

    #[test]
    fn recognizes_each_command() {
        assert_eq!(
            action("scroll up"),
            Some(NavigationAction::Scroll { direction: ScrollDirection::Up })
        );
        assert_eq!(
            action("please scroll down"),
            Some(NavigationAction::Scroll { direction: ScrollDirection::Down })
        );
        assert_eq!(
            action("zoomin"),
            Some(NavigationAction::Zoom { direction: ZoomDirection::In })
        );
        assert_eq!(action("open link 3"), Some(NavigationAction::OpenLink { index: 3 }));
        assert_eq!(action("show links"), Some(NavigationAction::ToggleLinks));
        assert_eq!(action("click"), Some(NavigationAction::Activate));
        assert_eq!(
            action("load sample pdf"),
            Some(NavigationAction::LoadDocument {
                source: DocumentSource::new("/samples/doc.pdf")
            })
        );
        assert_eq!(action("exit pdf"), Some(NavigationAction::CloseDocument));
        assert_eq!(action("page next"), Some(NavigationAction::NextPage));
        assert_eq!(action("previous page"), Some(NavigationAction::PrevPage));
        assert_eq!(action("page 7"), Some(NavigationAction::GoToPage { page: 7 }));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(
            action("ZOOM OUT"),
            Some(NavigationAction::Zoom { direction: ZoomDirection::Out })
        );
        assert_eq!(action("  Open Link 12 "), Some(NavigationAction::OpenLink { index: 12 }));
    }

    #[test]
    fn earlier_rule_wins() {
        assert_eq!(action("open link page 2"), Some(NavigationAction::OpenLink { index: 2 }));
        // "show link 4" has a number, so the link rule fires before the overlay toggle
        assert_eq!(action("show link 4"), Some(NavigationAction::OpenLink { index: 4 }));
    }

    #[test]
    fn link_without_number_falls_through() {
        assert_eq!(action("show link"), Some(NavigationAction::ToggleLinks));
        assert_eq!(action("link"), None);
        assert_eq!(action("page"), None);
    }

    #[test]
    fn full_width_digits_and_overflow() {
        assert_eq!(action("page ７"), Some(NavigationAction::GoToPage { page: 7 }));
        assert_eq!(action("link 99999999999"), None);
    }

    #[test]
    fn unrecognized_transcripts_yield_none() {
        for text in ["", "   ", "hello there", "scroll sideways", "zoom"] {
            assert!(classifier().classify(text).is_none(), "{text}");
        }
    }

    #[test]
    fn intent_keeps_raw_text() {
        let intent = classifier().classify("  Next Page ").unwrap();
        assert_eq!(intent.text, "Next Page");
        assert_eq!(intent.source, InputSource::Voice);
    }

    #[test]
    fn session_resets_transcript_on_match_only() {
        let session = VoiceSession::new(TranscriptBuffer::new(), classifier(), true);
        session.input().push("scroll");
        assert!(session.poll().is_none(), "not listening");

        session.input().start_listening();
        assert!(session.poll().is_none());
        assert_eq!(session.input().transcript(), "scroll");
        assert_eq!(session.misses(), 1);

        session.input().push("down");
        let intent = session.poll().unwrap();
        assert_eq!(
            intent.action,
            NavigationAction::Scroll { direction: ScrollDirection::Down }
        );
        assert_eq!(session.input().transcript(), "");
        assert!(session.poll().is_none());
    }

    #[test]
    fn session_without_listening_requirement() {
        let session = VoiceSession::new(TranscriptBuffer::new(), classifier(), false);
        session.input().push("zoom in");
        assert!(session.poll().is_some());
    }

    #[test]
    fn buffer_keeps_newest_fragments() {
        let buffer = TranscriptBuffer::with_max_fragments(3);
        for fragment in ["link 4", "uh", "hmm", "well"] {
            buffer.push(fragment);
        }
        assert_eq!(buffer.transcript(), "uh hmm well");

        buffer.push("  ");
        assert_eq!(buffer.transcript(), "uh hmm well");
    }

    #[test]
    fn aged_out_number_does_not_pair_with_later_phrase() {
        let session = VoiceSession::new(TranscriptBuffer::with_max_fragments(2), classifier(), false);
        for fragment in ["chapter 9", "um", "open link"] {
            session.input().push(fragment);
            assert!(session.poll().is_none());
        }
        assert_eq!(session.input().transcript(), "um open link");
        assert_eq!(session.misses(), 3);
    }
}
