use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomDirection {
    In,
    Out,
}

/// Location of a document the viewer collaborator can open
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSource(pub String);

impl DocumentSource {
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a recognized command asks the dispatcher to do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NavigationAction {
    Scroll { direction: ScrollDirection },
    Zoom { direction: ZoomDirection },
    /// 1-based number as shown on the link overlay
    OpenLink { index: u32 },
    ToggleLinks,
    Activate,
    LoadDocument { source: DocumentSource },
    CloseDocument,
    NextPage,
    PrevPage,
    /// 1-based page number
    GoToPage { page: u32 },
}

impl NavigationAction {
    pub fn name(&self) -> &'static str {
        match self {
            NavigationAction::Scroll { .. } => "scroll",
            NavigationAction::Zoom { .. } => "zoom",
            NavigationAction::OpenLink { .. } => "open_link",
            NavigationAction::ToggleLinks => "toggle_links",
            NavigationAction::Activate => "activate",
            NavigationAction::LoadDocument { .. } => "load_document",
            NavigationAction::CloseDocument => "close_document",
            NavigationAction::NextPage => "next_page",
            NavigationAction::PrevPage => "prev_page",
            NavigationAction::GoToPage { .. } => "go_to_page",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    Voice,
    Gesture,
}

/// A classified command together with the raw input it came from.
///
/// Not `Clone`: an intent is handed to the dispatcher by value and consumed once.
#[derive(Debug, PartialEq, Eq)]
pub struct NavigationIntent {
    pub action: NavigationAction,
    /// Original transcript or gesture label, kept for diagnostics and feedback
    pub text: String,
    pub source: InputSource,
}

impl NavigationIntent {
    pub fn voice(action: NavigationAction, text: impl Into<String>) -> Self {
        Self {
            action,
            text: text.into(),
            source: InputSource::Voice,
        }
    }

    pub fn gesture(action: NavigationAction, label: GestureLabel) -> Self {
        Self {
            action,
            text: label.as_str().to_string(),
            source: InputSource::Gesture,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureLabel {
    SwipeUp,
    SwipeDown,
    SwipeLeft,
    SwipeRight,
    Pinch,
    ThumbsUp,
    Point,
    Fist,
    OpenPalm,
}

impl GestureLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            GestureLabel::SwipeUp => "swipe_up",
            GestureLabel::SwipeDown => "swipe_down",
            GestureLabel::SwipeLeft => "swipe_left",
            GestureLabel::SwipeRight => "swipe_right",
            GestureLabel::Pinch => "pinch",
            GestureLabel::ThumbsUp => "thumbs_up",
            GestureLabel::Point => "point",
            GestureLabel::Fist => "fist",
            GestureLabel::OpenPalm => "open_palm",
        }
    }
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified camera frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSample {
    pub label: GestureLabel,
    /// In `[0, 1]`
    pub confidence: f32,
    pub timestamp: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Link,
    Button,
    Input,
    Heading,
}

#[derive(Debug)]
pub enum AppEvent {
    /// Latest transcript emitted by the speech collaborator
    TranscriptUpdate(String),
    ListeningChanged(bool),
    GestureControl {
        enabled: bool,
    },
    GestureDetected(GestureSample),
    GestureStatusUpdate {
        status: String,
        sampling: bool,
    },
    /// User pressed tab outside of voice/gesture control
    UserTab {
        backwards: bool,
    },
    /// Remove the n-th (1-based) focus target from the page
    RemoveTarget(usize),
    ViewportResized {
        width: f64,
        height: f64,
    },
    ShowStatus,
    Shutdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gesture_labels_serialize_snake_case() {
        let json = serde_json::to_string(&GestureLabel::ThumbsUp).unwrap();
        assert_eq!(json, "\"thumbs_up\"");
        assert_eq!(GestureLabel::OpenPalm.to_string(), "open_palm");
    }

    #[test]
    fn actions_serialize_tagged() {
        let action = NavigationAction::OpenLink { index: 3 };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "open_link");
        assert_eq!(json["index"], 3);
        assert_eq!(action.name(), "open_link");
    }

    #[test]
    fn gesture_intent_carries_label_text() {
        let intent = NavigationIntent::gesture(NavigationAction::Activate, GestureLabel::ThumbsUp);
        assert_eq!(intent.text, "thumbs_up");
        assert_eq!(intent.source, InputSource::Gesture);
    }
}
