use beckon_types::{GestureLabel, NavigationAction, NavigationIntent, ScrollDirection};

/// Navigation intent for a detected gesture.
///
/// `thumbs_up` activates only when something is focused. Labels without a
/// mapping, `point` included, produce nothing.
pub fn intent_for_gesture(label: GestureLabel, has_focus_target: bool) -> Option<NavigationIntent> {
    let action = match label {
        GestureLabel::SwipeUp => NavigationAction::Scroll {
            direction: ScrollDirection::Up,
        },
        GestureLabel::SwipeDown => NavigationAction::Scroll {
            direction: ScrollDirection::Down,
        },
        GestureLabel::Pinch => NavigationAction::ToggleLinks,
        GestureLabel::ThumbsUp if has_focus_target => NavigationAction::Activate,
        _ => return None,
    };
    Some(NavigationIntent::gesture(action, label))
}
