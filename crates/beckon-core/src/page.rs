use std::collections::HashMap;
use std::sync::Weak;

use crate::error::PageError;

/// Opaque handle to a live element of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

/// Static facts about an element at the time it was read
#[derive(Debug, Clone, Default)]
pub struct ElementSnapshot {
    /// Lower-case tag name
    pub tag: String,
    pub attributes: HashMap<String, String>,
    /// Text content of the element and its descendants
    pub text: String,
}

impl ElementSnapshot {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    #[default]
    Block,
    Inline,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComputedStyle {
    pub display: Display,
    pub visibility: Visibility,
}

impl ComputedStyle {
    pub fn is_hidden(&self) -> bool {
        self.display == Display::None || self.visibility == Visibility::Hidden
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Auto,
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAlign {
    Start,
    Center,
    End,
    Nearest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollIntoView {
    pub behavior: ScrollBehavior,
    pub block: ScrollAlign,
    pub inline: ScrollAlign,
}

impl ScrollIntoView {
    /// Smooth scroll that puts the element in the vertical center of the viewport
    pub const fn centered() -> Self {
        Self {
            behavior: ScrollBehavior::Smooth,
            block: ScrollAlign::Center,
            inline: ScrollAlign::Nearest,
        }
    }
}

/// Change notifications a page delivers to its observers
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// Children were added or removed somewhere in the document
    ChildList,
    /// An attribute changed on some element
    Attribute { name: String },
    /// The viewport changed size
    Resize,
    /// An element received focus, by any means
    FocusIn(ElementId),
}

/// Subscriber to page changes
pub trait PageObserver: Send + Sync {
    fn on_page_event(&self, event: &PageEvent);
}

/// Everything the engine reads from or writes to the host page.
///
/// Implementations must not hold internal locks while notifying observers:
/// observers are allowed to call back into the page.
pub trait Page: Send + Sync {
    /// All elements in document traversal order
    fn elements(&self) -> Vec<ElementId>;

    /// Tag, attributes and text of an element, `None` if it was removed
    fn snapshot(&self, id: ElementId) -> Option<ElementSnapshot>;

    /// Resolved style of an element, `None` if it was removed
    fn computed_style(&self, id: ElementId) -> Option<ComputedStyle>;

    /// Layout box of an element, `None` when it is not rendered
    fn layout_box(&self, id: ElementId) -> Option<Rect>;

    /// Element that currently holds focus
    fn focused(&self) -> Option<ElementId>;

    /// Move focus to an element
    fn focus(&self, id: ElementId) -> Result<(), PageError>;

    /// Scroll the viewport so the element becomes visible
    fn scroll_into_view(&self, id: ElementId, options: ScrollIntoView) -> Result<(), PageError>;

    /// Scroll the viewport by a pixel offset
    fn scroll_by(&self, dx: f64, dy: f64);

    /// Apply a CSS scale transform to the page body, origin top-left
    fn set_body_scale(&self, scale: f64);

    /// Activate an element as if it was clicked
    fn click(&self, id: ElementId) -> Result<(), PageError>;

    /// Register an observer for structure, resize and focus changes
    fn observe(&self, observer: Weak<dyn PageObserver>);
}
