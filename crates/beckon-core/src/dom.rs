//! In-memory document implementing [`Page`].
//!
//! Used by the headless runtime and as the page fake in tests. Elements form a
//! tree under an implicit body; traversal order is pre-order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use serde::Deserialize;

use crate::error::PageError;
use crate::focus::{ScanScope, scan};
use crate::page::{
    ComputedStyle, Display, ElementId, ElementSnapshot, Page, PageEvent, PageObserver, Rect,
    ScrollIntoView, Visibility,
};

const ROW_HEIGHT: f64 = 32.0;

/// Declarative element description, deserializable from page JSON files
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeSpec {
    pub tag: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_lowercase(),
            ..Default::default()
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }

    /// `<a href=..>text</a>`
    pub fn link(href: &str, text: &str) -> Self {
        Self::new("a").attr("href", href).text(text)
    }
}

#[derive(Debug)]
struct Node {
    tag: String,
    attributes: HashMap<String, String>,
    text: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Node {
    fn own_style(&self) -> ComputedStyle {
        let mut style = ComputedStyle::default();
        if self.attributes.contains_key("hidden") {
            style.display = Display::None;
        }
        if let Some(inline) = self.attributes.get("style") {
            for decl in inline.split(';') {
                let Some((prop, value)) = decl.split_once(':') else {
                    continue;
                };
                match (prop.trim(), value.trim()) {
                    ("display", "none") => style.display = Display::None,
                    ("display", "inline") => style.display = Display::Inline,
                    ("visibility", "hidden") => style.visibility = Visibility::Hidden,
                    ("visibility", "visible") => style.visibility = Visibility::Visible,
                    _ => {}
                }
            }
        }
        style
    }
}

#[derive(Debug)]
struct Tree {
    nodes: HashMap<ElementId, Node>,
    body: Vec<ElementId>,
    next_id: u64,
    focused: Option<ElementId>,
    scroll: (f64, f64),
    scale: f64,
    viewport: (f64, f64),
    clicks: Vec<ElementId>,
    last_scroll_into_view: Option<(ElementId, ScrollIntoView)>,
}

impl Tree {
    fn insert(&mut self, parent: Option<ElementId>, spec: NodeSpec) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;

        self.nodes.insert(
            id,
            Node {
                tag: spec.tag.to_lowercase(),
                attributes: spec.attributes,
                text: spec.text,
                parent,
                children: Vec::new(),
            },
        );

        for child in spec.children {
            let child_id = self.insert(Some(id), child);
            if let Some(node) = self.nodes.get_mut(&id) {
                node.children.push(child_id);
            }
        }

        id
    }

    fn preorder(&self) -> Vec<ElementId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<ElementId> = self.body.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    fn text_content(&self, id: ElementId) -> String {
        let Some(node) = self.nodes.get(&id) else {
            return String::new();
        };
        let mut text = node.text.clone();
        for child in &node.children {
            let child_text = self.text_content(*child);
            if !child_text.is_empty() {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(&child_text);
            }
        }
        text
    }

    fn is_rendered(&self, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(cur) = current {
            let Some(node) = self.nodes.get(&cur) else {
                return false;
            };
            if node.own_style().display == Display::None {
                return false;
            }
            current = node.parent;
        }
        true
    }

    fn contains(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(cur) = current {
            if cur == ancestor {
                return true;
            }
            current = self.nodes.get(&cur).and_then(|n| n.parent);
        }
        false
    }

    fn remove_subtree(&mut self, id: ElementId) {
        if let Some(node) = self.nodes.remove(&id) {
            for child in node.children {
                self.remove_subtree(child);
            }
        }
    }
}

pub struct MemoryDocument {
    tree: Mutex<Tree>,
    observers: Mutex<Vec<Weak<dyn PageObserver>>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self {
            tree: Mutex::new(Tree {
                nodes: HashMap::new(),
                body: Vec::new(),
                next_id: 1,
                focused: None,
                scroll: (0.0, 0.0),
                scale: 1.0,
                viewport: (1280.0, 720.0),
                clicks: Vec::new(),
                last_scroll_into_view: None,
            }),
            observers: Mutex::new(Vec::new()),
        }
    }

    pub fn from_nodes(nodes: Vec<NodeSpec>) -> Self {
        let doc = Self::new();
        {
            let mut tree = doc.lock();
            for spec in nodes {
                let id = tree.insert(None, spec);
                tree.body.push(id);
            }
        }
        doc
    }

    /// Parse a JSON array of [`NodeSpec`]s forming the body
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let nodes: Vec<NodeSpec> = serde_json::from_str(raw)?;
        Ok(Self::from_nodes(nodes))
    }

    fn lock(&self) -> MutexGuard<'_, Tree> {
        self.tree.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn notify(&self, event: PageEvent) {
        let live: Vec<Arc<dyn PageObserver>> = {
            let mut observers = self
                .observers
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            observers.retain(|o| o.strong_count() > 0);
            observers.iter().filter_map(Weak::upgrade).collect()
        };

        for observer in live {
            observer.on_page_event(&event);
        }
    }

    /// Append a subtree under `parent`, or at the end of the body
    pub fn append(&self, parent: Option<ElementId>, spec: NodeSpec) -> Option<ElementId> {
        let id = {
            let mut tree = self.lock();
            if let Some(parent) = parent
                && !tree.nodes.contains_key(&parent)
            {
                return None;
            }
            let id = tree.insert(parent, spec);
            match parent {
                Some(parent) => {
                    if let Some(node) = tree.nodes.get_mut(&parent) {
                        node.children.push(id);
                    }
                }
                None => tree.body.push(id),
            }
            id
        };
        self.notify(PageEvent::ChildList);
        Some(id)
    }

    /// Remove an element and its subtree. Focus inside it is lost.
    pub fn remove(&self, id: ElementId) -> bool {
        {
            let mut tree = self.lock();
            let Some(parent) = tree.nodes.get(&id).map(|n| n.parent) else {
                return false;
            };
            match parent {
                Some(parent) => {
                    if let Some(node) = tree.nodes.get_mut(&parent) {
                        node.children.retain(|c| *c != id);
                    }
                }
                None => tree.body.retain(|c| *c != id),
            }
            if let Some(focused) = tree.focused
                && tree.contains(id, focused)
            {
                tree.focused = None;
            }
            tree.remove_subtree(id);
        }
        self.notify(PageEvent::ChildList);
        true
    }

    pub fn set_attribute(&self, id: ElementId, name: &str, value: &str) -> bool {
        {
            let mut tree = self.lock();
            let Some(node) = tree.nodes.get_mut(&id) else {
                return false;
            };
            node.attributes.insert(name.to_string(), value.to_string());
        }
        self.notify(PageEvent::Attribute {
            name: name.to_string(),
        });
        true
    }

    pub fn resize(&self, width: f64, height: f64) {
        self.lock().viewport = (width, height);
        self.notify(PageEvent::Resize);
    }

    /// Sequential keyboard navigation, as the user pressing (shift+)tab
    pub fn tab(&self, backwards: bool) -> Option<ElementId> {
        let order = scan(self, ScanScope::Interactive);
        if order.is_empty() {
            return None;
        }

        let focused = self.focused();
        let position = focused.and_then(|f| order.iter().position(|t| t.element == f));
        let next = match (position, backwards) {
            (None, false) => 0,
            (None, true) => order.len() - 1,
            (Some(i), false) => (i + 1) % order.len(),
            (Some(i), true) => (i + order.len() - 1) % order.len(),
        };

        let target = order[next].element;
        self.focus(target).ok()?;
        Some(target)
    }

    /// First element, in document order, whose own text equals `text`
    pub fn find_by_text(&self, text: &str) -> Option<ElementId> {
        let tree = self.lock();
        tree.preorder()
            .into_iter()
            .find(|id| tree.nodes.get(id).is_some_and(|n| n.text == text))
    }

    pub fn scroll_offset(&self) -> (f64, f64) {
        self.lock().scroll
    }

    pub fn body_scale(&self) -> f64 {
        self.lock().scale
    }

    pub fn clicks(&self) -> Vec<ElementId> {
        self.lock().clicks.clone()
    }

    pub fn last_scroll_into_view(&self) -> Option<(ElementId, ScrollIntoView)> {
        self.lock().last_scroll_into_view
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl Page for MemoryDocument {
    fn elements(&self) -> Vec<ElementId> {
        self.lock().preorder()
    }

    fn snapshot(&self, id: ElementId) -> Option<ElementSnapshot> {
        let tree = self.lock();
        let node = tree.nodes.get(&id)?;
        Some(ElementSnapshot {
            tag: node.tag.clone(),
            attributes: node.attributes.clone(),
            text: tree.text_content(id),
        })
    }

    fn computed_style(&self, id: ElementId) -> Option<ComputedStyle> {
        let tree = self.lock();
        let mut style = tree.nodes.get(&id)?.own_style();

        // visibility inherits unless the element sets it
        let mut parent = tree.nodes.get(&id).and_then(|n| n.parent);
        let sets_visibility = tree
            .nodes
            .get(&id)
            .and_then(|n| n.attributes.get("style"))
            .is_some_and(|s| s.contains("visibility"));
        if !sets_visibility {
            while let Some(p) = parent {
                let Some(node) = tree.nodes.get(&p) else { break };
                if node.own_style().visibility == Visibility::Hidden {
                    style.visibility = Visibility::Hidden;
                    break;
                }
                parent = node.parent;
            }
        }
        Some(style)
    }

    fn layout_box(&self, id: ElementId) -> Option<Rect> {
        let tree = self.lock();
        if !tree.is_rendered(id) {
            return None;
        }
        let row = tree.preorder().iter().position(|e| *e == id)?;
        Some(Rect {
            x: 0.0,
            y: row as f64 * ROW_HEIGHT,
            width: tree.viewport.0,
            height: ROW_HEIGHT,
        })
    }

    fn focused(&self) -> Option<ElementId> {
        self.lock().focused
    }

    fn focus(&self, id: ElementId) -> Result<(), PageError> {
        {
            let mut tree = self.lock();
            if !tree.nodes.contains_key(&id) {
                return Err(PageError::StaleElement(id));
            }
            tree.focused = Some(id);
        }
        self.notify(PageEvent::FocusIn(id));
        Ok(())
    }

    fn scroll_into_view(&self, id: ElementId, options: ScrollIntoView) -> Result<(), PageError> {
        let rect = self.layout_box(id).ok_or(PageError::StaleElement(id))?;
        let mut tree = self.lock();
        let viewport_height = tree.viewport.1;
        tree.scroll.1 = (rect.y + rect.height / 2.0 - viewport_height / 2.0).max(0.0);
        tree.last_scroll_into_view = Some((id, options));
        Ok(())
    }

    fn scroll_by(&self, dx: f64, dy: f64) {
        let mut tree = self.lock();
        tree.scroll.0 = (tree.scroll.0 + dx).max(0.0);
        tree.scroll.1 = (tree.scroll.1 + dy).max(0.0);
    }

    fn set_body_scale(&self, scale: f64) {
        self.lock().scale = scale;
    }

    fn click(&self, id: ElementId) -> Result<(), PageError> {
        let mut tree = self.lock();
        if !tree.nodes.contains_key(&id) {
            return Err(PageError::StaleElement(id));
        }
        tree.clicks.push(id);
        Ok(())
    }

    fn observe(&self, observer: Weak<dyn PageObserver>) {
        self.observers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(observer);
    }
}
