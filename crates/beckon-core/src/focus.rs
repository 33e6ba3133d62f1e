//! Focus Index Model.
//!
//! An ordered list of focusable targets scanned from the page, plus a cursor
//! into it. The list is replaced wholesale on every scan and rescanned when the
//! page reports structural changes. All reads and writes of the list and cursor
//! go through [`FocusIndex`].

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use beckon_types::TargetKind;

use crate::page::{ElementId, ElementSnapshot, Page, PageEvent, PageObserver, ScrollIntoView};

/// Attribute changes that can alter which elements are focusable
const WATCHED_ATTRIBUTES: [&str; 4] = ["style", "class", "hidden", "aria-hidden"];

#[derive(Debug, Clone, PartialEq)]
pub struct FocusTarget {
    pub element: ElementId,
    /// Position in the scan that produced this target
    pub order: usize,
    pub kind: TargetKind,
    pub label: String,
    pub href: Option<String>,
}

/// Index into the current target list, or nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusCursor(Option<usize>);

impl FocusCursor {
    pub const NONE: FocusCursor = FocusCursor(None);

    pub fn at(index: usize) -> Self {
        Self(Some(index))
    }

    pub fn index(&self) -> Option<usize> {
        self.0
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }
}

/// Which elements a scan collects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanScope {
    /// Links, enabled form controls, tabindex >= 0, contenteditable
    Interactive,
    /// Interactive elements plus headings
    PageWide,
}

impl ScanScope {
    pub fn from_include_headings(include_headings: bool) -> Self {
        if include_headings {
            ScanScope::PageWide
        } else {
            ScanScope::Interactive
        }
    }
}

fn is_heading(tag: &str) -> bool {
    matches!(tag, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

fn is_candidate(snapshot: &ElementSnapshot, scope: ScanScope) -> bool {
    let tag = snapshot.tag.as_str();
    let enabled = !snapshot.has_attr("disabled");

    let matches = match tag {
        "a" => snapshot.has_attr("href"),
        "button" | "input" | "textarea" | "select" => enabled,
        _ => false,
    };

    matches
        || snapshot
            .attr("tabindex")
            .and_then(|v| v.trim().parse::<i32>().ok())
            .is_some_and(|v| v >= 0)
        || snapshot.attr("contenteditable") == Some("true")
        || (scope == ScanScope::PageWide && is_heading(tag))
}

fn kind_of(snapshot: &ElementSnapshot) -> TargetKind {
    match snapshot.tag.as_str() {
        "a" => TargetKind::Link,
        "button" => TargetKind::Button,
        "input" | "textarea" | "select" => TargetKind::Input,
        tag if is_heading(tag) => TargetKind::Heading,
        _ => TargetKind::Link,
    }
}

fn label_of(snapshot: &ElementSnapshot) -> String {
    let text = snapshot.text.trim();
    if !text.is_empty() {
        return text.to_string();
    }
    snapshot.attr("aria-label").unwrap_or_default().trim().to_string()
}

/// Collect focus targets in document order.
///
/// Elements without a layout box or hidden by computed style are skipped.
pub fn scan(page: &dyn Page, scope: ScanScope) -> Vec<FocusTarget> {
    let mut targets = Vec::new();

    for element in page.elements() {
        let Some(snapshot) = page.snapshot(element) else {
            continue;
        };
        if !is_candidate(&snapshot, scope) {
            continue;
        }
        if page.layout_box(element).is_none() {
            continue;
        }
        if page.computed_style(element).is_none_or(|style| style.is_hidden()) {
            continue;
        }

        targets.push(FocusTarget {
            element,
            order: targets.len(),
            kind: kind_of(&snapshot),
            label: label_of(&snapshot),
            href: if snapshot.tag == "a" {
                snapshot.attr("href").map(str::to_string)
            } else {
                None
            },
        });
    }

    targets
}

#[derive(Debug, Default)]
struct FocusState {
    targets: Vec<FocusTarget>,
    cursor: FocusCursor,
    scans: u64,
}

pub struct FocusIndex {
    page: Arc<dyn Page>,
    scope: ScanScope,
    state: Mutex<FocusState>,
}

impl FocusIndex {
    /// Scan the page and subscribe to its change notifications
    pub fn attach(page: Arc<dyn Page>, scope: ScanScope) -> Arc<Self> {
        let index = Arc::new(Self {
            page: Arc::clone(&page),
            scope,
            state: Mutex::new(FocusState::default()),
        });
        index.rescan();

        let observer = Arc::downgrade(&index);
        let observer: Weak<dyn PageObserver> = observer;
        page.observe(observer);

        index
    }

    fn lock(&self) -> MutexGuard<'_, FocusState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }


    /// Replace the target list with a fresh scan and re-resolve the cursor
    /// against the element that currently holds focus.
    pub fn rescan(&self) {
        let targets = scan(self.page.as_ref(), self.scope);
        let focused = self.page.focused();

        let mut state = self.lock();
        state.cursor = FocusCursor(focused.and_then(|f| targets.iter().position(|t| t.element == f)));
        state.targets = targets;
        state.scans += 1;

        tracing::debug!(
            "[FOCUS] Scan #{}: {} targets, cursor {:?}",
            state.scans,
            state.targets.len(),
            state.cursor.index()
        );
    }

    pub fn targets(&self) -> Vec<FocusTarget> {
        self.lock().targets.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().targets.is_empty()
    }

    /// Targets that take a link number, each with its position in `targets()`.
    ///
    /// Headings stay reachable through `focus_next`/`focus_previous` but are
    /// never numbered.
    pub fn numbered(&self) -> Vec<(usize, FocusTarget)> {
        self.lock()
            .targets
            .iter()
            .enumerate()
            .filter(|(_, t)| t.kind != TargetKind::Heading)
            .map(|(i, t)| (i, t.clone()))
            .collect()
    }

    pub fn cursor(&self) -> FocusCursor {
        self.lock().cursor
    }

    /// Target under the cursor
    pub fn current(&self) -> Option<FocusTarget> {
        let state = self.lock();
        state.cursor.index().and_then(|i| state.targets.get(i).cloned())
    }

    pub fn scan_count(&self) -> u64 {
        self.lock().scans
    }

    /// Focus the target at `index` and scroll it to the viewport center.
    ///
    /// Out-of-range indices leave everything untouched. Returns whether focus moved.
    pub fn focus_by_index(&self, index: usize) -> bool {
        let Some(target) = self.lock().targets.get(index).cloned() else {
            tracing::debug!("[FOCUS] Index {} out of range, ignoring", index);
            return false;
        };

        // The page notifies us of the focus change, so no lock may be held here
        if let Err(e) = self.page.focus(target.element) {
            tracing::warn!("[FOCUS] Failed to focus target {}: {}", index, e);
            return false;
        }

        self.lock().cursor = FocusCursor::at(index);

        if let Err(e) = self
            .page
            .scroll_into_view(target.element, ScrollIntoView::centered())
        {
            tracing::warn!("[FOCUS] Failed to scroll target {} into view: {}", index, e);
        }

        tracing::debug!("[FOCUS] Focused {} ({:?} '{}')", index, target.kind, target.label);
        true
    }

    /// Move to the next target, wrapping from the last to the first
    pub fn focus_next(&self) -> bool {
        let next = {
            let state = self.lock();
            let len = state.targets.len();
            if len == 0 {
                return false;
            }
            match state.cursor.index() {
                Some(i) if i + 1 < len => i + 1,
                _ => 0,
            }
        };
        self.focus_by_index(next)
    }

    /// Move to the previous target, wrapping from the first to the last
    pub fn focus_previous(&self) -> bool {
        let prev = {
            let state = self.lock();
            let len = state.targets.len();
            if len == 0 {
                return false;
            }
            match state.cursor.index() {
                Some(i) if i > 0 => i - 1,
                _ => len - 1,
            }
        };
        self.focus_by_index(prev)
    }

    /// Reflect a focus change made outside the engine (user tabbing, clicks)
    pub fn sync_focus(&self, element: ElementId) {
        let mut state = self.lock();
        state.cursor = FocusCursor(state.targets.iter().position(|t| t.element == element));
        tracing::debug!("[FOCUS] Observed focus, cursor {:?}", state.cursor.index());
    }
}

impl PageObserver for FocusIndex {
    fn on_page_event(&self, event: &PageEvent) {
        match event {
            PageEvent::ChildList | PageEvent::Resize => self.rescan(),
            PageEvent::Attribute { name } if WATCHED_ATTRIBUTES.contains(&name.as_str()) => {
                self.rescan()
            }
            PageEvent::Attribute { .. } => {}
            PageEvent::FocusIn(element) => self.sync_focus(*element),
        }
    }
}
