//! Command Dispatcher: turns intents from either modality into side effects.

use std::fmt;
use std::sync::Arc;

use beckon_config::dispatch::DispatchConfig;
use beckon_types::{NavigationAction, NavigationIntent, ScrollDirection, TargetKind, ZoomDirection};

use crate::feedback::CommandFeedback;
use crate::focus::FocusIndex;
use crate::page::Page;
use crate::viewer::{DocumentHost, DocumentViewer, ViewerSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Link number or page outside the valid range
    OutOfRange,
    /// Page navigation with no document loaded
    NoViewer,
    /// Activate with nothing focused
    NoFocusTarget,
    /// The host could not open the document
    DocumentUnavailable,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::OutOfRange => "out of range",
            SkipReason::NoViewer => "no document viewer",
            SkipReason::NoFocusTarget => "nothing focused",
            SkipReason::DocumentUnavailable => "document unavailable",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Executed,
    Skipped(SkipReason),
}

impl DispatchOutcome {
    pub fn is_executed(&self) -> bool {
        matches!(self, DispatchOutcome::Executed)
    }
}

/// One entry of the link number overlay
#[derive(Debug, Clone, PartialEq)]
pub struct LinkLabel {
    /// 1-based, as spoken in "open link N"
    pub number: usize,
    pub label: String,
    pub kind: TargetKind,
    pub focused: bool,
}

pub struct Dispatcher {
    page: Arc<dyn Page>,
    focus: Arc<FocusIndex>,
    host: Arc<dyn DocumentHost>,
    viewer: ViewerSlot,
    feedback: CommandFeedback,
    config: DispatchConfig,
    zoom: f64,
    link_overlay: bool,
}

impl Dispatcher {
    pub fn new(
        page: Arc<dyn Page>,
        focus: Arc<FocusIndex>,
        host: Arc<dyn DocumentHost>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            page,
            focus,
            host,
            viewer: ViewerSlot::new(),
            feedback: CommandFeedback::new(config.feedback_clear()),
            config,
            zoom: 1.0,
            link_overlay: false,
        }
    }

    pub fn focus(&self) -> &Arc<FocusIndex> {
        &self.focus
    }

    pub fn feedback(&self) -> &CommandFeedback {
        &self.feedback
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn link_overlay_visible(&self) -> bool {
        self.link_overlay
    }

    pub fn has_viewer(&self) -> bool {
        self.viewer.is_attached()
    }

    /// Current page and page count of the loaded document
    pub fn viewer_position(&self) -> Option<(u32, u32)> {
        self.viewer
            .get()
            .map(|v| (v.current_page(), v.page_count()))
    }

    /// Overlay labels for the numbered targets, 1-based
    pub fn link_labels(&self) -> Vec<LinkLabel> {
        let focused = self.focus.cursor().index();
        self.focus
            .numbered()
            .into_iter()
            .enumerate()
            .map(|(n, (i, target))| LinkLabel {
                number: n + 1,
                label: target.label,
                kind: target.kind,
                focused: focused == Some(i),
            })
            .collect()
    }

    /// Execute one intent. Failures are logged and reported as skipped, never raised.
    pub fn dispatch(&mut self, intent: NavigationIntent) -> DispatchOutcome {
        let NavigationIntent {
            action,
            text,
            source,
        } = intent;

        self.feedback.show(text.as_str());
        tracing::info!("[DISPATCH] {:?} '{}' -> {}", source, text, action.name());

        let outcome = self.execute(action);
        if let DispatchOutcome::Skipped(reason) = outcome {
            tracing::warn!("[DISPATCH] '{}' skipped: {}", text, reason);
        }
        outcome
    }

    fn execute(&mut self, action: NavigationAction) -> DispatchOutcome {
        match action {
            NavigationAction::Scroll { direction } => {
                let dy = match direction {
                    ScrollDirection::Up => -self.config.scroll_step,
                    ScrollDirection::Down => self.config.scroll_step,
                };
                self.page.scroll_by(0.0, dy);
                DispatchOutcome::Executed
            }

            NavigationAction::Zoom { direction } => {
                let factor = match direction {
                    ZoomDirection::In => self.config.zoom_in_factor,
                    ZoomDirection::Out => self.config.zoom_out_factor,
                };
                self.zoom = (self.zoom * factor).clamp(self.config.min_zoom, self.config.max_zoom);
                self.page.set_body_scale(self.zoom);
                tracing::debug!("[DISPATCH] Zoom {:.3}", self.zoom);
                DispatchOutcome::Executed
            }

            NavigationAction::OpenLink { index } => {
                let position = (index as usize)
                    .checked_sub(1)
                    .and_then(|n| self.focus.numbered().get(n).map(|(i, _)| *i));
                let Some(position) = position else {
                    return DispatchOutcome::Skipped(SkipReason::OutOfRange);
                };
                if self.focus.focus_by_index(position) {
                    DispatchOutcome::Executed
                } else {
                    DispatchOutcome::Skipped(SkipReason::OutOfRange)
                }
            }

            NavigationAction::ToggleLinks => {
                self.link_overlay = !self.link_overlay;
                tracing::debug!("[DISPATCH] Link overlay visible: {}", self.link_overlay);
                DispatchOutcome::Executed
            }

            NavigationAction::Activate => {
                let Some(target) = self.focus.current() else {
                    return DispatchOutcome::Skipped(SkipReason::NoFocusTarget);
                };
                match self.page.click(target.element) {
                    Ok(()) => DispatchOutcome::Executed,
                    Err(e) => {
                        tracing::debug!("[DISPATCH] Click failed: {}", e);
                        DispatchOutcome::Skipped(SkipReason::NoFocusTarget)
                    }
                }
            }

            NavigationAction::LoadDocument { source } => match self.host.load(&source) {
                Ok(viewer) => {
                    self.viewer.attach(&viewer);
                    tracing::info!(
                        "[DISPATCH] Loaded {} ({} pages)",
                        source,
                        viewer.page_count()
                    );
                    DispatchOutcome::Executed
                }
                Err(e) => {
                    tracing::debug!("[DISPATCH] Load failed: {}", e);
                    DispatchOutcome::Skipped(SkipReason::DocumentUnavailable)
                }
            },

            NavigationAction::CloseDocument => {
                self.viewer.detach();
                self.host.close();
                DispatchOutcome::Executed
            }

            NavigationAction::NextPage => self.with_viewer(|v| v.next_page()),
            NavigationAction::PrevPage => self.with_viewer(|v| v.prev_page()),
            NavigationAction::GoToPage { page } => self.with_viewer(|v| v.go_to_page(page)),
        }
    }

    fn with_viewer<F>(&self, step: F) -> DispatchOutcome
    where
        F: FnOnce(&dyn DocumentViewer) -> bool,
    {
        let Some(viewer) = self.viewer.get() else {
            return DispatchOutcome::Skipped(SkipReason::NoViewer);
        };
        if step(viewer.as_ref()) {
            DispatchOutcome::Executed
        } else {
            DispatchOutcome::Skipped(SkipReason::OutOfRange)
        }
    }
}
