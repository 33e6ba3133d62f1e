use beckon_core::dispatch::{Dispatcher, LinkLabel};
use beckon_types::TargetKind;

use crate::status::ControlStatus;

fn kind_tag(kind: TargetKind) -> &'static str {
    match kind {
        TargetKind::Link => "link",
        TargetKind::Button => "button",
        TargetKind::Input => "input",
        TargetKind::Heading => "heading",
    }
}

/// Numbered targets, the focused one marked with `*`
pub fn link_overlay(labels: &[LinkLabel]) -> String {
    if labels.is_empty() {
        return "  (no focusable targets)".to_string();
    }
    labels
        .iter()
        .map(|l| {
            let marker = if l.focused { '*' } else { ' ' };
            format!("{} [{:>2}] {:<7} {}", marker, l.number, kind_tag(l.kind), l.label)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn status_report(status: &ControlStatus, dispatcher: &Dispatcher) -> String {
    let mut report = serde_json::json!({
        "control": status,
        "zoom": dispatcher.zoom(),
        "link_overlay": dispatcher.link_overlay_visible(),
        "focus": dispatcher.focus().cursor().index().map(|i| i + 1),
        "targets": dispatcher.focus().len(),
        "feedback": dispatcher.feedback().current(),
    });
    if let Some((page, count)) = dispatcher.viewer_position() {
        report["document"] = serde_json::json!({ "page": page, "page_count": count });
    }

    serde_json::to_string_pretty(&report).unwrap_or_else(|e| format!("status unavailable: {}", e))
}
