use super::Engine;

/// Keyboard navigation by the user, observed by the focus index like any other focus change
pub fn handle_user_tab(engine: &mut Engine, backwards: bool) {
    match engine.state.page.tab(backwards) {
        Some(element) => tracing::debug!("[PAGE] Tabbed to {:?}", element),
        None => tracing::debug!("[PAGE] Nothing to tab to"),
    }
}

/// Remove the n-th (1-based) focus target from the document
pub fn handle_remove_target(engine: &mut Engine, number: usize) {
    let target = number
        .checked_sub(1)
        .and_then(|i| engine.dispatcher.focus().targets().into_iter().nth(i));

    let Some(target) = target else {
        tracing::warn!("[PAGE] No target {} to remove", number);
        return;
    };

    engine.state.page.remove(target.element);
    tracing::info!("[PAGE] Removed target {} '{}'", number, target.label);
}

pub fn handle_resize(engine: &mut Engine, width: f64, height: f64) {
    engine.state.page.resize(width, height);
    tracing::debug!(
        "[PAGE] Viewport {}x{}, {} targets",
        width,
        height,
        engine.dispatcher.focus().len()
    );
}
