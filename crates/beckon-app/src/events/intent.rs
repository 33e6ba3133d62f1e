use beckon_core::dispatch::DispatchOutcome;
use beckon_types::{NavigationAction, NavigationIntent};

use super::Engine;
use super::render::link_overlay;

/// Hand one intent to the dispatcher and surface the result
pub async fn dispatch_intent(engine: &mut Engine, intent: NavigationIntent) -> DispatchOutcome {
    let shows_overlay = matches!(
        intent.action,
        NavigationAction::ToggleLinks | NavigationAction::OpenLink { .. }
    );
    let text = intent.text.clone();

    let outcome = engine.dispatcher.dispatch(intent);

    {
        let mut control = engine.state.status.control.write().await;
        match outcome {
            DispatchOutcome::Executed => {
                control.dispatched += 1;
                control.message = text.clone();
            }
            DispatchOutcome::Skipped(reason) => {
                control.message = format!("{} ({})", text, reason);
            }
        }
    }

    match outcome {
        DispatchOutcome::Executed => println!("> {}", text),
        DispatchOutcome::Skipped(reason) => println!("> {} [{}]", text, reason),
    }
    if shows_overlay && engine.dispatcher.link_overlay_visible() {
        println!("{}", link_overlay(&engine.dispatcher.link_labels()));
    }

    outcome
}
