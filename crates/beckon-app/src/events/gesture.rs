use beckon_core::gesture::{SamplerState, intent_for_gesture};
use beckon_types::GestureSample;

use super::Engine;
use super::gesture_loop::gesture_loop;
use super::intent::dispatch_intent;

pub async fn handle_gesture_control(engine: &mut Engine, enabled: bool) {
    if !enabled {
        if engine.stop_gestures() {
            tracing::info!("[GESTURE] Stopping gesture control");
        } else {
            tracing::debug!("[GESTURE] Gesture control already off");
        }
        return;
    }

    if engine.gesture_task.is_some() {
        tracing::debug!("[GESTURE] Gesture control already on");
        return;
    }

    let token = engine.cancel.child_token();
    let config = engine.state.config.gesture.clone();
    let camera = engine.state.camera.camera();
    let clock = engine.gesture_clock.clone();
    let event_tx = engine.event_tx.clone();

    tokio::spawn({
        let token = token.clone();
        async move {
            if let Err(e) = gesture_loop(config, camera, clock, token, event_tx).await {
                tracing::error!("[GESTURE] gesture loop exited: {e}");
            }
        }
    });
    engine.gesture_task = Some(token);

    engine.state.status.set_message("Starting camera").await;
}

pub async fn handle_gesture_status(engine: &mut Engine, status: String, sampling: bool) {
    tracing::info!("[GESTURE] status: {} (sampling: {})", status, sampling);

    let mut control = engine.state.status.control.write().await;
    control.gesture = if sampling {
        SamplerState::Sampling
    } else {
        SamplerState::Idle
    };
    if !sampling {
        control.last_gesture = None;
    }
    control.message = status;
    drop(control);

    // the loop ended on its own, e.g. camera refused
    if !sampling
        && let Some(token) = &engine.gesture_task
        && token.is_cancelled()
    {
        engine.gesture_task = None;
    }
}

pub async fn handle_gesture_detected(engine: &mut Engine, sample: GestureSample) {
    if engine.gesture_task.is_none() {
        tracing::debug!("[GESTURE] Late {} after gesture control stopped", sample.label);
        return;
    }

    engine.state.status.control.write().await.last_gesture = Some(sample.label);

    let has_focus_target = engine.dispatcher.focus().current().is_some();
    match intent_for_gesture(sample.label, has_focus_target) {
        Some(intent) => {
            dispatch_intent(engine, intent).await;
        }
        None => tracing::debug!("[GESTURE] {} has no action", sample.label),
    }
}
