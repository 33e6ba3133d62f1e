use beckon_core::voice::SpeechInput;

use super::Engine;
use super::intent::dispatch_intent;

pub async fn handle_transcript(engine: &mut Engine, text: &str) {
    let input = engine.voice.input();
    if engine.state.config.voice.require_listening && !input.is_listening() {
        tracing::debug!("[VOICE] Not listening, transcript ignored");
        return;
    }
    input.push(text);

    match engine.voice.poll() {
        Some(intent) => {
            dispatch_intent(engine, intent).await;
        }
        None => {
            tracing::info!(
                "[VOICE] No command recognized in '{}'",
                engine.voice.input().transcript()
            );
            engine.state.status.control.write().await.misses = engine.voice.misses();
        }
    }
}

pub async fn handle_listening_changed(engine: &mut Engine, listening: bool) {
    let input = engine.voice.input();
    if listening {
        input.start_listening();
    } else {
        input.stop_listening();
        input.reset_transcript();
    }

    let mut control = engine.state.status.control.write().await;
    control.listening = listening;
    control.voice_active = listening;
    control.message = if listening { "Listening" } else { "Voice paused" }.to_string();
    tracing::info!("[VOICE] Listening: {}", listening);
}
