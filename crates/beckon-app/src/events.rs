use std::sync::Arc;

use beckon_core::dispatch::Dispatcher;
use beckon_core::focus::{FocusIndex, ScanScope};
use beckon_core::gesture::EmissionClock;
use beckon_core::page::Page;
use beckon_core::viewer::DocumentHost;
use beckon_core::voice::{TranscriptBuffer, VoiceClassifier, VoiceSession};
use beckon_types::AppEvent;
use kanal::{AsyncReceiver, AsyncSender};
use tokio_util::sync::CancellationToken;

use crate::host::LocalDocumentHost;
use crate::state::AppState;

pub mod gesture;
pub mod gesture_loop;
pub mod intent;
pub mod page;
pub mod render;
pub mod transcript;

use gesture::{handle_gesture_control, handle_gesture_detected, handle_gesture_status};
use page::{handle_remove_target, handle_resize, handle_user_tab};
use transcript::{handle_listening_changed, handle_transcript};

/// Everything the event loop owns.
///
/// The dispatcher lives here and nowhere else, so intents from every source are
/// executed one at a time in arrival order.
pub struct Engine {
    pub state: Arc<AppState>,
    pub event_tx: AsyncSender<AppEvent>,
    pub dispatcher: Dispatcher,
    pub voice: VoiceSession<TranscriptBuffer>,
    pub gesture_task: Option<CancellationToken>,
    /// Outlives each gesture loop so the cooldown holds across off and on
    pub gesture_clock: EmissionClock,
    pub cancel: CancellationToken,
}

impl Engine {
    pub fn new(
        state: Arc<AppState>,
        event_tx: AsyncSender<AppEvent>,
        cancel: CancellationToken,
    ) -> Self {
        let config = &state.config;

        let page: Arc<dyn Page> = state.page.clone();
        let scope = ScanScope::from_include_headings(config.focus.include_headings);
        let focus = FocusIndex::attach(Arc::clone(&page), scope);

        let host: Arc<dyn DocumentHost> = Arc::new(LocalDocumentHost::new(
            config.document.sample(),
            config.document.default_page_count,
        ));
        let dispatcher = Dispatcher::new(page, focus, host, config.dispatch.clone());

        let voice = VoiceSession::new(
            TranscriptBuffer::with_max_fragments(config.voice.max_fragments),
            VoiceClassifier::new(config.document.sample()),
            config.voice.require_listening,
        );

        Self {
            state,
            event_tx,
            dispatcher,
            voice,
            gesture_task: None,
            gesture_clock: EmissionClock::new(),
            cancel,
        }
    }

    /// Cancel the gesture loop if one is running
    pub fn stop_gestures(&mut self) -> bool {
        match self.gesture_task.take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}

/// App's main loop
pub async fn event_loop(
    state: Arc<AppState>,
    event_rx: AsyncReceiver<AppEvent>,
    event_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let mut engine = Engine::new(state, event_tx, cancel.clone());

    tracing::info!(
        "[EVENT_LOOP] Ready: {} focus targets",
        engine.dispatcher.focus().len()
    );

    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = event_rx.recv() => event?,
        };

        tracing::debug!("[EVENT_LOOP] Event: {:?}", event);
        if !handle_event(&mut engine, event).await? {
            break;
        }
    }

    engine.stop_gestures();
    tracing::info!("[EVENT_LOOP] Stopped");
    Ok(())
}

/// Returns `false` when the loop should stop
pub async fn handle_event(engine: &mut Engine, event: AppEvent) -> anyhow::Result<bool> {
    match event {
        AppEvent::TranscriptUpdate(text) => handle_transcript(engine, &text).await,
        AppEvent::ListeningChanged(listening) => handle_listening_changed(engine, listening).await,
        AppEvent::GestureControl { enabled } => handle_gesture_control(engine, enabled).await,
        AppEvent::GestureDetected(sample) => handle_gesture_detected(engine, sample).await,
        AppEvent::GestureStatusUpdate { status, sampling } => {
            handle_gesture_status(engine, status, sampling).await
        }
        AppEvent::UserTab { backwards } => handle_user_tab(engine, backwards),
        AppEvent::RemoveTarget(number) => handle_remove_target(engine, number),
        AppEvent::ViewportResized { width, height } => handle_resize(engine, width, height),
        AppEvent::ShowStatus => {
            let status = engine.state.status.snapshot().await;
            println!("{}", render::status_report(&status, &engine.dispatcher));
        }
        AppEvent::Shutdown => {
            tracing::info!("[EVENT_LOOP] Shutdown requested");
            return Ok(false);
        }
    }

    Ok(true)
}
