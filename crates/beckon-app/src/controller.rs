use std::sync::Arc;

use beckon_types::AppEvent;
use kanal::{AsyncReceiver, AsyncSender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::events::event_loop;
use crate::io::watcher_io;
use crate::state::AppState;

/// Centralized channel management
pub struct ChannelSet {
    /// Everything the event loop consumes: transcripts, gestures, host controls
    pub events: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
}

impl ChannelSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: kanal::bounded_async(capacity.max(1)),
        }
    }

    pub fn sender(&self) -> AsyncSender<AppEvent> {
        self.events.0.clone()
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    state: Arc<AppState>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            channels: ChannelSet::new(state.config.event_capacity),
            state,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn sender(&self) -> AsyncSender<AppEvent> {
        self.channels.sender()
    }

    pub fn spawn_tasks(&self) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        // Event loop
        tasks.spawn(event_loop(
            self.state.clone(),
            self.channels.events.1.clone(),
            self.channels.events.0.clone(),
            self.cancel_token.child_token(),
        ));

        // Watcher IO
        tasks.spawn(watcher_io(
            self.cancel_token.child_token(),
            self.channels.events.0.clone(),
        ));

        tasks
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
