use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;

#[derive(Debug, Default)]
struct Slot {
    /// Bumped by every `show`; a timer clears only the message it was armed for
    generation: u64,
    text: Option<String>,
}

/// "Last executed command" display value that clears itself.
///
/// Each `show` replaces the pending clear timer, so only one is ever armed.
pub struct CommandFeedback {
    slot: Arc<Mutex<Slot>>,
    clear_after: Duration,
    pending: Mutex<Option<AbortHandle>>,
}

fn lock_slot(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(|p| p.into_inner())
}

/// Clear the message if it is still the one `generation` was shown with
fn clear_if_current(slot: &Mutex<Slot>, generation: u64) -> bool {
    let mut slot = lock_slot(slot);
    if slot.generation != generation {
        return false;
    }
    slot.text = None;
    true
}

impl CommandFeedback {
    pub fn new(clear_after: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            clear_after,
            pending: Mutex::new(None),
        }
    }

    pub fn show(&self, text: impl Into<String>) {
        let mut pending = self.pending.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        let generation = {
            let mut slot = lock_slot(&self.slot);
            slot.generation += 1;
            slot.text = Some(text.into());
            slot.generation
        };

        let Ok(handle) = Handle::try_current() else {
            tracing::debug!("[FEEDBACK] No runtime, message will not auto-clear");
            return;
        };

        let slot = Arc::clone(&self.slot);
        let delay = self.clear_after;
        let task = handle.spawn(async move {
            tokio::time::sleep(delay).await;
            clear_if_current(&slot, generation);
        });
        *pending = Some(task.abort_handle());
    }

    pub fn current(&self) -> Option<String> {
        lock_slot(&self.slot).text.clone()
    }

    /// Whether a clear timer is armed
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl Drop for CommandFeedback {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.get_mut().ok().and_then(Option::take) {
            pending.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::sleep;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn clears_after_delay() {
        let feedback = CommandFeedback::new(Duration::from_millis(2000));
        feedback.show("scroll down");
        assert_eq!(feedback.current().as_deref(), Some("scroll down"));
        assert!(feedback.is_pending());

        sleep(Duration::from_millis(1999)).await;
        assert_eq!(feedback.current().as_deref(), Some("scroll down"));

        sleep(Duration::from_millis(2)).await;
        assert_eq!(feedback.current(), None);
        assert!(!feedback.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn new_message_restarts_timer() {
        let feedback = CommandFeedback::new(Duration::from_millis(2000));
        feedback.show("zoom in");

        sleep(Duration::from_millis(1500)).await;
        feedback.show("zoom out");

        // the first timer would have fired at 2000ms
        sleep(Duration::from_millis(1000)).await;
        assert_eq!(feedback.current().as_deref(), Some("zoom out"));

        sleep(Duration::from_millis(1001)).await;
        assert_eq!(feedback.current(), None);
    }

    #[test]
    fn without_runtime_message_stays() {
        let feedback = CommandFeedback::new(Duration::from_millis(10));
        feedback.show("activate");
        assert!(!feedback.is_pending());
        assert_eq!(feedback.current().as_deref(), Some("activate"));
    }

    #[test]
    fn stale_timer_leaves_newer_message() {
        let feedback = CommandFeedback::new(Duration::from_millis(10));
        feedback.show("zoom in");
        let armed_for = lock_slot(&feedback.slot).generation;
        feedback.show("zoom out");

        // the first timer fires after the second message was written
        assert!(!clear_if_current(&feedback.slot, armed_for));
        assert_eq!(feedback.current().as_deref(), Some("zoom out"));

        assert!(clear_if_current(&feedback.slot, armed_for + 1));
        assert_eq!(feedback.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_due_at_show_does_not_clear_new_message() {
        let feedback = CommandFeedback::new(Duration::from_millis(2000));
        feedback.show("scroll up");

        // wake the first timer without letting it run, then replace the message
        tokio::time::advance(Duration::from_millis(2000)).await;
        feedback.show("scroll down");
        tokio::task::yield_now().await;

        assert_eq!(feedback.current().as_deref(), Some("scroll down"));
        sleep(Duration::from_millis(2001)).await;
        assert_eq!(feedback.current(), None);
    }
}
