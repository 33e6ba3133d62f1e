use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use beckon_types::{GestureLabel, GestureSample};

pub const OPEN_PALM_ABOVE: f64 = 150.0;
pub const OPEN_PALM_CONFIDENCE: f32 = 0.7;

pub const FIST_BELOW: f64 = 80.0;
pub const FIST_CONFIDENCE: f32 = 0.6;

/// Exclusive band
pub const THUMBS_UP_BAND: (f64, f64) = (100.0, 140.0);
pub const THUMBS_UP_CONFIDENCE: f32 = 0.5;

/// Results at or below this confidence are dropped
pub const MIN_CONFIDENCE: f32 = 0.4;

/// Time of the last emitted gesture.
///
/// Clones share one value, so a clock handed to every sampling run keeps the
/// cooldown across stop and start.
#[derive(Debug, Clone, Default)]
pub struct EmissionClock(Arc<Mutex<Option<Instant>>>);

impl EmissionClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<Instant> {
        *self.0.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn record(&self, now: Instant) {
        *self.0.lock().unwrap_or_else(|p| p.into_inner()) = Some(now);
    }
}

/// Brightness heuristic standing in for a real hand-pose model.
///
/// At most one gesture is emitted per `cooldown`; frames inside the cooldown
/// yield nothing whatever their brightness and do not extend it.
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    cooldown: Duration,
    clock: EmissionClock,
}

impl GestureClassifier {
    pub fn new(cooldown: Duration) -> Self {
        Self::with_clock(cooldown, EmissionClock::new())
    }

    pub fn with_clock(cooldown: Duration, clock: EmissionClock) -> Self {
        Self { cooldown, clock }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn last_emitted(&self) -> Option<Instant> {
        self.clock.last()
    }

    pub fn classify(&mut self, brightness: f64, now: Instant) -> Option<GestureSample> {
        if let Some(last) = self.clock.last()
            && now.saturating_duration_since(last) < self.cooldown
        {
            return None;
        }

        let (label, confidence) = label_for(brightness)?;
        if confidence <= MIN_CONFIDENCE {
            return None;
        }

        self.clock.record(now);
        tracing::info!(
            "[GESTURE] Detected {} (brightness {:.0}, confidence {:.2})",
            label,
            brightness,
            confidence
        );

        Some(GestureSample {
            label,
            confidence,
            timestamp: now,
        })
    }
}

fn label_for(brightness: f64) -> Option<(GestureLabel, f32)> {
    if brightness > OPEN_PALM_ABOVE {
        Some((GestureLabel::OpenPalm, OPEN_PALM_CONFIDENCE))
    } else if brightness < FIST_BELOW {
        Some((GestureLabel::Fist, FIST_CONFIDENCE))
    } else if brightness > THUMBS_UP_BAND.0 && brightness < THUMBS_UP_BAND.1 {
        Some((GestureLabel::ThumbsUp, THUMBS_UP_CONFIDENCE))
    } else {
        None
    }
}
