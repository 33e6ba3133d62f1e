use beckon_config::gesture::GestureConfig;
use beckon_core::error::CameraError;
use beckon_core::gesture::{Camera, EmissionClock, GestureSampler};
use beckon_types::AppEvent;
use kanal::AsyncSender;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Camera warm-up, then one frame per tick until cancelled.
///
/// `clock` carries the last emission over from earlier runs.
///
/// Frames are read and classified on the blocking pool; the sampler is moved
/// in and handed back each tick, so frames never overlap. The camera is
/// released on every exit path and `cancel` is cancelled before the final
/// status is reported.
pub async fn gesture_loop(
    config: GestureConfig,
    camera: Box<dyn Camera>,
    clock: EmissionClock,
    cancel: CancellationToken,
    event_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let result = run_sampler(&config, camera, clock, &cancel, &event_tx).await;
    cancel.cancel();

    let status = match &result {
        Ok(Some(message)) => message.clone(),
        Ok(None) => "Gesture control stopped".to_string(),
        Err(e) => format!("Gesture control failed: {e}"),
    };
    report(&event_tx, status, false);

    result.map(|_| ())
}

/// `Ok(Some(message))` when sampling ended for a reason the user should see
async fn run_sampler(
    config: &GestureConfig,
    camera: Box<dyn Camera>,
    clock: EmissionClock,
    cancel: &CancellationToken,
    event_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<Option<String>> {
    tokio::select! {
        _ = cancel.cancelled() => return Ok(None),
        _ = tokio::time::sleep(config.start_delay()) => {}
    }

    let mut sampler = GestureSampler::with_clock(config, clock);
    let (returned, started) = tokio::task::spawn_blocking(move || {
        let started = sampler.start(camera);
        (sampler, started)
    })
    .await?;
    sampler = returned;

    if let Err(e) = started {
        return Ok(Some(format!("Camera unavailable: {e}")));
    }
    report(event_tx, "Gesture control active".to_string(), true);

    let mut ticker = tokio::time::interval(config.frame_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut frames: u64 = 0;
    let mut frame_errors: u64 = 0;

    let outcome = loop {
        tokio::select! {
            _ = cancel.cancelled() => break None,
            _ = ticker.tick() => {
                let now = Instant::now().into_std();
                let (returned, result) = tokio::task::spawn_blocking(move || {
                    let result = sampler.tick(now);
                    (sampler, result)
                })
                .await?;
                sampler = returned;
                frames += 1;

                match result {
                    Ok(Some(sample)) => {
                        if !event_tx.try_send(AppEvent::GestureDetected(sample))? {
                            tracing::debug!("[GESTURE] Event queue full, dropped {}", sample.label);
                        }
                    }
                    Ok(None) => {}
                    Err(CameraError::Closed) => break Some("Camera stream ended".to_string()),
                    Err(e) => {
                        frame_errors += 1;
                        tracing::warn!("[GESTURE] Frame failed: {}", e);
                    }
                }
            }
        }
    };

    sampler.stop();
    tracing::info!(
        "[GESTURE] Sampled {} frames ({} failed)",
        frames,
        frame_errors
    );
    Ok(outcome)
}

fn report(event_tx: &AsyncSender<AppEvent>, status: String, sampling: bool) {
    match event_tx.try_send(AppEvent::GestureStatusUpdate { status, sampling }) {
        Ok(true) => {}
        Ok(false) => tracing::debug!("[GESTURE] Event queue full, status dropped"),
        Err(e) => tracing::debug!("[GESTURE] Status not delivered: {}", e),
    }
}
