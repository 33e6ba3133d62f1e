use std::time::Duration;

use beckon_capture::{DirectoryCamera, SolidCamera};
use beckon_config::gesture::GestureConfig;
use beckon_core::gesture::EmissionClock;
use beckon_types::{AppEvent, GestureLabel};
use kanal::AsyncReceiver;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::events::gesture_loop::gesture_loop;

fn config() -> GestureConfig {
    GestureConfig {
        start_delay_ms: 0,
        frame_interval_ms: 10,
        ..GestureConfig::default()
    }
}

async fn next_event(rx: &AsyncReceiver<AppEvent>) -> AppEvent {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("no event in time")
        .unwrap()
}

#[tokio::test]
async fn bright_camera_reports_open_palm_until_cancelled() {
    let (tx, rx) = kanal::bounded_async(16);
    let cancel = CancellationToken::new();
    let task = tokio::spawn(gesture_loop(
        config(),
        Box::new(SolidCamera::new(200)),
        EmissionClock::new(),
        cancel.clone(),
        tx,
    ));

    match next_event(&rx).await {
        AppEvent::GestureStatusUpdate { sampling, .. } => assert!(sampling),
        other => panic!("unexpected {other:?}"),
    }
    match next_event(&rx).await {
        AppEvent::GestureDetected(sample) => assert_eq!(sample.label, GestureLabel::OpenPalm),
        other => panic!("unexpected {other:?}"),
    }

    cancel.cancel();
    task.await.unwrap().unwrap();

    match next_event(&rx).await {
        AppEvent::GestureStatusUpdate { status, sampling } => {
            assert!(!sampling);
            assert_eq!(status, "Gesture control stopped");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn missing_camera_reports_idle_and_cancels_token() {
    let (tx, rx) = kanal::bounded_async(16);
    let cancel = CancellationToken::new();
    let camera = DirectoryCamera::new(std::env::temp_dir().join("beckon-no-such-frames"));

    gesture_loop(config(), Box::new(camera), EmissionClock::new(), cancel.clone(), tx)
        .await
        .unwrap();

    assert!(cancel.is_cancelled());
    match next_event(&rx).await {
        AppEvent::GestureStatusUpdate { status, sampling } => {
            assert!(!sampling);
            assert!(status.starts_with("Camera unavailable"), "{status}");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(rx.is_empty());
}

#[tokio::test]
async fn cancel_during_warm_up_never_opens_camera() {
    let (tx, rx) = kanal::bounded_async(16);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let slow = GestureConfig {
        start_delay_ms: 60_000,
        ..GestureConfig::default()
    };
    gesture_loop(slow, Box::new(SolidCamera::new(200)), EmissionClock::new(), cancel, tx)
        .await
        .unwrap();

    match next_event(&rx).await {
        AppEvent::GestureStatusUpdate { sampling, .. } => assert!(!sampling),
        other => panic!("unexpected {other:?}"),
    }
    assert!(rx.is_empty());
}

#[tokio::test]
async fn restarted_loop_keeps_cooldown() {
    let clock = EmissionClock::new();

    let (tx, rx) = kanal::bounded_async(16);
    let cancel = CancellationToken::new();
    let first = tokio::spawn(gesture_loop(
        config(),
        Box::new(SolidCamera::new(200)),
        clock.clone(),
        cancel.clone(),
        tx,
    ));
    next_event(&rx).await;
    assert!(matches!(next_event(&rx).await, AppEvent::GestureDetected(_)));
    cancel.cancel();
    first.await.unwrap().unwrap();
    let emitted_at = clock.last().unwrap();

    let (tx, rx) = kanal::bounded_async(16);
    let cancel = CancellationToken::new();
    let second = tokio::spawn(gesture_loop(
        config(),
        Box::new(SolidCamera::new(200)),
        clock.clone(),
        cancel.clone(),
        tx,
    ));
    match next_event(&rx).await {
        AppEvent::GestureStatusUpdate { sampling, .. } => assert!(sampling),
        other => panic!("unexpected {other:?}"),
    }

    // well inside the 2000ms cooldown: frames are sampled but nothing is emitted
    assert!(timeout(Duration::from_millis(300), rx.recv()).await.is_err());
    assert_eq!(clock.last(), Some(emitted_at));

    cancel.cancel();
    second.await.unwrap().unwrap();
}
