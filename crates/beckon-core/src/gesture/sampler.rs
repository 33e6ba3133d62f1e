use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use beckon_config::gesture::GestureConfig;
use beckon_types::GestureSample;
use image::RgbaImage;
use serde::Serialize;

use super::camera::{Camera, CameraStream};
use super::classifier::{EmissionClock, GestureClassifier};
use super::frame::mean_luminance;
use crate::error::CameraError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplerState {
    #[default]
    Idle,
    Sampling,
}

/// In-flight flag: at most one frame is processed at a time
#[derive(Debug, Clone, Default)]
pub struct FrameGate(Arc<AtomicBool>);

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` while another frame holds the gate
    pub fn try_enter(&self) -> Option<FrameGuard> {
        if self.0.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(FrameGuard(Arc::clone(&self.0)))
    }

    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Holds the gate; releases it when dropped, including on early return or panic
#[derive(Debug)]
pub struct FrameGuard(Arc<AtomicBool>);

impl Drop for FrameGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Gesture capture state machine.
///
/// `start` acquires the camera and enters `Sampling`; `tick` is called once per
/// scheduled frame; `stop` releases the camera and returns to `Idle`.
pub struct GestureSampler {
    state: SamplerState,
    classifier: GestureClassifier,
    stream: Option<CameraStream>,
    gate: FrameGate,
    current: Option<GestureSample>,
    width: u32,
    height: u32,
}

impl GestureSampler {
    pub fn new(config: &GestureConfig) -> Self {
        Self::with_clock(config, EmissionClock::new())
    }

    /// Sampler whose cooldown continues from `clock`
    pub fn with_clock(config: &GestureConfig, clock: EmissionClock) -> Self {
        Self {
            state: SamplerState::Idle,
            classifier: GestureClassifier::with_clock(config.cooldown(), clock),
            stream: None,
            gate: FrameGate::new(),
            current: None,
            width: config.frame_width,
            height: config.frame_height,
        }
    }

    pub fn state(&self) -> SamplerState {
        self.state
    }

    /// Most recent gesture since sampling started
    pub fn current(&self) -> Option<GestureSample> {
        self.current
    }

    pub fn gate(&self) -> FrameGate {
        self.gate.clone()
    }

    /// Open the camera and begin sampling. On failure the sampler stays `Idle`.
    pub fn start(&mut self, camera: Box<dyn Camera>) -> Result<(), CameraError> {
        if self.state == SamplerState::Sampling {
            tracing::debug!("[GESTURE] Already sampling");
            return Ok(());
        }

        let stream = CameraStream::open(camera, self.width, self.height).inspect_err(|e| {
            tracing::warn!("[GESTURE] Camera unavailable, staying idle: {}", e);
        })?;

        self.stream = Some(stream);
        self.state = SamplerState::Sampling;
        tracing::info!("[GESTURE] Sampling started");
        Ok(())
    }

    /// Stop sampling and release the camera. Safe to call when idle.
    pub fn stop(&mut self) {
        let was_sampling = self.state == SamplerState::Sampling;

        self.stream = None;
        self.state = SamplerState::Idle;
        self.current = None;

        if was_sampling {
            tracing::info!("[GESTURE] Sampling stopped");
        }
    }

    /// Read and classify one camera frame
    pub fn tick(&mut self, now: Instant) -> Result<Option<GestureSample>, CameraError> {
        if self.state != SamplerState::Sampling {
            return Ok(None);
        }
        let Some(_guard) = self.gate.try_enter() else {
            tracing::trace!("[GESTURE] Previous frame still in flight, skipping");
            return Ok(None);
        };

        let Some(stream) = self.stream.as_mut() else {
            return Ok(None);
        };
        let Some(frame) = stream.frame()? else {
            return Ok(None);
        };

        Ok(self.classify_frame(&frame, now))
    }

    /// Classify a frame supplied by the caller instead of the camera
    pub fn tick_frame(&mut self, frame: &RgbaImage, now: Instant) -> Option<GestureSample> {
        if self.state != SamplerState::Sampling {
            return None;
        }
        let _guard = self.gate.try_enter()?;
        self.classify_frame(frame, now)
    }

    fn classify_frame(&mut self, frame: &RgbaImage, now: Instant) -> Option<GestureSample> {
        let brightness = mean_luminance(frame)?;
        tracing::trace!("[GESTURE] Frame brightness {:.1}", brightness);

        let sample = self.classifier.classify(brightness, now)?;
        self.current = Some(sample);
        Some(sample)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use beckon_types::GestureLabel;
    use image::Rgba;

    use super::*;

    #[derive(Default)]
    struct Log {
        opened: bool,
        closed: u32,
    }

    /// Camera returning uniform frames, optionally failing
    struct FakeCamera {
        log: Arc<Mutex<Log>>,
        brightness: u8,
        deny: bool,
        fail_frames: bool,
    }

    impl FakeCamera {
        fn boxed(log: &Arc<Mutex<Log>>, brightness: u8) -> Box<dyn Camera> {
            Box::new(Self {
                log: Arc::clone(log),
                brightness,
                deny: false,
                fail_frames: false,
            })
        }
    }

    impl Camera for FakeCamera {
        fn open(&mut self, _width: u32, _height: u32) -> Result<(), CameraError> {
            if self.deny {
                return Err(CameraError::PermissionDenied);
            }
            self.log.lock().unwrap().opened = true;
            Ok(())
        }

        fn frame(&mut self) -> Result<Option<RgbaImage>, CameraError> {
            if self.fail_frames {
                return Err(CameraError::Decode("corrupt".into()));
            }
            let b = self.brightness;
            Ok(Some(RgbaImage::from_pixel(4, 3, Rgba([b, b, b, 255]))))
        }

        fn close(&mut self) {
            self.log.lock().unwrap().closed += 1;
        }
    }

    fn sampler() -> GestureSampler {
        GestureSampler::new(&GestureConfig::default())
    }

    #[test]
    fn idle_sampler_ignores_ticks() {
        let mut s = sampler();
        assert_eq!(s.tick(Instant::now()).unwrap(), None);
        let frame = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255]));
        assert_eq!(s.tick_frame(&frame, Instant::now()), None);
    }

    #[test]
    fn start_tick_stop_lifecycle() {
        let log = Arc::new(Mutex::new(Log::default()));
        let mut s = sampler();

        s.start(FakeCamera::boxed(&log, 200)).unwrap();
        assert_eq!(s.state(), SamplerState::Sampling);
        assert!(log.lock().unwrap().opened);

        let sample = s.tick(Instant::now()).unwrap().unwrap();
        assert_eq!(sample.label, GestureLabel::OpenPalm);
        assert_eq!(s.current().map(|c| c.label), Some(GestureLabel::OpenPalm));

        s.stop();
        assert_eq!(s.state(), SamplerState::Idle);
        assert!(s.current().is_none());
        assert_eq!(log.lock().unwrap().closed, 1);

        // stopping again is harmless and does not close twice
        s.stop();
        assert_eq!(log.lock().unwrap().closed, 1);
    }

    #[test]
    fn denied_camera_keeps_sampler_idle() {
        let log = Arc::new(Mutex::new(Log::default()));
        let camera = Box::new(FakeCamera {
            log: Arc::clone(&log),
            brightness: 0,
            deny: true,
            fail_frames: false,
        });

        let mut s = sampler();
        let err = s.start(camera).unwrap_err();
        assert!(matches!(err, CameraError::PermissionDenied));
        assert_eq!(s.state(), SamplerState::Idle);
        assert_eq!(log.lock().unwrap().closed, 0);
    }

    #[test]
    fn bright_frames_inside_cooldown_emit_once() {
        let log = Arc::new(Mutex::new(Log::default()));
        let mut s = sampler();
        s.start(FakeCamera::boxed(&log, 200)).unwrap();

        let start = Instant::now();
        let emitted = (0..10)
            .filter_map(|i| s.tick(start + Duration::from_millis(i * 100)).unwrap())
            .count();
        assert_eq!(emitted, 1);
    }

    #[test]
    fn held_gate_skips_frame() {
        let mut s = sampler();
        s.start(FakeCamera::boxed(&Arc::new(Mutex::new(Log::default())), 200))
            .unwrap();

        let gate = s.gate();
        let guard = gate.try_enter().unwrap();
        assert!(gate.is_busy());
        assert_eq!(s.tick(Instant::now()).unwrap(), None);

        drop(guard);
        assert!(!gate.is_busy());
        assert!(s.tick(Instant::now()).unwrap().is_some());
    }

    #[test]
    fn gate_is_released_after_frame_error() {
        let log = Arc::new(Mutex::new(Log::default()));
        let camera = Box::new(FakeCamera {
            log,
            brightness: 200,
            deny: false,
            fail_frames: true,
        });

        let mut s = sampler();
        s.start(camera).unwrap();
        assert!(s.tick(Instant::now()).is_err());
        assert!(!s.gate().is_busy());
    }

    #[test]
    fn restart_keeps_cooldown() {
        let log = Arc::new(Mutex::new(Log::default()));
        let mut s = sampler();
        let now = Instant::now();

        s.start(FakeCamera::boxed(&log, 200)).unwrap();
        assert!(s.tick(now).unwrap().is_some());
        s.stop();

        s.start(FakeCamera::boxed(&log, 200)).unwrap();
        assert!(s.tick(now + Duration::from_millis(100)).unwrap().is_none());
        assert!(s.tick(now + Duration::from_millis(2000)).unwrap().is_some());
    }

    #[test]
    fn new_sampler_on_shared_clock_keeps_cooldown() {
        let log = Arc::new(Mutex::new(Log::default()));
        let clock = EmissionClock::new();
        let config = GestureConfig::default();
        let now = Instant::now();

        let mut first = GestureSampler::with_clock(&config, clock.clone());
        first.start(FakeCamera::boxed(&log, 200)).unwrap();
        assert!(first.tick(now).unwrap().is_some());
        first.stop();

        let mut second = GestureSampler::with_clock(&config, clock);
        second.start(FakeCamera::boxed(&log, 200)).unwrap();
        assert!(second.tick(now + Duration::from_millis(100)).unwrap().is_none());
    }

    #[test]
    fn synthetic_frames_while_sampling() {
        let mut s = sampler();
        s.start(FakeCamera::boxed(&Arc::new(Mutex::new(Log::default())), 0))
            .unwrap();

        let frame = |level: u8| RgbaImage::from_pixel(8, 6, Rgba([level, level, level, 255]));
        let start = Instant::now();
        let at = |ms: u64| start + Duration::from_millis(ms);

        let fist = s.tick_frame(&frame(20), at(0)).unwrap();
        assert_eq!(fist.label, GestureLabel::Fist);
        assert_eq!(fist.confidence, 0.6);
        assert_eq!(fist.timestamp, at(0));

        // inside the cooldown nothing is emitted whatever the frame
        assert_eq!(s.tick_frame(&frame(220), at(500)), None);
        assert_eq!(s.tick_frame(&frame(120), at(1999)), None);
        assert_eq!(s.current().map(|c| c.label), Some(GestureLabel::Fist));

        let thumbs = s.tick_frame(&frame(120), at(2000)).unwrap();
        assert_eq!(thumbs.label, GestureLabel::ThumbsUp);
        assert_eq!(thumbs.confidence, 0.5);

        // the gap band yields nothing and does not restart the cooldown
        assert_eq!(s.tick_frame(&frame(145), at(4100)), None);
        let palm = s.tick_frame(&frame(200), at(4200)).unwrap();
        assert_eq!(palm.label, GestureLabel::OpenPalm);
        assert_eq!(s.current(), Some(palm));
    }

    #[test]
    fn tick_frame_respects_gate() {
        let mut s = sampler();
        s.start(FakeCamera::boxed(&Arc::new(Mutex::new(Log::default())), 0))
            .unwrap();
        let frame = RgbaImage::from_pixel(2, 2, Rgba([10, 10, 10, 255]));

        let gate = s.gate();
        let guard = gate.try_enter().unwrap();
        assert_eq!(s.tick_frame(&frame, Instant::now()), None);
        drop(guard);
        assert!(s.tick_frame(&frame, Instant::now()).is_some());
    }
}
