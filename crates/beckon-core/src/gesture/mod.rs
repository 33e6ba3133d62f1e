//! Gesture Intent Classifier.
//!
//! Frames from a [`Camera`] are reduced to a mean brightness, classified under a
//! cooldown, and mapped to navigation intents.

pub mod camera;
pub mod classifier;
pub mod frame;
pub mod mapping;
pub mod sampler;

pub use camera::{Camera, CameraStream};
pub use classifier::{EmissionClock, GestureClassifier};
pub use frame::mean_luminance;
pub use mapping::intent_for_gesture;
pub use sampler::{FrameGate, FrameGuard, GestureSampler, SamplerState};
