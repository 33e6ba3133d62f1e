use image::RgbaImage;

use crate::error::CameraError;

/// Source of video frames
pub trait Camera: Send {
    /// Acquire the device, delivering frames at `width` x `height`
    fn open(&mut self, width: u32, height: u32) -> Result<(), CameraError>;

    /// Latest frame, `None` when the device has nothing ready yet
    fn frame(&mut self) -> Result<Option<RgbaImage>, CameraError>;

    /// Release the device. Must be safe to call more than once.
    fn close(&mut self);
}

/// An opened camera, closed when dropped
pub struct CameraStream {
    camera: Box<dyn Camera>,
}

impl CameraStream {
    pub fn open(mut camera: Box<dyn Camera>, width: u32, height: u32) -> Result<Self, CameraError> {
        camera.open(width, height)?;
        tracing::info!("[CAMERA] Stream opened at {}x{}", width, height);
        Ok(Self { camera })
    }

    pub fn frame(&mut self) -> Result<Option<RgbaImage>, CameraError> {
        self.camera.frame()
    }
}

impl Drop for CameraStream {
    fn drop(&mut self) {
        self.camera.close();
        tracing::info!("[CAMERA] Stream closed");
    }
}
