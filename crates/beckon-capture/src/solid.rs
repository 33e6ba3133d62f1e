use beckon_core::error::CameraError;
use beckon_core::gesture::Camera;
use image::{Rgba, RgbaImage};

/// Synthetic camera producing uniform grey frames
pub struct SolidCamera {
    level: u8,
    size: Option<(u32, u32)>,
}

impl SolidCamera {
    pub fn new(level: u8) -> Self {
        Self { level, size: None }
    }
}

impl Camera for SolidCamera {
    fn open(&mut self, width: u32, height: u32) -> Result<(), CameraError> {
        self.size = Some((width, height));
        Ok(())
    }

    fn frame(&mut self) -> Result<Option<RgbaImage>, CameraError> {
        let (width, height) = self.size.ok_or(CameraError::Closed)?;
        let l = self.level;
        Ok(Some(RgbaImage::from_pixel(width, height, Rgba([l, l, l, 255]))))
    }

    fn close(&mut self) {
        self.size = None;
    }
}

#[cfg(test)]
mod tests {
    use beckon_core::gesture::mean_luminance;

    use super::*;

    #[test]
    fn frames_only_while_open() {
        let mut camera = SolidCamera::new(42);
        assert!(matches!(camera.frame(), Err(CameraError::Closed)));

        camera.open(200, 150).unwrap();
        let frame = camera.frame().unwrap().unwrap();
        assert_eq!(frame.dimensions(), (200, 150));
        assert_eq!(mean_luminance(&frame), Some(42.0));

        camera.close();
        assert!(matches!(camera.frame(), Err(CameraError::Closed)));
    }
}
