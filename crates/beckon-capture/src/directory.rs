use std::path::{Path, PathBuf};

use beckon_core::error::CameraError;
use beckon_core::gesture::Camera;
use image::RgbaImage;
use image::imageops::{self, FilterType};

const FRAME_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Camera replaying still images from a directory, in file name order, looping
pub struct DirectoryCamera {
    dir: PathBuf,
    frames: Vec<RgbaImage>,
    next: usize,
}

impl DirectoryCamera {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            frames: Vec::new(),
            next: 0,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

fn load_frame(path: &Path, width: u32, height: u32) -> Result<RgbaImage, CameraError> {
    let image = image::open(path)
        .map_err(|e| CameraError::Decode(format!("{}: {}", path.display(), e)))?
        .to_rgba8();

    if image.dimensions() == (width, height) {
        return Ok(image);
    }
    Ok(imageops::resize(&image, width, height, FilterType::Triangle))
}

impl Camera for DirectoryCamera {
    fn open(&mut self, width: u32, height: u32) -> Result<(), CameraError> {
        if !self.dir.is_dir() {
            return Err(CameraError::Unavailable(format!(
                "{} is not a directory",
                self.dir.display()
            )));
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| is_frame_file(p))
            .collect();
        paths.sort();

        let frames = paths
            .iter()
            .map(|p| load_frame(p, width, height))
            .collect::<Result<Vec<_>, _>>()?;

        if frames.is_empty() {
            return Err(CameraError::Unavailable(format!(
                "no frames in {}",
                self.dir.display()
            )));
        }

        tracing::info!("[CAMERA] Loaded {} frames from {}", frames.len(), self.dir.display());
        self.frames = frames;
        self.next = 0;
        Ok(())
    }

    fn frame(&mut self) -> Result<Option<RgbaImage>, CameraError> {
        if self.frames.is_empty() {
            return Err(CameraError::Closed);
        }
        let frame = self.frames[self.next % self.frames.len()].clone();
        self.next = self.next.wrapping_add(1);
        Ok(Some(frame))
    }

    fn close(&mut self) {
        self.frames.clear();
        self.next = 0;
    }
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("beckon-capture-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn replays_frames_in_name_order_resized() {
        let dir = scratch_dir("replay");
        RgbaImage::from_pixel(40, 30, Rgba([200, 200, 200, 255]))
            .save(dir.join("b.png"))
            .unwrap();
        RgbaImage::from_pixel(40, 30, Rgba([10, 10, 10, 255]))
            .save(dir.join("a.png"))
            .unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let mut camera = DirectoryCamera::new(&dir);
        camera.open(20, 15).unwrap();
        assert_eq!(camera.frame_count(), 2);

        let first = camera.frame().unwrap().unwrap();
        assert_eq!(first.dimensions(), (20, 15));
        assert!(first.get_pixel(0, 0)[0].abs_diff(10) <= 1);
        let second = camera.frame().unwrap().unwrap();
        assert!(second.get_pixel(0, 0)[0].abs_diff(200) <= 1);
        let third = camera.frame().unwrap().unwrap();
        assert!(third.get_pixel(0, 0)[0].abs_diff(10) <= 1);

        camera.close();
        assert!(matches!(camera.frame(), Err(CameraError::Closed)));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_or_empty_directory_is_unavailable() {
        let mut camera = DirectoryCamera::new("/definitely/not/here");
        assert!(matches!(camera.open(20, 15), Err(CameraError::Unavailable(_))));

        let dir = scratch_dir("empty");
        let mut camera = DirectoryCamera::new(&dir);
        assert!(matches!(camera.open(20, 15), Err(CameraError::Unavailable(_))));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn corrupt_image_is_a_decode_error() {
        let dir = scratch_dir("corrupt");
        std::fs::write(dir.join("frame.png"), b"not a png").unwrap();

        let mut camera = DirectoryCamera::new(&dir);
        assert!(matches!(camera.open(20, 15), Err(CameraError::Decode(_))));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
