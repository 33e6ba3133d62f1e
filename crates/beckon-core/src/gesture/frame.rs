use image::RgbaImage;

/// Mean of `(r + g + b) / 3` over every pixel, `None` for an empty frame.
///
/// Alpha is ignored.
pub fn mean_luminance(frame: &RgbaImage) -> Option<f64> {
    let pixels = u64::from(frame.width()) * u64::from(frame.height());
    if pixels == 0 {
        return None;
    }

    let total: f64 = frame
        .pixels()
        .map(|p| (f64::from(p[0]) + f64::from(p[1]) + f64::from(p[2])) / 3.0)
        .sum();

    Some(total / pixels as f64)
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    #[test]
    fn averages_channels_and_pixels() {
        let mut frame = RgbaImage::from_pixel(2, 1, Rgba([30, 60, 90, 255]));
        frame.put_pixel(1, 0, Rgba([255, 255, 255, 0]));
        // (60 + 255) / 2
        assert_eq!(mean_luminance(&frame), Some(157.5));
    }

    #[test]
    fn empty_frame_has_no_luminance() {
        assert_eq!(mean_luminance(&RgbaImage::new(0, 0)), None);
    }
}
