//! Cover-and-crop resizing shared by every image source.

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};

/// Scale factor that makes `(src_w, src_h)` cover `(target_w, target_h)`.
pub fn cover_ratio(src_w: u32, src_h: u32, target_w: u32, target_h: u32) -> f64 {
    let w_ratio = target_w as f64 / src_w.max(1) as f64;
    let h_ratio = target_h as f64 / src_h.max(1) as f64;
    w_ratio.max(h_ratio)
}

/// Size after scaling by the cover ratio, never smaller than the target.
pub fn cover_size(src_w: u32, src_h: u32, target_w: u32, target_h: u32) -> (u32, u32) {
    let ratio = cover_ratio(src_w, src_h, target_w, target_h);
    let w = ((src_w as f64 * ratio) as u32).max(target_w);
    let h = ((src_h as f64 * ratio) as u32).max(target_h);
    (w, h)
}

/// Scale `image` to cover the target box, then centre-crop to exactly
/// `target_w` x `target_h`. Aspect ratio is preserved; nothing is letterboxed.
pub fn cover_crop(image: &DynamicImage, target_w: u32, target_h: u32) -> RgbImage {
    let rgb = image.to_rgb8();
    if rgb.dimensions() == (target_w, target_h) {
        return rgb;
    }

    let (w, h) = cover_size(rgb.width(), rgb.height(), target_w, target_h);
    let scaled = imageops::resize(&rgb, w, h, FilterType::Lanczos3);
    let left = (w - target_w) / 2;
    let top = (h - target_h) / 2;
    imageops::crop_imm(&scaled, left, top, target_w, target_h).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_ratio_is_max_of_axes() {
        assert_eq!(cover_ratio(1080, 720, 720, 1280), 1280.0 / 720.0);
        assert_eq!(cover_ratio(400, 2000, 720, 1280), 720.0 / 400.0);
    }

    #[test]
    fn test_output_exact_size() {
        for (w, h) in [(1080, 720), (400, 2000), (720, 1280), (10, 10), (3000, 3001)] {
            let src = DynamicImage::ImageRgb8(RgbImage::new(w, h));
            let out = cover_crop(&src, 720, 1280);
            assert_eq!(out.dimensions(), (720, 1280), "source {w}x{h}");
        }
    }

    #[test]
    fn test_centre_crop_keeps_middle() {
        // Wide source: red left third, green middle, blue right third
        let src = RgbImage::from_fn(300, 100, |x, _| match x {
            0..=99 => Rgb([255, 0, 0]),
            100..=199 => Rgb([0, 255, 0]),
            _ => Rgb([0, 0, 255]),
        });
        let out = cover_crop(&DynamicImage::ImageRgb8(src), 90, 270);
        let centre = out.get_pixel(45, 135);
        assert!(centre[1] > 200 && centre[0] < 50 && centre[2] < 50);
    }
}
