//! Raster primitives.
//!
//! Shapes are drawn into a transparent RGBA layer with replace semantics (a
//! later shape overwrites earlier pixels, alpha included), and the layer is
//! then alpha-composited onto the frame. Text is blended straight onto the
//! frame through a coverage mask.

use image::{Rgb, RgbImage, Rgba, RgbaImage};

/// Blend `color` over `dst` with `alpha` in 0..=255.
#[inline]
pub fn blend_channel(dst: u8, src: u8, alpha: u32) -> u8 {
    ((src as u32 * alpha + dst as u32 * (255 - alpha) + 127) / 255) as u8
}

/// Blend one pixel; coordinates outside the image are ignored.
pub fn blend_pixel(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>, alpha: u32) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 || alpha == 0 {
        return;
    }
    let px = img.get_pixel_mut(x as u32, y as u32);
    for c in 0..3 {
        px[c] = blend_channel(px[c], color[c], alpha.min(255));
    }
}

/// Alpha-composite an RGBA layer of the same size onto `base`.
pub fn composite(base: &mut RgbImage, layer: &RgbaImage) {
    for (dst, src) in base.pixels_mut().zip(layer.pixels()) {
        let alpha = src[3] as u32;
        if alpha == 0 {
            continue;
        }
        for c in 0..3 {
            dst[c] = blend_channel(dst[c], src[c], alpha);
        }
    }
}

/// Transparent layer matching `base`.
pub fn layer_for(base: &RgbImage) -> RgbaImage {
    RgbaImage::new(base.width(), base.height())
}

fn rgba(color: Rgb<u8>, alpha: u8) -> Rgba<u8> {
    Rgba([color[0], color[1], color[2], alpha])
}

/// Fill a whole row.
pub fn fill_row(layer: &mut RgbaImage, y: u32, color: Rgb<u8>, alpha: u8) {
    if y >= layer.height() {
        return;
    }
    for x in 0..layer.width() {
        layer.put_pixel(x, y, rgba(color, alpha));
    }
}

/// Fill the inclusive rectangle `(x0, y0)..=(x1, y1)`, clipped to the layer.
pub fn fill_rect(layer: &mut RgbaImage, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>, alpha: u8) {
    let (w, h) = (layer.width() as i64, layer.height() as i64);
    for y in y0.max(0)..=y1.min(h - 1) {
        for x in x0.max(0)..=x1.min(w - 1) {
            layer.put_pixel(x as u32, y as u32, rgba(color, alpha));
        }
    }
}

/// Fill an axis-aligned ellipse centred on `(cx, cy)`.
pub fn fill_ellipse(layer: &mut RgbaImage, cx: i64, cy: i64, rx: i64, ry: i64, color: Rgb<u8>, alpha: u8) {
    if rx <= 0 || ry <= 0 {
        return;
    }
    let (w, h) = (layer.width() as i64, layer.height() as i64);
    let (rx2, ry2) = ((rx * rx) as f64, (ry * ry) as f64);
    for y in (cy - ry).max(0)..=(cy + ry).min(h - 1) {
        let dy = (y - cy) as f64;
        for x in (cx - rx).max(0)..=(cx + rx).min(w - 1) {
            let dx = (x - cx) as f64;
            if dx * dx / rx2 + dy * dy / ry2 <= 1.0 {
                layer.put_pixel(x as u32, y as u32, rgba(color, alpha));
            }
        }
    }
}

/// Fill a circle.
pub fn fill_circle(layer: &mut RgbaImage, cx: i64, cy: i64, r: i64, color: Rgb<u8>, alpha: u8) {
    fill_ellipse(layer, cx, cy, r, r, color, alpha);
}

/// Fill a rectangle with rounded corners. The radius is clamped to half the
/// shorter side.
#[allow(clippy::too_many_arguments)]
pub fn fill_rounded_rect(
    layer: &mut RgbaImage,
    x0: i64,
    y0: i64,
    x1: i64,
    y1: i64,
    radius: i64,
    color: Rgb<u8>,
    alpha: u8,
) {
    let r = radius.min((x1 - x0) / 2).min((y1 - y0) / 2).max(0);
    let (w, h) = (layer.width() as i64, layer.height() as i64);
    for y in y0.max(0)..=y1.min(h - 1) {
        for x in x0.max(0)..=x1.min(w - 1) {
            // Distance into the nearest corner square, if any
            let cx = if x < x0 + r { x0 + r } else if x > x1 - r { x1 - r } else { x };
            let cy = if y < y0 + r { y0 + r } else if y > y1 - r { y1 - r } else { y };
            let (dx, dy) = (x - cx, y - cy);
            if dx * dx + dy * dy <= r * r {
                layer.put_pixel(x as u32, y as u32, rgba(color, alpha));
            }
        }
    }
}

/// Concentric glow: alpha falls linearly from `peak` at the centre to zero at
/// `max_radius`, quantised to rings `step` pixels wide. `stretch` widens the
/// glow horizontally.
#[allow(clippy::too_many_arguments)]
pub fn radial_glow(
    layer: &mut RgbaImage,
    cx: i64,
    cy: i64,
    max_radius: u32,
    step: u32,
    peak: f64,
    stretch: u32,
    color: Rgb<u8>,
) {
    let step = step.max(1) as f64;
    let max_r = max_radius as f64;
    let stretch = stretch.max(1) as i64;
    let (w, h) = (layer.width() as i64, layer.height() as i64);
    let reach_x = max_radius as i64 * stretch;
    let reach_y = max_radius as i64;

    for y in (cy - reach_y).max(0)..=(cy + reach_y).min(h - 1) {
        let dy = (y - cy) as f64;
        for x in (cx - reach_x).max(0)..=(cx + reach_x).min(w - 1) {
            let dx = (x - cx) as f64 / stretch as f64;
            let distance = (dx * dx + dy * dy).sqrt();
            // Smallest ring radius that still contains this pixel
            let ring = ((distance / step).ceil() * step).max(step);
            if ring > max_r {
                continue;
            }
            let alpha = (peak * (1.0 - ring / max_r)) as u8;
            if alpha > 0 {
                layer.put_pixel(x as u32, y as u32, rgba(color, alpha));
            }
        }
    }
}

/// Greedy word wrap at `width` characters. Words longer than a line are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while !word.is_empty() {
            let room = if current_len == 0 { width } else { width.saturating_sub(current_len + 1) };
            if word.len() <= room {
                if current_len > 0 {
                    current.push(' ');
                    current_len += 1;
                }
                current.extend(word.iter());
                current_len += word.len();
                break;
            }
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
                continue;
            }
            // Word alone exceeds the width
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_extremes() {
        assert_eq!(blend_channel(10, 200, 0), 10);
        assert_eq!(blend_channel(10, 200, 255), 200);
        assert_eq!(blend_channel(0, 255, 128), 128);
    }

    #[test]
    fn test_composite_respects_alpha() {
        let mut base = RgbImage::from_pixel(2, 1, Rgb([100, 100, 100]));
        let mut layer = layer_for(&base);
        layer.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        composite(&mut base, &layer);
        assert_eq!(base.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(base.get_pixel(1, 0), &Rgb([100, 100, 100]));
    }

    #[test]
    fn test_shapes_clip_to_bounds() {
        let mut layer = RgbaImage::new(20, 20);
        fill_circle(&mut layer, 0, 0, 50, Rgb([255, 0, 0]), 200);
        fill_rect(&mut layer, -5, -5, 100, 2, Rgb([0, 255, 0]), 100);
        fill_rounded_rect(&mut layer, -10, 10, 40, 30, 24, Rgb([0, 0, 255]), 50);
        assert_eq!(layer.get_pixel(0, 0)[1], 255);
        assert_eq!(layer.get_pixel(10, 15)[3], 50);
    }

    #[test]
    fn test_rounded_rect_corners_empty() {
        let mut layer = RgbaImage::new(100, 100);
        fill_rounded_rect(&mut layer, 10, 10, 90, 90, 20, Rgb([255, 255, 255]), 255);
        assert_eq!(layer.get_pixel(10, 10)[3], 0);
        assert_eq!(layer.get_pixel(50, 10)[3], 255);
        assert_eq!(layer.get_pixel(50, 50)[3], 255);
    }

    #[test]
    fn test_glow_peaks_at_centre() {
        let mut layer = RgbaImage::new(200, 200);
        radial_glow(&mut layer, 100, 100, 80, 4, 20.0, 1, Rgb([255, 0, 0]));
        let centre = layer.get_pixel(100, 100)[3];
        let mid = layer.get_pixel(140, 100)[3];
        assert!(centre > mid);
        assert_eq!(layer.get_pixel(199, 199)[3], 0);
    }

    #[test]
    fn test_wrap_text() {
        let lines = wrap_text("How does photosynthesis turn sunlight into sugar?", 20);
        assert_eq!(lines, vec!["How does", "photosynthesis turn", "sunlight into sugar?"]);
        for line in &lines {
            assert!(line.chars().count() <= 20);
        }
    }

    #[test]
    fn test_wrap_breaks_long_words() {
        let lines = wrap_text("pneumonoultramicroscopicsilicovolcanoconiosis", 20);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].chars().count(), 20);
        assert!(wrap_text("   ", 20).is_empty());
    }
}
