//! Title frame layout.

use image::{Rgb, RgbImage, RgbaImage};

use super::draw::{composite, fill_circle, fill_rect, fill_row, layer_for, wrap_text};
use super::fonts::{draw_text, Anchor, FontContext};
use super::palette::AccentPalette;

pub const HEADER_TEXT: &str = "\u{2014} DID YOU KNOW? \u{2014}";
const HEADER_PX: f32 = 28.0;
const QUESTION_PX: f32 = 56.0;
const BRAND_PX: f32 = 24.0;
const WRAP_COLUMNS: usize = 20;
const MAX_LINES: usize = 5;
const LINE_STEP: i64 = 72;
const UNDERLINE_WIDTH: i64 = 160;
const DOT_RADIUS: i64 = 4;
const BRAND_COLOR: Rgb<u8> = Rgb([200, 200, 200]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Darkening alpha for row `y`: a centre-weighted S-curve, with the top 8% and
/// bottom 15% of the frame darkened further.
pub fn vignette_alpha(y: u32, height: u32) -> u8 {
    let h = height as f64;
    let norm = y as f64 / h;
    let base = (160.0 * (0.3 + 0.7 * (1.0 - (norm - 0.5).abs() * 1.4))) as i64;
    let base = base.clamp(0, 200);

    let top_band = h * 0.08;
    let bottom_start = h * 0.85;
    let edge = if (y as f64) < top_band.trunc() {
        (120.0 * (1.0 - y as f64 / top_band)) as i64
    } else if y as f64 >= bottom_start.trunc() {
        ((150.0 * ((y as f64 - bottom_start) / (h * 0.15))) as i64).max(0)
    } else {
        0
    };
    base.max(edge).clamp(0, 255) as u8
}

/// Full-frame vignette layer.
pub fn overlay(frame: &RgbImage) -> RgbaImage {
    let mut layer = layer_for(frame);
    for y in 0..frame.height() {
        fill_row(&mut layer, y, BLACK, vignette_alpha(y, frame.height()));
    }
    layer
}

/// Glow centre height.
pub fn glow_y(height: u32) -> i64 {
    height as i64 - 180
}

/// Caption, underline, wrapped question and branded footer.
pub fn draw(frame: &mut RgbImage, fonts: &FontContext, question: &str, palette: &AccentPalette, brand: &str) {
    let (w, h) = (frame.width() as i64, frame.height() as i64);
    let cx = w / 2;

    let header_y = (h as f64 * 0.28) as i64;
    draw_text(frame, fonts.regular(), HEADER_TEXT, HEADER_PX, Anchor::Centre, cx, header_y, palette.glow, 255);

    let mut shapes = layer_for(frame);
    let line_y = header_y + 28;
    fill_rect(
        &mut shapes,
        cx - UNDERLINE_WIDTH / 2,
        line_y,
        cx + UNDERLINE_WIDTH / 2,
        line_y + 3,
        palette.primary,
        255,
    );

    let by = h - 120;
    for i in 0..3 {
        fill_circle(&mut shapes, cx - 20 + i * 20, by, DOT_RADIUS, palette.primary, 255);
    }
    composite(frame, &shapes);

    let mut y = (h as f64 * 0.40) as i64;
    for line in wrap_text(question, WRAP_COLUMNS).iter().take(MAX_LINES) {
        draw_text(frame, fonts.bold(), line, QUESTION_PX, Anchor::Centre, cx + 2, y + 3, BLACK, 180);
        draw_text(frame, fonts.bold(), line, QUESTION_PX, Anchor::Centre, cx, y, WHITE, 255);
        y += LINE_STEP;
    }

    draw_text(frame, fonts.regular(), brand, BRAND_PX, Anchor::Centre, cx, by + 30, BRAND_COLOR, 255);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vignette_edges_darker_than_middle() {
        let h = 1280;
        let middle = vignette_alpha(h / 2, h);
        assert!(vignette_alpha(0, h) >= middle);
        assert!(vignette_alpha(h - 1, h) >= middle);
        assert!(vignette_alpha(h * 3 / 10, h) <= middle);
    }

    #[test]
    fn test_vignette_takes_stronger_of_curve_and_edge() {
        let h = 1000;
        // Top row: curve gives 160 * (0.3 + 0.7 * 0.3) = 81, edge gives 120
        assert_eq!(vignette_alpha(0, h), 120);
        // Just inside the bottom band the curve still dominates
        let curve_only = (160.0 * (0.3 + 0.7 * (1.0 - 0.35 * 1.4))) as u8;
        assert_eq!(vignette_alpha(850, h), curve_only);
    }

    #[test]
    fn test_draw_places_accent_underline() {
        let mut frame = RgbImage::new(720, 1280);
        let palette = AccentPalette::at(1);
        draw(&mut frame, &FontContext::builtin(), "Why is the sky blue?", &palette, "EduVid AI");
        let line_y = (1280.0 * 0.28) as u32 + 29;
        assert_eq!(frame.get_pixel(360, line_y), &palette.primary);
        assert_eq!(frame.get_pixel(360 - 20, 1280 - 120), &palette.primary);
    }
}
