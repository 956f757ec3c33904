//! Content frame layout: glass card, numbered badge, body text and progress dots.

use image::{Rgb, RgbImage, RgbaImage};

use super::draw::{composite, fill_circle, fill_rect, fill_rounded_rect, fill_row, layer_for, wrap_text};
use super::fonts::{draw_text, Anchor, FontContext};
use super::palette::AccentPalette;

const BODY_PX: f32 = 38.0;
const NUMBER_PX: f32 = 48.0;
const LABEL_PX: f32 = 20.0;
const WRAP_COLUMNS: usize = 28;
const MAX_LINES: usize = 8;
const LINE_STEP: i64 = 52;

const CARD_MARGIN_X: i64 = 40;
const CARD_MARGIN_BOTTOM: i64 = 80;
const CARD_RADIUS: i64 = 24;
const BADGE_RADIUS: i64 = 22;
const DOT_RADIUS: i64 = 5;
const DOT_SPACING: i64 = 18;

const BODY_COLOR: Rgb<u8> = Rgb([240, 240, 240]);
const LABEL_COLOR: Rgb<u8> = Rgb([180, 180, 180]);
const IDLE_DOT: Rgb<u8> = Rgb([80, 80, 80]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Ease-in alpha of the bottom gradient for row `y`; zero above 35% height.
pub fn gradient_alpha(y: u32, height: u32) -> u8 {
    let start = (height as f64 * 0.35) as u32;
    if y < start || height <= start {
        return 0;
    }
    let progress = (y - start) as f64 / (height - start) as f64;
    (220.0 * progress.powf(1.5)) as u8
}

/// Bottom gradient plus the thin accent rule along the top edge.
pub fn overlay(frame: &RgbImage, palette: &AccentPalette) -> RgbaImage {
    let mut layer = layer_for(frame);
    for y in 0..frame.height() {
        let alpha = gradient_alpha(y, frame.height());
        if alpha > 0 {
            fill_row(&mut layer, y, BLACK, alpha);
        }
    }
    fill_rect(&mut layer, 0, 0, frame.width() as i64, 3, palette.primary, 200);
    layer
}

pub fn glow_y(height: u32) -> i64 {
    (height as f64 * 0.55) as i64
}

/// x-centres of the progress dots.
pub fn dot_centres(width: u32, total: usize) -> Vec<i64> {
    let total = total as i64;
    let start = width as i64 / 2 - total * DOT_SPACING / 2;
    (0..total).map(|i| start + i * DOT_SPACING).collect()
}

/// Card, badge, label, body text and dots for slide `number` of `total`.
pub fn draw(
    frame: &mut RgbImage,
    fonts: &FontContext,
    text: &str,
    number: usize,
    total: usize,
    palette: &AccentPalette,
) {
    let (w, h) = (frame.width() as i64, frame.height() as i64);
    let card_top = (h as f64 * 0.42) as i64;
    let card_bottom = h - CARD_MARGIN_BOTTOM;
    let card_left = CARD_MARGIN_X;
    let card_right = w - CARD_MARGIN_X;

    let mut card = layer_for(frame);
    fill_rounded_rect(&mut card, card_left, card_top, card_right, card_bottom, CARD_RADIUS, BLACK, 100);
    fill_rounded_rect(&mut card, card_left, card_top, card_right, card_top + 4, 2, palette.primary, 180);
    composite(frame, &card);

    let badge_x = card_left + 45;
    let badge_y = card_top + 40;
    let dot_y = card_bottom - 30;

    let mut shapes = layer_for(frame);
    fill_circle(&mut shapes, badge_x, badge_y, BADGE_RADIUS, palette.primary, 255);
    for (i, cx) in dot_centres(frame.width(), total).into_iter().enumerate() {
        if i + 1 == number {
            fill_circle(&mut shapes, cx, dot_y, DOT_RADIUS + 2, palette.primary, 255);
        } else {
            fill_circle(&mut shapes, cx, dot_y, DOT_RADIUS, IDLE_DOT, 255);
        }
    }
    composite(frame, &shapes);

    draw_text(frame, fonts.bold(), &number.to_string(), NUMBER_PX, Anchor::Centre, badge_x, badge_y, WHITE, 255);
    draw_text(
        frame,
        fonts.regular(),
        &format!("Point {number} of {total}"),
        LABEL_PX,
        Anchor::LeftMiddle,
        badge_x + BADGE_RADIUS + 14,
        badge_y,
        LABEL_COLOR,
        255,
    );

    let cx = w / 2;
    let mut y = card_top + 90;
    for line in wrap_text(text, WRAP_COLUMNS).iter().take(MAX_LINES) {
        draw_text(frame, fonts.bold(), line, BODY_PX, Anchor::Centre, cx + 1, y + 2, BLACK, 255);
        draw_text(frame, fonts.bold(), line, BODY_PX, Anchor::Centre, cx, y, BODY_COLOR, 255);
        y += LINE_STEP;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_ramp() {
        let h = 1280;
        assert_eq!(gradient_alpha(0, h), 0);
        assert_eq!(gradient_alpha(440, h), 0);
        assert!(gradient_alpha(900, h) < gradient_alpha(1200, h));
        assert!(gradient_alpha(h - 1, h) <= 220);
    }

    #[test]
    fn test_dots_centred() {
        let xs = dot_centres(720, 4);
        assert_eq!(xs, vec![324, 342, 360, 378]);
        assert!(dot_centres(720, 0).is_empty());
    }

    #[test]
    fn test_current_dot_highlighted() {
        let mut frame = RgbImage::new(720, 1280);
        let palette = AccentPalette::at(4);
        draw(&mut frame, &FontContext::builtin(), "Plants make sugar from light.", 2, 4, &palette);

        let dot_y = 1280 - 80 - 30;
        let xs = dot_centres(720, 4);
        assert_eq!(frame.get_pixel(xs[1] as u32, dot_y), &palette.primary);
        assert_eq!(frame.get_pixel(xs[0] as u32, dot_y), &IDLE_DOT);
        // Just outside a normal dot but inside the enlarged one
        assert_eq!(frame.get_pixel(xs[1] as u32 + 6, dot_y), &palette.primary);
        assert_ne!(frame.get_pixel(xs[0] as u32 + 6, dot_y), &IDLE_DOT);
    }

    #[test]
    fn test_top_rule_uses_accent() {
        let frame = RgbImage::new(100, 200);
        let palette = AccentPalette::at(0);
        let layer = overlay(&frame, &palette);
        assert_eq!(layer.get_pixel(50, 2).0, [233, 69, 96, 200]);
        assert_eq!(layer.get_pixel(50, 10)[3], 0);
    }
}
