//! Offline fallback backgrounds.
//!
//! A vertical two-colour gradient with blurred bokeh circles and a soft glow.
//! Output depends only on `(topic, slot, width, height)`.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::compose::draw::{blend_pixel, composite, fill_circle, layer_for, radial_glow};
use crate::hash::slot_seed;

const PRESETS: [([u8; 3], [u8; 3]); 8] = [
    ([20, 20, 50], [220, 60, 90]),
    ([10, 35, 80], [0, 190, 230]),
    ([45, 20, 95], [230, 95, 95]),
    ([15, 25, 55], [85, 175, 230]),
    ([30, 5, 50], [190, 45, 135]),
    ([5, 30, 40], [0, 200, 140]),
    ([40, 10, 10], [240, 150, 50]),
    ([10, 10, 40], [80, 60, 200]),
];

const BOKEH_COUNT: usize = 15;
const BOKEH_DOWNSCALE: u32 = 4;
const GLOW_RADIUS: u32 = 280;
const GLOW_STEP: u32 = 4;
const GLOW_PEAK: f64 = 20.0;

/// Index into the preset table for a topic/slot pair.
pub fn preset_index(topic: &str, slot: usize) -> usize {
    (slot_seed(topic, slot) % PRESETS.len() as u64) as usize
}

/// Build the fallback image for `slot`.
pub fn create_fallback_image(topic: &str, slot: usize, width: u32, height: u32) -> RgbImage {
    let (top, bottom) = PRESETS[preset_index(topic, slot)];
    let mut img = vertical_gradient(width, height, top, bottom);

    let accent = Rgb(bottom);
    let mut rng = StdRng::seed_from_u64(slot_seed(topic, slot));
    for _ in 0..BOKEH_COUNT {
        let cx = rng.random_range(0..=width) as i64;
        let cy = rng.random_range(0..=height) as i64;
        let radius = rng.random_range(30..=140u32);
        let alpha = rng.random_range(15..=50u8);
        draw_bokeh(&mut img, cx, cy, radius, alpha, accent);
    }

    let mut glow = layer_for(&img);
    radial_glow(
        &mut glow,
        width as i64 / 2,
        height as i64 / 3,
        GLOW_RADIUS,
        GLOW_STEP,
        GLOW_PEAK,
        1,
        accent,
    );
    composite(&mut img, &glow);
    img
}

fn vertical_gradient(width: u32, height: u32, top: [u8; 3], bottom: [u8; 3]) -> RgbImage {
    let mut img = RgbImage::new(width, height);
    for y in 0..height {
        let t = y as f64 / height as f64;
        let mut color = [0u8; 3];
        for (c, out) in color.iter_mut().enumerate() {
            let from = top[c] as f64;
            let to = bottom[c] as f64;
            *out = (from + (to - from) * t) as u8;
        }
        for x in 0..width {
            img.put_pixel(x, y, Rgb(color));
        }
    }
    img
}

/// Blend a Gaussian-blurred disc onto `img`.
///
/// The disc is blurred at reduced scale on a patch padded by three sigmas and
/// upscaled; at these radii the result is indistinguishable and far cheaper.
fn draw_bokeh(img: &mut RgbImage, cx: i64, cy: i64, radius: u32, alpha: u8, color: Rgb<u8>) {
    let small_radius = (radius / BOKEH_DOWNSCALE).max(1);
    let sigma = (radius / 3) as f32 / BOKEH_DOWNSCALE as f32;
    let pad = (sigma * 3.0).ceil() as u32;
    let small_size = 2 * (small_radius + pad) + 1;
    let small_centre = (small_radius + pad) as i64;

    let mut patch = RgbaImage::from_pixel(small_size, small_size, Rgba([color[0], color[1], color[2], 0]));
    fill_circle(&mut patch, small_centre, small_centre, small_radius as i64, color, alpha);
    let patch = if sigma > 0.0 { imageops::blur(&patch, sigma) } else { patch };

    let size = small_size * BOKEH_DOWNSCALE;
    let patch = imageops::resize(&patch, size, size, FilterType::Triangle);
    let centre = (size / 2) as i64;

    let (ox, oy) = (cx - centre, cy - centre);
    for (x, y, px) in patch.enumerate_pixels() {
        if px[3] > 0 {
            blend_pixel(img, ox + x as i64, oy + y as i64, color, px[3] as u32);
        }
    }
}
