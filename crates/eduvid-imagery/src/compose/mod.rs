//! Frame composition.
//!
//! [`FrameCompositor::render`] is pure CPU work; callers on the async runtime
//! should run it under `spawn_blocking`.

pub mod builtin_font;
pub mod content;
pub mod draw;
pub mod fonts;
pub mod palette;
pub mod title;

use eduvid_models::{RenderSettings, SlideRole};
use image::{DynamicImage, RgbImage};
use std::sync::Arc;

use crate::resize::cover_crop;
use draw::{composite, layer_for, radial_glow};
pub use fonts::{FontContext, FontSource};
pub use palette::AccentPalette;

/// Footer text on title frames.
pub const DEFAULT_BRAND: &str = "EduVid AI";

const GLOW_MAX_RADIUS: u32 = 120;
const GLOW_STEP: u32 = 3;
const GLOW_PEAK: f64 = 12.0;
const GLOW_STRETCH: u32 = 3;

/// Renders title and content frames at the configured resolution.
#[derive(Debug, Clone)]
pub struct FrameCompositor {
    fonts: Arc<FontContext>,
    settings: RenderSettings,
    brand: String,
}

impl FrameCompositor {
    pub fn new(fonts: Arc<FontContext>, settings: RenderSettings) -> Self {
        Self {
            fonts,
            settings,
            brand: DEFAULT_BRAND.to_string(),
        }
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn fonts(&self) -> &FontContext {
        &self.fonts
    }

    /// Compose one frame.
    ///
    /// `total` is the number of content slides; it drives the "Point N of M"
    /// label and the progress dots and is ignored for the title.
    pub fn render(
        &self,
        image: &RgbImage,
        text: &str,
        role: SlideRole,
        total: usize,
        palette: &AccentPalette,
    ) -> RgbImage {
        let (w, h) = (self.settings.width, self.settings.height);
        let mut frame = if image.dimensions() == (w, h) {
            image.clone()
        } else {
            cover_crop(&DynamicImage::ImageRgb8(image.clone()), w, h)
        };

        let overlay = match role {
            SlideRole::Title => title::overlay(&frame),
            SlideRole::Content { .. } => content::overlay(&frame, palette),
        };
        composite(&mut frame, &overlay);

        let glow_y = match role {
            SlideRole::Title => title::glow_y(h),
            SlideRole::Content { .. } => content::glow_y(h),
        };
        let mut glow = layer_for(&frame);
        radial_glow(
            &mut glow,
            w as i64 / 2,
            glow_y,
            GLOW_MAX_RADIUS,
            GLOW_STEP,
            GLOW_PEAK,
            GLOW_STRETCH,
            palette.primary,
        );
        composite(&mut frame, &glow);

        match role {
            SlideRole::Title => title::draw(&mut frame, &self.fonts, text, palette, &self.brand),
            SlideRole::Content { index } => content::draw(&mut frame, &self.fonts, text, index, total, palette),
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn compositor() -> FrameCompositor {
        FrameCompositor::new(Arc::new(FontContext::builtin()), RenderSettings::default())
    }

    #[test]
    fn test_output_matches_settings() {
        let source = RgbImage::from_pixel(1080, 720, Rgb([120, 130, 140]));
        let frame = compositor().render(&source, "What is gravity?", SlideRole::Title, 3, &AccentPalette::at(2));
        assert_eq!(frame.dimensions(), (720, 1280));
    }

    #[test]
    fn test_content_darkens_bottom() {
        let source = RgbImage::from_pixel(720, 1280, Rgb([200, 200, 200]));
        let frame = compositor().render(
            &source,
            "Gravity pulls masses together.",
            SlideRole::Content { index: 1 },
            3,
            &AccentPalette::at(0),
        );
        // Above the gradient the background survives; the bottom margin is darkened
        assert_eq!(frame.get_pixel(5, 200), &Rgb([200, 200, 200]));
        assert!(frame.get_pixel(5, 1270)[0] < 60);
    }

    #[test]
    fn test_render_is_deterministic() {
        let source = RgbImage::from_pixel(720, 1280, Rgb([30, 60, 90]));
        let palette = AccentPalette::at(3);
        let role = SlideRole::Content { index: 2 };
        let a = compositor().render(&source, "Same text", role, 4, &palette);
        let b = compositor().render(&source, "Same text", role, 4, &palette);
        assert_eq!(a, b);
    }
}
