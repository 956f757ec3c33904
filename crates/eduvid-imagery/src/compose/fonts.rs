//! Font resolution and text rasterisation.
//!
//! A [`FontContext`] is built once per process and shared by reference with
//! every frame render. It holds a bold and a regular face; when no TrueType
//! file loads, both fall back to the built-in bitmap font so rendering never
//! fails for lack of fonts.

use fontdue::{Font, FontSettings};
use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::builtin_font;
use super::draw::blend_pixel;
use crate::error::{ImageryError, ImageryResult};

const BOLD_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSansBold.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
];

const REGULAR_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
];

/// Directory searched when no candidate path exists.
const FONT_ROOT: &str = "/usr/share/fonts";
const SCAN_DEPTH: usize = 4;

/// 8-bit coverage mask for one line of text.
#[derive(Debug, Clone)]
pub struct TextMask {
    pub width: u32,
    pub height: u32,
    pub coverage: Vec<u8>,
}

impl TextMask {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            coverage: vec![0; (width * height) as usize],
        }
    }

    fn stamp(&mut self, x: i64, y: i64, value: u8) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = (y as u32 * self.width + x as u32) as usize;
        self.coverage[idx] = self.coverage[idx].max(value);
    }

    pub fn at(&self, x: u32, y: u32) -> u8 {
        self.coverage[(y * self.width + x) as usize]
    }

    /// Blend the mask onto `img` with its top-left corner at `(x0, y0)`.
    pub fn draw_onto(&self, img: &mut RgbImage, x0: i64, y0: i64, color: Rgb<u8>, alpha: u8) {
        for y in 0..self.height {
            for x in 0..self.width {
                let cov = self.at(x, y) as u32;
                if cov == 0 {
                    continue;
                }
                let a = cov * alpha as u32 / 255;
                blend_pixel(img, x0 + x as i64, y0 + y as i64, color, a);
            }
        }
    }
}

/// A single typeface.
pub enum FontFace {
    TrueType { font: Box<Font>, path: PathBuf },
    Builtin,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FontFace::TrueType { path, .. } => f.debug_tuple("TrueType").field(path).finish(),
            FontFace::Builtin => f.write_str("Builtin"),
        }
    }
}

impl FontFace {
    /// Load a TrueType/OpenType file.
    pub fn load(path: &Path) -> ImageryResult<Self> {
        let bytes = std::fs::read(path)?;
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| ImageryError::Font(format!("{}: {}", path.display(), e)))?;
        Ok(FontFace::TrueType {
            font: Box::new(font),
            path: path.to_path_buf(),
        })
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, FontFace::Builtin)
    }

    /// Rasterise `text` as one line at `px` pixels.
    pub fn render_line(&self, text: &str, px: f32) -> TextMask {
        match self {
            FontFace::TrueType { font, .. } => render_truetype(font, text, px),
            FontFace::Builtin => render_builtin(text, px),
        }
    }
}

fn render_truetype(font: &Font, text: &str, px: f32) -> TextMask {
    let (ascent, descent) = font
        .horizontal_line_metrics(px)
        .map(|m| (m.ascent, m.descent))
        .unwrap_or((px * 0.8, -px * 0.2));

    let mut pen = 0.0f32;
    let mut prev: Option<char> = None;
    let mut glyphs = Vec::with_capacity(text.len());
    for c in text.chars() {
        if let Some(p) = prev {
            pen += font.horizontal_kern(p, c, px).unwrap_or(0.0);
        }
        let (metrics, bitmap) = font.rasterize(c, px);
        glyphs.push((pen, metrics, bitmap));
        pen += metrics.advance_width;
        prev = Some(c);
    }

    let mut mask = TextMask::new(pen.ceil().max(1.0) as u32, (ascent - descent).ceil().max(1.0) as u32);
    for (origin, metrics, bitmap) in glyphs {
        let gx = (origin + metrics.xmin as f32).round() as i64;
        let gy = (ascent - metrics.ymin as f32 - metrics.height as f32).round() as i64;
        for row in 0..metrics.height {
            for col in 0..metrics.width {
                let value = bitmap[row * metrics.width + col];
                if value > 0 {
                    mask.stamp(gx + col as i64, gy + row as i64, value);
                }
            }
        }
    }
    mask
}

fn render_builtin(text: &str, px: f32) -> TextMask {
    let scale = builtin_font::scale_for(px);
    let chars: Vec<char> = text.chars().collect();
    let width = (chars.len() as u32 * builtin_font::CELL_WIDTH * scale).max(1);
    let height = builtin_font::CELL_HEIGHT * scale;
    let mut mask = TextMask::new(width, height);

    for (i, &c) in chars.iter().enumerate() {
        let cell_x = i as u32 * builtin_font::CELL_WIDTH * scale;
        for col in 0..builtin_font::GLYPH_COLUMNS {
            for row in 0..builtin_font::GLYPH_ROWS {
                if !builtin_font::is_set(c, col, row) {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        mask.stamp(
                            (cell_x + col * scale + dx) as i64,
                            (row * scale + dy) as i64,
                            255,
                        );
                    }
                }
            }
        }
    }
    mask
}

/// Where text is anchored relative to the given point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Horizontally and vertically centred
    Centre,
    /// Left edge, vertically centred
    LeftMiddle,
}

/// Draw one line of text onto `img`.
#[allow(clippy::too_many_arguments)]
pub fn draw_text(
    img: &mut RgbImage,
    face: &FontFace,
    text: &str,
    px: f32,
    anchor: Anchor,
    x: i64,
    y: i64,
    color: Rgb<u8>,
    alpha: u8,
) {
    let mask = face.render_line(text, px);
    let top = y - mask.height as i64 / 2;
    let left = match anchor {
        Anchor::Centre => x - mask.width as i64 / 2,
        Anchor::LeftMiddle => x,
    };
    mask.draw_onto(img, left, top, color, alpha);
}

/// Which font source frames are rendered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    TrueType { bold: PathBuf, regular: PathBuf },
    Builtin,
}

impl std::fmt::Display for FontSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FontSource::TrueType { bold, regular } => {
                write!(f, "truetype (bold: {}, regular: {})", bold.display(), regular.display())
            }
            FontSource::Builtin => f.write_str("builtin bitmap font"),
        }
    }
}

/// Resolved faces shared by all frame renders.
#[derive(Debug)]
pub struct FontContext {
    bold: FontFace,
    regular: FontFace,
}

impl FontContext {
    /// Bitmap-only context.
    pub fn builtin() -> Self {
        Self {
            bold: FontFace::Builtin,
            regular: FontFace::Builtin,
        }
    }

    pub fn new(bold: FontFace, regular: FontFace) -> Self {
        Self { bold, regular }
    }

    /// Resolve fonts from `extra_paths` first, then well-known system paths.
    ///
    /// A missing regular face reuses the bold one; a missing bold face reuses
    /// the regular one.
    pub fn discover(extra_paths: &[PathBuf]) -> Self {
        let bold = first_loadable(extra_paths, BOLD_CANDIDATES, "Bold");
        let regular = first_loadable(extra_paths, REGULAR_CANDIDATES, "Sans");

        let context = match (bold, regular) {
            (Some(bold), Some(regular)) => Self::new(bold, regular),
            (Some(bold), None) => {
                let regular = reload(&bold);
                Self::new(bold, regular)
            }
            (None, Some(regular)) => {
                let bold = reload(&regular);
                Self::new(bold, regular)
            }
            (None, None) => {
                warn!("No TrueType font found, using the built-in bitmap font");
                Self::builtin()
            }
        };
        info!(source = %context.source(), "Fonts resolved");
        context
    }

    pub fn bold(&self) -> &FontFace {
        &self.bold
    }

    pub fn regular(&self) -> &FontFace {
        &self.regular
    }

    pub fn source(&self) -> FontSource {
        match (&self.bold, &self.regular) {
            (FontFace::TrueType { path: bold, .. }, FontFace::TrueType { path: regular, .. }) => {
                FontSource::TrueType {
                    bold: bold.clone(),
                    regular: regular.clone(),
                }
            }
            _ => FontSource::Builtin,
        }
    }
}

fn reload(face: &FontFace) -> FontFace {
    match face {
        FontFace::TrueType { path, .. } => FontFace::load(path).unwrap_or(FontFace::Builtin),
        FontFace::Builtin => FontFace::Builtin,
    }
}

fn first_loadable(extra: &[PathBuf], candidates: &[&str], scan_hint: &str) -> Option<FontFace> {
    let listed = extra
        .iter()
        .cloned()
        .chain(candidates.iter().map(PathBuf::from))
        .filter(|p| p.is_file());

    for path in listed.chain(scan_fonts(Path::new(FONT_ROOT), scan_hint, SCAN_DEPTH)) {
        match FontFace::load(&path) {
            Ok(face) => return Some(face),
            Err(e) => debug!(path = %path.display(), error = %e, "Skipping font"),
        }
    }
    None
}

/// `.ttf` files under `root` whose name contains `hint`, depth-limited.
fn scan_fonts(root: &Path, hint: &str, depth: usize) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let Ok(entries) = std::fs::read_dir(root) else {
        return found;
    };
    let mut entries: Vec<_> = entries.flatten().map(|e| e.path()).collect();
    entries.sort();

    for path in entries {
        if path.is_dir() {
            if depth > 0 {
                found.extend(scan_fonts(&path, hint, depth - 1));
            }
        } else if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("ttf"))
            && path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().contains(hint))
        {
            found.push(path);
        }
    }
    found
}
