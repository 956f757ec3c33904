//! Per-job accent colours.

use image::Rgb;

use crate::hash::stable_hash;

/// Accent colour pair used across every frame of one video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccentPalette {
    /// Badges, rules, glows and the current progress dot
    pub primary: Rgb<u8>,
    /// Title caption line
    pub glow: Rgb<u8>,
}

const PALETTES: [([u8; 3], [u8; 3]); 6] = [
    ([233, 69, 96], [255, 120, 140]),
    ([0, 180, 255], [100, 220, 255]),
    ([255, 107, 107], [255, 160, 160]),
    ([102, 192, 244], [160, 220, 255]),
    ([15, 220, 160], [80, 255, 200]),
    ([255, 180, 40], [255, 220, 100]),
];

impl AccentPalette {
    pub const COUNT: usize = PALETTES.len();

    pub fn at(index: usize) -> Self {
        let (primary, glow) = PALETTES[index % PALETTES.len()];
        Self {
            primary: Rgb(primary),
            glow: Rgb(glow),
        }
    }

    /// Palette chosen from a stable hash of the narration script.
    pub fn for_script(script: &str) -> Self {
        Self::at((stable_hash(script) % PALETTES.len() as u64) as usize)
    }
}

impl Default for AccentPalette {
    fn default() -> Self {
        Self::at(0)
    }
}
