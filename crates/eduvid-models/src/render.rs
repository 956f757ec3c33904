//! Render settings and slide roles.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Default portrait output width.
pub const DEFAULT_WIDTH: u32 = 720;
/// Default portrait output height.
pub const DEFAULT_HEIGHT: u32 = 1280;
/// Default output frame rate.
pub const DEFAULT_FPS: u32 = 24;

/// Target output geometry and frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Validate)]
#[validate(schema(function = "validate_portrait"))]
pub struct RenderSettings {
    /// Output width in pixels
    #[validate(range(min = 64, max = 4096))]
    pub width: u32,
    /// Output height in pixels
    #[validate(range(min = 64, max = 4096))]
    pub height: u32,
    /// Frames per second
    #[validate(range(min = 1, max = 60))]
    pub fps: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            fps: DEFAULT_FPS,
        }
    }
}

impl RenderSettings {
    pub fn new(width: u32, height: u32, fps: u32) -> Self {
        Self { width, height, fps }
    }

    /// `WxH` as used by FFmpeg size options.
    pub fn size_arg(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

fn validate_portrait(settings: &RenderSettings) -> Result<(), ValidationError> {
    if settings.height <= settings.width {
        return Err(ValidationError::new("not_portrait"));
    }
    // yuv420p needs even dimensions
    if settings.width % 2 != 0 || settings.height % 2 != 0 {
        return Err(ValidationError::new("odd_dimensions"));
    }
    Ok(())
}

/// Role of a rendered frame within the video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlideRole {
    /// Opening frame carrying the question
    Title,
    /// Narration segment frame; `index` is 1-based
    Content { index: usize },
}

impl SlideRole {
    pub fn is_title(&self) -> bool {
        matches!(self, SlideRole::Title)
    }

    /// Position of this frame in the slide sequence (title is 0).
    pub fn slot(&self) -> usize {
        match self {
            SlideRole::Title => 0,
            SlideRole::Content { index } => *index,
        }
    }
}
