//! Video encoding profile.
//!
//! Every encoded artifact (per-frame clips, transition merges, the simple
//! fallback and the caption burn) uses this single profile so that clips can
//! be concatenated losslessly when transitions fail.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Default video bitrate
pub const DEFAULT_VIDEO_BITRATE: &str = "1500k";
/// Default pixel format
pub const DEFAULT_PIXEL_FORMAT: &str = "yuv420p";
/// Default audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Default audio bitrate
pub const DEFAULT_AUDIO_BITRATE: &str = "128k";

/// Thumbnail dimensions (portrait, downscaled title frame)
pub const THUMBNAIL_WIDTH: u32 = 270;
pub const THUMBNAIL_HEIGHT: u32 = 480;

/// Seconds of overlap between adjacent clips during a crossfade.
pub const CROSSFADE_SECS: f64 = 0.6;
/// Smallest transition offset handed to the xfade filter.
pub const MIN_TRANSITION_OFFSET_SECS: f64 = 0.1;

/// Video encoding configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EncodingConfig {
    /// Video codec
    #[serde(default = "default_video_codec")]
    pub codec: String,

    /// Target video bitrate
    #[serde(default = "default_video_bitrate")]
    pub video_bitrate: String,

    /// Output pixel format
    #[serde(default = "default_pixel_format")]
    pub pixel_format: String,

    /// Audio codec
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Audio bitrate
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,

    /// Move the moov atom to the front for progressive playback
    #[serde(default = "default_faststart")]
    pub faststart: bool,
}

fn default_video_codec() -> String {
    DEFAULT_VIDEO_CODEC.to_string()
}
fn default_video_bitrate() -> String {
    DEFAULT_VIDEO_BITRATE.to_string()
}
fn default_pixel_format() -> String {
    DEFAULT_PIXEL_FORMAT.to_string()
}
fn default_audio_codec() -> String {
    DEFAULT_AUDIO_CODEC.to_string()
}
fn default_audio_bitrate() -> String {
    DEFAULT_AUDIO_BITRATE.to_string()
}
fn default_faststart() -> bool {
    true
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            codec: DEFAULT_VIDEO_CODEC.to_string(),
            video_bitrate: DEFAULT_VIDEO_BITRATE.to_string(),
            pixel_format: DEFAULT_PIXEL_FORMAT.to_string(),
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
            faststart: true,
        }
    }
}

impl EncodingConfig {
    /// Create a new encoding configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Video-only output arguments (codec, bitrate, pixel format).
    pub fn video_args(&self) -> Vec<String> {
        vec![
            "-c:v".to_string(),
            self.codec.clone(),
            "-b:v".to_string(),
            self.video_bitrate.clone(),
            "-pix_fmt".to_string(),
            self.pixel_format.clone(),
        ]
    }

    /// Audio output arguments.
    pub fn audio_args(&self) -> Vec<String> {
        vec![
            "-c:a".to_string(),
            self.audio_codec.clone(),
            "-b:a".to_string(),
            self.audio_bitrate.clone(),
        ]
    }

    /// Container flags.
    pub fn container_args(&self) -> Vec<String> {
        if self.faststart {
            vec!["-movflags".to_string(), "+faststart".to_string()]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EncodingConfig::default();
        assert_eq!(config.codec, "libx264");
        assert_eq!(config.video_bitrate, "1500k");
        assert!(config.faststart);
    }

    #[test]
    fn test_ffmpeg_args() {
        let config = EncodingConfig::default();
        let args = config.video_args();
        assert!(args.contains(&"-c:v".to_string()));
        assert!(args.contains(&"yuv420p".to_string()));
        assert_eq!(config.audio_args()[1], "aac");
        assert_eq!(config.container_args(), vec!["-movflags", "+faststart"]);
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: EncodingConfig = serde_json::from_str(r#"{"video_bitrate":"2M"}"#).unwrap();
        assert_eq!(config.video_bitrate, "2M");
        assert_eq!(config.codec, DEFAULT_VIDEO_CODEC);
    }

    #[test]
    fn test_crossfade_leaves_room_for_offset() {
        assert!(MIN_TRANSITION_OFFSET_SECS > 0.0);
        assert!(CROSSFADE_SECS > MIN_TRANSITION_OFFSET_SECS);
    }
}
