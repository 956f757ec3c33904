//! Worker configuration.

use std::path::PathBuf;
use std::str::FromStr;

use eduvid_imagery::compose::DEFAULT_BRAND;
use eduvid_imagery::SourcingConfig;
use eduvid_media::{CaptionStyle, SpeechConfig, Toolchain};
use eduvid_models::{EncodingConfig, RenderSettings};
use validator::Validate;

use crate::error::{WorkerError, WorkerResult};

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Output geometry and frame rate
    pub render: RenderSettings,
    /// Where finished videos and thumbnails are published
    pub output_dir: PathBuf,
    /// Root for per-job scratch directories
    pub temp_dir: PathBuf,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    /// External text-to-speech command
    pub speech: SpeechConfig,
    /// Image provider endpoints and pool sizes
    pub sourcing: SourcingConfig,
    /// Font files tried before the system candidates
    pub font_paths: Vec<PathBuf>,
    /// Footer text on title frames
    pub brand_name: String,
    /// Maximum jobs the executor runs at once
    pub max_concurrent_jobs: usize,
    /// Profile shared by every encode
    pub encoding: EncodingConfig,
    /// Font family libass uses for burned captions
    pub caption_font: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            render: RenderSettings::default(),
            output_dir: PathBuf::from("./generated_videos"),
            temp_dir: PathBuf::from("./temp"),
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            speech: SpeechConfig::default(),
            sourcing: SourcingConfig::default(),
            font_paths: Vec::new(),
            brand_name: DEFAULT_BRAND.to_string(),
            max_concurrent_jobs: 2,
            encoding: EncodingConfig::default(),
            caption_font: CaptionStyle::default().font_name,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let speech_defaults = SpeechConfig::default();

        let speech = SpeechConfig {
            command: env_string("TTS_COMMAND", &speech_defaults.command),
            args: std::env::var("TTS_ARGS")
                .ok()
                .map(|s| s.split_whitespace().map(String::from).collect::<Vec<_>>())
                .filter(|args| !args.is_empty())
                .unwrap_or(speech_defaults.args),
            timeout_secs: env_or("TTS_TIMEOUT_SECS", speech_defaults.timeout_secs),
        };

        let sourcing = SourcingConfig {
            photo_search_url: env_string("PHOTO_SEARCH_URL", &defaults.sourcing.photo_search_url),
            ai_image_url: env_string("AI_IMAGE_URL", &defaults.sourcing.ai_image_url),
            download_workers: env_or("IMAGE_DOWNLOAD_WORKERS", defaults.sourcing.download_workers),
            generation_workers: env_or("IMAGE_GENERATION_WORKERS", defaults.sourcing.generation_workers),
        };

        Self {
            render: RenderSettings::new(
                env_or("VIDEO_WIDTH", defaults.render.width),
                env_or("VIDEO_HEIGHT", defaults.render.height),
                env_or("VIDEO_FPS", defaults.render.fps),
            ),
            output_dir: std::env::var_os("VIDEO_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            temp_dir: std::env::var_os("VIDEO_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.temp_dir),
            ffmpeg_path: env_string("FFMPEG_PATH", &defaults.ffmpeg_path),
            ffprobe_path: env_string("FFPROBE_PATH", &defaults.ffprobe_path),
            speech,
            sourcing,
            font_paths: std::env::var_os("FONT_PATHS")
                .map(|paths| std::env::split_paths(&paths).collect())
                .unwrap_or_default(),
            brand_name: env_string("BRAND_NAME", &defaults.brand_name),
            max_concurrent_jobs: env_or("WORKER_MAX_JOBS", defaults.max_concurrent_jobs),
            encoding: EncodingConfig {
                video_bitrate: env_string("VIDEO_BITRATE", &defaults.encoding.video_bitrate),
                ..defaults.encoding
            },
            caption_font: env_string("CAPTION_FONT", &defaults.caption_font),
        }
    }

    /// Reject settings the pipeline cannot render.
    pub fn validate(&self) -> WorkerResult<()> {
        self.render
            .validate()
            .map_err(|e| WorkerError::config_error(format!("invalid render settings: {e}")))?;
        if self.max_concurrent_jobs == 0 {
            return Err(WorkerError::config_error("WORKER_MAX_JOBS must be at least 1"));
        }
        if self.speech.command.trim().is_empty() {
            return Err(WorkerError::config_error("TTS_COMMAND is empty"));
        }
        Ok(())
    }

    pub fn caption_style(&self) -> CaptionStyle {
        CaptionStyle::default().with_font(self.caption_font.clone())
    }

    pub fn toolchain(&self) -> Toolchain {
        Toolchain::new(&self.ffmpeg_path, &self.ffprobe_path)
    }
}
