//! Motion assembly: still frames to a captioned, narrated video.
//!
//! The primary path animates each frame, crossfades the clips, muxes the
//! narration and burns captions. Each stage has its own fallback (concat,
//! video-only, uncaptioned copy). If the primary path still fails, a static
//! slideshow (narration included) is encoded instead and goes through the same
//! caption burn. Only when both paths fail does assembly return an error.

pub mod captions;
pub mod crossfade;
pub mod kenburns;
pub mod mux;
pub mod simple;

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::command::Toolchain;
use crate::error::{MediaError, MediaResult};
use eduvid_models::{EncodingConfig, RenderSettings};

pub use captions::{burn_captions, CaptionOutcome, CaptionStyle};
pub use crossfade::merge_clips;
pub use kenburns::{plan_clips, render_clips, ClipPlan};
pub use mux::mux_audio;
pub use simple::assemble_slideshow;

/// Timeout for each clip, merge, mux and caption encode.
pub const STAGE_TIMEOUT_SECS: u64 = 120;

/// Everything assembly reads and where it writes.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyRequest<'a> {
    /// Rendered frames in slide order
    pub frames: &'a [PathBuf],
    /// Seconds each frame stays on screen
    pub durations: &'a [f64],
    pub audio: Option<&'a Path>,
    /// SRT file with the caption cues
    pub subtitles: Option<&'a Path>,
    /// Scratch directory for intermediate clips
    pub work_dir: &'a Path,
    pub output: &'a Path,
}

/// Which assembly path produced the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyPath {
    KenBurns,
    Slideshow,
}

impl AssemblyPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssemblyPath::KenBurns => "ken_burns",
            AssemblyPath::Slideshow => "slideshow",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyReport {
    pub path: AssemblyPath,
    pub captions: CaptionOutcome,
}

/// Drives the assembly stages with one encoding profile.
#[derive(Debug, Clone)]
pub struct Assembler {
    toolchain: Toolchain,
    settings: RenderSettings,
    encoding: EncodingConfig,
    caption_style: CaptionStyle,
}

impl Assembler {
    pub fn new(toolchain: Toolchain, settings: RenderSettings) -> Self {
        Self {
            toolchain,
            settings,
            encoding: EncodingConfig::default(),
            caption_style: CaptionStyle::default(),
        }
    }

    pub fn with_encoding(mut self, encoding: EncodingConfig) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_caption_style(mut self, style: CaptionStyle) -> Self {
        self.caption_style = style;
        self
    }

    /// Assemble the final video at `request.output`.
    pub async fn assemble(&self, request: AssemblyRequest<'_>) -> MediaResult<AssemblyReport> {
        if request.frames.is_empty() || request.frames.len() != request.durations.len() {
            return Err(MediaError::invalid_input(format!(
                "{} frames for {} durations",
                request.frames.len(),
                request.durations.len()
            )));
        }

        match self.ken_burns(&request).await {
            Ok(captions) => Ok(AssemblyReport {
                path: AssemblyPath::KenBurns,
                captions,
            }),
            Err(primary) => {
                warn!(
                    error = %primary,
                    stderr = primary.stderr().unwrap_or(""),
                    "Ken Burns assembly failed, falling back to slideshow"
                );
                metrics::counter!("eduvid_assembly_fallbacks_total").increment(1);

                let captions = self.slideshow(&request).await.map_err(|fallback| {
                    MediaError::ffmpeg_failed(
                        format!("assembly failed: {primary}; slideshow fallback failed: {fallback}"),
                        fallback.stderr().map(str::to_string),
                        None,
                    )
                })?;
                Ok(AssemblyReport {
                    path: AssemblyPath::Slideshow,
                    captions,
                })
            }
        }
    }

    async fn ken_burns(&self, request: &AssemblyRequest<'_>) -> MediaResult<CaptionOutcome> {
        let clips = render_clips(
            &self.toolchain,
            &self.settings,
            &self.encoding,
            request.frames,
            request.durations,
            request.work_dir,
        )
        .await?;

        let merged = merge_clips(&self.toolchain, &self.encoding, &clips, request.work_dir).await?;
        let with_audio = mux_audio(
            &self.toolchain,
            &self.encoding,
            &merged,
            request.audio,
            request.work_dir,
        )
        .await;

        info!(path = AssemblyPath::KenBurns.as_str(), "Burning captions");
        burn_captions(
            &self.toolchain,
            &self.encoding,
            &self.caption_style,
            &with_audio,
            request.subtitles,
            request.output,
        )
        .await
    }

    async fn slideshow(&self, request: &AssemblyRequest<'_>) -> MediaResult<CaptionOutcome> {
        let video = assemble_slideshow(
            &self.toolchain,
            &self.settings,
            &self.encoding,
            request.frames,
            request.durations,
            request.audio,
            request.work_dir,
        )
        .await?;

        info!(path = AssemblyPath::Slideshow.as_str(), "Burning captions");
        burn_captions(
            &self.toolchain,
            &self.encoding,
            &self.caption_style,
            &video,
            request.subtitles,
            request.output,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_both_paths_fail_without_ffmpeg() {
        let dir = TempDir::new().unwrap();
        let frames = vec![dir.path().join("frame_000.png"), dir.path().join("frame_001.png")];
        let output = dir.path().join("final.mp4");
        let assembler = Assembler::new(
            Toolchain::new("/nonexistent/ffmpeg", "/nonexistent/ffprobe"),
            RenderSettings::default(),
        );

        let err = assembler
            .assemble(AssemblyRequest {
                frames: &frames,
                durations: &[7.5, 7.5],
                audio: None,
                subtitles: None,
                work_dir: dir.path(),
                output: &output,
            })
            .await
            .unwrap_err();

        assert!(err.to_string().contains("slideshow fallback failed"));
        assert!(!output.exists());
        // The slideshow list was written before the encode was attempted
        assert!(dir.path().join("concat.txt").exists());
    }

    #[tokio::test]
    async fn test_mismatched_request_rejected() {
        let assembler = Assembler::new(Toolchain::default(), RenderSettings::default());
        let frames = vec![PathBuf::from("a.png")];
        let err = assembler
            .assemble(AssemblyRequest {
                frames: &frames,
                durations: &[],
                audio: None,
                subtitles: None,
                work_dir: Path::new("/tmp"),
                output: Path::new("/tmp/out.mp4"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::InvalidInput(_)));
    }

    #[tokio::test]
    #[ignore] // Requires FFmpeg
    async fn test_ken_burns_path_with_ffmpeg() {
        use image::{Rgb, RgbImage};

        let dir = TempDir::new().unwrap();
        let frames: Vec<PathBuf> = (0..2)
            .map(|i| {
                let path = dir.path().join(format!("frame_{i:03}.png"));
                RgbImage::from_pixel(180, 320, Rgb([40 * i as u8, 80, 160]))
                    .save(&path)
                    .unwrap();
                path
            })
            .collect();
        let srt = dir.path().join("subtitles.srt");
        std::fs::write(&srt, "1\n00:00:00,000 --> 00:00:02,000\nHello there\n\n").unwrap();
        let output = dir.path().join("final.mp4");

        let toolchain = Toolchain::default();
        let report = Assembler::new(toolchain.clone(), RenderSettings::new(180, 320, 24))
            .assemble(AssemblyRequest {
                frames: &frames,
                durations: &[2.0, 2.0],
                audio: None,
                subtitles: Some(&srt),
                work_dir: dir.path(),
                output: &output,
            })
            .await
            .unwrap();

        assert_eq!(report.path, AssemblyPath::KenBurns);
        let duration = crate::probe::probe_duration(&toolchain, &output).await.unwrap();
        assert!((duration - 4.0).abs() < 0.5, "duration {duration}");
    }
}
