//! Caption burn-in.
//!
//! - `CaptionStyle`: builder for the ASS `force_style` override
//! - `burn_captions`: renders SRT cues into the frames, or passes the input
//!   through untouched when the burn fails

use std::path::Path;
use tracing::{info, warn};

use super::STAGE_TIMEOUT_SECS;
use crate::command::{FfmpegCommand, Toolchain};
use crate::error::MediaResult;
use crate::filters::escape_filter_path;
use crate::fs_utils::{is_non_empty_file, move_file};
use eduvid_models::EncodingConfig;

/// On-screen caption styling.
///
/// ```ignore
/// let style = CaptionStyle::default().with_font_size(28).with_margin(80);
/// ```
#[derive(Debug, Clone)]
pub struct CaptionStyle {
    pub font_name: String,
    pub font_size: u32,
    pub bold: bool,
    /// Outline thickness in pixels
    pub outline: u32,
    /// Distance from the bottom edge in pixels
    pub margin_v: u32,
    /// `&HAABBGGRR` colours as libass expects them
    pub primary_colour: String,
    pub outline_colour: String,
    pub back_colour: String,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font_name: "DejaVu Sans".to_string(),
            font_size: 24,
            bold: true,
            outline: 2,
            margin_v: 50,
            primary_colour: "&H00FFFFFF".to_string(),
            outline_colour: "&H00000000".to_string(),
            back_colour: "&H80000000".to_string(),
        }
    }
}

impl CaptionStyle {
    pub fn with_font(mut self, name: impl Into<String>) -> Self {
        self.font_name = name.into();
        self
    }

    pub fn with_font_size(mut self, size: u32) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_margin(mut self, margin_v: u32) -> Self {
        self.margin_v = margin_v;
        self
    }

    /// `force_style` value; alignment 2 is bottom centre.
    pub fn force_style(&self) -> String {
        format!(
            "FontSize={},FontName={},PrimaryColour={},OutlineColour={},BackColour={},\
             BorderStyle=1,Outline={},Shadow=0,MarginV={},Bold={},Alignment=2",
            self.font_size,
            self.font_name,
            self.primary_colour,
            self.outline_colour,
            self.back_colour,
            self.outline,
            self.margin_v,
            u8::from(self.bold)
        )
    }

    /// Full `subtitles` filter for an SRT file.
    pub fn filter(&self, srt_path: &Path) -> String {
        format!(
            "subtitles={}:force_style='{}'",
            escape_filter_path(&srt_path.to_string_lossy()),
            self.force_style()
        )
    }
}

/// Whether the output carries burned captions or is an uncaptioned copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionOutcome {
    Burned,
    PassedThrough,
}

/// Burn `srt_path` into `input`, writing `output`.
///
/// Any failure (missing or empty SRT, FFmpeg error, timeout) moves `input` to
/// `output` unchanged. Only a failure of that move is an error.
pub async fn burn_captions(
    toolchain: &Toolchain,
    encoding: &EncodingConfig,
    style: &CaptionStyle,
    input: &Path,
    srt_path: Option<&Path>,
    output: &Path,
) -> MediaResult<CaptionOutcome> {
    let srt = match srt_path {
        Some(srt) if is_non_empty_file(srt).await => srt,
        _ => {
            info!("No captions to burn, publishing uncaptioned video");
            move_file(input, output).await?;
            return Ok(CaptionOutcome::PassedThrough);
        }
    };

    let cmd = FfmpegCommand::new(input, output)
        .video_filter(style.filter(srt))
        .audio_codec("copy")
        .encode_video(encoding);

    match toolchain
        .runner()
        .with_timeout(STAGE_TIMEOUT_SECS)
        .run(&cmd)
        .await
    {
        Ok(()) if is_non_empty_file(output).await => Ok(CaptionOutcome::Burned),
        Ok(()) => {
            warn!("Caption burn produced no output, copying without captions");
            move_file(input, output).await?;
            Ok(CaptionOutcome::PassedThrough)
        }
        Err(e) => {
            warn!(error = %e, stderr = e.stderr().unwrap_or(""), "Caption burn failed, copying without captions");
            metrics::counter!("eduvid_caption_fallbacks_total").increment(1);
            move_file(input, output).await?;
            Ok(CaptionOutcome::PassedThrough)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_force_style() {
        assert_eq!(
            CaptionStyle::default().force_style(),
            "FontSize=24,FontName=DejaVu Sans,PrimaryColour=&H00FFFFFF,OutlineColour=&H00000000,\
             BackColour=&H80000000,BorderStyle=1,Outline=2,Shadow=0,MarginV=50,Bold=1,Alignment=2"
        );
    }

    #[test]
    fn test_builder() {
        let style = CaptionStyle::default().with_font_size(30).with_margin(80).with_font("Inter");
        let forced = style.force_style();
        assert!(forced.contains("FontSize=30"));
        assert!(forced.contains("MarginV=80"));
        assert!(forced.contains("FontName=Inter"));
    }

    #[test]
    fn test_filter_escapes_path() {
        let filter = CaptionStyle::default().filter(Path::new("/tmp/job:1/subs.srt"));
        assert!(filter.starts_with("subtitles=/tmp/job\\:1/subs.srt:force_style='"));
        assert!(filter.ends_with("Alignment=2'"));
    }

    #[tokio::test]
    async fn test_failed_burn_passes_input_through() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("with_audio.mp4");
        let srt = dir.path().join("subs.srt");
        let output = dir.path().join("final.mp4");
        tokio::fs::write(&input, b"video").await.unwrap();
        tokio::fs::write(&srt, b"1\n00:00:00,000 --> 00:00:01,000\nhi\n").await.unwrap();

        let toolchain = Toolchain::new("/nonexistent/ffmpeg", "/nonexistent/ffprobe");
        let outcome = burn_captions(
            &toolchain,
            &EncodingConfig::default(),
            &CaptionStyle::default(),
            &input,
            Some(&srt),
            &output,
        )
        .await
        .unwrap();

        assert_eq!(outcome, CaptionOutcome::PassedThrough);
        assert_eq!(tokio::fs::read(&output).await.unwrap(), b"video");
        assert!(!input.exists());
    }

    #[tokio::test]
    async fn test_missing_srt_passes_through() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.mp4");
        let output = dir.path().join("out.mp4");
        tokio::fs::write(&input, b"video").await.unwrap();

        let outcome = burn_captions(
            &Toolchain::default(),
            &EncodingConfig::default(),
            &CaptionStyle::default(),
            &input,
            None,
            &output,
        )
        .await
        .unwrap();
        assert_eq!(outcome, CaptionOutcome::PassedThrough);
        assert!(output.exists());
    }
}
