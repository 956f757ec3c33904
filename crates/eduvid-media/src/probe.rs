//! FFprobe media information.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::command::{run_with_timeout, Toolchain};
use crate::error::{MediaError, MediaResult};

/// Seconds allowed for a single probe.
pub const PROBE_TIMEOUT_SECS: u64 = 15;

/// Media file information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Container duration in seconds
    pub duration: f64,
    /// Whether a video stream is present
    pub has_video: bool,
    /// Whether an audio stream is present
    pub has_audio: bool,
    /// Video width in pixels (0 without video)
    pub width: u32,
    /// Video height in pixels (0 without video)
    pub height: u32,
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    width: Option<u32>,
    height: Option<u32>,
}

/// Probe a media file (audio or video).
pub async fn probe_media(toolchain: &Toolchain, path: impl AsRef<Path>) -> MediaResult<MediaInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    let ffprobe = toolchain.resolve_ffprobe()?;

    let args = vec![
        "-v".to_string(),
        "quiet".to_string(),
        "-print_format".to_string(),
        "json".to_string(),
        "-show_format".to_string(),
        "-show_streams".to_string(),
        path.to_string_lossy().to_string(),
    ];

    let output = run_with_timeout(
        ffprobe,
        &args,
        None,
        Duration::from_secs(PROBE_TIMEOUT_SECS),
    )
    .await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: format!("FFprobe failed for {}", path.display()),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    parse_probe_output(&output.stdout)
}

/// Container duration of a media file in seconds.
pub async fn probe_duration(toolchain: &Toolchain, path: impl AsRef<Path>) -> MediaResult<f64> {
    let path = path.as_ref();
    let info = probe_media(toolchain, path).await?;
    if info.duration <= 0.0 {
        return Err(MediaError::InvalidMedia(format!(
            "{} reports no duration",
            path.display()
        )));
    }
    Ok(info.duration)
}

fn parse_probe_output(stdout: &[u8]) -> MediaResult<MediaInfo> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;

    let duration = probe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite())
        .unwrap_or(0.0);

    let video = probe.streams.iter().find(|s| s.codec_type == "video");
    let has_audio = probe.streams.iter().any(|s| s.codec_type == "audio");

    Ok(MediaInfo {
        duration,
        has_video: video.is_some(),
        has_audio,
        width: video.and_then(|s| s.width).unwrap_or(0),
        height: video.and_then(|s| s.height).unwrap_or(0),
    })
}
