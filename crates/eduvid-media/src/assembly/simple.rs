//! Static slideshow assembly used when the Ken Burns path fails.

use std::path::{Path, PathBuf};
use tracing::info;

use super::crossfade::concat_entry;
use crate::command::{FfmpegCommand, Toolchain};
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::is_non_empty_file;
use eduvid_models::{EncodingConfig, RenderSettings};

/// Timeout for the single slideshow encode.
pub const SIMPLE_TIMEOUT_SECS: u64 = 180;

/// Concat list holding each frame for its duration.
///
/// The last frame is listed again without a duration; the concat demuxer
/// otherwise ignores the final `duration` line.
pub fn slideshow_list(frames: &[PathBuf], durations: &[f64]) -> String {
    let mut list = String::new();
    for (frame, secs) in frames.iter().zip(durations) {
        list.push_str(&concat_entry(frame));
        list.push_str(&format!("\nduration {:.4}\n", secs));
    }
    if let Some(last) = frames.last() {
        list.push_str(&concat_entry(last));
        list.push('\n');
    }
    list
}

/// Encode frames as a hard-cut slideshow, with narration when available.
pub async fn assemble_slideshow(
    toolchain: &Toolchain,
    settings: &RenderSettings,
    encoding: &EncodingConfig,
    frames: &[PathBuf],
    durations: &[f64],
    audio: Option<&Path>,
    work_dir: &Path,
) -> MediaResult<PathBuf> {
    if frames.is_empty() {
        return Err(MediaError::invalid_input("no frames to assemble"));
    }

    let list_path = work_dir.join("concat.txt");
    tokio::fs::write(&list_path, slideshow_list(frames, durations)).await?;

    let output = work_dir.join("simple.mp4");
    let mut cmd = FfmpegCommand::new(&list_path, &output).concat_list_input();

    let audio = match audio {
        Some(audio) if is_non_empty_file(audio).await => Some(audio),
        _ => None,
    };
    if let Some(audio) = audio {
        cmd = cmd.add_input(audio);
    }

    cmd = cmd.encode_video(encoding).frame_rate(settings.fps);
    if audio.is_some() {
        cmd = cmd.encode_audio(encoding).shortest();
    }
    cmd = cmd.container(encoding);

    info!(frames = frames.len(), with_audio = audio.is_some(), "Encoding slideshow");
    toolchain
        .runner()
        .with_timeout(SIMPLE_TIMEOUT_SECS)
        .run(&cmd)
        .await?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slideshow_list_repeats_last_frame() {
        let frames = vec![PathBuf::from("/t/frame_000.png"), PathBuf::from("/t/frame_001.png")];
        let list = slideshow_list(&frames, &[7.5, 7.5]);
        assert_eq!(
            list,
            "file '/t/frame_000.png'\nduration 7.5000\n\
             file '/t/frame_001.png'\nduration 7.5000\n\
             file '/t/frame_001.png'\n"
        );
    }

    #[tokio::test]
    async fn test_no_frames_rejected() {
        let err = assemble_slideshow(
            &Toolchain::default(),
            &RenderSettings::default(),
            &EncodingConfig::default(),
            &[],
            &[],
            None,
            Path::new("/tmp"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, MediaError::InvalidInput(_)));
    }
}
