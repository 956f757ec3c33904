//! Narration mux.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::STAGE_TIMEOUT_SECS;
use crate::command::{FfmpegCommand, Toolchain};
use crate::fs_utils::is_non_empty_file;
use eduvid_models::EncodingConfig;

pub fn mux_command(video: &Path, audio: &Path, encoding: &EncodingConfig, output: &Path) -> FfmpegCommand {
    FfmpegCommand::new(video, output)
        .add_input(audio)
        .copy_video()
        .encode_audio(encoding)
        .shortest()
        .container(encoding)
}

/// Attach `audio` to `video`, stopping at the shorter stream.
///
/// Returns the muxed file, or `video` itself when there is no usable audio or
/// the mux fails.
pub async fn mux_audio(
    toolchain: &Toolchain,
    encoding: &EncodingConfig,
    video: &Path,
    audio: Option<&Path>,
    work_dir: &Path,
) -> PathBuf {
    let audio = match audio {
        Some(audio) if is_non_empty_file(audio).await => audio,
        _ => {
            info!("No narration audio, continuing video-only");
            return video.to_path_buf();
        }
    };

    let output = work_dir.join("with_audio.mp4");
    let cmd = mux_command(video, audio, encoding, &output);
    match toolchain
        .runner()
        .with_timeout(STAGE_TIMEOUT_SECS)
        .run(&cmd)
        .await
    {
        Ok(()) => output,
        Err(e) => {
            warn!(error = %e, stderr = e.stderr().unwrap_or(""), "Audio mux failed, continuing video-only");
            metrics::counter!("eduvid_mux_fallbacks_total").increment(1);
            video.to_path_buf()
        }
    }
}
