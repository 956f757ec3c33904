//! Transition merge with a concat fallback.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::STAGE_TIMEOUT_SECS;
use crate::command::{FfmpegCommand, Toolchain};
use crate::error::{MediaError, MediaResult};
use crate::filters::{transition_offset, xfade_filter, Transition};
use crate::probe::probe_duration;
use eduvid_models::encoding::CROSSFADE_SECS;
use eduvid_models::EncodingConfig;

/// Concat demuxer list line for `path`.
pub fn concat_entry(path: &Path) -> String {
    // Single quotes close, escape, reopen
    format!("file '{}'", path.to_string_lossy().replace('\'', "'\\''"))
}

/// Build the command crossfading `upstream` into `next`.
pub fn xfade_command(
    upstream: &Path,
    next: &Path,
    transition: Transition,
    offset_secs: f64,
    encoding: &EncodingConfig,
    output: &Path,
) -> FfmpegCommand {
    FfmpegCommand::new(upstream, output)
        .add_input(next)
        .filter_complex(xfade_filter(
            transition,
            CROSSFADE_SECS,
            offset_secs,
            &encoding.pixel_format,
        ))
        .map("[v]")
        .video_codec(encoding.codec.clone())
        .output_args(["-b:v", encoding.video_bitrate.as_str()])
        .container(encoding)
        .no_audio()
}

/// Chain pairwise crossfades: `(c0 x c1) x c2 ...`.
pub async fn xfade_chain(
    toolchain: &Toolchain,
    encoding: &EncodingConfig,
    clips: &[PathBuf],
    work_dir: &Path,
) -> MediaResult<PathBuf> {
    let (first, rest) = clips
        .split_first()
        .ok_or_else(|| MediaError::invalid_input("no clips to merge"))?;

    let runner = toolchain.runner().with_timeout(STAGE_TIMEOUT_SECS);
    let mut current = first.clone();

    for (offset_index, next) in rest.iter().enumerate() {
        let index = offset_index + 1;
        let transition = Transition::for_merge(index);
        let upstream_secs = probe_duration(toolchain, &current).await?;
        let offset = transition_offset(upstream_secs, CROSSFADE_SECS);
        let output = work_dir.join(format!("xfade_{:03}.mp4", index));

        info!(
            merge = index,
            total = rest.len(),
            transition = transition.as_str(),
            offset,
            "Crossfading clips"
        );
        let cmd = xfade_command(&current, next, transition, offset, encoding, &output);
        runner.run(&cmd).await?;
        current = output;
    }

    Ok(current)
}

/// Losslessly join clips with the concat demuxer (hard cuts).
pub async fn concat_clips(
    toolchain: &Toolchain,
    encoding: &EncodingConfig,
    clips: &[PathBuf],
    work_dir: &Path,
) -> MediaResult<PathBuf> {
    let list_path = work_dir.join("clips.txt");
    let list: String = clips
        .iter()
        .map(|clip| concat_entry(clip) + "\n")
        .collect();
    tokio::fs::write(&list_path, list).await?;

    let output = work_dir.join("merged.mp4");
    let cmd = FfmpegCommand::new(&list_path, &output)
        .concat_list_input()
        .copy_video()
        .container(encoding);
    toolchain
        .runner()
        .with_timeout(STAGE_TIMEOUT_SECS)
        .run(&cmd)
        .await?;
    Ok(output)
}

/// Merge clips into one video: crossfades first, concat on any failure.
pub async fn merge_clips(
    toolchain: &Toolchain,
    encoding: &EncodingConfig,
    clips: &[PathBuf],
    work_dir: &Path,
) -> MediaResult<PathBuf> {
    match clips {
        [] => Err(MediaError::invalid_input("no clips to merge")),
        [only] => Ok(only.clone()),
        _ => match xfade_chain(toolchain, encoding, clips, work_dir).await {
            Ok(merged) => Ok(merged),
            Err(e) => {
                warn!(error = %e, stderr = e.stderr().unwrap_or(""), "Crossfade failed, using plain concat");
                metrics::counter!("eduvid_crossfade_fallbacks_total").increment(1);
                concat_clips(toolchain, encoding, clips, work_dir).await
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_concat_entry_quotes() {
        assert_eq!(concat_entry(Path::new("/tmp/clip_000.mp4")), "file '/tmp/clip_000.mp4'");
        assert_eq!(
            concat_entry(Path::new("/tmp/it's/clip.mp4")),
            "file '/tmp/it'\\''s/clip.mp4'"
        );
    }

    #[test]
    fn test_xfade_command() {
        let args = xfade_command(
            Path::new("clip_000.mp4"),
            Path::new("clip_001.mp4"),
            Transition::for_merge(1),
            7.5,
            &EncodingConfig::default(),
            Path::new("xfade_001.mp4"),
        )
        .build_args();

        assert!(args.iter().any(|a| a.contains("xfade=transition=fadeblack:duration=0.60:offset=7.50")));
        let map_pos = args.iter().position(|a| a == "-map").unwrap();
        assert_eq!(args[map_pos + 1], "[v]");
        assert!(args.contains(&"+faststart".to_string()));
        assert!(args.contains(&"-an".to_string()));
    }

    #[tokio::test]
    async fn test_single_clip_passes_through() {
        let clips = vec![PathBuf::from("/tmp/clip_000.mp4")];
        let merged = merge_clips(
            &Toolchain::default(),
            &EncodingConfig::default(),
            &clips,
            Path::new("/tmp"),
        )
        .await
        .unwrap();
        assert_eq!(merged, clips[0]);
    }

    #[tokio::test]
    async fn test_fallback_writes_concat_list() {
        let dir = TempDir::new().unwrap();
        let clips = vec![dir.path().join("clip_000.mp4"), dir.path().join("clip_001.mp4")];
        let toolchain = Toolchain::new("/nonexistent/ffmpeg", "/nonexistent/ffprobe");

        // Both paths fail without binaries, but the concat list is still written
        let result = merge_clips(&toolchain, &EncodingConfig::default(), &clips, dir.path()).await;
        assert!(result.is_err());

        let list = tokio::fs::read_to_string(dir.path().join("clips.txt")).await.unwrap();
        assert_eq!(list.lines().count(), 2);
        assert!(list.lines().all(|l| l.starts_with("file '")));
    }
}
