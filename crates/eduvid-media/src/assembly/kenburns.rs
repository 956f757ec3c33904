//! Per-frame pan/zoom clips.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::STAGE_TIMEOUT_SECS;
use crate::command::{FfmpegCommand, Toolchain};
use crate::error::{MediaError, MediaResult};
use crate::filters::{clip_frame_count, zoompan_filter, CameraMotion};
use eduvid_models::encoding::CROSSFADE_SECS;
use eduvid_models::{EncodingConfig, RenderSettings};

/// Timing for one animated clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipPlan {
    pub index: usize,
    pub motion: CameraMotion,
    /// Clip length including the crossfade overlap
    pub clip_secs: f64,
    pub frames: u64,
}

/// Plan every clip: all but the last are extended by the crossfade overlap.
pub fn plan_clips(durations: &[f64], fps: u32) -> Vec<ClipPlan> {
    let last = durations.len().saturating_sub(1);
    durations
        .iter()
        .enumerate()
        .map(|(index, &secs)| {
            let overlap = if index < last { CROSSFADE_SECS } else { 0.0 };
            let clip_secs = secs + overlap;
            ClipPlan {
                index,
                motion: CameraMotion::for_index(index),
                clip_secs,
                frames: clip_frame_count(clip_secs, fps),
            }
        })
        .collect()
}

/// Path of the clip rendered for frame `index`.
pub fn clip_path(work_dir: &Path, index: usize) -> PathBuf {
    work_dir.join(format!("clip_{:03}.mp4", index))
}

/// Build the command animating one still frame.
pub fn clip_command(
    frame: &Path,
    plan: &ClipPlan,
    settings: &RenderSettings,
    encoding: &EncodingConfig,
    output: &Path,
) -> FfmpegCommand {
    FfmpegCommand::new(frame, output)
        .loop_input()
        .video_filter(zoompan_filter(plan.motion, plan.frames, settings))
        .duration(plan.clip_secs)
        .encode_video(encoding)
        .no_audio()
}

/// Render one clip per frame. Any clip failure fails the whole stage.
pub async fn render_clips(
    toolchain: &Toolchain,
    settings: &RenderSettings,
    encoding: &EncodingConfig,
    frames: &[PathBuf],
    durations: &[f64],
    work_dir: &Path,
) -> MediaResult<Vec<PathBuf>> {
    if frames.is_empty() || frames.len() != durations.len() {
        return Err(MediaError::invalid_input(format!(
            "{} frames for {} durations",
            frames.len(),
            durations.len()
        )));
    }

    let runner = toolchain.runner().with_timeout(STAGE_TIMEOUT_SECS);
    let plans = plan_clips(durations, settings.fps);
    let mut clips = Vec::with_capacity(plans.len());

    for (frame, plan) in frames.iter().zip(&plans) {
        let output = clip_path(work_dir, plan.index);
        info!(
            clip = plan.index + 1,
            total = plans.len(),
            motion = plan.motion.as_str(),
            "Rendering Ken Burns clip"
        );
        let cmd = clip_command(frame, plan, settings, encoding, &output);
        let total_frames = plan.frames;
        runner
            .run_with_progress(&cmd, move |progress| {
                debug!(percent = progress.frame_percentage(total_frames), "clip progress");
            })
            .await?;
        clips.push(output);
    }

    Ok(clips)
}
