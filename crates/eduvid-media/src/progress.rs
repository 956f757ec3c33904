//! FFmpeg progress reports.

use serde::{Deserialize, Serialize};

/// Progress snapshot parsed from `-progress pipe:2`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FfmpegProgress {
    /// Frames written so far
    pub frame: u64,
    /// Current encode rate in frames/second
    pub fps: f64,
    /// Output time in milliseconds
    pub out_time_ms: i64,
    /// Output time as string (HH:MM:SS.microseconds)
    pub out_time: String,
    /// Encoding speed relative to realtime
    pub speed: f64,
    /// Whether encoding is complete
    pub is_complete: bool,
}

impl FfmpegProgress {
    /// Percentage of a known frame count written so far.
    ///
    /// Still-image clips report `out_time` late, so frame counts are the
    /// better signal for the per-frame Ken Burns encodes.
    pub fn frame_percentage(&self, total_frames: u64) -> f64 {
        if total_frames == 0 {
            return 0.0;
        }
        ((self.frame as f64 / total_frames as f64) * 100.0).min(100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_percentage() {
        let progress = FfmpegProgress {
            frame: 90,
            ..Default::default()
        };

        assert!((progress.frame_percentage(180) - 50.0).abs() < 0.01);
        assert_eq!(progress.frame_percentage(0), 0.0);
    }
}
