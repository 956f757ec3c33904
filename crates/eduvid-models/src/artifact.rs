//! Artifact manifest returned by a successful job.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::SubtitleCue;

/// Everything a completed job publishes.
///
/// File names are relative to the configured output directory, which is how
/// the request layer serves them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoArtifact {
    /// Encoded video file name
    pub video_file: String,
    /// Thumbnail image file name
    pub thumbnail_file: String,
    /// Narration length in whole seconds (truncated)
    pub duration_secs: u32,
    /// Caption cues covering the full narration
    pub subtitles: Vec<SubtitleCue>,
}

impl VideoArtifact {
    /// Cues as the JSON text stored alongside the video record.
    pub fn subtitles_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.subtitles)
    }

    /// Absolute paths of the published files under `output_dir`.
    pub fn published_paths(&self, output_dir: &std::path::Path) -> [PathBuf; 2] {
        [
            output_dir.join(&self.video_file),
            output_dir.join(&self.thumbnail_file),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtitles_json() {
        let artifact = VideoArtifact {
            video_file: "eduvid_1_1700000000.mp4".to_string(),
            thumbnail_file: "thumb_1.png".to_string(),
            duration_secs: 15,
            subtitles: vec![SubtitleCue::new("hello there", 0.0, 15.0)],
        };

        let json = artifact.subtitles_json().unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains("hello there"));

        let paths = artifact.published_paths(std::path::Path::new("/out"));
        assert_eq!(paths[0], PathBuf::from("/out/eduvid_1_1700000000.mp4"));
        assert_eq!(paths[1], PathBuf::from("/out/thumb_1.png"));
    }
}
