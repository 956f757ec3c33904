//! Subtitle cue model.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A timed subtitle unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SubtitleCue {
    /// Words shown while the cue is active
    pub text: String,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
}

impl SubtitleCue {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Cue length in seconds.
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_json_shape() {
        let cue = SubtitleCue::new("The sun is a star.", 0.0, 1.5);
        let json = serde_json::to_value(&cue).unwrap();
        assert_eq!(json["text"], "The sun is a star.");
        assert_eq!(json["start"], 0.0);
        assert_eq!(json["end"], 1.5);
    }

    #[test]
    fn test_duration_never_negative() {
        assert_eq!(SubtitleCue::new("x", 2.0, 1.0).duration(), 0.0);
    }
}
