//! Narration audio and caption timing.
//!
//! Speech is produced by an ordered list of [`SpeechSource`] strategies. The
//! external TTS command is tried first; the silent track always comes last,
//! and when even that cannot be encoded the estimated duration is still
//! returned so downstream timing stays defined.

pub mod script;
pub mod subtitles;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::command::{run_with_timeout, FfmpegCommand, Toolchain};
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::{file_larger_than, remove_if_exists};
use crate::probe::probe_duration;

pub use script::segment_script;
pub use subtitles::{build_cues, to_srt, WORDS_PER_CUE};

/// Speech output at or below this size is treated as a failed synthesis.
pub const MIN_SPEECH_BYTES: u64 = 1000;
/// Speaking rate used to size the silent fallback.
pub const WORDS_PER_SECOND: f64 = 2.5;
/// Shortest silent fallback track.
pub const MIN_SILENCE_SECS: f64 = 15.0;
/// Narration durations are never reported below this.
pub const MIN_NARRATION_SECS: f64 = 10.0;
/// Timeout for encoding the silent track.
pub const SILENCE_TIMEOUT_SECS: u64 = 30;

/// Placeholder replaced by the output path in TTS arguments.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// External text-to-speech command settings.
///
/// The narration text is written to the command's stdin.
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    pub command: String,
    pub args: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            command: "gtts-cli".to_string(),
            args: "--lang en --output {output} -"
                .split_whitespace()
                .map(String::from)
                .collect(),
            timeout_secs: 30,
        }
    }
}

impl SpeechConfig {
    /// Arguments with the output placeholder substituted.
    pub fn render_args(&self, output: &Path) -> Vec<String> {
        let output = output.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace(OUTPUT_PLACEHOLDER, &output))
            .collect()
    }
}

/// One way of turning narration text into an audio file.
#[async_trait]
pub trait SpeechSource: Send + Sync {
    /// Short name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Write audio for `text` to `output` and return its duration in seconds.
    async fn attempt(&self, text: &str, output: &Path) -> MediaResult<f64>;
}

/// Speech from an external TTS program.
pub struct CommandSpeech {
    config: SpeechConfig,
    toolchain: Toolchain,
}

impl CommandSpeech {
    pub fn new(config: SpeechConfig, toolchain: Toolchain) -> Self {
        Self { config, toolchain }
    }
}

#[async_trait]
impl SpeechSource for CommandSpeech {
    fn name(&self) -> &'static str {
        "tts"
    }

    async fn attempt(&self, text: &str, output: &Path) -> MediaResult<f64> {
        let program = which::which(&self.config.command)
            .map_err(|_| MediaError::speech_failed(format!("{} not found", self.config.command)))?;

        let result = run_with_timeout(
            program,
            &self.config.render_args(output),
            Some(text),
            Duration::from_secs(self.config.timeout_secs),
        )
        .await?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(MediaError::speech_failed(format!(
                "{} exited with {}: {}",
                self.config.command,
                result.status,
                stderr.trim()
            )));
        }

        if !file_larger_than(output, MIN_SPEECH_BYTES).await {
            return Err(MediaError::speech_failed("speech output missing or too small"));
        }

        // Measured, not estimated, so audio and video lengths agree
        probe_duration(&self.toolchain, output).await
    }
}

/// Silent track sized from the word count.
pub struct SilentSpeech {
    toolchain: Toolchain,
}

impl SilentSpeech {
    pub fn new(toolchain: Toolchain) -> Self {
        Self { toolchain }
    }
}

/// Estimated narration length for `text` when no speech is available.
pub fn estimate_silence_secs(text: &str) -> f64 {
    let words = text.split_whitespace().count() as f64;
    (words / WORDS_PER_SECOND).max(MIN_SILENCE_SECS)
}

#[async_trait]
impl SpeechSource for SilentSpeech {
    fn name(&self) -> &'static str {
        "silence"
    }

    async fn attempt(&self, text: &str, output: &Path) -> MediaResult<f64> {
        let duration = estimate_silence_secs(text);
        let cmd = FfmpegCommand::lavfi("anullsrc=r=44100:cl=mono", output)
            .duration(duration)
            .output_args(["-q:a", "9"])
            .audio_codec("libmp3lame");

        self.toolchain
            .runner()
            .with_timeout(SILENCE_TIMEOUT_SECS)
            .run(&cmd)
            .await?;
        Ok(duration)
    }
}

/// Narration audio and the duration that drives all slide timing.
#[derive(Debug, Clone)]
pub struct NarrationTrack {
    /// Audio file, absent when no source could write one
    pub audio: Option<PathBuf>,
    /// Duration in seconds, floored at [`MIN_NARRATION_SECS`]
    pub duration: f64,
    /// Name of the source that produced the track
    pub source: &'static str,
}

/// Runs speech sources in order until one succeeds.
pub struct Narrator {
    sources: Vec<Box<dyn SpeechSource>>,
}

impl Narrator {
    pub fn new(sources: Vec<Box<dyn SpeechSource>>) -> Self {
        Self { sources }
    }

    /// TTS command first, then silence.
    pub fn standard(config: SpeechConfig, toolchain: Toolchain) -> Self {
        Self::new(vec![
            Box::new(CommandSpeech::new(config, toolchain.clone())),
            Box::new(SilentSpeech::new(toolchain)),
        ])
    }

    /// Produce narration for `text` at `output`. Never fails.
    pub async fn synthesize(&self, text: &str, output: &Path) -> NarrationTrack {
        for source in &self.sources {
            debug!(source = source.name(), "Attempting narration");
            match source.attempt(text, output).await {
                Ok(duration) if duration.is_finite() && duration > 0.0 => {
                    info!(source = source.name(), duration, "Narration ready");
                    return NarrationTrack {
                        audio: Some(output.to_path_buf()),
                        duration: duration.max(MIN_NARRATION_SECS),
                        source: source.name(),
                    };
                }
                Ok(duration) => {
                    warn!(source = source.name(), duration, "Narration reported no duration");
                }
                Err(e) => {
                    warn!(source = source.name(), error = %e, "Narration source failed");
                }
            }
            metrics::counter!("eduvid_narration_fallbacks_total", "source" => source.name())
                .increment(1);
            // A partial file from a failed source must not be muxed
            if let Err(e) = remove_if_exists(output).await {
                warn!(source = source.name(), path = %output.display(), error = %e, "Failed to remove partial narration");
            }
        }

        let duration = estimate_silence_secs(text).max(MIN_NARRATION_SECS);
        warn!(duration, "No narration source produced audio, continuing without a track");
        NarrationTrack {
            audio: None,
            duration,
            source: "none",
        }
    }
}
