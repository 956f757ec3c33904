//! FFmpeg and speech-synthesis wrappers for the EduVid pipeline.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with timeouts and stderr capture
//! - Narration (TTS with a silent fallback), script segmentation and captions
//! - Motion assembly: Ken Burns clips, crossfades, mux and caption burn-in
//! - Thumbnails from the title frame

pub mod assembly;
pub mod command;
pub mod error;
pub mod filters;
pub mod fs_utils;
pub mod narration;
pub mod probe;
pub mod progress;
pub mod thumbnail;

pub use assembly::{Assembler, AssemblyPath, AssemblyReport, AssemblyRequest, CaptionStyle};
pub use command::{FfmpegCommand, FfmpegRunner, Toolchain};
pub use error::{MediaError, MediaResult};
pub use narration::{NarrationTrack, Narrator, SpeechConfig, SpeechSource};
pub use probe::{probe_duration, probe_media, MediaInfo};
pub use progress::FfmpegProgress;
pub use thumbnail::generate_thumbnail;
