//! Shared data models for the EduVid video pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Video jobs and their lifecycle states
//! - Render settings and the single encoding profile
//! - Subtitle cues and the final artifact manifest
//! - Topic extraction from a user question

pub mod artifact;
pub mod encoding;
pub mod job;
pub mod render;
pub mod subtitle;
pub mod timestamp;
pub mod topic;

// Re-export common types
pub use artifact::VideoArtifact;
pub use encoding::EncodingConfig;
pub use job::{JobId, JobState, VideoJob};
pub use render::{RenderSettings, SlideRole};
pub use subtitle::SubtitleCue;
pub use topic::extract_topic;
