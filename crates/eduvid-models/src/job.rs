//! Video job definitions.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a video job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string (e.g. a database row id).
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Lifecycle state reported to the external job tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Accepted, not yet started
    #[default]
    Pending,
    /// Pipeline is running
    Processing,
    /// Artifacts published
    Completed,
    /// Pipeline aborted, nothing published
    Failed,
    /// Cancelled by the owner; any produced artifacts were discarded
    Cancelled,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Processing => "processing",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::Failed | JobState::Cancelled
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to produce one narrated video.
///
/// The question and script come from upstream collaborators (request layer and
/// LLM script generation); the pipeline never edits them.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoJob {
    /// Job identifier, also used to name output files
    pub job_id: JobId,
    /// The user's question; rendered on the title frame and used to derive the topic
    pub question: String,
    /// Narration script
    pub script: String,
    /// When the job was accepted
    pub created_at: DateTime<Utc>,
}

impl VideoJob {
    /// Create a new job with a fresh id.
    pub fn new(question: impl Into<String>, script: impl Into<String>) -> Self {
        Self::with_id(JobId::new(), question, script)
    }

    /// Create a job for an existing id.
    pub fn with_id(job_id: JobId, question: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            job_id,
            question: question.into(),
            script: script.into(),
            created_at: Utc::now(),
        }
    }
}
