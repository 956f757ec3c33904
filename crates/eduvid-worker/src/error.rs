//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

/// Longest error text handed to the job tracker.
pub const MAX_USER_MESSAGE_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Rendering failed: {0}")]
    RenderingFailed(String),

    #[error("Assembly failed: {0}")]
    AssemblyFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Media error: {0}")]
    Media(#[from] eduvid_media::MediaError),

    #[error("Imagery error: {0}")]
    Imagery(#[from] eduvid_imagery::ImageryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn job_failed(msg: impl Into<String>) -> Self {
        Self::JobFailed(msg.into())
    }

    pub fn rendering_failed(msg: impl Into<String>) -> Self {
        Self::RenderingFailed(msg.into())
    }

    pub fn assembly_failed(msg: impl Into<String>) -> Self {
        Self::AssemblyFailed(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Error text for the job tracker, cut to [`MAX_USER_MESSAGE_CHARS`].
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        match message.char_indices().nth(MAX_USER_MESSAGE_CHARS) {
            Some((cut, _)) => message[..cut].to_string(),
            None => message,
        }
    }
}
