//! Error types for image sourcing and composition.

use thiserror::Error;

/// Result type for imagery operations.
pub type ImageryResult<T> = Result<T, ImageryError>;

/// Errors raised by image providers and raster work.
///
/// Provider errors never escape [`crate::ImageSourcer::acquire`]; they are
/// logged and the slot moves to the next tier.
#[derive(Debug, Error)]
pub enum ImageryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("Image decode/encode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Font error: {0}")]
    Font(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ImageryError {
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether the failure came from the network rather than local work.
    pub fn is_provider_error(&self) -> bool {
        matches!(
            self,
            ImageryError::Http(_) | ImageryError::Status { .. } | ImageryError::InvalidResponse(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message() {
        let err = ImageryError::Status {
            status: 503,
            url: "https://example.test/search".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Provider returned status 503 for https://example.test/search"
        );
        assert!(err.is_provider_error());
        assert!(!ImageryError::internal("x").is_provider_error());
    }
}
