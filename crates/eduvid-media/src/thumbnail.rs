//! Thumbnail generation.
//!
//! The thumbnail is the title frame downscaled to a fixed portrait size. The
//! frame is already a still image, so no decode of the encoded video is needed.

use image::imageops::FilterType;
use std::path::Path;

use crate::error::{MediaError, MediaResult};
use eduvid_models::encoding::{THUMBNAIL_HEIGHT, THUMBNAIL_WIDTH};

/// Downscale `title_frame` into a PNG thumbnail at `output_path`.
pub async fn generate_thumbnail(
    title_frame: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
) -> MediaResult<()> {
    let source = title_frame.as_ref().to_path_buf();
    let output = output_path.as_ref().to_path_buf();

    if !source.exists() {
        return Err(MediaError::FileNotFound(source));
    }

    tokio::task::spawn_blocking(move || -> MediaResult<()> {
        let frame = image::open(&source)?;
        let thumb = frame.resize_exact(THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT, FilterType::Lanczos3);
        thumb.save_with_format(&output, image::ImageFormat::Png)?;
        Ok(())
    })
    .await
    .map_err(|e| MediaError::internal(format!("Thumbnail task failed: {}", e)))?
}
