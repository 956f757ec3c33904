//! Shared HTTP download and decode helpers.

use image::RgbImage;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::error::{ImageryError, ImageryResult};
use crate::resize::cover_crop;

/// Browser User-Agent; some image CDNs reject library defaults.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0";

/// Acceptance rules for a downloaded image body.
#[derive(Debug, Clone, Copy)]
pub struct DownloadPolicy {
    /// Bodies must be strictly larger than this
    pub min_bytes: usize,
    pub timeout: Duration,
}

/// GET `url` and return the body if it looks like a real image.
pub async fn fetch_image_bytes(client: &Client, url: &str, policy: DownloadPolicy) -> ImageryResult<Vec<u8>> {
    let response = client
        .get(url)
        .header(USER_AGENT, BROWSER_USER_AGENT)
        .timeout(policy.timeout)
        .send()
        .await?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(ImageryError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    if !content_type.contains("image") {
        return Err(ImageryError::invalid_response(format!(
            "content-type '{content_type}' is not an image"
        )));
    }

    let body = response.bytes().await?;
    if body.len() <= policy.min_bytes {
        return Err(ImageryError::invalid_response(format!(
            "body of {} bytes is below the {} byte minimum",
            body.len(),
            policy.min_bytes
        )));
    }
    Ok(body.to_vec())
}

/// Decode `bytes` and cover-crop to `width` x `height` off the async runtime.
pub async fn decode_cover(bytes: Vec<u8>, width: u32, height: u32) -> ImageryResult<RgbImage> {
    tokio::task::spawn_blocking(move || {
        let decoded = image::load_from_memory(&bytes)?;
        Ok(cover_crop(&decoded, width, height))
    })
    .await
    .map_err(|e| ImageryError::internal(format!("decode task failed: {e}")))?
}

/// Fetch, validate, decode and crop in one step.
pub async fn download_cover(
    client: &Client,
    url: &str,
    policy: DownloadPolicy,
    width: u32,
    height: u32,
) -> ImageryResult<RgbImage> {
    let bytes = fetch_image_bytes(client, url, policy).await?;
    decode_cover(bytes, width, height).await
}

/// Encode an image as PNG bytes. Used by tests to serve realistic bodies.
#[cfg(test)]
pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    use image::{ImageOutputFormat, Rgb};
    use std::io::Cursor;

    // Noise keeps the PNG above the size thresholds
    let img = RgbImage::from_fn(width, height, |x, y| {
        let mut h = x.wrapping_mul(73_856_093) ^ y.wrapping_mul(19_349_663);
        h ^= h >> 13;
        h = h.wrapping_mul(0x5bd1_e995);
        h ^= h >> 15;
        let [a, b, c, _] = h.to_le_bytes();
        Rgb([a, b, c])
    });
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageOutputFormat::Png)
        .expect("encode png");
    out.into_inner()
}
