//! AI image generation tier.

use async_trait::async_trait;
use image::RgbImage;
use rand::Rng;
use reqwest::Client;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{info, warn};

use super::fanout::FanOut;
use super::http::{download_cover, DownloadPolicy};
use super::{ImageOrigin, ImageRequest, ImageSource};
use crate::error::ImageryResult;

pub const DEFAULT_GENERATION_URL: &str = "https://image.pollinations.ai/prompt";
pub const DEFAULT_WORKERS: usize = 2;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);
const COLLECTION_DEADLINE: Duration = Duration::from_secs(60);
const MIN_IMAGE_BYTES: usize = 5000;
const MAX_SEED: u32 = 99_999;

/// Build the generation URL for one prompt.
pub fn generation_url(base: &str, prompt: &str, width: u32, height: u32, seed: u32) -> String {
    format!(
        "{}/{}?width={width}&height={height}&nologo=true&seed={seed}",
        base.trim_end_matches('/'),
        urlencoding::encode(prompt)
    )
}

/// Prompt-to-image HTTP endpoint.
#[derive(Debug, Clone)]
pub struct AiGeneration {
    client: Client,
    base_url: String,
    fan_out: FanOut,
    download: DownloadPolicy,
}

impl AiGeneration {
    pub fn new(client: Client, base_url: impl Into<String>, workers: usize) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            fan_out: FanOut::new(workers, COLLECTION_DEADLINE),
            download: DownloadPolicy {
                min_bytes: MIN_IMAGE_BYTES,
                timeout: REQUEST_TIMEOUT,
            },
        }
    }

    pub fn with_timeouts(mut self, request: Duration, deadline: Duration) -> Self {
        self.download.timeout = request;
        self.fan_out = FanOut::new(self.fan_out.workers(), deadline);
        self
    }
}

#[async_trait]
impl ImageSource for AiGeneration {
    fn origin(&self) -> ImageOrigin {
        ImageOrigin::AiGeneration
    }

    async fn fill(&self, request: &ImageRequest, slots: &[usize]) -> ImageryResult<BTreeMap<usize, RgbImage>> {
        let (width, height) = (request.width, request.height);

        let result = self
            .fan_out
            .run("ai_generation", slots, |slot| {
                let client = self.client.clone();
                let policy = self.download;
                let prompt = request.prompt(slot);
                let seed = rand::rng().random_range(1..=MAX_SEED);
                let url = generation_url(&self.base_url, &prompt, width, height, seed);
                async move {
                    info!(slot, prompt = %prompt.chars().take(55).collect::<String>(), "Requesting generated image");
                    match download_cover(&client, &url, policy, width, height).await {
                        Ok(image) => Some(image),
                        Err(e) => {
                            warn!(slot, error = %e, "Image generation failed");
                            None
                        }
                    }
                }
            })
            .await;

        Ok(result.filled)
    }
}
