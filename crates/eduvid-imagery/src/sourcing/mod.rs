//! Tiered background image sourcing.
//!
//! Slots are filled by photo search first, then AI generation for the gaps,
//! then the offline gradient for anything still empty. Provider failures are
//! logged and never escape [`ImageSourcer::acquire`].

pub mod ai_generation;
pub mod fanout;
pub mod gradient;
pub mod http;
pub mod photo_search;

use async_trait::async_trait;
use image::RgbImage;
use reqwest::Client;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::ImageryResult;
pub use ai_generation::AiGeneration;
pub use gradient::create_fallback_image;
pub use photo_search::PhotoSearch;

/// Content slides beyond this count reuse earlier images.
pub const MAX_CONTENT_IMAGES: usize = 5;
/// Characters of a segment used in its generation prompt.
pub const PROMPT_CONTEXT_CHARS: usize = 80;

/// What to source images for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub topic: String,
    pub segments: Vec<String>,
    pub width: u32,
    pub height: u32,
}

impl ImageRequest {
    pub fn new(topic: impl Into<String>, segments: Vec<String>, width: u32, height: u32) -> Self {
        Self {
            topic: topic.into(),
            segments,
            width,
            height,
        }
    }

    /// Title slot plus one per segment, capped.
    pub fn slot_count(&self) -> usize {
        1 + self.segments.len().min(MAX_CONTENT_IMAGES)
    }

    /// Generation prompt for `slot`. Slot 0 is the title image.
    pub fn prompt(&self, slot: usize) -> String {
        let topic = &self.topic;
        match slot.checked_sub(1).and_then(|i| self.segments.get(i)) {
            Some(segment) => {
                let context: String = segment.chars().take(PROMPT_CONTEXT_CHARS).collect();
                format!(
                    "3D illustration of {topic}, showing: {}, cinematic lighting, vivid colors, professional",
                    context.trim()
                )
            }
            _ => format!(
                "3D cinematic render of {topic}, vibrant colors, studio lighting, dark background, highly detailed, 8k"
            ),
        }
    }
}

/// Which tier produced an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageOrigin {
    PhotoSearch,
    AiGeneration,
    Gradient,
}

impl ImageOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageOrigin::PhotoSearch => "photo_search",
            ImageOrigin::AiGeneration => "ai_generation",
            ImageOrigin::Gradient => "gradient",
        }
    }
}

impl std::fmt::Display for ImageOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One filled slot, already cropped to the request size.
#[derive(Debug, Clone)]
pub struct SlotImage {
    pub image: RgbImage,
    pub origin: ImageOrigin,
}

/// A network image tier.
#[async_trait]
pub trait ImageSource: Send + Sync {
    fn origin(&self) -> ImageOrigin;

    /// Try to fill `slots`. Slots absent from the result are misses.
    async fn fill(&self, request: &ImageRequest, slots: &[usize]) -> ImageryResult<BTreeMap<usize, RgbImage>>;
}

/// Endpoints and pool sizes for the network tiers.
#[derive(Debug, Clone)]
pub struct SourcingConfig {
    pub photo_search_url: String,
    pub ai_image_url: String,
    pub download_workers: usize,
    pub generation_workers: usize,
}

impl Default for SourcingConfig {
    fn default() -> Self {
        Self {
            photo_search_url: photo_search::DEFAULT_SEARCH_URL.to_string(),
            ai_image_url: ai_generation::DEFAULT_GENERATION_URL.to_string(),
            download_workers: photo_search::DEFAULT_WORKERS,
            generation_workers: ai_generation::DEFAULT_WORKERS,
        }
    }
}

/// Ordered network tiers with an unconditional offline fallback.
#[derive(Clone)]
pub struct ImageSourcer {
    sources: Vec<Arc<dyn ImageSource>>,
}

impl ImageSourcer {
    pub fn new(sources: Vec<Arc<dyn ImageSource>>) -> Self {
        Self { sources }
    }

    /// Gradient-only sourcer.
    pub fn offline() -> Self {
        Self::new(Vec::new())
    }

    /// Photo search then AI generation.
    pub fn standard(client: Client, config: &SourcingConfig) -> Self {
        Self::new(vec![
            Arc::new(PhotoSearch::new(
                client.clone(),
                config.photo_search_url.clone(),
                config.download_workers,
            )),
            Arc::new(AiGeneration::new(
                client,
                config.ai_image_url.clone(),
                config.generation_workers,
            )),
        ])
    }

    /// One image per slot, in slot order. Never fails.
    pub async fn acquire(&self, request: &ImageRequest) -> Vec<SlotImage> {
        let needed = request.slot_count();
        let mut filled: BTreeMap<usize, SlotImage> = BTreeMap::new();
        info!(topic = %request.topic, needed, "Sourcing images");

        for source in &self.sources {
            let gaps: Vec<usize> = (0..needed).filter(|s| !filled.contains_key(s)).collect();
            if gaps.is_empty() {
                break;
            }
            let origin = source.origin();
            match source.fill(request, &gaps).await {
                Ok(images) => {
                    let mut added = 0;
                    for (slot, image) in images {
                        if slot < needed && !filled.contains_key(&slot) {
                            filled.insert(slot, SlotImage { image, origin });
                            added += 1;
                        }
                    }
                    info!(origin = %origin, added, requested = gaps.len(), "Image tier finished");
                }
                Err(e) => warn!(origin = %origin, error = %e, "Image tier failed"),
            }
        }

        let gaps: Vec<usize> = (0..needed).filter(|s| !filled.contains_key(s)).collect();
        if !gaps.is_empty() {
            for (slot, image) in render_gradients(request, gaps).await {
                filled.insert(slot, SlotImage { image, origin: ImageOrigin::Gradient });
            }
        }

        for image in filled.values() {
            metrics::counter!("eduvid_image_slots_total", "origin" => image.origin.as_str()).increment(1);
        }
        filled.into_values().collect()
    }
}

async fn render_gradients(request: &ImageRequest, slots: Vec<usize>) -> Vec<(usize, RgbImage)> {
    let topic = request.topic.clone();
    let (w, h) = (request.width, request.height);
    let render = move |slots: Vec<usize>| -> Vec<(usize, RgbImage)> {
        slots
            .into_iter()
            .map(|slot| (slot, create_fallback_image(&topic, slot, w, h)))
            .collect()
    };

    let retry = render.clone();
    let retry_slots = slots.clone();
    match tokio::task::spawn_blocking(move || render(slots)).await {
        Ok(images) => images,
        Err(e) => {
            error!(error = %e, "Gradient render task failed, rendering inline");
            retry(retry_slots)
        }
    }
}
