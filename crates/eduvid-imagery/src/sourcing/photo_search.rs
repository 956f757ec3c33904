//! Photo search tier.
//!
//! One search request for `needed + margin` candidates, shuffled, then a
//! bounded pool of downloads. Candidate `i` is assigned to the `i`-th gap.

use async_trait::async_trait;
use image::RgbImage;
use rand::seq::SliceRandom;
use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::fanout::FanOut;
use super::http::{download_cover, DownloadPolicy, BROWSER_USER_AGENT};
use super::{ImageOrigin, ImageRequest, ImageSource};
use crate::error::{ImageryError, ImageryResult};

pub const DEFAULT_SEARCH_URL: &str = "https://unsplash.com/napi/search/photos";
pub const DEFAULT_WORKERS: usize = 3;
/// Extra candidates requested beyond the slots needed.
pub const SEARCH_MARGIN: usize = 4;

const SEARCH_TIMEOUT: Duration = Duration::from_secs(12);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(20);
const COLLECTION_DEADLINE: Duration = Duration::from_secs(30);
const MIN_IMAGE_BYTES: usize = 2000;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    urls: Option<PhotoUrls>,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    regular: Option<String>,
}

/// Keyless photo search plus download.
#[derive(Debug, Clone)]
pub struct PhotoSearch {
    client: Client,
    search_url: String,
    fan_out: FanOut,
    search_timeout: Duration,
    download: DownloadPolicy,
    shuffle: bool,
}

impl PhotoSearch {
    pub fn new(client: Client, search_url: impl Into<String>, workers: usize) -> Self {
        Self {
            client,
            search_url: search_url.into(),
            fan_out: FanOut::new(workers, COLLECTION_DEADLINE),
            search_timeout: SEARCH_TIMEOUT,
            download: DownloadPolicy {
                min_bytes: MIN_IMAGE_BYTES,
                timeout: DOWNLOAD_TIMEOUT,
            },
            shuffle: true,
        }
    }

    /// Override the per-download timeout and overall collection deadline.
    pub fn with_timeouts(mut self, download: Duration, deadline: Duration) -> Self {
        self.download.timeout = download;
        self.fan_out = FanOut::new(self.fan_out.workers(), deadline);
        self
    }

    /// Keep search order instead of shuffling.
    pub fn without_shuffle(mut self) -> Self {
        self.shuffle = false;
        self
    }

    /// Candidate image URLs for `topic`.
    pub async fn search(&self, topic: &str, count: usize) -> ImageryResult<Vec<String>> {
        let per_page = count.to_string();
        let response = self
            .client
            .get(&self.search_url)
            .query(&[("query", topic), ("per_page", per_page.as_str())])
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .timeout(self.search_timeout)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(ImageryError::Status {
                status: response.status().as_u16(),
                url: self.search_url.clone(),
            });
        }

        let body: SearchResponse = response.json().await?;
        let urls: Vec<String> = body
            .results
            .into_iter()
            .filter_map(|r| r.urls.and_then(|u| u.regular))
            .filter(|u| !u.is_empty())
            .collect();
        info!(topic, found = urls.len(), "Photo search finished");
        Ok(urls)
    }
}

#[async_trait]
impl ImageSource for PhotoSearch {
    fn origin(&self) -> ImageOrigin {
        ImageOrigin::PhotoSearch
    }

    async fn fill(&self, request: &ImageRequest, slots: &[usize]) -> ImageryResult<BTreeMap<usize, RgbImage>> {
        let mut urls = self.search(&request.topic, request.slot_count() + SEARCH_MARGIN).await?;
        if urls.is_empty() {
            return Ok(BTreeMap::new());
        }
        if self.shuffle {
            urls.shuffle(&mut rand::rng());
        }

        let assigned: BTreeMap<usize, String> = slots.iter().copied().zip(urls).collect();
        let targets: Vec<usize> = assigned.keys().copied().collect();
        let (width, height) = (request.width, request.height);

        let result = self
            .fan_out
            .run("photo_search", &targets, |slot| {
                let client = self.client.clone();
                let policy = self.download;
                let url = assigned.get(&slot).cloned().unwrap_or_default();
                async move {
                    match download_cover(&client, &url, policy, width, height).await {
                        Ok(image) => Some(image),
                        Err(e) => {
                            warn!(slot, url = %url, error = %e, "Photo download failed");
                            None
                        }
                    }
                }
            })
            .await;

        debug!(filled = result.filled_count(), misses = ?result.misses, "Photo downloads collected");
        Ok(result.filled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sourcing::http::png_bytes;
    use crate::sourcing::ImageSourcer;
    use std::sync::Arc;
    use wiremock::matchers::{method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_photo(server: &MockServer, name: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/img/{name}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(png_bytes(80, 60)),
            )
            .mount(server)
            .await;
    }

    async fn mount_search(server: &MockServer, names: &[&str]) {
        let results: Vec<_> = names
            .iter()
            .map(|n| serde_json::json!({ "urls": { "regular": format!("{}/img/{n}", server.uri()) } }))
            .collect();
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("query", "volcanoes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "results": results })))
            .mount(server)
            .await;
    }

    fn request() -> ImageRequest {
        let segments = vec![
            "Volcanoes form where magma rises.".to_string(),
            "Eruptions release gas and ash.".to_string(),
            "Lava cools into new rock.".to_string(),
        ];
        ImageRequest::new("volcanoes", segments, 36, 64)
    }

    #[tokio::test]
    async fn test_search_parses_regular_urls() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("per_page", "8"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    { "urls": { "regular": "https://cdn.test/a.jpg" } },
                    { "urls": {} },
                    { "id": "no-urls" }
                ]
            })))
            .mount(&server)
            .await;

        let search = PhotoSearch::new(Client::new(), format!("{}/search", server.uri()), 3);
        let urls = search.search("volcanoes", 8).await.unwrap();
        assert_eq!(urls, vec!["https://cdn.test/a.jpg"]);
    }

    #[tokio::test]
    async fn test_search_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let search = PhotoSearch::new(Client::new(), format!("{}/search", server.uri()), 3);
        let err = search.search("volcanoes", 8).await.unwrap_err();
        assert!(matches!(err, ImageryError::Status { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_three_results_fill_three_of_four_slots() {
        let server = MockServer::start().await;
        mount_search(&server, &["a.png", "b.png", "c.png"]).await;
        for name in ["a.png", "b.png", "c.png"] {
            mount_photo(&server, name).await;
        }

        let search = PhotoSearch::new(Client::new(), format!("{}/search", server.uri()), 3);
        let filled = search.fill(&request(), &[0, 1, 2, 3]).await.unwrap();
        assert_eq!(filled.len(), 3);
        assert!(filled.values().all(|img| img.dimensions() == (36, 64)));
        assert!(!filled.contains_key(&3));
    }

    #[tokio::test]
    async fn test_broken_download_leaves_slot_empty() {
        let server = MockServer::start().await;
        mount_search(&server, &["good.png", "missing.png"]).await;
        mount_photo(&server, "good.png").await;

        let search = PhotoSearch::new(Client::new(), format!("{}/search", server.uri()), 3).without_shuffle();
        let filled = search.fill(&request(), &[0, 1]).await.unwrap();
        assert_eq!(filled.keys().copied().collect::<Vec<_>>(), vec![0]);
    }

    #[tokio::test]
    async fn test_missing_slot_falls_back_when_generation_fails() {
        let server = MockServer::start().await;
        mount_search(&server, &["a.png", "b.png", "c.png"]).await;
        for name in ["a.png", "b.png", "c.png"] {
            mount_photo(&server, name).await;
        }
        Mock::given(method("GET"))
            .and(path_regex(r"^/prompt/.+"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = Client::new();
        let sourcer = ImageSourcer::new(vec![
            Arc::new(PhotoSearch::new(client.clone(), format!("{}/search", server.uri()), 3)),
            Arc::new(crate::sourcing::AiGeneration::new(client, format!("{}/prompt", server.uri()), 2)),
        ]);
        let images = sourcer.acquire(&request()).await;

        assert_eq!(images.len(), 4);
        let photos = images.iter().filter(|i| i.origin == ImageOrigin::PhotoSearch).count();
        let gradients = images.iter().filter(|i| i.origin == ImageOrigin::Gradient).count();
        assert_eq!(photos, 3);
        assert_eq!(gradients, 1);
    }
}
