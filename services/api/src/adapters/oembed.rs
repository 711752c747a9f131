//! services/api/src/adapters/oembed.rs
//!
//! Video title and channel lookup through YouTube's public oEmbed endpoint.

use async_trait::async_trait;
use postcraft_core::domain::VideoMetadata;
use postcraft_core::ports::{PortError, PortResult, VideoMetadataService};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

pub const YOUTUBE_OEMBED_BASE: &str = "https://www.youtube.com";

pub struct OEmbedAdapter {
    client: Client,
    base_url: String,
}

impl OEmbedAdapter {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, YOUTUBE_OEMBED_BASE.to_string())
    }

    pub fn with_base_url(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[derive(Deserialize)]
struct OEmbedBody {
    title: Option<String>,
    author_name: Option<String>,
}

#[async_trait]
impl VideoMetadataService for OEmbedAdapter {
    async fn lookup(&self, video_id: &str) -> PortResult<VideoMetadata> {
        let watch_url = format!("https://www.youtube.com/watch?v={}", video_id);
        let response = self
            .client
            .get(format!("{}/oembed", self.base_url.trim_end_matches('/')))
            .query(&[("url", watch_url.as_str()), ("format", "json")])
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND | StatusCode::UNAUTHORIZED => {
                return Err(PortError::NotFound(format!("Video {}", video_id)))
            }
            status => {
                return Err(PortError::Unexpected(format!("oEmbed answered {}", status)))
            }
        }

        let body: OEmbedBody = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(VideoMetadata {
            title: body.title.unwrap_or_else(|| "YouTube Video".to_string()),
            author_name: body.author_name,
        })
    }
}
