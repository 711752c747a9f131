//! services/api/src/adapters/search.rs
//!
//! Google Custom Search as the `WebSearchService` port.

use async_trait::async_trait;
use postcraft_core::domain::SearchResult;
use postcraft_core::ports::{PortError, PortResult, WebSearchService};
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

pub const GOOGLE_SEARCH_BASE: &str = "https://www.googleapis.com";

/// The API caps `num` at ten.
const MAX_RESULTS: usize = 10;

pub struct GoogleSearchAdapter {
    client: Client,
    base_url: String,
    api_key: String,
    engine_id: String,
}

impl GoogleSearchAdapter {
    pub fn new(client: Client, api_key: String, engine_id: String) -> Self {
        Self::with_base_url(client, GOOGLE_SEARCH_BASE.to_string(), api_key, engine_id)
    }

    pub fn with_base_url(
        client: Client,
        base_url: String,
        api_key: String,
        engine_id: String,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key,
            engine_id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponseBody {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    link: String,
    pagemap: Option<PageMap>,
}

#[derive(Debug, Deserialize)]
struct PageMap {
    #[serde(default)]
    metatags: Vec<serde_json::Map<String, serde_json::Value>>,
}

impl SearchItem {
    fn published_time(&self) -> Option<String> {
        self.pagemap
            .as_ref()?
            .metatags
            .first()?
            .get("article:published_time")?
            .as_str()
            .map(str::to_string)
    }

    fn into_result(self) -> SearchResult {
        let published_date = self.published_time();
        SearchResult {
            title: self.title,
            snippet: self.snippet,
            link: self.link,
            published_date,
        }
    }
}

#[async_trait]
impl WebSearchService for GoogleSearchAdapter {
    async fn search(&self, query: &str, limit: usize) -> PortResult<Vec<SearchResult>> {
        let num = limit.clamp(1, MAX_RESULTS).to_string();
        let url = format!("{}/customsearch/v1", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("Search request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(PortError::Unexpected(format!(
                "Search API answered {}",
                response.status()
            )));
        }

        let body: SearchResponseBody = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to parse search results: {}", e)))?;

        let results: Vec<SearchResult> = body
            .items
            .into_iter()
            .take(limit)
            .map(SearchItem::into_result)
            .collect();
        info!(count = results.len(), "Web search returned results");
        Ok(results)
    }
}
