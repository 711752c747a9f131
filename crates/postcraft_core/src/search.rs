//! crates/postcraft_core/src/search.rs
//!
//! Search decision and retrieval. Retrieval never fails: a missing or failing
//! provider degrades to placeholder results on the sentinel domain.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::domain::{SearchResponse, SearchResult};
use crate::ports::WebSearchService;

/// Links on this domain mark placeholder results.
pub const SENTINEL_DOMAIN: &str = "example.com";

const TIME_KEYWORDS: [&str; 16] = [
    "news",
    "latest",
    "recent",
    "update",
    "trend",
    "current",
    "today",
    "2024",
    "2025",
    "breaking",
    "announcement",
    "release",
    "new",
    "recently",
    "now",
    "currently",
];

const DOMAIN_KEYWORDS: [&str; 7] = [
    "ai",
    "technology",
    "crypto",
    "stock",
    "market",
    "politics",
    "economy",
];

/// True when the topic looks time-sensitive or belongs to a fast-moving domain.
pub fn should_search(topic: &str) -> bool {
    let topic = topic.to_lowercase();
    TIME_KEYWORDS.iter().any(|k| topic.contains(k))
        || DOMAIN_KEYWORDS.iter().any(|k| topic.contains(k))
}

/// True when any result links to the sentinel domain.
pub fn is_placeholder(results: &[SearchResult]) -> bool {
    results.iter().any(|r| r.link.contains(SENTINEL_DOMAIN))
}

fn slug(query: &str) -> String {
    query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// Deterministic placeholder results, at most three.
pub fn mock_results(query: &str, limit: usize, now: DateTime<Utc>) -> Vec<SearchResult> {
    let slug = slug(query);
    let date = Some(now.to_rfc3339());
    let results = vec![
        SearchResult {
            title: format!("Latest updates on {}", query),
            snippet: format!(
                "Recent developments and news about {} show significant progress in the field.",
                query
            ),
            link: format!("https://{}/{}", SENTINEL_DOMAIN, slug),
            published_date: date.clone(),
        },
        SearchResult {
            title: format!("Understanding {}: A comprehensive guide", query),
            snippet: format!(
                "Learn about {} with the latest insights and expert opinions.",
                query
            ),
            link: format!("https://{}/guide/{}", SENTINEL_DOMAIN, slug),
            published_date: date.clone(),
        },
        SearchResult {
            title: format!("Expert analysis: {} trends", query),
            snippet: format!(
                "Industry experts share their insights on current {} trends and future outlook.",
                query
            ),
            link: format!("https://{}/analysis/{}", SENTINEL_DOMAIN, slug),
            published_date: date,
        },
    ];
    results.into_iter().take(limit).collect()
}

/// Formats search results as a block appended to the user prompt.
///
/// Returns an empty string when there are no results.
pub fn format_search_block(response: &SearchResponse) -> String {
    if response.results.is_empty() {
        return String::new();
    }

    let mut block = String::from("\n\n=== LATEST INFORMATION FROM WEB SEARCH ===\n");
    block.push_str(&format!("Search Query: \"{}\"\n", response.query));
    block.push_str(&format!(
        "Found {} relevant results:\n\n",
        response.total_results
    ));

    for (index, result) in response.results.iter().enumerate() {
        block.push_str(&format!("[RESULT {}]\n", index + 1));
        block.push_str(&format!("Title: {}\n", result.title));
        block.push_str(&format!("Key Information: {}\n", result.snippet));
        if let Some(date) = result.published_date.as_deref() {
            let shown = DateTime::parse_from_rfc3339(date)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|_| date.to_string());
            block.push_str(&format!("Date: {}\n", shown));
        }
        block.push_str(&format!("Official Source URL: {}\n\n", result.link));
    }

    if is_placeholder(&response.results) {
        block.push_str("\nWARNING: These appear to be placeholder/mock results. Use your knowledge base to provide accurate, real information about the topic.\n");
        block.push_str("DO NOT use placeholder URLs like example.com. If you include URLs, they must be real, official sources.\n");
    } else {
        block.push_str("\nCRITICAL INSTRUCTIONS:\n");
        block.push_str("- Use the SPECIFIC facts, details, and information from the search results above\n");
        block.push_str("- If including URLs, use the REAL URLs from the search results, NOT placeholder URLs\n");
        block.push_str("- Include specific details like product features, release dates, pricing, or key facts from the results\n");
        block.push_str("- Make your content accurate and based on the real information found\n");
        block.push_str("- DO NOT make up URLs, use the actual URLs from the search results above\n");
    }

    block
}

/// Wraps an optional search provider with the placeholder fallback.
#[derive(Clone)]
pub struct SearchRetriever {
    provider: Option<Arc<dyn WebSearchService>>,
}

impl SearchRetriever {
    pub fn new(provider: Option<Arc<dyn WebSearchService>>) -> Self {
        Self { provider }
    }

    /// A retriever that always answers with placeholder results.
    pub fn unconfigured() -> Self {
        Self { provider: None }
    }

    pub async fn search(&self, query: &str, limit: usize) -> SearchResponse {
        let Some(provider) = &self.provider else {
            warn!("No search API keys configured, using mock results");
            return SearchResponse::new(query, mock_results(query, limit, Utc::now()));
        };

        match provider.search(query, limit).await {
            Ok(results) => {
                info!(count = results.len(), "Web search returned results");
                SearchResponse::new(query, results)
            }
            Err(e) => {
                warn!(error = %e, "Search provider failed, using mock results");
                SearchResponse::new(query, mock_results(query, limit, Utc::now()))
            }
        }
    }
}
