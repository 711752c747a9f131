//! crates/postcraft_core/src/trending.rs
//!
//! Trending articles for a topic. Any failure, including an unconfigured
//! source or unparseable output, yields the fixed fallback list.

use std::sync::Arc;
use std::sync::LazyLock;

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::TrendingArticle;
use crate::ports::TrendSource;

static JSON_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```json\s*([\s\S]*?)\s*```").expect("valid fence regex")
});

#[derive(Deserialize)]
#[serde(untagged)]
enum TrendPayload {
    List(Vec<TrendingArticle>),
    Wrapped {
        #[serde(default)]
        articles: Vec<TrendingArticle>,
    },
}

/// Parses the trend provider's text: a JSON array, or an object with an
/// `articles` array, optionally inside a ```json fence.
pub fn parse_trending(raw: &str) -> Result<Vec<TrendingArticle>, serde_json::Error> {
    let json = JSON_FENCE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(raw);

    Ok(match serde_json::from_str::<TrendPayload>(json.trim())? {
        TrendPayload::List(articles) => articles,
        TrendPayload::Wrapped { articles } => articles,
    })
}

/// The fixed five-item list used when real trends are unavailable.
pub fn fallback_trending(topic: &str, now: DateTime<Utc>) -> Vec<TrendingArticle> {
    let slug = topic
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    let entry = |days_ago: i64, title: String, summary: String, suffix: &str, source: &str| {
        TrendingArticle {
            title,
            summary,
            url: format!("https://example.com/{}-{}", slug, suffix),
            source: source.to_string(),
            published_date: (now - Duration::days(days_ago)).to_rfc3339(),
            category: topic.to_string(),
        }
    };

    vec![
        entry(
            0,
            format!("Latest {} trends and developments", topic),
            format!("Recent developments in {} show significant growth and innovation. Key trends include emerging technologies, market shifts, and new opportunities for businesses and individuals.", topic),
            "trends",
            "Tech News",
        ),
        entry(
            1,
            format!("How {} is changing the industry", topic),
            format!("The {} sector is experiencing rapid transformation with new technologies and approaches reshaping traditional business models and creating new opportunities.", topic),
            "industry-changes",
            "Industry Report",
        ),
        entry(
            2,
            format!("Expert insights on {} future", topic),
            format!("Industry experts share their predictions for the future of {}, highlighting key trends, challenges, and opportunities that will shape the sector in the coming years.", topic),
            "expert-insights",
            "Expert Analysis",
        ),
        entry(
            3,
            format!("{} market analysis and predictions", topic),
            format!("Comprehensive market analysis reveals strong growth potential in {} with increasing investment and consumer adoption driving market expansion.", topic),
            "market-analysis",
            "Market Research",
        ),
        entry(
            4,
            format!("Breaking: New {} regulations announced", topic),
            format!("Recent regulatory changes in {} are expected to impact businesses and consumers, with new guidelines focusing on innovation and consumer protection.", topic),
            "regulations",
            "Government News",
        ),
    ]
}

#[derive(Clone)]
pub struct TrendFeed {
    source: Option<Arc<dyn TrendSource>>,
}

impl TrendFeed {
    pub fn new(source: Option<Arc<dyn TrendSource>>) -> Self {
        Self { source }
    }

    pub async fn fetch(&self, topic: &str) -> Vec<TrendingArticle> {
        let Some(source) = &self.source else {
            warn!("Trend source not configured, using fallback articles");
            return fallback_trending(topic, Utc::now());
        };

        let raw = match source.trending_raw(topic).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Trend source failed, using fallback articles");
                return fallback_trending(topic, Utc::now());
            }
        };

        match parse_trending(&raw) {
            Ok(articles) => {
                info!(count = articles.len(), topic, "Fetched trending articles");
                articles
            }
            Err(e) => {
                warn!(error = %e, "Failed to parse trend response, using fallback articles");
                fallback_trending(topic, Utc::now())
            }
        }
    }
}
