//! services/api/src/adapters/trends_llm.rs
//!
//! Trending articles from a search-grounded, OpenAI-compatible model
//! (Perplexity by default). Implements the `TrendSource` port.

use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use postcraft_core::ports::{PortResult, SamplingParams, TrendSource};
use postcraft_core::prompts::build_trending_prompts;

use crate::adapters::completion_llm::complete_with;

pub const PERPLEXITY_API_BASE: &str = "https://api.perplexity.ai";

#[derive(Clone)]
pub struct TrendsLlmAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl TrendsLlmAdapter {
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    /// Builds an adapter against the Perplexity endpoint.
    pub fn perplexity(api_key: &str, model: String) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(PERPLEXITY_API_BASE);
        Self::new(Client::with_config(config), model)
    }
}

#[async_trait]
impl TrendSource for TrendsLlmAdapter {
    async fn trending_raw(&self, topic: &str) -> PortResult<String> {
        let prompts = build_trending_prompts(topic);
        complete_with(&self.client, &prompts, &SamplingParams::trending(&self.model)).await
    }
}
