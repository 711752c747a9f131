//! crates/postcraft_core/src/pipeline.rs
//!
//! The content generation pipeline: optional search, prompt assembly, one
//! completion call, parsing and the pad-to-minimum stage. Article and video
//! generation run their source extractor first and feed the result in as the
//! topic.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{
    ContentRequest, ContentType, GeneratedContent, GtmPlan, GtmPlanRequest, Tone,
};
use crate::parsing::{pad_to_minimum, parse_generated, PaddingPolicy};
use crate::plans::parse_gtm_plan;
use crate::prompts::{build_gtm_prompts, build_humanize_prompts, build_prompts};
use crate::search::{format_search_block, is_placeholder, should_search, SearchRetriever};
use crate::sources::{ArticleExtractor, VideoExtractor};
use crate::ports::{CompletionService, PortError, SamplingParams};

/// Audience used for article and video generations.
pub const DEFAULT_AUDIENCE: &str = "general";

/// The coarse, user-readable failures of the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("Invalid YouTube URL. Please provide a valid YouTube video URL.")]
    InvalidVideoUrl,
    #[error("Invalid article URL. Please check the URL and try again.")]
    InvalidArticleUrl,
    #[error("Failed to generate content. Please try again.")]
    GenerationFailed(#[source] PortError),
}

/// Tunables for the pipeline, loaded from configuration.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub model: String,
    /// Search every topic, not only those `should_search` accepts.
    pub search_all_topics: bool,
    pub search_result_count: usize,
    pub padding: PaddingPolicy,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            search_all_topics: true,
            search_result_count: 5,
            padding: PaddingPolicy::default(),
        }
    }
}

#[derive(Clone)]
pub struct ContentPipeline {
    completion: Arc<dyn CompletionService>,
    search: SearchRetriever,
    articles: ArticleExtractor,
    videos: VideoExtractor,
    settings: PipelineSettings,
}

impl ContentPipeline {
    pub fn new(
        completion: Arc<dyn CompletionService>,
        search: SearchRetriever,
        articles: ArticleExtractor,
        videos: VideoExtractor,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            completion,
            search,
            articles,
            videos,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    async fn search_block(&self, request: &ContentRequest) -> String {
        if !request.web_search_enabled {
            return String::new();
        }
        if !self.settings.search_all_topics && !should_search(&request.topic) {
            return String::new();
        }

        info!("Searching web for latest information about the topic");
        let response = self
            .search
            .search(&request.topic, self.settings.search_result_count)
            .await;
        if is_placeholder(&response.results) {
            warn!("Using placeholder search results; configure a search provider for real data");
        }
        format_search_block(&response)
    }

    /// Generates posts for a topic.
    pub async fn generate(&self, request: &ContentRequest) -> Result<GeneratedContent, PipelineError> {
        if request.topic.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "Please enter a topic".to_string(),
            ));
        }

        let search_block = self.search_block(request).await;
        let prompts = build_prompts(request, &search_block);
        let params = SamplingParams::generation(&self.settings.model);

        let raw = self
            .completion
            .complete(&prompts, &params)
            .await
            .map_err(PipelineError::GenerationFailed)?;

        let parsed = parse_generated(&raw, request.content_type);
        let content = pad_to_minimum(parsed, &self.settings.padding, &mut rand::rng());
        if content.is_empty() {
            warn!(content_type = %request.content_type, "Completion yielded nothing to display");
        }
        Ok(content)
    }

    pub async fn generate_from_article(
        &self,
        url: &str,
        content_type: ContentType,
        tone: Tone,
    ) -> Result<GeneratedContent, PipelineError> {
        let article = self.articles.extract(url).await?;
        let request = ContentRequest::new(article.as_topic(), content_type)
            .with_tone(tone)
            .with_audience(DEFAULT_AUDIENCE);
        self.generate(&request).await
    }

    pub async fn generate_from_video(
        &self,
        url: &str,
        content_type: ContentType,
        tone: Tone,
    ) -> Result<GeneratedContent, PipelineError> {
        let video = self.videos.extract(url).await?;
        let request = ContentRequest::new(video.as_topic(), content_type)
            .with_tone(tone)
            .with_audience(DEFAULT_AUDIENCE);
        self.generate(&request).await
    }

    /// Rewrites a post so it reads as if a person wrote it.
    pub async fn humanize(&self, content: &str, content_type: ContentType) -> Result<String, PipelineError> {
        if content.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "Nothing to humanize".to_string(),
            ));
        }
        let prompts = build_humanize_prompts(content, content_type);
        let params = SamplingParams::humanize(&self.settings.model);
        let raw = self
            .completion
            .complete(&prompts, &params)
            .await
            .map_err(PipelineError::GenerationFailed)?;
        Ok(raw.trim().to_string())
    }

    pub async fn generate_gtm_plan(&self, request: &GtmPlanRequest) -> Result<GtmPlan, PipelineError> {
        let required = [
            &request.product_name,
            &request.product_description,
            &request.target_audience,
            &request.short_term_goal,
        ];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(PipelineError::InvalidInput(
                "Please fill in all required fields".to_string(),
            ));
        }

        let prompts = build_gtm_prompts(request);
        let params = SamplingParams::gtm_plan(&self.settings.model);
        let raw = self
            .completion
            .complete(&prompts, &params)
            .await
            .map_err(PipelineError::GenerationFailed)?;

        parse_gtm_plan(&raw).map_err(|e| {
            PipelineError::GenerationFailed(PortError::Unexpected(format!(
                "GTM plan was not valid JSON: {}",
                e
            )))
        })
    }
}
