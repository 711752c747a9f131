pub mod dashboard;
pub mod domain;
pub mod extract;
pub mod parsing;
pub mod pipeline;
pub mod plans;
pub mod ports;
pub mod prompts;
pub mod search;
pub mod sources;
pub mod trending;

pub use dashboard::{Dashboard, DashboardController, DashboardError, Tab, TaskState};
pub use domain::{
    ArticleContent, AuthEvent, ContentRequest, ContentType, GeneratedContent, GtmPlan,
    GtmPlanRequest, NewPrompt, Prompt, SearchResult, Social, Tone, TrendingArticle, User,
    UserCredentials, VideoInfo, VideoMetadata,
};
pub use parsing::PaddingPolicy;
pub use pipeline::{ContentPipeline, PipelineError, PipelineSettings};
pub use ports::{
    CompletionService, DatabaseService, FetchError, PageFetcher, PortError, PortResult,
    PromptPair, SamplingParams, TranscriptService, TrendSource, VideoMetadataService,
    WebSearchService,
};
pub use search::SearchRetriever;
pub use sources::{ArticleExtractor, VideoExtractor};
pub use trending::TrendFeed;
