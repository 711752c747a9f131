//! crates/postcraft_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{NewPrompt, Prompt, SearchResult, Social, User, UserCredentials, VideoMetadata};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Service not configured: {0}")]
    NotConfigured(String),
    #[error("The completion endpoint returned no text")]
    EmptyCompletion,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Failure of a single page fetch strategy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("upstream answered with status {0}")]
    Status(u16),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("refusing to fetch from non-public address {0}")]
    Blocked(String),
    #[error("response body exceeds {0} bytes")]
    TooLarge(usize),
}

//=========================================================================================
// Completion Parameters
//=========================================================================================

/// The system and user messages sent to a completion endpoint, in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Static sampling parameters for one call site.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: Option<f32>,
    pub frequency_penalty: Option<f32>,
    pub presence_penalty: Option<f32>,
}

impl SamplingParams {
    /// Post generation: low temperature for instruction following.
    pub fn generation(model: &str) -> Self {
        Self {
            model: model.to_string(),
            temperature: 0.3,
            max_tokens: 1500,
            top_p: Some(0.9),
            frequency_penalty: Some(0.1),
            presence_penalty: Some(0.1),
        }
    }

    pub fn humanize(model: &str) -> Self {
        Self {
            model: model.to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            top_p: Some(0.9),
            frequency_penalty: Some(0.2),
            presence_penalty: Some(0.2),
        }
    }

    pub fn gtm_plan(model: &str) -> Self {
        Self {
            model: model.to_string(),
            temperature: 0.7,
            max_tokens: 3000,
            top_p: Some(0.9),
            frequency_penalty: Some(0.1),
            presence_penalty: Some(0.1),
        }
    }

    pub fn trending(model: &str) -> Self {
        Self {
            model: model.to_string(),
            temperature: 0.1,
            max_tokens: 4000,
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
        }
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Sends one system/user message pair and returns the first choice's text.
    ///
    /// Fails with `PortError::EmptyCompletion` when no text comes back.
    async fn complete(&self, prompts: &PromptPair, params: &SamplingParams) -> PortResult<String>;
}

#[async_trait]
pub trait WebSearchService: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> PortResult<Vec<SearchResult>>;
}

#[async_trait]
pub trait TrendSource: Send + Sync {
    /// Asks the trend provider for recent articles about `topic` and returns its raw text.
    async fn trending_raw(&self, topic: &str) -> PortResult<String>;
}

/// One interchangeable way of retrieving a page's HTML.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// A short label used in logs.
    fn name(&self) -> &str;

    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

#[async_trait]
pub trait VideoMetadataService: Send + Sync {
    async fn lookup(&self, video_id: &str) -> PortResult<VideoMetadata>;
}

#[async_trait]
pub trait TranscriptService: Send + Sync {
    async fn transcript(&self, video_id: &str) -> PortResult<String>;
}

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Auth Methods ---
    async fn create_user_with_email(&self, email: &str, hashed_password: &str) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    // --- Prompt Library ---
    /// Newest first.
    async fn list_prompts(&self, user_id: Uuid, social: Social) -> PortResult<Vec<Prompt>>;

    async fn get_prompt(&self, user_id: Uuid, prompt_id: i64) -> PortResult<Prompt>;

    async fn insert_prompt(&self, user_id: Uuid, prompt: &NewPrompt) -> PortResult<Prompt>;

    async fn update_prompt(
        &self,
        user_id: Uuid,
        prompt_id: i64,
        title: &str,
        body: &str,
    ) -> PortResult<Prompt>;

    async fn delete_prompt(&self, user_id: Uuid, prompt_id: i64) -> PortResult<()>;
}
