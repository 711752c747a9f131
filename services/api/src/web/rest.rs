//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the content, trending and prompt library
//! endpoints, and the master definition for the OpenAPI specification.

use crate::error::{pipeline_failure, port_failure, HandlerError};
use crate::web::{auth, state::AppState};
use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use postcraft_core::dashboard::prompt_request;
use postcraft_core::domain::{
    ContentRequest, ContentType, GeneratedContent, GtmPlan, GtmPlanRequest, NewPrompt, Prompt,
    Social, Tone, TrendingArticle, TRENDING_CATEGORIES,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::me_handler,
        auth::auth_events_handler,
        generate_handler,
        article_handler,
        video_handler,
        humanize_handler,
        gtm_plan_handler,
        trending_handler,
        trending_categories_handler,
        list_prompts_handler,
        create_prompt_handler,
        update_prompt_handler,
        delete_prompt_handler,
        generate_from_prompt_handler,
    ),
    components(
        schemas(
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            GenerateRequest,
            SourceRequest,
            HumanizeRequest,
            HumanizeResponse,
            GtmPlanBody,
            GeneratedContentResponse,
            TrendingArticleResponse,
            TrendingCategoryResponse,
            PromptResponse,
            CreatePromptRequest,
            UpdatePromptRequest,
            PromptGenerateRequest,
        )
    ),
    tags(
        (name = "Postcraft API", description = "Social post generation, trending topics and the prompt library.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

fn default_true() -> bool {
    true
}

fn default_content_type() -> ContentType {
    ContentType::Both
}

fn default_tone() -> Tone {
    Tone::Engaging
}

/// A topic generation request.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub topic: String,
    #[schema(value_type = String, example = "both")]
    pub content_type: ContentType,
    #[schema(value_type = Option<String>, example = "engaging")]
    pub tone: Option<Tone>,
    pub target_audience: Option<String>,
    #[serde(default = "default_true")]
    pub web_search_enabled: bool,
}

impl GenerateRequest {
    fn into_request(self) -> ContentRequest {
        let mut request =
            ContentRequest::new(self.topic, self.content_type).with_web_search(self.web_search_enabled);
        request.tone = self.tone;
        request.target_audience = self.target_audience;
        request
    }
}

/// An article or video URL to generate from.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourceRequest {
    pub url: String,
    #[serde(default = "default_content_type")]
    #[schema(value_type = String, example = "both")]
    pub content_type: ContentType,
    #[serde(default = "default_tone")]
    #[schema(value_type = String, example = "engaging")]
    pub tone: Tone,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HumanizeRequest {
    pub content: String,
    #[schema(value_type = String, example = "linkedin")]
    pub content_type: ContentType,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HumanizeResponse {
    pub content: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GtmPlanBody {
    pub product_name: String,
    pub product_description: String,
    pub target_audience: String,
    pub short_term_goal: String,
    pub channels_tried: Option<String>,
}

impl From<GtmPlanBody> for GtmPlanRequest {
    fn from(body: GtmPlanBody) -> Self {
        Self {
            product_name: body.product_name,
            product_description: body.product_description,
            target_audience: body.target_audience,
            short_term_goal: body.short_term_goal,
            channels_tried: body.channels_tried,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedContentResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tweet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter_thread: Option<Vec<String>>,
    pub hashtags: Vec<String>,
}

impl From<GeneratedContent> for GeneratedContentResponse {
    fn from(content: GeneratedContent) -> Self {
        Self {
            tweet: content.tweet,
            linkedin: content.linkedin,
            twitter_thread: content.twitter_thread,
            hashtags: content.hashtags,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrendingArticleResponse {
    pub title: String,
    pub summary: String,
    pub url: String,
    pub source: String,
    pub published_date: String,
    pub category: String,
}

impl From<TrendingArticle> for TrendingArticleResponse {
    fn from(a: TrendingArticle) -> Self {
        Self {
            title: a.title,
            summary: a.summary,
            url: a.url,
            source: a.source,
            published_date: a.published_date,
            category: a.category,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct TrendingCategoryResponse {
    pub id: String,
    pub label: String,
}

#[derive(Deserialize, IntoParams)]
pub struct TrendingQuery {
    /// Free-text topic or category label.
    pub topic: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromptResponse {
    pub id: i64,
    pub title: String,
    pub body: String,
    #[schema(example = "linkedin")]
    pub social: String,
    pub created_at: DateTime<Utc>,
}

impl From<Prompt> for PromptResponse {
    fn from(p: Prompt) -> Self {
        Self {
            id: p.id,
            title: p.title,
            body: p.body,
            social: p.social.as_str().to_string(),
            created_at: p.created_at,
        }
    }
}

#[derive(Deserialize, IntoParams)]
pub struct PromptQuery {
    /// `linkedin` or `twitter`.
    pub social: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CreatePromptRequest {
    pub title: String,
    pub body: String,
    #[schema(example = "twitter")]
    pub social: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePromptRequest {
    pub title: String,
    pub body: String,
}

#[derive(Deserialize, ToSchema, Default)]
pub struct PromptGenerateRequest {
    /// Replaces every `[TOPIC]` in the prompt body.
    pub topic: Option<String>,
}

fn parse_social(raw: &str) -> Result<Social, HandlerError> {
    raw.parse::<Social>()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))
}

//=========================================================================================
// Content Handlers
//=========================================================================================

/// Generate posts for a topic.
#[utoipa::path(
    post,
    path = "/content/generate",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Generated posts", body = GeneratedContentResponse),
        (status = 400, description = "Empty topic"),
        (status = 401, description = "Not signed in"),
        (status = 502, description = "Completion failed")
    )
)]
pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<GeneratedContentResponse>, HandlerError> {
    let request = body.into_request();
    info!(content_type = %request.content_type, "Generating content for topic");
    let content = state
        .pipeline
        .generate(&request)
        .await
        .map_err(pipeline_failure)?;
    Ok(Json(content.into()))
}

/// Generate posts from a web article.
#[utoipa::path(
    post,
    path = "/content/article",
    request_body = SourceRequest,
    responses(
        (status = 200, description = "Generated posts", body = GeneratedContentResponse),
        (status = 400, description = "Invalid article URL"),
        (status = 502, description = "Completion failed")
    )
)]
pub async fn article_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SourceRequest>,
) -> Result<Json<GeneratedContentResponse>, HandlerError> {
    let content = state
        .pipeline
        .generate_from_article(&body.url, body.content_type, body.tone)
        .await
        .map_err(pipeline_failure)?;
    Ok(Json(content.into()))
}

/// Generate posts from a YouTube video.
#[utoipa::path(
    post,
    path = "/content/video",
    request_body = SourceRequest,
    responses(
        (status = 200, description = "Generated posts", body = GeneratedContentResponse),
        (status = 400, description = "Invalid YouTube URL"),
        (status = 502, description = "Completion failed")
    )
)]
pub async fn video_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SourceRequest>,
) -> Result<Json<GeneratedContentResponse>, HandlerError> {
    let content = state
        .pipeline
        .generate_from_video(&body.url, body.content_type, body.tone)
        .await
        .map_err(pipeline_failure)?;
    Ok(Json(content.into()))
}

/// Rewrite a post so it reads as written by a person.
#[utoipa::path(
    post,
    path = "/content/humanize",
    request_body = HumanizeRequest,
    responses(
        (status = 200, description = "Rewritten post", body = HumanizeResponse),
        (status = 400, description = "Empty content"),
        (status = 502, description = "Completion failed")
    )
)]
pub async fn humanize_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<HumanizeRequest>,
) -> Result<Json<HumanizeResponse>, HandlerError> {
    let content = state
        .pipeline
        .humanize(&body.content, body.content_type)
        .await
        .map_err(pipeline_failure)?;
    Ok(Json(HumanizeResponse { content }))
}

/// Generate a go-to-market plan.
#[utoipa::path(
    post,
    path = "/plans/gtm",
    request_body = GtmPlanBody,
    responses(
        (status = 200, description = "Plan with positioning, channels, a content calendar, outreach and KPIs"),
        (status = 400, description = "Missing required fields"),
        (status = 502, description = "Completion failed or returned an unreadable plan")
    )
)]
pub async fn gtm_plan_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GtmPlanBody>,
) -> Result<Json<GtmPlan>, HandlerError> {
    let plan = state
        .pipeline
        .generate_gtm_plan(&body.into())
        .await
        .map_err(pipeline_failure)?;
    Ok(Json(plan))
}

//=========================================================================================
// Trending Handlers
//=========================================================================================

/// Trending articles for a topic.
#[utoipa::path(
    get,
    path = "/trending",
    params(TrendingQuery),
    responses(
        (status = 200, description = "Trending articles, or the fallback list", body = [TrendingArticleResponse]),
        (status = 400, description = "Empty topic")
    )
)]
pub async fn trending_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TrendingQuery>,
) -> Result<Json<Vec<TrendingArticleResponse>>, HandlerError> {
    let topic = query.topic.trim();
    if topic.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Please enter a topic".to_string()));
    }
    let articles = state.trends.fetch(topic).await;
    Ok(Json(articles.into_iter().map(Into::into).collect()))
}

/// The fixed list of trending categories.
#[utoipa::path(
    get,
    path = "/trending/categories",
    responses(
        (status = 200, description = "Trending categories", body = [TrendingCategoryResponse])
    )
)]
pub async fn trending_categories_handler() -> Json<Vec<TrendingCategoryResponse>> {
    Json(
        TRENDING_CATEGORIES
            .iter()
            .map(|c| TrendingCategoryResponse {
                id: c.id.to_string(),
                label: c.label.to_string(),
            })
            .collect(),
    )
}

//=========================================================================================
// Prompt Library Handlers
//=========================================================================================

/// List the caller's prompts for one network, newest first.
#[utoipa::path(
    get,
    path = "/prompts",
    params(PromptQuery),
    responses(
        (status = 200, description = "Saved prompts", body = [PromptResponse]),
        (status = 400, description = "Unknown social network")
    )
)]
pub async fn list_prompts_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Query(query): Query<PromptQuery>,
) -> Result<Json<Vec<PromptResponse>>, HandlerError> {
    let social = parse_social(&query.social)?;
    let prompts = state
        .db
        .list_prompts(user_id, social)
        .await
        .map_err(|e| port_failure("Prompts", e))?;
    Ok(Json(prompts.into_iter().map(Into::into).collect()))
}

/// Save a new prompt.
#[utoipa::path(
    post,
    path = "/prompts",
    request_body = CreatePromptRequest,
    responses(
        (status = 201, description = "Prompt saved", body = PromptResponse),
        (status = 400, description = "Empty title or body, or unknown network")
    )
)]
pub async fn create_prompt_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(body): Json<CreatePromptRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let prompt = NewPrompt {
        title: body.title,
        body: body.body,
        social: parse_social(&body.social)?,
    }
    .validate()
    .map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    let saved = state
        .db
        .insert_prompt(user_id, &prompt)
        .await
        .map_err(|e| port_failure("Prompt", e))?;
    Ok((StatusCode::CREATED, Json(PromptResponse::from(saved))))
}

/// Edit a prompt's title and body.
#[utoipa::path(
    put,
    path = "/prompts/{id}",
    request_body = UpdatePromptRequest,
    params(("id" = i64, Path, description = "Prompt id")),
    responses(
        (status = 200, description = "Prompt updated", body = PromptResponse),
        (status = 400, description = "Empty title or body"),
        (status = 404, description = "Prompt not found")
    )
)]
pub async fn update_prompt_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(prompt_id): Path<i64>,
    Json(body): Json<UpdatePromptRequest>,
) -> Result<Json<PromptResponse>, HandlerError> {
    let (title, text) = (body.title.trim(), body.body.trim());
    if title.is_empty() || text.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Please fill in both title and prompt".to_string(),
        ));
    }
    let updated = state
        .db
        .update_prompt(user_id, prompt_id, title, text)
        .await
        .map_err(|e| port_failure("Prompt", e))?;
    Ok(Json(updated.into()))
}

/// Delete a prompt.
#[utoipa::path(
    delete,
    path = "/prompts/{id}",
    params(("id" = i64, Path, description = "Prompt id")),
    responses(
        (status = 204, description = "Prompt deleted"),
        (status = 404, description = "Prompt not found")
    )
)]
pub async fn delete_prompt_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(prompt_id): Path<i64>,
) -> Result<StatusCode, HandlerError> {
    state
        .db
        .delete_prompt(user_id, prompt_id)
        .await
        .map_err(|e| port_failure("Prompt", e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Run a saved prompt through the generator.
#[utoipa::path(
    post,
    path = "/prompts/{id}/generate",
    request_body = PromptGenerateRequest,
    params(("id" = i64, Path, description = "Prompt id")),
    responses(
        (status = 200, description = "Generated post", body = GeneratedContentResponse),
        (status = 404, description = "Prompt not found"),
        (status = 502, description = "Completion failed")
    )
)]
pub async fn generate_from_prompt_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(prompt_id): Path<i64>,
    Json(body): Json<PromptGenerateRequest>,
) -> Result<Json<GeneratedContentResponse>, HandlerError> {
    let prompt = state
        .db
        .get_prompt(user_id, prompt_id)
        .await
        .map_err(|e| port_failure("Prompt", e))?;

    let request = prompt_request(&prompt, body.topic.as_deref());
    let content = state
        .pipeline
        .generate(&request)
        .await
        .map_err(pipeline_failure)?;
    Ok(Json(content.into()))
}
