//! services/api/src/adapters/completion_llm.rs
//!
//! This module contains the adapter for the post-writing LLM.
//! It implements the `CompletionService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use postcraft_core::ports::{
    CompletionService, PortError, PortResult, PromptPair, SamplingParams,
};
use tracing::info;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `CompletionService` using an OpenAI-compatible
/// chat completion endpoint.
#[derive(Clone)]
pub struct OpenAiCompletionAdapter {
    client: Client<OpenAIConfig>,
}

impl OpenAiCompletionAdapter {
    /// Creates a new `OpenAiCompletionAdapter`.
    pub fn new(client: Client<OpenAIConfig>) -> Self {
        Self { client }
    }
}

/// Builds the two-message chat request with the preset's sampling values.
pub fn chat_request(
    prompts: &PromptPair,
    params: &SamplingParams,
) -> PortResult<CreateChatCompletionRequest> {
    let messages = vec![
        ChatCompletionRequestSystemMessageArgs::default()
            .content(prompts.system.as_str())
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into(),
        ChatCompletionRequestUserMessageArgs::default()
            .content(prompts.user.as_str())
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into(),
    ];

    let mut builder = CreateChatCompletionRequestArgs::default();
    builder
        .model(&params.model)
        .messages(messages)
        .temperature(params.temperature)
        .max_tokens(params.max_tokens);
    if let Some(top_p) = params.top_p {
        builder.top_p(top_p);
    }
    if let Some(penalty) = params.frequency_penalty {
        builder.frequency_penalty(penalty);
    }
    if let Some(penalty) = params.presence_penalty {
        builder.presence_penalty(penalty);
    }

    builder
        .build()
        .map_err(|e| PortError::Unexpected(e.to_string()))
}

/// Sends one chat request and returns the first choice's text.
pub async fn complete_with(
    client: &Client<OpenAIConfig>,
    prompts: &PromptPair,
    params: &SamplingParams,
) -> PortResult<String> {
    let request = chat_request(prompts, params)?;

    // Call the API and manually map the error if it occurs, which respects the orphan rule.
    let response = client
        .chat()
        .create(request)
        .await
        .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(PortError::EmptyCompletion)?;

    info!(model = %params.model, chars = text.len(), "Completion received");
    Ok(text)
}

//=========================================================================================
// `CompletionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CompletionService for OpenAiCompletionAdapter {
    async fn complete(&self, prompts: &PromptPair, params: &SamplingParams) -> PortResult<String> {
        complete_with(&self.client, prompts, params).await
    }
}
