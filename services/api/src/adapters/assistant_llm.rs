//! services/api/src/adapters/assistant_llm.rs
//!
//! This module contains the adapter for the Bible chat assistant.
//! It implements the `BibleAssistantService` port from the `core` crate against any
//! OpenAI-compatible chat completion endpoint.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use bible_nav_core::ports::{BibleAssistantService, PortError, PortResult};

const SYSTEM_INSTRUCTION: &str = "You are a helpful and knowledgeable Bible expert. Your purpose is to answer user questions about the Bible concisely and accurately. Use your deep understanding of biblical texts, characters, and theological concepts to provide helpful and insightful responses. Please format your responses clearly using markdown.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `BibleAssistantService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiAssistantAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiAssistantAdapter {
    /// Creates a new `OpenAiAssistantAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `BibleAssistantService` Trait Implementation
//=========================================================================================

#[async_trait]
impl BibleAssistantService for OpenAiAssistantAdapter {
    async fn answer(&self, prompt: &str) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTION)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("Assistant response contained no text content.".to_string())
            })
    }
}

/// Used when no API key is configured: every question fails, so `/ai` answers 500
/// while the rest of the service keeps working.
pub struct UnconfiguredAssistant;

#[async_trait]
impl BibleAssistantService for UnconfiguredAssistant {
    async fn answer(&self, _prompt: &str) -> PortResult<String> {
        Err(PortError::Unexpected(
            "AI_API_KEY is not configured".to_string(),
        ))
    }
}
