// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! OpenAI-compatible chat completion backend
//!
//! Talks to any service exposing `POST {base_url}/chat/completions` with a
//! bearer token. The system prompt is fixed at construction; every call sends
//! the context as a single user message.

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::completion::{CompletionOptions, TextCompletion};
use crate::error::GenerationError;

/// Default service endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Default system prompt
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an experienced developer and technical \
blog author. You write informative, readable posts about software changes based on git \
commit information.";

/// Longest error body kept in a [`GenerationError::Status`]
const MAX_ERROR_BODY: usize = 500;

/// Connection settings for [`OpenAiClient`]
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key sent as a bearer token
    pub api_key: Option<String>,
    /// Model name
    pub model: String,
    /// Service base URL, without the `/chat/completions` suffix
    pub base_url: String,
    /// System prompt sent with every request
    pub system_prompt: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// HTTP client for an OpenAI-compatible chat completion endpoint
pub struct OpenAiClient {
    http: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    /// Create a client with the given settings
    #[must_use]
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// The model requests are sent to
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn request_body<'a>(
        &'a self,
        context: &'a str,
        options: CompletionOptions,
    ) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.config.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: context,
                },
            ],
            max_tokens: options.max_output_tokens,
            temperature: options.temperature,
        }
    }
}

#[async_trait]
impl TextCompletion for OpenAiClient {
    async fn complete(
        &self,
        context: &str,
        options: CompletionOptions,
    ) -> Result<String, GenerationError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(GenerationError::MissingApiKey)?;

        debug!(
            model = %self.config.model,
            max_tokens = options.max_output_tokens,
            "requesting completion"
        );

        let response = self
            .http
            .post(self.endpoint())
            .header(AUTHORIZATION, format!("Bearer {api_key}"))
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&self.request_body(context, options))
            .send()
            .await?;

        let status = response.status();
        match status.as_u16() {
            401 | 403 => {
                return Err(GenerationError::AuthenticationFailed {
                    status: status.as_u16(),
                });
            }
            429 => return Err(GenerationError::RateLimited),
            _ if !status.is_success() => {
                let mut body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<unable to read response>".to_string());
                truncate_at_char_boundary(&mut body, MAX_ERROR_BODY);
                return Err(GenerationError::Status {
                    status: status.as_u16(),
                    body,
                });
            }
            _ => {}
        }

        let payload = response.text().await?;
        parse_completion(&payload)
    }
}

/// Extract the first choice's text from a chat completion response body
///
/// # Errors
///
/// Returns `GenerationError::MalformedResponse` if the body is not a chat
/// completion and `GenerationError::EmptyResponse` if it carries no text.
pub fn parse_completion(payload: &str) -> Result<String, GenerationError> {
    let response: ChatResponse =
        serde_json::from_str(payload).map_err(|err| GenerationError::MalformedResponse {
            message: err.to_string(),
        })?;

    let content = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::MalformedResponse {
            message: "response has no choices".to_string(),
        })?
        .message
        .content
        .unwrap_or_default();

    let content = content.trim();
    if content.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(content.to_string())
}

fn truncate_at_char_boundary(text: &mut String, max: usize) {
    if text.len() <= max {
        return;
    }
    let mut cut = max;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}
