//! HTTP chat clients for the supported provider protocols.

use crate::provider::ProviderId;
use crate::retry::{with_retry_if, RetryConfig};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Role of a message in a rendered prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    Human,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Generation parameters shared by every provider.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout: Option<Duration>,
    /// Transport retry budget, on top of the first attempt
    pub max_retries: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: None,
            timeout: None,
            max_retries: 2,
        }
    }
}

/// Where and how to authenticate against a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub base_url: String,
}

/// A single-turn chat completion endpoint.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Model identifier requested from the provider
    fn model(&self) -> &str;

    /// Send the conversation and return the assistant's text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Failure of one HTTP round trip, classified for retry decisions.
#[derive(Debug, Error)]
enum CallError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{provider} API error ({status}): {body}")]
    Status {
        provider: ProviderId,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed {provider} response: {reason}")]
    Malformed { provider: ProviderId, reason: String },
}

/// Retry network errors, timeouts, 429 and 5xx. Other 4xx and
/// undecodable bodies fail immediately.
fn is_retryable(error: &CallError) -> bool {
    match error {
        CallError::Transport(e) => !e.is_decode(),
        CallError::Status { status, .. } => {
            *status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
        }
        CallError::Malformed { .. } => false,
    }
}

fn build_http_client(timeout: Option<Duration>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().context("Failed to build HTTP client")
}

async fn read_error_body(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|e| format!("<failed to read body: {}>", e))
}

// ==================== OpenAI-compatible protocol ====================

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<CompletionMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct CompletionMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionContent,
}

#[derive(Debug, Deserialize)]
struct CompletionContent {
    content: Option<String>,
}

/// Client for the chat-completions protocol used by OpenAI and Groq.
pub struct OpenAiCompatibleClient {
    http: reqwest::Client,
    provider: ProviderId,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    retry: RetryConfig,
}

impl OpenAiCompatibleClient {
    pub fn new(
        provider: ProviderId,
        credentials: &Credentials,
        params: &GenerationParams,
        model_id: &str,
    ) -> Result<Self> {
        Ok(Self {
            http: build_http_client(params.timeout)?,
            provider,
            endpoint: format!(
                "{}/chat/completions",
                credentials.base_url.trim_end_matches('/')
            ),
            api_key: credentials.api_key.clone(),
            model: model_id.to_string(),
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            retry: RetryConfig::provider_call(params.max_retries),
        })
    }

    async fn send(&self, request: &CompletionRequest<'_>) -> Result<String, CallError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(CallError::Status {
                provider: self.provider,
                status,
                body: read_error_body(response).await,
            });
        }

        let body: CompletionResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| CallError::Malformed {
                provider: self.provider,
                reason: "response contained no choices or empty content".to_string(),
            })
    }
}

#[async_trait]
impl ChatClient for OpenAiCompatibleClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = CompletionRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| CompletionMessage {
                    role: match m.role {
                        Role::System => "system",
                        Role::Human => "user",
                    },
                    content: &m.content,
                })
                .collect(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let text = with_retry_if(
            &self.retry,
            &format!("{} completion", self.provider),
            || self.send(&request),
            is_retryable,
        )
        .await?;
        Ok(text)
    }
}

// ==================== Gemini protocol ====================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent<'a>>,
    contents: Vec<GeminiContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Client for Google's Gemini `generateContent` endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    retry: RetryConfig,
}

impl GeminiClient {
    pub fn new(credentials: &Credentials, params: &GenerationParams, model_id: &str) -> Result<Self> {
        Ok(Self {
            http: build_http_client(params.timeout)?,
            endpoint: format!(
                "{}/models/{}:generateContent",
                credentials.base_url.trim_end_matches('/'),
                model_id
            ),
            api_key: credentials.api_key.clone(),
            model: model_id.to_string(),
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            retry: RetryConfig::provider_call(params.max_retries),
        })
    }

    async fn send(&self, request: &GenerateRequest<'_>) -> Result<String, CallError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(CallError::Status {
                provider: ProviderId::Google,
                status,
                body: read_error_body(response).await,
            });
        }

        let body: GenerateResponse = response.json().await?;
        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(CallError::Malformed {
                provider: ProviderId::Google,
                reason: "response contained no candidate text".to_string(),
            });
        }
        Ok(text)
    }
}

#[async_trait]
impl ChatClient for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let system_parts: Vec<GeminiPart> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| GeminiPart { text: &m.content })
            .collect();

        let request = GenerateRequest {
            system_instruction: if system_parts.is_empty() {
                None
            } else {
                Some(GeminiContent {
                    role: None,
                    parts: system_parts,
                })
            },
            contents: messages
                .iter()
                .filter(|m| m.role == Role::Human)
                .map(|m| GeminiContent {
                    role: Some("user"),
                    parts: vec![GeminiPart { text: &m.content }],
                })
                .collect(),
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
            },
        };

        let text = with_retry_if(
            &self.retry,
            "Google generateContent",
            || self.send(&request),
            is_retryable,
        )
        .await?;
        Ok(text)
    }
}
