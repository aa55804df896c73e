//! The three fixed provider slots and their per-provider client adapters.
//!
//! Each provider speaks its own wire protocol and names its generation
//! parameters differently. A `ClientAdapter` hides those differences behind
//! one construction interface so the factory never needs to know which
//! protocol a slot uses.

use crate::client::{ChatClient, Credentials, GeminiClient, GenerationParams, OpenAiCompatibleClient};
use anyhow::{bail, Result};
use std::fmt;
use std::sync::Arc;

/// Identifier of one of the three provider slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Groq,
    Google,
    OpenAI,
}

impl ProviderId {
    /// All provider slots, in display order.
    pub const ALL: [ProviderId; 3] = [ProviderId::Groq, ProviderId::Google, ProviderId::OpenAI];

    /// Resolve an external provider name ("Groq", "Google", "OpenAI").
    ///
    /// Matching is exact: the web form and CLI submit these names verbatim.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Display name, also the value callers select a provider by.
    pub fn name(self) -> &'static str {
        match self {
            Self::Groq => "Groq",
            Self::Google => "Google",
            Self::OpenAI => "OpenAI",
        }
    }

    /// Prefix of this provider's environment variables (`GROQ_API_KEY`, ...).
    pub fn env_prefix(self) -> &'static str {
        match self {
            Self::Groq => "GROQ",
            Self::Google => "GOOGLE",
            Self::OpenAI => "OPENAI",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Self::Groq => "llama3-70b-8192",
            Self::Google => "gemini-1.5-pro",
            Self::OpenAI => "gpt-3.5-turbo",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::Groq => "https://api.groq.com/openai/v1",
            Self::Google => "https://generativelanguage.googleapis.com/v1beta",
            Self::OpenAI => "https://api.openai.com/v1",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Uniform construction interface for a provider's chat client.
///
/// Implementations reject generation parameters their provider cannot
/// accept; the factory reports such failures as client initialization errors.
pub trait ClientAdapter: Send + Sync {
    fn build(
        &self,
        credentials: &Credentials,
        params: &GenerationParams,
        model_id: &str,
    ) -> Result<Arc<dyn ChatClient>>;
}

/// Adapter for providers exposing the OpenAI chat-completions protocol.
pub struct OpenAiCompatibleAdapter {
    provider: ProviderId,
}

impl OpenAiCompatibleAdapter {
    pub fn new(provider: ProviderId) -> Self {
        Self { provider }
    }
}

impl ClientAdapter for OpenAiCompatibleAdapter {
    fn build(
        &self,
        credentials: &Credentials,
        params: &GenerationParams,
        model_id: &str,
    ) -> Result<Arc<dyn ChatClient>> {
        check_temperature(params.temperature, 0.0, 2.0)?;
        check_max_tokens(params.max_tokens)?;
        let client = OpenAiCompatibleClient::new(self.provider, credentials, params, model_id)?;
        Ok(Arc::new(client))
    }
}

/// Adapter for Google's Gemini `generateContent` protocol.
pub struct GeminiAdapter;

impl ClientAdapter for GeminiAdapter {
    fn build(
        &self,
        credentials: &Credentials,
        params: &GenerationParams,
        model_id: &str,
    ) -> Result<Arc<dyn ChatClient>> {
        check_temperature(params.temperature, 0.0, 2.0)?;
        check_max_tokens(params.max_tokens)?;
        let client = GeminiClient::new(credentials, params, model_id)?;
        Ok(Arc::new(client))
    }
}

/// The adapter a provider slot uses unless one is injected.
pub fn default_adapter(provider: ProviderId) -> Box<dyn ClientAdapter> {
    match provider {
        ProviderId::Groq | ProviderId::OpenAI => Box::new(OpenAiCompatibleAdapter::new(provider)),
        ProviderId::Google => Box::new(GeminiAdapter),
    }
}

fn check_temperature(temperature: f32, min: f32, max: f32) -> Result<()> {
    if !(min..=max).contains(&temperature) {
        bail!(
            "unsupported temperature {} (expected {}..={})",
            temperature,
            min,
            max
        );
    }
    Ok(())
}

fn check_max_tokens(max_tokens: Option<u32>) -> Result<()> {
    if max_tokens == Some(0) {
        bail!("unsupported max_tokens 0 (must be positive)");
    }
    Ok(())
}
