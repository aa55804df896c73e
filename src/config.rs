use crate::client::{Credentials, GenerationParams};
use crate::provider::ProviderId;
use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

/// Process-wide settings, loaded once and immutable afterwards.
#[derive(Debug, Clone)]
pub struct Settings {
    // Providers
    pub provider_api_keys: HashMap<ProviderId, String>,
    pub provider_model_ids: HashMap<ProviderId, String>,
    pub provider_base_urls: HashMap<ProviderId, String>,

    // Generation
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout: Option<Duration>,
    pub max_retries: u32,

    // Web surface
    pub default_target_language: String,
    pub port: u16,
    pub api_key: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider_api_keys: HashMap::new(),
            provider_model_ids: HashMap::new(),
            provider_base_urls: HashMap::new(),
            temperature: 0.0,
            max_tokens: None,
            timeout: None,
            max_retries: 2,
            default_target_language: "German".to_string(),
            port: 7860,
            api_key: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let mut settings = Self::default();

        for provider in ProviderId::ALL {
            let prefix = provider.env_prefix();
            if let Some(key) = non_empty_var(&format!("{}_API_KEY", prefix)) {
                settings.provider_api_keys.insert(provider, key);
            }
            if let Some(model) = non_empty_var(&format!("{}_MODEL", prefix)) {
                settings.provider_model_ids.insert(provider, model);
            }
            if let Some(url) = non_empty_var(&format!("{}_API_URL", prefix)) {
                settings.provider_base_urls.insert(provider, url);
            }
        }

        // Generation
        if let Some(temperature) = parse_var("TRANSLATOR_TEMPERATURE")? {
            settings.temperature = temperature;
        }
        settings.max_tokens = parse_var("TRANSLATOR_MAX_TOKENS")?;
        settings.timeout = parse_var::<u64>("TRANSLATOR_TIMEOUT_SECS")?.map(Duration::from_secs);
        if let Some(max_retries) = parse_var("TRANSLATOR_MAX_RETRIES")? {
            settings.max_retries = max_retries;
        }

        // Web surface
        if let Some(language) = non_empty_var("DEFAULT_TARGET_LANGUAGE") {
            settings.default_target_language = language;
        }
        if let Some(port) = parse_var("PORT")? {
            settings.port = port;
        }
        settings.api_key = non_empty_var("API_KEY");

        settings.validate()?;
        Ok(settings)
    }

    /// Reject values no provider can accept. Missing API keys are not an
    /// error here: they only disable the affected provider.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            bail!(
                "TRANSLATOR_TEMPERATURE must be between 0 and 2, got {}",
                self.temperature
            );
        }
        if self.max_tokens == Some(0) {
            bail!("TRANSLATOR_MAX_TOKENS must be positive");
        }
        if self.timeout == Some(Duration::ZERO) {
            bail!("TRANSLATOR_TIMEOUT_SECS must be positive");
        }
        Ok(())
    }

    /// The provider's API key, if one is configured and non-empty.
    pub fn api_key_for(&self, provider: ProviderId) -> Option<&str> {
        self.provider_api_keys
            .get(&provider)
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
    }

    pub fn model_for(&self, provider: ProviderId) -> &str {
        self.provider_model_ids
            .get(&provider)
            .map(String::as_str)
            .unwrap_or_else(|| provider.default_model())
    }

    pub fn base_url_for(&self, provider: ProviderId) -> &str {
        self.provider_base_urls
            .get(&provider)
            .map(String::as_str)
            .unwrap_or_else(|| provider.default_base_url())
    }

    /// Credentials for a provider, or `None` when it has no API key.
    pub fn credentials_for(&self, provider: ProviderId) -> Option<Credentials> {
        self.api_key_for(provider).map(|api_key| Credentials {
            api_key: api_key.to_string(),
            base_url: self.base_url_for(provider).to_string(),
        })
    }

    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout: self.timeout,
            max_retries: self.max_retries,
        }
    }

    /// Providers that will be disabled for lack of an API key.
    pub fn missing_credentials(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .into_iter()
            .filter(|p| self.api_key_for(*p).is_none())
            .collect()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    non_empty_var(name)
        .map(|v| {
            v.parse::<T>()
                .with_context(|| format!("{} has an invalid value: '{}'", name, v))
        })
        .transpose()
}
