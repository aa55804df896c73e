//! Provider selection and the public `perform_translation` entry point.

use crate::chain::TranslationChain;
use crate::config::Settings;
use crate::detector::LanguageDetector;
use crate::error::TranslatorError;
use crate::factory::ProviderClientFactory;
use crate::parser::{parse, TranslationResult};
use crate::provider::ProviderId;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// One translation round trip, after the source language is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub provider: ProviderId,
    pub source_language: String,
    pub target_language: String,
    pub input_text: String,
}

/// Owns one chain per provider slot and routes requests between them.
///
/// Shared across concurrent requests behind an `Arc`; nothing in it is
/// mutated after construction.
pub struct TranslationRouter {
    chains: HashMap<ProviderId, TranslationChain>,
    detector: LanguageDetector,
}

impl TranslationRouter {
    /// Build chains for every provider from `settings`.
    pub fn new(settings: Arc<Settings>) -> Self {
        Self::with_factory(&ProviderClientFactory::new(settings), LanguageDetector::new())
    }

    pub fn with_factory(factory: &ProviderClientFactory, detector: LanguageDetector) -> Self {
        let chains: HashMap<_, _> = ProviderId::ALL
            .into_iter()
            .map(|p| (p, TranslationChain::new(p, factory)))
            .collect();

        let available: Vec<_> = chains
            .values()
            .filter(|c| c.is_available())
            .map(|c| c.provider().name())
            .collect();
        if available.is_empty() {
            warn!("No translation provider is available; every request will fail");
        } else {
            info!("Translation providers available: {}", available.join(", "));
        }

        Self { chains, detector }
    }

    /// Providers whose chain was created successfully, in display order.
    pub fn available_providers(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .into_iter()
            .filter(|p| self.chains.get(p).is_some_and(TranslationChain::is_available))
            .collect()
    }

    /// Translate `input_text` into `target_language` with the named provider.
    ///
    /// Never fails: every error becomes a sentinel result so the caller
    /// always has something to display.
    pub async fn perform_translation(
        &self,
        provider_name: &str,
        target_language: &str,
        input_text: &str,
    ) -> TranslationResult {
        match self
            .try_translate(provider_name, target_language, input_text)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                error!("Translation with '{}' failed: {}", provider_name, e);
                e.into()
            }
        }
    }

    /// Same as `perform_translation`, but with the typed error kept.
    pub async fn try_translate(
        &self,
        provider_name: &str,
        target_language: &str,
        input_text: &str,
    ) -> Result<TranslationResult, TranslatorError> {
        let provider = ProviderId::from_name(provider_name)
            .ok_or_else(|| TranslatorError::InvalidSelection(provider_name.to_string()))?;

        let chain = self
            .chains
            .get(&provider)
            .ok_or(TranslatorError::ChainUnavailable(provider))?;
        if let Some(cause) = chain.creation_error() {
            warn!("{} was requested but is unavailable: {}", provider, cause);
            return Err(TranslatorError::ChainUnavailable(provider));
        }

        let source = self.detector.detect(input_text)?;
        let request = TranslationRequest {
            provider,
            source_language: source.code().to_string(),
            target_language: target_language.to_string(),
            input_text: input_text.to_string(),
        };
        info!(
            "Translating {} chars from {} ({}) to {} with {}",
            request.input_text.chars().count(),
            source.name(),
            request.source_language,
            request.target_language,
            request.provider
        );

        let raw = chain
            .invoke(
                &request.source_language,
                &request.target_language,
                &request.input_text,
            )
            .await?;

        Ok(parse(&raw))
    }
}
