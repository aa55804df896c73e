//! A provider's client composed with the translation prompt.

use crate::client::ChatClient;
use crate::error::TranslatorError;
use crate::factory::ProviderClientFactory;
use crate::prompt::build_prompt;
use crate::provider::ProviderId;
use std::sync::Arc;
use tracing::{debug, error};

pub struct TranslationChain {
    provider: ProviderId,
    client: Result<Arc<dyn ChatClient>, TranslatorError>,
}

impl TranslationChain {
    /// Create the chain for `provider`. A client that cannot be obtained
    /// is logged and leaves the chain unavailable rather than failing.
    pub fn new(provider: ProviderId, factory: &ProviderClientFactory) -> Self {
        let client = factory.get_client(provider);
        if let Err(e) = &client {
            error!("Error creating translation chain for {}: {}", provider, e);
        }
        Self { provider, client }
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    pub fn is_available(&self) -> bool {
        self.client.is_ok()
    }

    /// Why the chain is unavailable, if it is.
    pub fn creation_error(&self) -> Option<&TranslatorError> {
        self.client.as_ref().err()
    }

    /// Run the prompt through the provider and return its raw text.
    pub async fn invoke(
        &self,
        source_language: &str,
        target_language: &str,
        input_text: &str,
    ) -> Result<String, TranslatorError> {
        let client = self
            .client
            .as_ref()
            .map_err(|_| TranslatorError::ChainUnavailable(self.provider))?;

        let prompt = build_prompt(source_language, target_language);
        debug!(
            "Invoking {} ({}) for {} -> {}",
            self.provider,
            client.model(),
            prompt.source_language(),
            prompt.target_language()
        );
        let messages = prompt.render(input_text);

        client
            .complete(&messages)
            .await
            .map_err(|e| TranslatorError::ProviderInvocation {
                provider: self.provider,
                cause: format!("{:#}", e),
            })
    }
}
