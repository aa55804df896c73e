//! Lazily built, memoized chat clients, one per provider.

use crate::client::ChatClient;
use crate::config::Settings;
use crate::error::TranslatorError;
use crate::provider::{default_adapter, ClientAdapter, ProviderId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

type ClientSlot = Result<Arc<dyn ChatClient>, TranslatorError>;

/// Builds each provider's client at most once.
///
/// The outcome of the first construction is remembered, whether it
/// succeeded or failed, so a provider that failed to initialize stays
/// disabled for the lifetime of the factory.
pub struct ProviderClientFactory {
    settings: Arc<Settings>,
    adapters: HashMap<ProviderId, Box<dyn ClientAdapter>>,
    slots: Mutex<HashMap<ProviderId, ClientSlot>>,
}

impl ProviderClientFactory {
    pub fn new(settings: Arc<Settings>) -> Self {
        let adapters = ProviderId::ALL
            .into_iter()
            .map(|p| (p, default_adapter(p)))
            .collect();
        Self::with_adapters(settings, adapters)
    }

    /// Use custom adapters. Providers without an adapter fall back to
    /// their default one.
    pub fn with_adapters(
        settings: Arc<Settings>,
        mut adapters: HashMap<ProviderId, Box<dyn ClientAdapter>>,
    ) -> Self {
        for provider in ProviderId::ALL {
            adapters
                .entry(provider)
                .or_insert_with(|| default_adapter(provider));
        }
        Self {
            settings,
            adapters,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Get the provider's client, constructing it on first use.
    pub fn get_client(&self, provider: ProviderId) -> Result<Arc<dyn ChatClient>, TranslatorError> {
        // A panic while holding the lock cannot leave a half-written slot
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(slot) = slots.get(&provider) {
            debug!("Reusing {} client", provider);
            return slot.clone();
        }

        let slot = self.construct(provider);
        slots.insert(provider, slot.clone());
        slot
    }

    fn construct(&self, provider: ProviderId) -> ClientSlot {
        let credentials = self
            .settings
            .credentials_for(provider)
            .ok_or(TranslatorError::MissingCredential(provider))?;

        let adapter = self
            .adapters
            .get(&provider)
            .ok_or_else(|| TranslatorError::ClientInitialization {
                provider,
                cause: "no client adapter registered".to_string(),
            })?;

        let model = self.settings.model_for(provider);
        let client = adapter
            .build(&credentials, &self.settings.generation_params(), model)
            .map_err(|e| TranslatorError::ClientInitialization {
                provider,
                cause: format!("{:#}", e),
            })?;

        info!("Initialized {} client (model: {})", provider, model);
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ChatMessage, Credentials, GenerationParams};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    // ==================== Test Doubles ====================

    struct EchoClient {
        model: String,
    }

    #[async_trait]
    impl ChatClient for EchoClient {
        fn model(&self) -> &str {
            &self.model
        }

        async fn complete(&self, messages: &[ChatMessage]) -> anyhow::Result<String> {
            Ok(messages.last().map(|m| m.content.clone()).unwrap_or_default())
        }
    }

    /// Counts constructions; optionally fails every one of them
    struct CountingAdapter {
        builds: Arc<AtomicU32>,
        fail: bool,
    }

    impl ClientAdapter for CountingAdapter {
        fn build(
            &self,
            _credentials: &Credentials,
            _params: &GenerationParams,
            model_id: &str,
        ) -> anyhow::Result<Arc<dyn ChatClient>> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("unexpected keyword argument 'max_tokens'");
            }
            Ok(Arc::new(EchoClient {
                model: model_id.to_string(),
            }))
        }
    }

    fn settings_with_keys(providers: &[ProviderId]) -> Arc<Settings> {
        let mut settings = Settings::default();
        for provider in providers {
            settings
                .provider_api_keys
                .insert(*provider, format!("{}-key", provider.env_prefix()));
        }
        Arc::new(settings)
    }

    fn counting_factory(
        settings: Arc<Settings>,
        provider: ProviderId,
        fail: bool,
    ) -> (ProviderClientFactory, Arc<AtomicU32>) {
        let builds = Arc::new(AtomicU32::new(0));
        let mut adapters: HashMap<ProviderId, Box<dyn ClientAdapter>> = HashMap::new();
        adapters.insert(
            provider,
            Box::new(CountingAdapter {
                builds: builds.clone(),
                fail,
            }),
        );
        (ProviderClientFactory::with_adapters(settings, adapters), builds)
    }

    // ==================== Memoization Tests ====================

    #[test]
    fn test_get_client_returns_same_instance() {
        let settings = settings_with_keys(&[ProviderId::Groq]);
        let (factory, builds) = counting_factory(settings, ProviderId::Groq, false);

        let first = factory.get_client(ProviderId::Groq).unwrap();
        let second = factory.get_client(ProviderId::Groq).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_default_adapters_memoize_too() {
        let factory = ProviderClientFactory::new(settings_with_keys(&ProviderId::ALL));

        for provider in ProviderId::ALL {
            let first = factory.get_client(provider).unwrap();
            let second = factory.get_client(provider).unwrap();
            assert!(Arc::ptr_eq(&first, &second));
            assert_eq!(first.model(), provider.default_model());
        }
    }

    #[test]
    fn test_concurrent_first_use_constructs_once() {
        let settings = settings_with_keys(&[ProviderId::OpenAI]);
        let (factory, builds) = counting_factory(settings, ProviderId::OpenAI, false);
        let factory = Arc::new(factory);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let factory = factory.clone();
                std::thread::spawn(move || factory.get_client(ProviderId::OpenAI).unwrap())
            })
            .collect();
        let clients: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(clients.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    // ==================== Failure Tests ====================

    #[test]
    fn test_missing_credential_names_provider() {
        let factory = ProviderClientFactory::new(settings_with_keys(&[]));

        for provider in ProviderId::ALL {
            let err = factory.get_client(provider).err().unwrap();
            assert_eq!(err, TranslatorError::MissingCredential(provider));
        }
    }

    #[test]
    fn test_missing_credential_does_not_call_adapter() {
        let (factory, builds) = counting_factory(settings_with_keys(&[]), ProviderId::Google, false);

        assert!(factory.get_client(ProviderId::Google).is_err());
        assert_eq!(builds.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_initialization_failure_is_not_retried() {
        let settings = settings_with_keys(&[ProviderId::Google]);
        let (factory, builds) = counting_factory(settings, ProviderId::Google, true);

        let first = factory.get_client(ProviderId::Google).err().unwrap();
        let second = factory.get_client(ProviderId::Google).err().unwrap();

        match &first {
            TranslatorError::ClientInitialization { provider, cause } => {
                assert_eq!(*provider, ProviderId::Google);
                assert!(cause.contains("max_tokens"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(first, second);
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_one_failing_provider_does_not_affect_others() {
        let settings = settings_with_keys(&ProviderId::ALL);
        let (factory, _) = counting_factory(settings, ProviderId::Groq, true);

        assert!(factory.get_client(ProviderId::Groq).is_err());
        assert!(factory.get_client(ProviderId::Google).is_ok());
        assert!(factory.get_client(ProviderId::OpenAI).is_ok());
    }

    #[test]
    fn test_out_of_range_settings_fail_initialization() {
        let mut settings = Settings::default();
        settings
            .provider_api_keys
            .insert(ProviderId::OpenAI, "sk-test".to_string());
        settings.temperature = 9.0;
        let factory = ProviderClientFactory::new(Arc::new(settings));

        let err = factory.get_client(ProviderId::OpenAI).err().unwrap();
        assert!(matches!(
            err,
            TranslatorError::ClientInitialization {
                provider: ProviderId::OpenAI,
                ..
            }
        ));
    }
}
