//! Error taxonomy for translation requests.
//!
//! Errors stay typed inside the crate. At the public boundary they are
//! mapped, in one place, onto the fixed sentinel messages the UI renders.

use crate::parser::TranslationResult;
use crate::provider::ProviderId;
use thiserror::Error;

pub const INVALID_SELECTION_MESSAGE: &str = "Invalid model selected.";
pub const CHAIN_UNAVAILABLE_MESSAGE: &str = "Translation chain not available.";
pub const DETECTION_FAILURE_MESSAGE: &str = "Error detecting language or performing translation.";
pub const INVOCATION_FAILURE_MESSAGE: &str = "An unexpected error occurred during translation.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslatorError {
    /// The provider has no API key configured.
    #[error("no API key configured for {0}")]
    MissingCredential(ProviderId),

    /// The provider's client rejected its construction parameters.
    #[error("failed to initialize {provider} client: {cause}")]
    ClientInitialization { provider: ProviderId, cause: String },

    /// The provider is recognized but its chain has no client.
    #[error("translation chain for {0} is not available")]
    ChainUnavailable(ProviderId),

    /// The remote call failed (transport, status, or response shape).
    #[error("{provider} request failed: {cause}")]
    ProviderInvocation { provider: ProviderId, cause: String },

    #[error("language detection failed: {0}")]
    Detection(String),

    #[error("unknown provider '{0}'")]
    InvalidSelection(String),
}

impl TranslatorError {
    /// The human-readable message shown in place of a translation.
    pub fn sentinel_message(&self) -> &'static str {
        match self {
            Self::InvalidSelection(_) => INVALID_SELECTION_MESSAGE,
            Self::MissingCredential(_)
            | Self::ClientInitialization { .. }
            | Self::ChainUnavailable(_) => CHAIN_UNAVAILABLE_MESSAGE,
            Self::Detection(_) => DETECTION_FAILURE_MESSAGE,
            Self::ProviderInvocation { .. } => INVOCATION_FAILURE_MESSAGE,
        }
    }
}

impl From<TranslatorError> for TranslationResult {
    fn from(error: TranslatorError) -> Self {
        TranslationResult::sentinel(error.sentinel_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_selection_maps_to_invalid_model() {
        let result: TranslationResult = TranslatorError::InvalidSelection("Z".to_string()).into();
        assert_eq!(result.translation, "Invalid model selected.");
        assert_eq!(result.insights, "");
    }

    #[test]
    fn test_unavailable_family_maps_to_chain_not_available() {
        let errors = vec![
            TranslatorError::MissingCredential(ProviderId::Groq),
            TranslatorError::ClientInitialization {
                provider: ProviderId::Google,
                cause: "bad param".to_string(),
            },
            TranslatorError::ChainUnavailable(ProviderId::OpenAI),
        ];
        for error in errors {
            let result: TranslationResult = error.into();
            assert_eq!(result.translation, "Translation chain not available.");
            assert!(result.insights.is_empty());
        }
    }

    #[test]
    fn test_detection_maps_to_detection_message() {
        let result: TranslationResult = TranslatorError::Detection("empty".to_string()).into();
        assert_eq!(
            result.translation,
            "Error detecting language or performing translation."
        );
    }

    #[test]
    fn test_invocation_maps_to_unexpected_error() {
        let result: TranslationResult = TranslatorError::ProviderInvocation {
            provider: ProviderId::OpenAI,
            cause: "timeout".to_string(),
        }
        .into();
        assert_eq!(
            result.translation,
            "An unexpected error occurred during translation."
        );
        assert_eq!(result.insights, "");
    }

    #[test]
    fn test_error_display_names_provider() {
        let err = TranslatorError::MissingCredential(ProviderId::Google);
        assert_eq!(err.to_string(), "no API key configured for Google");

        let err = TranslatorError::ProviderInvocation {
            provider: ProviderId::Groq,
            cause: "429 Too Many Requests".to_string(),
        };
        assert!(err.to_string().contains("Groq"));
        assert!(err.to_string().contains("429"));
    }
}
