//! Multilingual text translation routed through one of three LLM providers.
//!
//! The entry point is [`router::TranslationRouter::perform_translation`],
//! which never fails: errors come back as fixed sentinel messages.

pub mod chain;
pub mod client;
pub mod config;
pub mod detector;
pub mod error;
pub mod factory;
pub mod languages;
pub mod parser;
pub mod prompt;
pub mod provider;
pub mod retry;
pub mod router;
pub mod server;

pub use config::Settings;
pub use error::TranslatorError;
pub use parser::TranslationResult;
pub use provider::ProviderId;
pub use router::TranslationRouter;
