use anyhow::Result;
use multilingual_translator::config::Settings;
use multilingual_translator::router::TranslationRouter;
use multilingual_translator::server::{self, AppState};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when variables come from the environment)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("multilingual_translator=info".parse()?),
        )
        .init();

    info!("Starting multilingual translator");

    let settings = Arc::new(Settings::from_env()?);
    for provider in settings.missing_credentials() {
        warn!(
            "{}_API_KEY is not set; {} translations are disabled",
            provider.env_prefix(),
            provider
        );
    }

    let router = Arc::new(TranslationRouter::new(settings.clone()));
    server::serve(Arc::new(AppState { router, settings })).await
}
