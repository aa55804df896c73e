//! Translate a single text from the command line
//!
//! Usage:
//!   cargo run --bin translate -- <provider> <target_language> <text...>
//!   cargo run --bin translate -- Groq German "Hello, how are you?"
//!
//! Providers: Groq, Google, OpenAI. Credentials are read from the same
//! environment variables (or .env file) as the web server.

use anyhow::{bail, Result};
use multilingual_translator::config::Settings;
use multilingual_translator::router::TranslationRouter;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("multilingual_translator=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 {
        bail!("usage: translate <provider> <target_language> <text...>");
    }
    let provider = &args[0];
    let target_language = &args[1];
    let text = args[2..].join(" ");

    let settings = Arc::new(Settings::from_env()?);
    let router = TranslationRouter::new(settings);
    let result = router
        .perform_translation(provider, target_language, &text)
        .await;

    println!("{}", result.translation);
    if !result.insights.is_empty() {
        println!("\n{}", result.insights);
    }
    Ok(())
}
