//! Web front end: a translation form and a small JSON API around
//! `TranslationRouter::perform_translation`.

use crate::config::Settings;
use crate::languages::target_languages_with;
use crate::parser::TranslationResult;
use crate::provider::ProviderId;
use crate::router::TranslationRouter;
use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub const API_KEY_HEADER: &str = "x-api-key";

pub struct AppState {
    pub router: Arc<TranslationRouter>,
    pub settings: Arc<Settings>,
}

#[derive(Debug, Deserialize)]
pub struct TranslateBody {
    /// Provider name as shown in the form ("Groq", "Google", "OpenAI")
    pub model: String,
    pub text: String,
    #[serde(default)]
    pub target_language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    pub providers: Vec<&'static str>,
    pub available: Vec<&'static str>,
    pub languages: Vec<String>,
    pub default_target_language: String,
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/options", get(options))
        .route("/api/translate", post(translate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind to the configured port and serve until the process stops.
pub async fn serve(state: Arc<AppState>) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], state.settings.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Translator listening on http://{}", addr);
    axum::serve(listener, app(state))
        .await
        .context("HTTP server error")
}

async fn health() -> &'static str {
    "OK"
}

async fn options(State(state): State<Arc<AppState>>) -> Json<OptionsResponse> {
    let default = state.settings.default_target_language.as_str();
    Json(OptionsResponse {
        providers: ProviderId::ALL.iter().map(|p| p.name()).collect(),
        available: state
            .router
            .available_providers()
            .into_iter()
            .map(ProviderId::name)
            .collect(),
        languages: target_languages_with(default)
            .into_iter()
            .map(str::to_string)
            .collect(),
        default_target_language: default.to_string(),
    })
}

async fn translate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<TranslateBody>,
) -> Result<Json<TranslationResult>, (StatusCode, Json<serde_json::Value>)> {
    if !authorized(&headers, state.settings.api_key.as_deref()) {
        warn!("Rejected translate request with missing or invalid API key");
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"error": "invalid or missing API key"})),
        ));
    }

    let target_language = body
        .target_language
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(&state.settings.default_target_language);

    let result = state
        .router
        .perform_translation(&body.model, target_language, &body.text)
        .await;
    Ok(Json(result))
}

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_index(&state))
}

fn authorized(headers: &HeaderMap, expected: Option<&str>) -> bool {
    let Some(expected) = expected else {
        return true;
    };
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|provided| constant_time_compare(provided, expected))
}

/// Constant-time string comparison for API keys
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_options<'a>(values: impl IntoIterator<Item = &'a str>, selected: &str) -> String {
    values
        .into_iter()
        .map(|v| {
            let v = escape_html(v);
            let attr = if v == escape_html(selected) { " selected" } else { "" };
            format!("<option value=\"{v}\"{attr}>{v}</option>")
        })
        .collect::<Vec<_>>()
        .join("")
}

fn render_index(state: &AppState) -> String {
    let default_language = state.settings.default_target_language.as_str();
    let providers = render_options(
        ProviderId::ALL.iter().map(|p| p.name()),
        ProviderId::Groq.name(),
    );
    let languages = render_options(target_languages_with(default_language), default_language);
    let api_key_field = if state.settings.api_key.is_some() {
        r#"<label>API Key<input id="api-key" type="password" autocomplete="off"></label>"#
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Multilingual Translator</title>
<style>
  body {{ font-family: sans-serif; max-width: 800px; margin: 2rem auto; padding: 0 1rem; }}
  .row {{ display: flex; gap: 1.5rem; }}
  .col {{ flex: 1; display: flex; flex-direction: column; gap: 0.75rem; }}
  textarea {{ width: 100%; min-height: 8rem; }}
  label {{ display: flex; flex-direction: column; gap: 0.25rem; }}
  #insights {{ white-space: pre-wrap; color: #555; }}
</style>
</head>
<body>
<h1>Multilingual Translator</h1>
<p>Translate text between different languages using your chosen chatbot model.</p>
<div class="row">
  <div class="col">
    <label>Choose Translation Model<select id="model">{providers}</select></label>
    <label>Input Text<textarea id="input" placeholder="Enter text here..."></textarea></label>
    <label>Output Language<select id="language">{languages}</select></label>
    {api_key_field}
    <button id="translate">Translate</button>
  </div>
  <div class="col">
    <label>Translation Output<textarea id="output" readonly placeholder="Translation will appear here..."></textarea></label>
    <div id="insights"></div>
    <button id="copy">Copy to Clipboard</button>
    <span id="copied"></span>
    <button id="clear">Clear</button>
  </div>
</div>
<script>
const $ = (id) => document.getElementById(id);
$("translate").addEventListener("click", async () => {{
  $("output").value = "Translating...";
  $("insights").textContent = "";
  const headers = {{ "Content-Type": "application/json" }};
  const key = $("api-key");
  if (key) headers["{header}"] = key.value;
  try {{
    const res = await fetch("/api/translate", {{
      method: "POST",
      headers,
      body: JSON.stringify({{ model: $("model").value, text: $("input").value, target_language: $("language").value }}),
    }});
    const data = await res.json();
    $("output").value = res.ok ? data.translation : (data.error || "Request failed");
    $("insights").textContent = res.ok ? data.insights : "";
  }} catch (e) {{
    $("output").value = "Request failed";
  }}
}});
$("copy").addEventListener("click", async () => {{
  await navigator.clipboard.writeText($("output").value);
  $("copied").textContent = "Copied!";
}});
$("clear").addEventListener("click", () => {{
  $("output").value = "";
  $("insights").textContent = "";
  $("copied").textContent = "";
}});
</script>
</body>
</html>
"#,
        providers = providers,
        languages = languages,
        api_key_field = api_key_field,
        header = API_KEY_HEADER,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("secret123", "secret123"));
        assert!(!constant_time_compare("secret123", "secret124"));
        assert!(!constant_time_compare("secret123", "secret12"));
        assert!(!constant_time_compare("", "secret"));
    }

    #[test]
    fn test_authorized_without_configured_key() {
        assert!(authorized(&HeaderMap::new(), None));
    }

    #[test]
    fn test_authorized_requires_matching_header() {
        let mut headers = HeaderMap::new();
        assert!(!authorized(&headers, Some("secret")));

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("wrong"));
        assert!(!authorized(&headers, Some("secret")));

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("secret"));
        assert!(authorized(&headers, Some("secret")));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_render_options_marks_selected() {
        let html = render_options(["English", "German"], "German");
        assert_eq!(
            html,
            "<option value=\"English\">English</option><option value=\"German\" selected>German</option>"
        );
    }

    #[test]
    fn test_index_lists_providers_and_default_language() {
        let settings = Arc::new(Settings {
            default_target_language: "French".to_string(),
            ..Settings::default()
        });
        let state = AppState {
            router: Arc::new(TranslationRouter::new(settings.clone())),
            settings,
        };

        let html = render_index(&state);
        assert!(html.contains("<option value=\"Groq\" selected>Groq</option>"));
        assert!(html.contains("<option value=\"Google\">Google</option>"));
        assert!(html.contains("<option value=\"OpenAI\">OpenAI</option>"));
        assert!(html.contains("<option value=\"French\" selected>French</option>"));
        assert!(!html.contains("api-key\" type"));
    }

    #[test]
    fn test_index_shows_api_key_field_when_protected() {
        let settings = Arc::new(Settings {
            api_key: Some("secret".to_string()),
            ..Settings::default()
        });
        let state = AppState {
            router: Arc::new(TranslationRouter::new(settings.clone())),
            settings,
        };

        assert!(render_index(&state).contains("id=\"api-key\""));
    }
}
