//! The fixed translation prompt.
//!
//! Language names are bound when the prompt is built; the input text is
//! bound when it is rendered. The input appears twice in the rendered
//! conversation: once inside the system framing and once as the human turn.

use crate::client::{ChatMessage, Role};

const SYSTEM_TEMPLATE: &str = r#"You are an advanced translation assistant equipped with powerful language models. Your task is to accurately translate the provided text from {input_language} to {output_language}.

## Instructions

1. Translation Output
- Provide a precise and fluent translation of the text.
- Maintain the original meaning, tone, and context.
- Reply with the translation first, without any preamble.

2. Suggestions and Insights (optional)
- If the text contains idioms, cultural references, or ambiguous phrasing, add a blank line after the translation followed by the heading **Suggestions and Insights:** and short notes explaining them.
- Omit this section entirely when there is nothing worth noting.

## Guidelines
- Make sure the translation is clear, contextually accurate, and grammatically correct.
- Ensure that suggestions are relevant and enhance the quality of the translation.

**Input Text:**
{input}"#;

const HUMAN_TEMPLATE: &str = "{input}";

/// A translation prompt with both language names bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSpec {
    source_language: String,
    target_language: String,
}

/// Build the prompt for translating from `source_language` to `target_language`.
pub fn build_prompt(source_language: &str, target_language: &str) -> PromptSpec {
    PromptSpec {
        source_language: source_language.to_string(),
        target_language: target_language.to_string(),
    }
}

impl PromptSpec {
    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    /// Render the system and human messages for `input_text`.
    pub fn render(&self, input_text: &str) -> Vec<ChatMessage> {
        let vars = [
            ("input_language", self.source_language.as_str()),
            ("output_language", self.target_language.as_str()),
            ("input", input_text),
        ];
        vec![
            ChatMessage::new(Role::System, render_template(SYSTEM_TEMPLATE, &vars)),
            ChatMessage::new(Role::Human, render_template(HUMAN_TEMPLATE, &vars)),
        ]
    }
}

/// Substitute `{name}` placeholders in a single pass.
///
/// Substituted values are copied verbatim, so braces inside them are never
/// expanded. Unknown placeholders are kept as written.
fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
