//! Splitting a raw model response into translation and insights.

use serde::{Deserialize, Serialize};

/// Marks the start of the optional insights section in a model response.
///
/// The translation prompt asks the model to use exactly this heading.
pub const INSIGHTS_DELIMITER: &str = "\n\n**Suggestions and Insights:**";

/// Structured result handed back to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub translation: String,
    pub insights: String,
}

impl TranslationResult {
    /// A result carrying only a fixed message and no insights.
    pub fn sentinel(message: &str) -> Self {
        Self {
            translation: message.to_string(),
            insights: String::new(),
        }
    }
}

/// Parse a raw response. Only the first delimiter splits; a missing
/// delimiter is not an error.
pub fn parse(raw_response: &str) -> TranslationResult {
    match raw_response.split_once(INSIGHTS_DELIMITER) {
        Some((translation, insights)) => TranslationResult {
            translation: translation.trim().to_string(),
            insights: insights.trim().to_string(),
        },
        None => TranslationResult {
            translation: raw_response.trim().to_string(),
            insights: String::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_splits_on_delimiter() {
        let raw = format!("T{}\nI", INSIGHTS_DELIMITER);
        let result = parse(&raw);
        assert_eq!(result.translation, "T");
        assert_eq!(result.insights, "I");
    }

    #[test]
    fn test_parse_without_delimiter() {
        let result = parse("  Hallo, wie geht es dir?\n");
        assert_eq!(result.translation, "Hallo, wie geht es dir?");
        assert_eq!(result.insights, "");
    }

    #[test]
    fn test_parse_trims_both_sides() {
        let raw = format!(
            "\n  Bonjour le monde  {}\n\n- \"monde\" can also mean \"people\".\n\n",
            INSIGHTS_DELIMITER
        );
        let result = parse(&raw);
        assert_eq!(result.translation, "Bonjour le monde");
        assert_eq!(result.insights, "- \"monde\" can also mean \"people\".");
    }

    #[test]
    fn test_parse_splits_only_on_first_delimiter() {
        let raw = format!("A{}B{}C", INSIGHTS_DELIMITER, INSIGHTS_DELIMITER);
        let result = parse(&raw);
        assert_eq!(result.translation, "A");
        assert_eq!(result.insights, format!("B{}C", INSIGHTS_DELIMITER).trim());
    }

    #[test]
    fn test_parse_ignores_heading_without_leading_blank_line() {
        // The heading must follow a blank line to count as the delimiter
        let raw = "Hola **Suggestions and Insights:** nada";
        let result = parse(raw);
        assert_eq!(result.translation, raw);
        assert!(result.insights.is_empty());
    }

    #[test]
    fn test_parse_empty_response() {
        assert_eq!(parse(""), TranslationResult::default());
    }

    #[test]
    fn test_sentinel_has_no_insights() {
        let result = TranslationResult::sentinel("Invalid model selected.");
        assert_eq!(result.translation, "Invalid model selected.");
        assert!(result.insights.is_empty());
    }

    #[test]
    fn test_result_serializes_both_fields() {
        let json = serde_json::to_value(TranslationResult::sentinel("x")).unwrap();
        assert_eq!(json, serde_json::json!({"translation": "x", "insights": ""}));
    }

    proptest! {
        #[test]
        fn prop_no_delimiter_means_trimmed_whole(text in "[^*]*") {
            let result = parse(&text);
            prop_assert_eq!(result.translation, text.trim());
            prop_assert!(result.insights.is_empty());
        }

        #[test]
        fn prop_translation_and_insights_are_trimmed(
            before in "[a-zA-Z ,.\n]{0,40}",
            after in "[a-zA-Z ,.\n]{0,40}",
        ) {
            let result = parse(&format!("{}{}{}", before, INSIGHTS_DELIMITER, after));
            prop_assert_eq!(result.translation.as_str(), before.trim());
            prop_assert_eq!(result.insights.as_str(), after.trim());
        }
    }
}
