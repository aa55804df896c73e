//! Output languages offered by the web form.
//!
//! Any language name is accepted by the translator itself; this list only
//! drives the form's dropdown.

pub const TARGET_LANGUAGES: &[&str] = &[
    "English",
    "Hindi",
    "German",
    "French",
    "Spanish",
    "Chinese",
    "Japanese",
    "Korean",
    "Russian",
    "Arabic",
    "Portuguese",
    "Italian",
    "Turkish",
    "Dutch",
    "Swedish",
    "Norwegian",
    "Danish",
    "Polish",
    "Czech",
    "Greek",
    "Hungarian",
];

/// The offered languages, with `default` first if it is not already listed.
pub fn target_languages_with(default: &str) -> Vec<&str> {
    let mut languages = Vec::with_capacity(TARGET_LANGUAGES.len() + 1);
    if !TARGET_LANGUAGES.contains(&default) {
        languages.push(default);
    }
    languages.extend_from_slice(TARGET_LANGUAGES);
    languages
}
