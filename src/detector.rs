//! Source language detection.
//!
//! whatlang's trigram detector answers first. Short inputs often get an
//! unreliable whatlang guess, so those fall back to lingua, which is slower
//! but accurate on a handful of words. Neither has random state: the same
//! input always yields the same language.

use crate::error::TranslatorError;
use lingua::{Language, LanguageDetector as LinguaDetector, LanguageDetectorBuilder};
use std::fmt;
use tracing::debug;
use whatlang::{Detector, Lang};

/// Minimum whatlang confidence for its answer to be used without a fallback.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.5;

/// Languages lingua chooses between, paired with their whatlang equivalent.
const FALLBACK_LANGUAGES: [(Language, Lang); 27] = [
    (Language::English, Lang::Eng),
    (Language::French, Lang::Fra),
    (Language::Spanish, Lang::Spa),
    (Language::German, Lang::Deu),
    (Language::Italian, Lang::Ita),
    (Language::Portuguese, Lang::Por),
    (Language::Dutch, Lang::Nld),
    (Language::Russian, Lang::Rus),
    (Language::Ukrainian, Lang::Ukr),
    (Language::Polish, Lang::Pol),
    (Language::Czech, Lang::Ces),
    (Language::Hungarian, Lang::Hun),
    (Language::Greek, Lang::Ell),
    (Language::Turkish, Lang::Tur),
    (Language::Swedish, Lang::Swe),
    (Language::Bokmal, Lang::Nob),
    (Language::Danish, Lang::Dan),
    (Language::Finnish, Lang::Fin),
    (Language::Arabic, Lang::Ara),
    (Language::Hebrew, Lang::Heb),
    (Language::Hindi, Lang::Hin),
    (Language::Chinese, Lang::Cmn),
    (Language::Japanese, Lang::Jpn),
    (Language::Korean, Lang::Kor),
    (Language::Vietnamese, Lang::Vie),
    (Language::Thai, Lang::Tha),
    (Language::Indonesian, Lang::Ind),
];

/// A detected language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageCode {
    code: &'static str,
    name: &'static str,
}

impl LanguageCode {
    /// ISO 639-1 code where one exists, ISO 639-3 otherwise.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// English name of the language.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl From<Lang> for LanguageCode {
    fn from(lang: Lang) -> Self {
        let code = match lang {
            Lang::Eng => "en",
            Lang::Fra => "fr",
            Lang::Spa => "es",
            Lang::Deu => "de",
            Lang::Ita => "it",
            Lang::Por => "pt",
            Lang::Nld => "nl",
            Lang::Rus => "ru",
            Lang::Ukr => "uk",
            Lang::Pol => "pl",
            Lang::Ces => "cs",
            Lang::Hun => "hu",
            Lang::Ell => "el",
            Lang::Tur => "tr",
            Lang::Swe => "sv",
            Lang::Nob => "no",
            Lang::Dan => "da",
            Lang::Fin => "fi",
            Lang::Ara => "ar",
            Lang::Heb => "he",
            Lang::Hin => "hi",
            Lang::Cmn => "zh",
            Lang::Jpn => "ja",
            Lang::Kor => "ko",
            Lang::Vie => "vi",
            Lang::Tha => "th",
            Lang::Ind => "id",
            // Fall back to the 3-letter code
            other => other.code(),
        };
        Self {
            code,
            name: lang.eng_name(),
        }
    }
}

pub struct LanguageDetector {
    primary: Detector,
    fallback: LinguaDetector,
    min_confidence: f64,
}

impl LanguageDetector {
    pub fn new() -> Self {
        Self::with_min_confidence(DEFAULT_MIN_CONFIDENCE)
    }

    /// Trust whatlang only when it is reliable and at least `min_confidence`
    /// (0.0..=1.0) sure; anything less is decided by lingua.
    pub fn with_min_confidence(min_confidence: f64) -> Self {
        let languages: Vec<Language> = FALLBACK_LANGUAGES.iter().map(|(l, _)| *l).collect();
        Self {
            primary: Detector::new(),
            fallback: LanguageDetectorBuilder::from_languages(&languages).build(),
            min_confidence,
        }
    }

    pub fn detect(&self, input_text: &str) -> Result<LanguageCode, TranslatorError> {
        if !input_text.chars().any(char::is_alphabetic) {
            return Err(TranslatorError::Detection(
                "input contains no linguistic content".to_string(),
            ));
        }

        let primary = self.primary.detect(input_text);
        if let Some(info) = &primary {
            if info.is_reliable() && info.confidence() >= self.min_confidence {
                return Ok(LanguageCode::from(info.lang()));
            }
            debug!(
                "whatlang guessed {} with confidence {:.3}; asking lingua",
                info.lang().eng_name(),
                info.confidence()
            );
        }

        self.fallback
            .detect_language_of(input_text)
            .and_then(|language| {
                FALLBACK_LANGUAGES
                    .iter()
                    .find(|(l, _)| *l == language)
                    .map(|(_, lang)| LanguageCode::from(*lang))
            })
            .ok_or_else(|| match primary {
                Some(info) => TranslatorError::Detection(format!(
                    "confidence {:.2} for {} is below {:.2} and no fallback match",
                    info.confidence(),
                    info.lang().eng_name(),
                    self.min_confidence
                )),
                None => TranslatorError::Detection("no language features found in input".to_string()),
            })
    }
}

impl Default for LanguageDetector {
    fn default() -> Self {
        Self::new()
    }
}
