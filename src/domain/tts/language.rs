use super::error::TtsServiceError;
use async_trait::async_trait;
use lingua::{Language, LanguageDetectorBuilder};
use serde::{Deserialize, Serialize};

/// Language returned when detection is unsure or finds an unsupported language
pub const DEFAULT_LANGUAGE: &str = "en";
/// Language tag used by region-aware providers when nothing else is known
pub const DEFAULT_LANGUAGE_REGION: &str = "en-US";
/// Detection results at or below this confidence are discarded
pub const MIN_DETECTION_CONFIDENCE: f64 = 0.1;

/// Languages supported by the synthesis backends with their default regions, preferred first
const LANGUAGE_REGIONS: &[(&str, &[&str])] = &[
    ("af", &["ZA"]),
    ("ar", &["XA"]),
    ("bg", &["BG"]),
    ("bn", &["IN"]),
    ("ca", &["ES"]),
    ("cmn", &["CN", "TW"]),
    ("cs", &["CZ"]),
    ("da", &["DK"]),
    ("de", &["DE"]),
    ("el", &["GR"]),
    ("en", &["US", "AU", "GB", "IN"]),
    ("es", &["ES", "US"]),
    ("eu", &["ES"]),
    ("fi", &["FI"]),
    ("fil", &["PH"]),
    ("fr", &["FR", "CA"]),
    ("gl", &["ES"]),
    ("gu", &["IN"]),
    ("he", &["IL"]),
    ("hi", &["IN"]),
    ("hu", &["HU"]),
    ("id", &["ID"]),
    ("is", &["IS"]),
    ("it", &["IT"]),
    ("ja", &["JP"]),
    ("kn", &["IN"]),
    ("ko", &["KR"]),
    ("lt", &["LT"]),
    ("lv", &["LV"]),
    ("ml", &["IN"]),
    ("mr", &["IN"]),
    ("ms", &["MY"]),
    ("nb", &["NO"]),
    ("nl", &["NL", "BE"]),
    ("pa", &["IN"]),
    ("pl", &["PL"]),
    ("pt", &["PT", "BR"]),
    ("ro", &["RO"]),
    ("ru", &["RU"]),
    ("sk", &["SK"]),
    ("sr", &["RS"]),
    ("sv", &["SE"]),
    ("ta", &["IN"]),
    ("te", &["IN"]),
    ("th", &["TH"]),
    ("tr", &["TR"]),
    ("uk", &["UA"]),
    ("vi", &["VN"]),
    ("yue", &["HK"]),
];

/// Default regions for a supported language code
pub fn default_regions(language: &str) -> Option<&'static [&'static str]> {
    LANGUAGE_REGIONS
        .iter()
        .find(|(code, _)| *code == language)
        .map(|(_, regions)| *regions)
}

/// Accept a detection result only when it is confident enough and the language is supported
pub fn resolve_detected_language(language_code: &str, confidence: f64) -> &str {
    if confidence > MIN_DETECTION_CONFIDENCE && default_regions(language_code).is_some() {
        language_code
    } else {
        DEFAULT_LANGUAGE
    }
}

/// Language identification used by providers to pick a default language or voice
#[async_trait]
pub trait LanguageDetector: Send + Sync {
    /// Detect the language of `text`, returning a supported language code or "en"
    async fn detect_language(&self, text: &str) -> Result<String, TtsServiceError>;

    /// Detect the language and append its default region, e.g. "fr-FR"
    async fn detect_language_and_region(&self, text: &str) -> Result<String, TtsServiceError> {
        let language = self.detect_language(text).await?;
        let region = default_regions(&language)
            .and_then(|regions| regions.first())
            .copied();

        Ok(match region {
            Some(region) => format!("{}-{}", language, region),
            None => DEFAULT_LANGUAGE_REGION.to_string(),
        })
    }
}

/// ISO 639-1 language codes supported by the offline detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LanguageCode {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "pt")]
    Portuguese,
}

impl LanguageCode {
    const ALL: [LanguageCode; 6] = [
        LanguageCode::English,
        LanguageCode::Spanish,
        LanguageCode::French,
        LanguageCode::German,
        LanguageCode::Italian,
        LanguageCode::Portuguese,
    ];

    /// Get the ISO 639-1 code as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageCode::English => "en",
            LanguageCode::Spanish => "es",
            LanguageCode::French => "fr",
            LanguageCode::German => "de",
            LanguageCode::Italian => "it",
            LanguageCode::Portuguese => "pt",
        }
    }

    /// Parse a language code or tag ("es", "es-US", "ES_es"), looking at the primary subtag only
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.split(['-', '_']).next()?.to_lowercase();
        Self::ALL.into_iter().find(|code| code.as_str() == primary)
    }

    /// Convert lingua Language to LanguageCode
    pub fn from_lingua(language: Language) -> Self {
        match language {
            Language::English => LanguageCode::English,
            Language::Spanish => LanguageCode::Spanish,
            Language::French => LanguageCode::French,
            Language::German => LanguageCode::German,
            Language::Italian => LanguageCode::Italian,
            Language::Portuguese => LanguageCode::Portuguese,
        }
    }

    fn to_lingua(self) -> Language {
        match self {
            LanguageCode::English => Language::English,
            LanguageCode::Spanish => Language::Spanish,
            LanguageCode::French => Language::French,
            LanguageCode::German => Language::German,
            LanguageCode::Italian => Language::Italian,
            LanguageCode::Portuguese => Language::Portuguese,
        }
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Offline language detection backed by lingua
pub struct LinguaLanguageDetector {
    detector: lingua::LanguageDetector,
}

impl LinguaLanguageDetector {
    pub fn new() -> Self {
        let languages: Vec<Language> = LanguageCode::ALL
            .into_iter()
            .map(LanguageCode::to_lingua)
            .collect();

        Self {
            detector: LanguageDetectorBuilder::from_languages(&languages).build(),
        }
    }
}

impl Default for LinguaLanguageDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LanguageDetector for LinguaLanguageDetector {
    async fn detect_language(&self, text: &str) -> Result<String, TtsServiceError> {
        let best = self
            .detector
            .compute_language_confidence_values(text)
            .into_iter()
            .next();

        let language = match best {
            Some((language, confidence)) => {
                let code = LanguageCode::from_lingua(language);
                resolve_detected_language(code.as_str(), confidence)
            }
            None => {
                tracing::warn!("Could not detect language, falling back to English");
                DEFAULT_LANGUAGE
            }
        };

        tracing::debug!(language, text_length = text.chars().count(), "Language detected");

        Ok(language.to_string())
    }
}

/// Get the appropriate Polly voice ID for a language
pub fn get_voice_for_language(language: LanguageCode) -> &'static str {
    match language {
        LanguageCode::English => "Joanna",
        LanguageCode::Spanish => "Lupe",
        LanguageCode::French => "Lea",
        LanguageCode::German => "Vicki",
        LanguageCode::Italian => "Bianca",
        LanguageCode::Portuguese => "Ines",
    }
}

/// Check if a voice supports neural engine
pub fn is_voice_neural_compatible(voice: &str) -> bool {
    // Based on AWS Polly documentation
    const NEURAL_VOICES: &[&str] = &[
        // English
        "Joanna", "Matthew", "Ivy", "Kendra", "Kimberly", "Salli", "Joey", "Justin", "Kevin",
        // Spanish
        "Lupe", "Pedro", "Sergio", // French
        "Lea", "Remi", // German
        "Vicki", "Daniel", // Italian
        "Bianca", "Adriano", // Portuguese
        "Ines", "Camila", "Vitoria", "Thiago",
    ];

    NEURAL_VOICES.contains(&voice)
}
