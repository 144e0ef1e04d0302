use super::tts_repository::{ensure_within_limit, TtsRepository};
use crate::domain::tts::language::DEFAULT_LANGUAGE_REGION;
use crate::domain::tts::{LanguageDetector, TtsOptions, TtsServiceError};
use crate::infrastructure::google::AccessTokenSource;
use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Google Cloud Text-to-Speech accepts up to 5000 characters per request
pub const MAX_INPUT_LENGTH: usize = 5000;

const TEXT_TO_SPEECH_API_URL: &str = "https://texttospeech.googleapis.com";

const DEFAULT_MODEL: &str = "Standard";
const DEFAULT_VOICE: &str = "A";
const DEFAULT_RESPONSE_FORMAT: &str = "mp3";
const DEFAULT_SPEED: f32 = 1.0;
const DEFAULT_PITCH: f32 = 0.0;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum SynthesisInput<'a> {
    Text(&'a str),
    Ssml(&'a str),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection {
    language_code: String,
    name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: String,
    speaking_rate: f32,
    pitch: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

/// Google Cloud Text-to-Speech implementation of TTS repository
pub struct GoogleTtsRepository {
    client: reqwest::Client,
    token_source: Arc<dyn AccessTokenSource>,
    language_detector: Option<Arc<dyn LanguageDetector>>,
    base_url: String,
}

impl GoogleTtsRepository {
    pub fn new(client: reqwest::Client, token_source: Arc<dyn AccessTokenSource>) -> Self {
        Self {
            client,
            token_source,
            language_detector: None,
            base_url: TEXT_TO_SPEECH_API_URL.to_string(),
        }
    }

    /// Detect the language of text submitted without one
    pub fn with_language_detector(mut self, detector: Arc<dyn LanguageDetector>) -> Self {
        self.language_detector = Some(detector);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Google names encodings in upper case, and calls Opus-in-Ogg "OGG_OPUS"
    fn audio_encoding(format: &str) -> String {
        match format.to_lowercase().as_str() {
            "opus" | "ogg" | "ogg_opus" => "OGG_OPUS".to_string(),
            other => other.to_uppercase(),
        }
    }

    async fn resolve_language(&self, text: &str, options: &TtsOptions) -> Result<String, TtsServiceError> {
        if let Some(language) = &options.language {
            return Ok(language.clone());
        }

        match &self.language_detector {
            Some(detector) => detector.detect_language_and_region(text).await,
            None => Ok(DEFAULT_LANGUAGE_REGION.to_string()),
        }
    }

    fn build_request<'a>(text: &'a str, language: String, options: &TtsOptions) -> SynthesizeRequest<'a> {
        let model = options.model.as_deref().unwrap_or(DEFAULT_MODEL);
        let voice = options.voice.as_deref().unwrap_or(DEFAULT_VOICE);
        let format = options
            .response_format
            .as_deref()
            .unwrap_or(DEFAULT_RESPONSE_FORMAT);

        let input = if options.is_ssml.unwrap_or(false) {
            SynthesisInput::Ssml(text)
        } else {
            SynthesisInput::Text(text)
        };

        SynthesizeRequest {
            input,
            voice: VoiceSelection {
                name: format!("{}-{}-{}", language, model, voice),
                language_code: language,
            },
            audio_config: AudioConfig {
                audio_encoding: Self::audio_encoding(format),
                speaking_rate: options.speed.unwrap_or(DEFAULT_SPEED),
                pitch: options.pitch.unwrap_or(DEFAULT_PITCH),
            },
        }
    }
}

#[async_trait]
impl TtsRepository for GoogleTtsRepository {
    fn name(&self) -> &'static str {
        "google"
    }

    fn max_input_length(&self) -> usize {
        MAX_INPUT_LENGTH
    }

    async fn synthesize(&self, text: &str, options: &TtsOptions) -> Result<Vec<u8>, TtsServiceError> {
        ensure_within_limit(text, MAX_INPUT_LENGTH)?;

        let start_time = std::time::Instant::now();
        let language = self.resolve_language(text, options).await?;
        let request = Self::build_request(text, language, options);

        tracing::info!(
            voice = %request.voice.name,
            language = %request.voice.language_code,
            audio_encoding = %request.audio_config.audio_encoding,
            text_length = text.chars().count(),
            "Calling Google Text-to-Speech API"
        );

        let token = self.token_source.access_token().await?;
        let response = self
            .client
            .post(format!("{}/v1/text:synthesize", self.base_url))
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Google Text-to-Speech request failed");
                TtsServiceError::Conversion(format!("Google TTS error: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, "Google Text-to-Speech API call failed");
            return Err(TtsServiceError::Conversion(format!(
                "Google TTS error {}: {}",
                status, body
            )));
        }

        let payload: SynthesizeResponse = response
            .json()
            .await
            .map_err(|e| TtsServiceError::Conversion(format!("Google TTS response error: {}", e)))?;

        let audio_bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.audio_content)
            .map_err(|e| TtsServiceError::Conversion(format!("Google TTS audio decode error: {}", e)))?;

        tracing::info!(
            provider = "google",
            latency_ms = start_time.elapsed().as_millis(),
            characters_count = text.chars().count(),
            audio_size_bytes = audio_bytes.len(),
            "Google TTS audio received"
        );

        Ok(audio_bytes)
    }
}
