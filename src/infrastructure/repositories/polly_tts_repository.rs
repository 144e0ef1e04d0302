use super::tts_repository::{ensure_within_limit, TtsRepository};
use crate::domain::tts::language::{get_voice_for_language, is_voice_neural_compatible};
use crate::domain::tts::{LanguageCode, LanguageDetector, TtsOptions, TtsServiceError};
use async_trait::async_trait;
use aws_sdk_polly::{
    config::{retry::RetryConfig, BehaviorVersion, Credentials, Region},
    error::DisplayErrorContext,
    types::{Engine, LanguageCode as PollyLanguageCode, OutputFormat, TextType, VoiceId},
    Client as PollyClient,
};
use std::sync::Arc;

/// AWS Polly has a limit of 3000 characters per request
pub const MAX_INPUT_LENGTH: usize = 3000;

/// Static AWS credentials used to sign Polly requests
#[derive(Debug, Clone, PartialEq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl AwsCredentials {
    /// Parse `ACCESS_KEY_ID:SECRET_ACCESS_KEY[:SESSION_TOKEN]`
    pub fn parse(value: &str) -> Result<Self, TtsServiceError> {
        let mut parts = value.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(id), Some(secret), token) if !id.is_empty() && !secret.is_empty() => Ok(Self {
                access_key_id: id.to_string(),
                secret_access_key: secret.to_string(),
                session_token: token.filter(|t| !t.is_empty()).map(str::to_string),
            }),
            _ => Err(TtsServiceError::InvalidCredentials(
                "AWS credentials must look like ACCESS_KEY_ID:SECRET_ACCESS_KEY".to_string(),
            )),
        }
    }
}

/// AWS Polly implementation of TTS repository
pub struct PollyTtsRepository {
    polly_client: Arc<PollyClient>,
    language_detector: Option<Arc<dyn LanguageDetector>>,
}

impl PollyTtsRepository {
    pub fn new(polly_client: Arc<PollyClient>) -> Self {
        Self {
            polly_client,
            language_detector: None,
        }
    }

    /// Pick the default voice from the detected language of text submitted without one
    pub fn with_language_detector(mut self, detector: Arc<dyn LanguageDetector>) -> Self {
        self.language_detector = Some(detector);
        self
    }

    /// Build a Polly client with static credentials and the SDK retry layer disabled
    pub fn client_for(credentials: AwsCredentials, region: &str, endpoint_url: Option<&str>) -> PollyClient {
        let credentials = Credentials::new(
            credentials.access_key_id,
            credentials.secret_access_key,
            credentials.session_token,
            None,
            "readit",
        );

        let mut builder = aws_sdk_polly::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled());
        if let Some(endpoint_url) = endpoint_url {
            builder = builder.endpoint_url(endpoint_url);
        }

        PollyClient::from_conf(builder.build())
    }

    async fn resolve_language(&self, text: &str, options: &TtsOptions) -> Result<LanguageCode, TtsServiceError> {
        if let Some(language) = &options.language {
            return Ok(LanguageCode::from_tag(language).unwrap_or(LanguageCode::English));
        }

        match &self.language_detector {
            Some(detector) => {
                let detected = detector.detect_language(text).await?;
                Ok(LanguageCode::from_tag(&detected).unwrap_or(LanguageCode::English))
            }
            None => Ok(LanguageCode::English),
        }
    }

    fn output_format(requested: Option<&str>) -> OutputFormat {
        match requested.map(str::to_lowercase).as_deref() {
            None | Some("mp3") => OutputFormat::Mp3,
            Some("ogg") | Some("ogg_vorbis") => OutputFormat::OggVorbis,
            Some("pcm") => OutputFormat::Pcm,
            Some(other) => {
                tracing::warn!(format = other, "Unsupported Polly output format, using mp3");
                OutputFormat::Mp3
            }
        }
    }

    fn engine(requested: Option<&str>, voice: &str) -> Engine {
        match requested {
            Some(model) => Engine::from(model.to_lowercase().as_str()),
            None if is_voice_neural_compatible(voice) => Engine::Neural,
            None => Engine::Standard,
        }
    }
}

#[async_trait]
impl TtsRepository for PollyTtsRepository {
    fn name(&self) -> &'static str {
        "polly"
    }

    fn max_input_length(&self) -> usize {
        MAX_INPUT_LENGTH
    }

    async fn synthesize(&self, text: &str, options: &TtsOptions) -> Result<Vec<u8>, TtsServiceError> {
        ensure_within_limit(text, MAX_INPUT_LENGTH)?;

        let start_time = std::time::Instant::now();
        let language = self.resolve_language(text, options).await?;
        let voice_name = options
            .voice
            .clone()
            .unwrap_or_else(|| get_voice_for_language(language).to_string());
        let engine = Self::engine(options.model.as_deref(), &voice_name);
        let output_format = Self::output_format(options.response_format.as_deref());
        let text_type = if options.is_ssml.unwrap_or(false) {
            TextType::Ssml
        } else {
            TextType::Text
        };
        // Polly only understands full tags such as "en-GB"
        let language_code = options
            .language
            .as_deref()
            .filter(|tag| tag.contains('-'))
            .map(PollyLanguageCode::from);

        tracing::info!(
            language = %language,
            voice = %voice_name,
            engine = ?engine,
            output_format = ?output_format,
            text_length = text.chars().count(),
            "Calling AWS Polly synthesize_speech"
        );

        let result = self
            .polly_client
            .synthesize_speech()
            .text(text)
            .text_type(text_type)
            .voice_id(VoiceId::from(voice_name.as_str()))
            .output_format(output_format)
            .engine(engine.clone())
            .set_language_code(language_code)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = ?e,
                    error_display = %DisplayErrorContext(&e),
                    voice = %voice_name,
                    engine = ?engine,
                    text_length = text.chars().count(),
                    "AWS Polly synthesize_speech failed"
                );
                TtsServiceError::Conversion(format!("AWS Polly error: {}", DisplayErrorContext(&e)))
            })?;

        let audio_stream = result.audio_stream.collect().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to collect audio stream from Polly response");
            TtsServiceError::Conversion(format!("failed to read audio stream: {}", e))
        })?;

        let audio_bytes = audio_stream.into_bytes().to_vec();

        tracing::info!(
            provider = "polly",
            latency_ms = start_time.elapsed().as_millis(),
            characters_count = text.chars().count(),
            audio_size_bytes = audio_bytes.len(),
            "AWS Polly audio received"
        );

        Ok(audio_bytes)
    }
}
