use super::tts_repository::{ensure_within_limit, TtsRepository};
use crate::domain::tts::{TtsOptions, TtsServiceError};
use async_openai::{
    config::OpenAIConfig,
    types::{CreateSpeechRequestArgs, SpeechModel, SpeechResponseFormat, Voice},
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// OpenAI has a limit of 4096 characters per request
pub const MAX_INPUT_LENGTH: usize = 4096;

pub const DEFAULT_MODEL: &str = "tts-1";
pub const DEFAULT_VOICE: &str = "fable";
const DEFAULT_SPEED: f32 = 1.0;

/// OpenAI TTS implementation of TTS repository
pub struct OpenAiTtsRepository {
    client: Arc<Client<OpenAIConfig>>,
    default_model: String,
    default_voice: String,
}

impl OpenAiTtsRepository {
    pub fn new(client: Arc<Client<OpenAIConfig>>, default_model: String, default_voice: String) -> Self {
        Self {
            client,
            default_model,
            default_voice,
        }
    }

    /// Build a client for `api_key`, optionally against a custom API base URL.
    ///
    /// The client's built-in backoff is switched off so provider errors reach the caller at once.
    pub fn client_for(api_key: &str, api_base: Option<&str>) -> Client<OpenAIConfig> {
        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(api_base) = api_base {
            config = config.with_api_base(api_base);
        }

        let no_retries = backoff::ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        Client::with_config(config).with_backoff(no_retries)
    }

    fn parse_model(model: &str) -> SpeechModel {
        match model {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        }
    }

    fn parse_voice(voice: &str) -> Option<Voice> {
        match voice.to_lowercase().as_str() {
            "alloy" => Some(Voice::Alloy),
            "echo" => Some(Voice::Echo),
            "fable" => Some(Voice::Fable),
            "onyx" => Some(Voice::Onyx),
            "nova" => Some(Voice::Nova),
            "shimmer" => Some(Voice::Shimmer),
            _ => None,
        }
    }

    fn parse_response_format(format: &str) -> Option<SpeechResponseFormat> {
        match format.to_lowercase().as_str() {
            "mp3" => Some(SpeechResponseFormat::Mp3),
            "opus" => Some(SpeechResponseFormat::Opus),
            "aac" => Some(SpeechResponseFormat::Aac),
            "flac" => Some(SpeechResponseFormat::Flac),
            "wav" => Some(SpeechResponseFormat::Wav),
            "pcm" => Some(SpeechResponseFormat::Pcm),
            _ => None,
        }
    }

    fn resolve_voice(&self, requested: Option<&str>) -> Voice {
        let voice = requested.unwrap_or(&self.default_voice);
        Self::parse_voice(voice).unwrap_or_else(|| {
            tracing::warn!(voice, fallback = DEFAULT_VOICE, "Unknown OpenAI voice, using fallback");
            Voice::Fable
        })
    }

    fn resolve_response_format(requested: Option<&str>) -> SpeechResponseFormat {
        match requested {
            None => SpeechResponseFormat::Mp3,
            Some(format) => Self::parse_response_format(format).unwrap_or_else(|| {
                tracing::warn!(format, "Unsupported OpenAI response format, using mp3");
                SpeechResponseFormat::Mp3
            }),
        }
    }
}

#[async_trait]
impl TtsRepository for OpenAiTtsRepository {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn max_input_length(&self) -> usize {
        MAX_INPUT_LENGTH
    }

    async fn synthesize(&self, text: &str, options: &TtsOptions) -> Result<Vec<u8>, TtsServiceError> {
        ensure_within_limit(text, MAX_INPUT_LENGTH)?;

        let start_time = std::time::Instant::now();
        let model = options.model.as_deref().unwrap_or(&self.default_model);
        let voice = self.resolve_voice(options.voice.as_deref());
        let response_format = Self::resolve_response_format(options.response_format.as_deref());
        let speed = options.speed.unwrap_or(DEFAULT_SPEED);

        tracing::info!(
            model,
            voice = ?voice,
            response_format = ?response_format,
            speed,
            text_length = text.chars().count(),
            "Calling OpenAI TTS API"
        );

        let request = CreateSpeechRequestArgs::default()
            .model(Self::parse_model(model))
            .input(text)
            .voice(voice)
            .response_format(response_format)
            .speed(speed)
            .build()
            .map_err(|e| TtsServiceError::Conversion(format!("OpenAI TTS request error: {}", e)))?;

        let response = self.client.audio().speech(request).await.map_err(|e| {
            tracing::error!(
                error = %e,
                model,
                text_length = text.chars().count(),
                "OpenAI TTS API call failed"
            );
            TtsServiceError::Conversion(format!("OpenAI TTS error: {}", e))
        })?;

        let audio_bytes = response.bytes.to_vec();

        tracing::info!(
            provider = "openai",
            model,
            latency_ms = start_time.elapsed().as_millis(),
            characters_count = text.chars().count(),
            audio_size_bytes = audio_bytes.len(),
            "OpenAI TTS audio received"
        );

        Ok(audio_bytes)
    }
}
