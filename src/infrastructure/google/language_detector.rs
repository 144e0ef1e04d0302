use super::auth::AccessTokenSource;
use crate::domain::tts::language::{resolve_detected_language, DEFAULT_LANGUAGE};
use crate::domain::tts::{LanguageDetector, TtsServiceError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const TRANSLATION_API_URL: &str = "https://translation.googleapis.com";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DetectLanguageRequest<'a> {
    content: &'a str,
    mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct DetectLanguageResponse {
    #[serde(default)]
    languages: Vec<DetectedLanguage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectedLanguage {
    language_code: String,
    #[serde(default)]
    confidence: f64,
}

/// Language detection through the Google Cloud Translation v3 API
pub struct GoogleLanguageDetector {
    client: reqwest::Client,
    token_source: Arc<dyn AccessTokenSource>,
    project_id: String,
    base_url: String,
}

impl GoogleLanguageDetector {
    /// Fails with `InvalidCredentials` when the service account carries no project id
    pub fn new(
        client: reqwest::Client,
        token_source: Arc<dyn AccessTokenSource>,
        project_id: Option<String>,
    ) -> Result<Self, TtsServiceError> {
        let project_id = project_id.filter(|id| !id.is_empty()).ok_or_else(|| {
            TtsServiceError::InvalidCredentials(
                "language detection requires project_id to be part of the service account JSON"
                    .to_string(),
            )
        })?;

        Ok(Self {
            client,
            token_source,
            project_id,
            base_url: TRANSLATION_API_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl LanguageDetector for GoogleLanguageDetector {
    async fn detect_language(&self, text: &str) -> Result<String, TtsServiceError> {
        let token = self.token_source.access_token().await?;
        let url = format!(
            "{}/v3/projects/{}/locations/global:detectLanguage",
            self.base_url, self.project_id
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&DetectLanguageRequest {
                content: text,
                mime_type: "text/plain",
            })
            .send()
            .await
            .map_err(|e| {
                TtsServiceError::Conversion(format!("language detection request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TtsServiceError::Conversion(format!(
                "language detection failed: {} - {}",
                status, body
            )));
        }

        let detection: DetectLanguageResponse = response.json().await.map_err(|e| {
            TtsServiceError::Conversion(format!("language detection parse error: {}", e))
        })?;

        let language = match detection.languages.first() {
            Some(candidate) => {
                resolve_detected_language(&candidate.language_code, candidate.confidence)
                    .to_string()
            }
            None => DEFAULT_LANGUAGE.to_string(),
        };

        tracing::debug!(language = %language, "Language detected by Google Translation");

        Ok(language)
    }
}
