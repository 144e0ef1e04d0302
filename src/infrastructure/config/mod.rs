use crate::error::{AppError, AppResult};
use crate::infrastructure::repositories::{LanguageDetectionMode, ProviderOptions};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// Provider name, `None` selects the default provider
    pub provider: Option<String>,
    pub language_detection: LanguageDetectionMode,
    pub aws_region: String,
    pub api_base: Option<String>,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            provider: non_empty_var("TTS_PROVIDER"),
            language_detection: env::var("LANGUAGE_DETECTION")
                .unwrap_or_else(|_| "off".to_string())
                .parse()
                .map_err(AppError::Config)?,
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            api_base: non_empty_var("OPENAI_API_BASE"),
            log_format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        Ok(config)
    }

    /// Provider construction settings; the API base override only applies to OpenAI
    pub fn provider_options(&self, provider: Option<&str>) -> ProviderOptions {
        let is_openai = provider
            .map(|name| name.eq_ignore_ascii_case("openai"))
            .unwrap_or(true);

        ProviderOptions {
            language_detection: self.language_detection,
            aws_region: self.aws_region.clone(),
            api_base: self.api_base.clone().filter(|_| is_openai),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
