use super::google_tts_repository::GoogleTtsRepository;
use super::openai_tts_repository::{self, OpenAiTtsRepository};
use super::polly_tts_repository::{AwsCredentials, PollyTtsRepository};
use super::tts_repository::TtsRepository;
use crate::domain::tts::{LanguageDetector, LinguaLanguageDetector, TtsServiceError};
use crate::infrastructure::google::{
    AccessTokenSource, GoogleLanguageDetector, ServiceAccount, ServiceAccountTokenSource,
};
use std::env;
use std::str::FromStr;
use std::sync::Arc;

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const GOOGLE_CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS_JSON";
pub const AWS_ACCESS_KEY_ID_ENV: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY_ENV: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_SESSION_TOKEN_ENV: &str = "AWS_SESSION_TOKEN";

/// Known TTS backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    OpenAi,
    Google,
    Polly,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Google => "google",
            ProviderKind::Polly => "polly",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = TtsServiceError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "google" => Ok(ProviderKind::Google),
            "polly" | "aws" => Ok(ProviderKind::Polly),
            _ => Err(TtsServiceError::UnknownProvider(name.to_string())),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How providers pick a language when the caller does not give one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LanguageDetectionMode {
    #[default]
    Disabled,
    /// Offline detection with lingua
    Local,
    /// Google Cloud Translation, using the Google provider's service account
    Cloud,
}

impl FromStr for LanguageDetectionMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "" | "off" | "disabled" | "none" => Ok(LanguageDetectionMode::Disabled),
            "local" | "lingua" => Ok(LanguageDetectionMode::Local),
            "cloud" | "google" => Ok(LanguageDetectionMode::Cloud),
            other => Err(format!("unknown language detection mode: {}", other)),
        }
    }
}

/// Construction settings that are not credentials
#[derive(Debug, Clone)]
pub struct ProviderOptions {
    pub language_detection: LanguageDetectionMode,
    pub aws_region: String,
    /// Override of the provider's API base URL
    pub api_base: Option<String>,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            language_detection: LanguageDetectionMode::Disabled,
            aws_region: "us-east-1".to_string(),
            api_base: None,
        }
    }
}

/// Build the provider registered under `name` (OpenAI when absent).
///
/// Explicit `credentials` win over the provider's environment variables:
/// - openai: API key, or `OPENAI_API_KEY`
/// - google: service account JSON, or `GOOGLE_APPLICATION_CREDENTIALS_JSON`
/// - polly: `ACCESS_KEY_ID:SECRET_ACCESS_KEY`, or `AWS_ACCESS_KEY_ID` + `AWS_SECRET_ACCESS_KEY`
///
/// # Errors
/// - `UnknownProvider` for an unrecognized name, before anything is built
/// - `MissingCredentials` when neither source provides credentials
/// - `InvalidCredentials` when the credentials cannot be parsed
pub fn create_tts_repository(
    name: Option<&str>,
    credentials: Option<&str>,
    options: &ProviderOptions,
) -> Result<Arc<dyn TtsRepository>, TtsServiceError> {
    let kind = match name {
        Some(name) => name.parse::<ProviderKind>()?,
        None => ProviderKind::default(),
    };

    tracing::info!(
        provider = %kind,
        explicit_credentials = credentials.is_some(),
        language_detection = ?options.language_detection,
        "Creating TTS provider"
    );

    let repository: Arc<dyn TtsRepository> = match kind {
        ProviderKind::OpenAi => Arc::new(create_openai(credentials, options)?),
        ProviderKind::Google => Arc::new(create_google(credentials, options)?),
        ProviderKind::Polly => Arc::new(create_polly(credentials, options)?),
    };

    Ok(repository)
}

fn create_openai(
    credentials: Option<&str>,
    options: &ProviderOptions,
) -> Result<OpenAiTtsRepository, TtsServiceError> {
    let api_key = explicit_or_env(credentials, OPENAI_API_KEY_ENV).ok_or_else(|| {
        missing_credentials(&format!("the environment variable \"{}\"", OPENAI_API_KEY_ENV))
    })?;

    if options.language_detection != LanguageDetectionMode::Disabled {
        tracing::debug!("OpenAI voices are language independent, ignoring language detection");
    }

    let client = OpenAiTtsRepository::client_for(&api_key, options.api_base.as_deref());
    Ok(OpenAiTtsRepository::new(
        Arc::new(client),
        openai_tts_repository::DEFAULT_MODEL.to_string(),
        openai_tts_repository::DEFAULT_VOICE.to_string(),
    ))
}

fn create_google(
    credentials: Option<&str>,
    options: &ProviderOptions,
) -> Result<GoogleTtsRepository, TtsServiceError> {
    let json = explicit_or_env(credentials, GOOGLE_CREDENTIALS_ENV).ok_or_else(|| {
        missing_credentials(&format!("the environment variable \"{}\"", GOOGLE_CREDENTIALS_ENV))
    })?;
    let service_account = ServiceAccount::from_json(&json)?;
    let project_id = service_account.project_id.clone();

    let client = reqwest::Client::new();
    let token_source: Arc<dyn AccessTokenSource> =
        Arc::new(ServiceAccountTokenSource::new(client.clone(), service_account)?);

    let mut repository = GoogleTtsRepository::new(client.clone(), token_source.clone());
    if let Some(api_base) = &options.api_base {
        repository = repository.with_base_url(api_base.clone());
    }

    let detector: Option<Arc<dyn LanguageDetector>> = match options.language_detection {
        LanguageDetectionMode::Disabled => None,
        LanguageDetectionMode::Local => Some(Arc::new(LinguaLanguageDetector::new())),
        LanguageDetectionMode::Cloud => Some(Arc::new(GoogleLanguageDetector::new(
            client,
            token_source,
            project_id,
        )?)),
    };

    Ok(match detector {
        Some(detector) => repository.with_language_detector(detector),
        None => repository,
    })
}

fn create_polly(
    credentials: Option<&str>,
    options: &ProviderOptions,
) -> Result<PollyTtsRepository, TtsServiceError> {
    let credentials = match credentials {
        Some(value) => AwsCredentials::parse(value)?,
        None => aws_credentials_from_env().ok_or_else(|| {
            missing_credentials(&format!(
                "the environment variables \"{}\" and \"{}\"",
                AWS_ACCESS_KEY_ID_ENV, AWS_SECRET_ACCESS_KEY_ENV
            ))
        })?,
    };

    let client = PollyTtsRepository::client_for(
        credentials,
        &options.aws_region,
        options.api_base.as_deref(),
    );
    let repository = PollyTtsRepository::new(Arc::new(client));

    Ok(match options.language_detection {
        LanguageDetectionMode::Disabled => repository,
        LanguageDetectionMode::Local => {
            repository.with_language_detector(Arc::new(LinguaLanguageDetector::new()))
        }
        LanguageDetectionMode::Cloud => {
            tracing::warn!("Cloud language detection needs Google credentials, using local detection for Polly");
            repository.with_language_detector(Arc::new(LinguaLanguageDetector::new()))
        }
    })
}

fn explicit_or_env(explicit: Option<&str>, var: &str) -> Option<String> {
    explicit
        .map(str::to_string)
        .or_else(|| env::var(var).ok())
        .filter(|value| !value.trim().is_empty())
}

fn aws_credentials_from_env() -> Option<AwsCredentials> {
    let access_key_id = explicit_or_env(None, AWS_ACCESS_KEY_ID_ENV)?;
    let secret_access_key = explicit_or_env(None, AWS_SECRET_ACCESS_KEY_ENV)?;
    Some(AwsCredentials {
        access_key_id,
        secret_access_key,
        session_token: explicit_or_env(None, AWS_SESSION_TOKEN_ENV),
    })
}

fn missing_credentials(source: &str) -> TtsServiceError {
    TtsServiceError::MissingCredentials(format!(
        "neither explicit credentials were provided nor {} is set",
        source
    ))
}
