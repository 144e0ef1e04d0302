use crate::domain::tts::TtsServiceError;

/// Main application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Tts(#[from] TtsServiceError),
}

impl AppError {
    /// Process exit code reported for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Tts(e) if e.is_construction_error() => 2,
            Self::Tts(TtsServiceError::InputTooLarge { .. }) => 3,
            Self::Tts(_) => 1,
            Self::Io(_) => 74,
        }
    }
}

/// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;
