#[derive(Debug, thiserror::Error)]
pub enum TtsServiceError {
    #[error("failed to convert text to speech: input text must be less or equal to {max} characters (got {length})")]
    InputTooLarge { length: usize, max: usize },
    #[error("failed to convert text to speech: {0}")]
    Conversion(String),
    #[error("unknown TTS provider: {0}")]
    UnknownProvider(String),
    #[error("missing credentials: {0}")]
    MissingCredentials(String),
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),
    #[error("not implemented: {0}")]
    NotImplemented(String),
}

impl TtsServiceError {
    /// Errors raised while building a provider, before any conversion is attempted
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            TtsServiceError::UnknownProvider(_)
                | TtsServiceError::MissingCredentials(_)
                | TtsServiceError::InvalidCredentials(_)
        )
    }
}
