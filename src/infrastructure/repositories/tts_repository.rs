use crate::domain::tts::{TtsOptions, TtsServiceError};
use async_trait::async_trait;

/// Repository for TTS synthesis operations.
/// Abstracts the underlying TTS provider (OpenAI, Google Cloud, AWS Polly, etc.)
///
/// Implementations are responsible for:
/// - Rejecting text longer than `max_input_length` before any network call
/// - Applying provider-specific defaults for options the caller left out
/// - Ignoring options the provider has no use for
///
/// Splitting long text is the caller's job, see `TtsService`.
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Provider identifier used in logs
    fn name(&self) -> &'static str {
        "unimplemented"
    }

    /// Maximum number of characters accepted by a single `synthesize` call
    fn max_input_length(&self) -> usize;

    /// Synthesize text to speech
    ///
    /// Returns audio data in the requested `response_format`
    ///
    /// # Errors
    /// - `InputTooLarge` if `text` exceeds `max_input_length`
    /// - `Conversion` if the provider call fails
    async fn synthesize(&self, text: &str, options: &TtsOptions) -> Result<Vec<u8>, TtsServiceError> {
        let _ = (text, options);
        Err(TtsServiceError::NotImplemented(format!(
            "synthesize is not implemented by the {} provider",
            self.name()
        )))
    }
}

/// Fail with `InputTooLarge` when `text` is longer than `max` characters
pub fn ensure_within_limit(text: &str, max: usize) -> Result<(), TtsServiceError> {
    let length = text.chars().count();
    if length > max {
        return Err(TtsServiceError::InputTooLarge { length, max });
    }
    Ok(())
}
