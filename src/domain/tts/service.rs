use super::dto::TtsOptions;
use super::error::TtsServiceError;
use super::splitter::{optimize_text, split_text_into_chunks};
use crate::infrastructure::repositories::{ensure_within_limit, TtsRepository};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;
use std::time::Instant;

/// Converts text of any length to speech on top of a single provider
pub struct TtsService {
    tts_repo: Arc<dyn TtsRepository>,
}

impl TtsService {
    pub fn new(tts_repo: Arc<dyn TtsRepository>) -> Self {
        Self { tts_repo }
    }
}

#[async_trait]
pub trait TtsServiceApi: Send + Sync {
    /// Maximum number of characters the wrapped provider accepts per call
    fn max_input_length(&self) -> usize;

    /// Convert text that fits in a single provider call
    ///
    /// Fails with `InputTooLarge` without calling the provider when the normalized text is
    /// longer than `max_input_length`. `chunk_size` is ignored.
    async fn small_text_to_speech(
        &self,
        text: &str,
        options: &TtsOptions,
    ) -> Result<Vec<u8>, TtsServiceError>;

    /// Convert text of any length and return the whole audio at once
    ///
    /// This operation:
    /// - Splits the text into chunks that fit the provider
    /// - Converts the chunks one after another, in order
    /// - Concatenates the audio, holding all of it in memory
    ///
    /// The first failing chunk aborts the conversion.
    async fn medium_text_to_speech(
        &self,
        text: &str,
        options: &TtsOptions,
    ) -> Result<Vec<u8>, TtsServiceError>;

    /// Convert text of any length into a lazy stream of audio buffers, one per chunk
    ///
    /// A chunk is converted only when the stream is polled for it, so dropping the stream stops
    /// any further provider calls. A failing chunk yields its error and ends the stream.
    fn large_text_to_speech<'a>(
        &'a self,
        text: &str,
        options: &'a TtsOptions,
    ) -> BoxStream<'a, Result<Vec<u8>, TtsServiceError>>;
}

#[async_trait]
impl TtsServiceApi for TtsService {
    fn max_input_length(&self) -> usize {
        self.tts_repo.max_input_length()
    }

    async fn small_text_to_speech(
        &self,
        text: &str,
        options: &TtsOptions,
    ) -> Result<Vec<u8>, TtsServiceError> {
        let text = optimize_text(text);
        ensure_within_limit(&text, self.tts_repo.max_input_length())?;

        tracing::info!(
            provider = self.tts_repo.name(),
            text_length = text.chars().count(),
            "TTS bounded conversion request"
        );

        self.tts_repo.synthesize(&text, options).await
    }

    async fn medium_text_to_speech(
        &self,
        text: &str,
        options: &TtsOptions,
    ) -> Result<Vec<u8>, TtsServiceError> {
        let start_time = Instant::now();
        let chunks = self.prepare_chunks(text, options);
        let chunk_count = chunks.len();

        let mut merged_audio = Vec::new();
        for (index, chunk) in chunks.iter().enumerate() {
            let audio_data = self.convert_chunk(index, chunk_count, chunk, options).await?;
            merged_audio.extend(audio_data);

            tracing::debug!(
                chunk_index = index,
                total_audio_size = merged_audio.len(),
                "Chunk synthesized and merged"
            );
        }

        tracing::info!(
            provider = self.tts_repo.name(),
            chunk_count,
            audio_size_bytes = merged_audio.len(),
            latency_ms = start_time.elapsed().as_millis(),
            "TTS synthesis completed"
        );

        Ok(merged_audio)
    }

    fn large_text_to_speech<'a>(
        &'a self,
        text: &str,
        options: &'a TtsOptions,
    ) -> BoxStream<'a, Result<Vec<u8>, TtsServiceError>> {
        let chunks = self.prepare_chunks(text, options);
        let chunk_count = chunks.len();

        stream::try_unfold(
            chunks.into_iter().enumerate(),
            move |mut pending| async move {
                let Some((index, chunk)) = pending.next() else {
                    tracing::info!(
                        provider = self.tts_repo.name(),
                        chunk_count,
                        "TTS streaming completed"
                    );
                    return Ok(None);
                };
                let audio_data = self.convert_chunk(index, chunk_count, &chunk, options).await?;
                Ok(Some((audio_data, pending)))
            },
        )
        .boxed()
    }
}

impl TtsService {
    /// Normalize whitespace and split into chunks bounded by the effective chunk size
    fn prepare_chunks(&self, text: &str, options: &TtsOptions) -> Vec<String> {
        let text = optimize_text(text);
        let chunk_size = self.effective_chunk_size(options);
        let chunks = split_text_into_chunks(&text, chunk_size);

        tracing::info!(
            provider = self.tts_repo.name(),
            text_length = text.chars().count(),
            chunk_size,
            chunk_count = chunks.len(),
            "Text split into chunks"
        );

        chunks
    }

    /// Caller's `chunk_size` clamped into `1..=max_input_length`, or the provider ceiling
    fn effective_chunk_size(&self, options: &TtsOptions) -> usize {
        let max = self.tts_repo.max_input_length();
        match options.chunk_size {
            Some(requested) if requested == 0 || requested > max => {
                let clamped = requested.min(max).max(1);
                tracing::warn!(
                    requested,
                    max_input_length = max,
                    chunk_size = clamped,
                    "Requested chunk size is out of range, clamping"
                );
                clamped
            }
            Some(requested) => requested,
            None => max,
        }
    }

    async fn convert_chunk(
        &self,
        index: usize,
        chunk_count: usize,
        chunk: &str,
        options: &TtsOptions,
    ) -> Result<Vec<u8>, TtsServiceError> {
        tracing::debug!(
            chunk_index = index,
            chunk_count,
            chunk_size = chunk.chars().count(),
            "Synthesizing chunk"
        );

        self.tts_repo.synthesize(chunk, options).await.map_err(|e| {
            tracing::error!(
                error = %e,
                provider = self.tts_repo.name(),
                chunk_index = index,
                chunk_count,
                "Chunk synthesis failed"
            );
            e
        })
    }
}
