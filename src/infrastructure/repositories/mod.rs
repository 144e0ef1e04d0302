pub mod factory;
pub mod google_tts_repository;
pub mod openai_tts_repository;
pub mod polly_tts_repository;
pub mod tts_repository;

pub use factory::{create_tts_repository, LanguageDetectionMode, ProviderKind, ProviderOptions};
pub use google_tts_repository::GoogleTtsRepository;
pub use openai_tts_repository::OpenAiTtsRepository;
pub use polly_tts_repository::{AwsCredentials, PollyTtsRepository};
pub use tts_repository::{ensure_within_limit, TtsRepository};
