pub mod dto;
pub mod error;
pub mod language;
pub mod service;
pub mod splitter;

pub use dto::TtsOptions;
pub use error::TtsServiceError;
pub use language::{LanguageCode, LanguageDetector, LinguaLanguageDetector};
pub use service::{TtsService, TtsServiceApi};
pub use splitter::{optimize_text, split_text_into_chunks};
