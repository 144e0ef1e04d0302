pub mod auth;
pub mod language_detector;

pub use auth::{AccessTokenSource, ServiceAccount, ServiceAccountTokenSource};
pub use language_detector::GoogleLanguageDetector;
