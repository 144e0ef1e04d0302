use crate::helpers::{FixedLanguageDetector, StaticTokenSource};
use httpmock::prelude::*;
use pretty_assertions::assert_eq;
use readit::domain::tts::{LanguageDetector, TtsOptions, TtsServiceError};
use readit::infrastructure::google::GoogleLanguageDetector;
use readit::infrastructure::repositories::{GoogleTtsRepository, TtsRepository};
use serde_json::json;
use std::sync::Arc;

// base64 of "audio"
const AUDIO_CONTENT: &str = "YXVkaW8=";

fn repository(server: &MockServer) -> GoogleTtsRepository {
    GoogleTtsRepository::new(reqwest::Client::new(), Arc::new(StaticTokenSource("ya29.test")))
        .with_base_url(server.base_url())
}

fn detector(server: &MockServer) -> GoogleLanguageDetector {
    GoogleLanguageDetector::new(
        reqwest::Client::new(),
        Arc::new(StaticTokenSource("ya29.test")),
        Some("demo-project".to_string()),
    )
    .unwrap()
    .with_base_url(server.base_url())
}

#[tokio::test]
async fn it_should_send_default_synthesize_request() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/text:synthesize")
                .header("authorization", "Bearer ya29.test")
                .json_body(json!({
                    "input": { "text": "Hello world." },
                    "voice": { "languageCode": "en-US", "name": "en-US-Standard-A" },
                    "audioConfig": { "audioEncoding": "MP3", "speakingRate": 1.0, "pitch": 0.0 }
                }));
            then.status(200)
                .json_body(json!({ "audioContent": AUDIO_CONTENT }));
        })
        .await;

    let audio = repository(&server)
        .synthesize("Hello world.", &TtsOptions::default())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(audio, b"audio".to_vec());
}

#[tokio::test]
async fn it_should_map_options_to_the_request() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/text:synthesize").json_body(json!({
                "input": { "ssml": "<speak>Hola</speak>" },
                "voice": { "languageCode": "es-ES", "name": "es-ES-Neural2-B" },
                "audioConfig": { "audioEncoding": "OGG_OPUS", "speakingRate": 1.25, "pitch": -2.0 }
            }));
            then.status(200)
                .json_body(json!({ "audioContent": AUDIO_CONTENT }));
        })
        .await;

    let options = TtsOptions {
        model: Some("Neural2".to_string()),
        voice: Some("B".to_string()),
        response_format: Some("opus".to_string()),
        speed: Some(1.25),
        language: Some("es-ES".to_string()),
        pitch: Some(-2.0),
        is_ssml: Some(true),
        chunk_size: None,
    };
    repository(&server)
        .synthesize("<speak>Hola</speak>", &options)
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn it_should_detect_the_language_when_none_is_given() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/text:synthesize").json_body(json!({
                "input": { "text": "Bonjour tout le monde." },
                "voice": { "languageCode": "fr-FR", "name": "fr-FR-Standard-A" },
                "audioConfig": { "audioEncoding": "MP3", "speakingRate": 1.0, "pitch": 0.0 }
            }));
            then.status(200)
                .json_body(json!({ "audioContent": AUDIO_CONTENT }));
        })
        .await;
    let detector = FixedLanguageDetector::new("fr");

    repository(&server)
        .with_language_detector(detector.clone())
        .synthesize("Bonjour tout le monde.", &TtsOptions::default())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(detector.calls(), 1);
}

#[tokio::test]
async fn it_should_not_detect_the_language_when_one_is_given() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/text:synthesize");
            then.status(200)
                .json_body(json!({ "audioContent": AUDIO_CONTENT }));
        })
        .await;
    let detector = FixedLanguageDetector::new("fr");
    let options = TtsOptions {
        language: Some("en-GB".to_string()),
        ..Default::default()
    };

    repository(&server)
        .with_language_detector(detector.clone())
        .synthesize("Good morning.", &options)
        .await
        .unwrap();

    assert_eq!(detector.calls(), 0);
}

#[tokio::test]
async fn it_should_wrap_api_errors() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/text:synthesize");
            then.status(403)
                .json_body(json!({ "error": { "code": 403, "message": "API disabled" } }));
        })
        .await;

    let error = repository(&server)
        .synthesize("Hello world.", &TtsOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(error, TtsServiceError::Conversion(_)));
    assert!(error.to_string().contains("API disabled"), "unexpected error: {}", error);
}

#[tokio::test]
async fn it_should_reject_text_over_the_limit_without_a_request() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200)
                .json_body(json!({ "audioContent": AUDIO_CONTENT }));
        })
        .await;

    let result = repository(&server)
        .synthesize(&"a".repeat(5001), &TtsOptions::default())
        .await;

    assert!(matches!(
        result,
        Err(TtsServiceError::InputTooLarge { length: 5001, max: 5000 })
    ));
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn it_should_detect_language_with_cloud_translation() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v3/projects/demo-project/locations/global:detectLanguage")
                .header("authorization", "Bearer ya29.test")
                .json_body(json!({ "content": "Guten Morgen", "mimeType": "text/plain" }));
            then.status(200).json_body(json!({
                "languages": [{ "languageCode": "de", "confidence": 0.93 }]
            }));
        })
        .await;

    let detector = detector(&server);

    assert_eq!(detector.detect_language("Guten Morgen").await.unwrap(), "de");
    assert_eq!(
        detector.detect_language_and_region("Guten Morgen").await.unwrap(),
        "de-DE"
    );
    assert_eq!(mock.hits_async().await, 2);
}

#[tokio::test]
async fn it_should_fall_back_to_english_for_weak_or_unsupported_detections() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).body_includes("weak");
            then.status(200).json_body(json!({
                "languages": [{ "languageCode": "de", "confidence": 0.1 }]
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).body_includes("unsupported");
            then.status(200).json_body(json!({
                "languages": [{ "languageCode": "xx", "confidence": 0.99 }]
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).body_includes("nothing");
            then.status(200).json_body(json!({}));
        })
        .await;

    let detector = detector(&server);

    assert_eq!(detector.detect_language("weak").await.unwrap(), "en");
    assert_eq!(detector.detect_language("unsupported").await.unwrap(), "en");
    assert_eq!(
        detector.detect_language_and_region("nothing").await.unwrap(),
        "en-US"
    );
}

#[test]
fn it_should_require_a_project_id_for_cloud_detection() {
    let result = GoogleLanguageDetector::new(
        reqwest::Client::new(),
        Arc::new(StaticTokenSource("ya29.test")),
        None,
    );

    assert!(matches!(result, Err(TtsServiceError::InvalidCredentials(_))));
}
