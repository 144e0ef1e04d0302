use readit::domain::tts::TtsServiceError;
use readit::infrastructure::repositories::{
    create_tts_repository, LanguageDetectionMode, ProviderOptions, TtsRepository,
};
use serial_test::serial;
use std::env;
use std::sync::Arc;

const CREDENTIAL_VARIABLES: [&str; 5] = [
    "OPENAI_API_KEY",
    "GOOGLE_APPLICATION_CREDENTIALS_JSON",
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_SESSION_TOKEN",
];

fn clear_credentials() {
    for variable in CREDENTIAL_VARIABLES {
        env::remove_var(variable);
    }
}

fn error_of(result: Result<Arc<dyn TtsRepository>, TtsServiceError>) -> TtsServiceError {
    match result {
        Ok(repository) => panic!("expected an error, got provider {}", repository.name()),
        Err(e) => e,
    }
}

#[test]
#[serial]
fn it_should_reject_unknown_providers() {
    env::set_var("OPENAI_API_KEY", "sk-test");

    let error = error_of(create_tts_repository(
        Some("azure"),
        None,
        &ProviderOptions::default(),
    ));

    assert!(matches!(error, TtsServiceError::UnknownProvider(ref name) if name == "azure"));
    assert!(error.is_construction_error());
    clear_credentials();
}

#[test]
#[serial]
fn it_should_default_to_openai() {
    clear_credentials();
    env::set_var("OPENAI_API_KEY", "sk-test");

    let repository = create_tts_repository(None, None, &ProviderOptions::default()).unwrap();

    assert_eq!(repository.name(), "openai");
    assert_eq!(repository.max_input_length(), 4096);
    clear_credentials();
}

#[test]
#[serial]
fn it_should_match_provider_names_case_insensitively() {
    clear_credentials();
    let options = ProviderOptions::default();

    let openai = create_tts_repository(Some("OpenAI"), Some("sk-test"), &options).unwrap();
    let polly = create_tts_repository(Some("POLLY"), Some("AKIDEXAMPLE:secret"), &options).unwrap();

    assert_eq!(openai.name(), "openai");
    assert_eq!(polly.name(), "polly");
    assert_eq!(polly.max_input_length(), 3000);
}

#[test]
#[serial]
fn it_should_report_missing_credentials() {
    clear_credentials();
    let options = ProviderOptions::default();

    for provider in ["openai", "google", "polly"] {
        let error = error_of(create_tts_repository(Some(provider), None, &options));
        assert!(
            matches!(error, TtsServiceError::MissingCredentials(_)),
            "{} should report missing credentials, got {:?}",
            provider,
            error
        );
    }
}

#[test]
#[serial]
fn it_should_read_credentials_from_the_environment() {
    clear_credentials();
    env::set_var("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE");
    env::set_var("AWS_SECRET_ACCESS_KEY", "secret");

    let repository =
        create_tts_repository(Some("polly"), None, &ProviderOptions::default()).unwrap();

    assert_eq!(repository.name(), "polly");
    clear_credentials();
}

#[test]
#[serial]
fn it_should_reject_malformed_credentials() {
    clear_credentials();
    let options = ProviderOptions::default();

    let google = error_of(create_tts_repository(Some("google"), Some("{not json"), &options));
    assert!(matches!(google, TtsServiceError::InvalidCredentials(_)));

    let bad_key = r#"{"type": "service_account", "project_id": "demo", "client_email": "tts@demo.iam.gserviceaccount.com", "private_key": "not a pem"}"#;
    let google = error_of(create_tts_repository(Some("google"), Some(bad_key), &options));
    assert!(matches!(google, TtsServiceError::InvalidCredentials(_)));

    let polly = error_of(create_tts_repository(Some("polly"), Some("AKIDEXAMPLE"), &options));
    assert!(matches!(polly, TtsServiceError::InvalidCredentials(_)));
}

#[test]
#[serial]
fn it_should_fall_back_to_local_detection_for_polly() {
    clear_credentials();
    let options = ProviderOptions {
        language_detection: LanguageDetectionMode::Cloud,
        ..Default::default()
    };

    let repository =
        create_tts_repository(Some("aws"), Some("AKIDEXAMPLE:secret"), &options).unwrap();

    assert_eq!(repository.name(), "polly");
}
