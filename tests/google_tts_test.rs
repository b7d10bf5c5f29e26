use assert_fs::prelude::*;
use assert_fs::TempDir;
use dubbing_providers::error::Error;
use dubbing_providers::tts::{GoogleClientRegistry, GoogleEndpoints, GoogleTtsEngine, SsmlGender};
use dubbing_providers::{SpeechRequest, TtsProvider};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AUTHORIZED_USER: &str =
    r#"{"type": "authorized_user", "client_id": "client", "client_secret": "secret", "refresh_token": "refresh"}"#;

fn registry_for(server: &MockServer) -> Arc<GoogleClientRegistry> {
    Arc::new(GoogleClientRegistry::with_endpoints(
        GoogleEndpoints {
            api_base: server.uri(),
            oauth_token_url: format!("{}/token", server.uri()),
        },
        Duration::from_secs(5),
    ))
}

async fn mount_token(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.test",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_voices_and_synthesis_share_cached_token() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/v1/voices"))
        .and(header("authorization", "Bearer ya29.test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "voices": [
                {"languageCodes": ["es-ES"], "name": "es-ES-Standard-A", "ssmlGender": "FEMALE", "naturalSampleRateHertz": 24000},
                {"languageCodes": ["uk-UA"], "name": "uk-UA-Wavenet-A", "ssmlGender": "FEMALE", "naturalSampleRateHertz": 24000}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/text:synthesize"))
        .and(header("authorization", "Bearer ya29.test"))
        .and(body_json(json!({
            "input": {"text": "Hola"},
            "voice": {
                "languageCode": "es-ES",
                "name": "es-ES-Standard-A",
                "ssmlGender": "SSML_VOICE_GENDER_UNSPECIFIED"
            },
            "audioConfig": {"audioEncoding": "LINEAR16", "speakingRate": 1.25}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "audioContent": "UklGRiQAAABXQVZFZm10IA=="
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let credentials = dir.child("adc.json");
    credentials.write_str(AUTHORIZED_USER).unwrap();

    let engine = GoogleTtsEngine::new(Some(credentials.path().to_path_buf()), registry_for(&server));

    let voices = engine.available_voices().await.unwrap();
    assert_eq!(voices, vec!["es-ES-Standard-A", "uk-UA-Wavenet-A"]);

    let request = SpeechRequest::new("Hola").with_voice("es-ES-Standard-A").with_speed(1.25);
    let output = engine.synthesize(&request).await.unwrap();

    assert_eq!(output.extension().and_then(|e| e.to_str()), Some("wav"));
    assert_eq!(std::fs::read(&output).unwrap(), b"RIFF\x24\x00\x00\x00WAVEfmt ");
    std::fs::remove_file(output).unwrap();
}

#[tokio::test]
async fn test_voice_catalog_fields() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/v1/voices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "voices": [
                {"languageCodes": ["en-US", "en-GB"], "name": "en-US-Neural2-D", "ssmlGender": "MALE", "naturalSampleRateHertz": 24000},
                {"name": "xx-Unknown"}
            ]
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let credentials = dir.child("adc.json");
    credentials.write_str(AUTHORIZED_USER).unwrap();

    let client = registry_for(&server).get(Some(credentials.path())).await.unwrap();
    let voices = client.list_voices().await.unwrap();

    let neural = &voices["en-US-Neural2-D"];
    assert_eq!(neural.language_code, "en-US");
    assert_eq!(neural.ssml_gender, Some(SsmlGender::Male));
    assert_eq!(neural.natural_sample_rate_hz, Some(24000));

    let unknown = &voices["xx-Unknown"];
    assert_eq!(unknown.language_code, "");
    assert_eq!(unknown.ssml_gender, None);
}

#[tokio::test]
async fn test_missing_credentials_make_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let registry = registry_for(&server);

    let unset = GoogleTtsEngine::new(None, registry.clone());
    let result = unset.synthesize(&SpeechRequest::new("Hola").with_language("es-ES")).await;
    assert!(matches!(result, Err(Error::Configuration(_))));

    let dir = TempDir::new().unwrap();
    let missing = GoogleTtsEngine::new(Some(dir.path().join("absent.json")), registry.clone());
    let result = missing.synthesize(&SpeechRequest::new("Hola").with_language("es-ES")).await;
    assert!(matches!(result, Err(Error::Configuration(_))));

    assert!(registry.is_empty().await);
}

#[tokio::test]
async fn test_missing_audio_content_is_structural_error() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/v1/text:synthesize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "quota"})))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let credentials = dir.child("adc.json");
    credentials.write_str(AUTHORIZED_USER).unwrap();

    let engine = GoogleTtsEngine::new(Some(credentials.path().to_path_buf()), registry_for(&server));
    let result = engine
        .synthesize(&SpeechRequest::new("Hello").with_language("en-US"))
        .await;
    assert!(matches!(result, Err(Error::UnexpectedResponse(_))));
}
