use super::{write_temp_audio, SpeechRequest, TtsProvider};
use crate::config::{ProviderConfig, ENV_GOOGLE_CREDENTIALS};
use crate::error::{Error, ErrorType, Result};
use crate::logging::{log_debug, log_error, log_info, payload_snapshot};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod auth;
mod registry;

pub use auth::{AccessToken, GoogleAuth, GoogleCredentials};
pub use registry::GoogleClientRegistry;

pub const GOOGLE_TTS_API_BASE: &str = "https://texttospeech.googleapis.com";

/// Пол голоса в терминах SSML
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SsmlGender {
    #[serde(rename = "SSML_VOICE_GENDER_UNSPECIFIED")]
    Unspecified,
    Male,
    Female,
    Neutral,
}

impl Default for SsmlGender {
    fn default() -> Self {
        Self::Unspecified
    }
}

impl SsmlGender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unspecified => "SSML_VOICE_GENDER_UNSPECIFIED",
            Self::Male => "MALE",
            Self::Female => "FEMALE",
            Self::Neutral => "NEUTRAL",
        }
    }

    /// Создает SsmlGender из строки
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "SSML_VOICE_GENDER_UNSPECIFIED" | "UNSPECIFIED" => Ok(Self::Unspecified),
            "MALE" => Ok(Self::Male),
            "FEMALE" => Ok(Self::Female),
            "NEUTRAL" => Ok(Self::Neutral),
            _ => Err(Error::Validation(format!("неизвестный SSML пол: {}", s))),
        }
    }
}

/// Голос Google Cloud TTS
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GoogleVoice {
    /// Полное имя, например `uk-UA-Standard-A`; пустое имя оставляет выбор за Google
    pub name: String,
    pub language_code: String,
    pub natural_sample_rate_hz: Option<u32>,
    pub ssml_gender: Option<SsmlGender>,
}

impl GoogleVoice {
    /// Голос по умолчанию для языка
    pub fn for_language(language_code: impl Into<String>) -> Self {
        Self {
            language_code: language_code.into(),
            ..Self::default()
        }
    }

    /// Голос по имени; код языка берется из префикса имени (`uk-UA-Wavenet-A` -> `uk-UA`)
    pub fn from_name(name: impl Into<String>) -> Self {
        let name = name.into();
        let language_code = name.splitn(3, '-').take(2).collect::<Vec<_>>().join("-");
        Self {
            name,
            language_code,
            ..Self::default()
        }
    }
}

/// Адреса сервисов Google
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleEndpoints {
    pub api_base: String,
    /// Используется для учетных данных пользователя; сервисный аккаунт берет `token_uri` из ключа
    pub oauth_token_url: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            api_base: GOOGLE_TTS_API_BASE.to_string(),
            oauth_token_url: auth::DEFAULT_TOKEN_URL.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    ssml_gender: SsmlGender,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
    speaking_rate: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VoiceEntry {
    name: String,
    #[serde(default)]
    language_codes: Vec<String>,
    #[serde(default)]
    ssml_gender: Option<SsmlGender>,
    #[serde(default)]
    natural_sample_rate_hertz: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ListVoicesResponse {
    #[serde(default)]
    voices: Vec<VoiceEntry>,
}

/// Клиент Google Cloud Text-to-Speech REST API
#[derive(Debug)]
pub struct GoogleCloudTts {
    auth: GoogleAuth,
    api_base: String,
    client: reqwest::Client,
}

impl GoogleCloudTts {
    /// Создает клиент по файлу учетных данных.
    ///
    /// Отсутствующий путь или файл считается ошибкой конфигурации, сеть не используется.
    pub async fn from_credentials_file(
        path: Option<&Path>,
        endpoints: &GoogleEndpoints,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let path = path.ok_or_else(|| {
            Error::new(ErrorType::Configuration, &format!("переменная {} не задана", ENV_GOOGLE_CREDENTIALS))
        })?;
        if !path.is_file() {
            return Err(Error::new(
                ErrorType::Configuration,
                &format!("файл учетных данных Google не найден: {}", path.display()),
            ));
        }

        let contents = tokio::fs::read_to_string(path).await?;
        let credentials = GoogleCredentials::parse(&contents)?;
        log_info(&format!("Создан клиент Google TTS для {}", path.display()));

        let client = crate::http_client(timeout);
        Ok(Self {
            auth: GoogleAuth::new(credentials, endpoints.oauth_token_url.clone(), client.clone()),
            api_base: endpoints.api_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Возвращает каталог голосов, ключ - имя голоса
    pub async fn list_voices(&self) -> Result<BTreeMap<String, GoogleVoice>> {
        let token = self.auth.access_token().await?;
        let url = format!("{}/v1/voices", self.api_base);
        log_debug(&format!("Запрос списка голосов Google: {}", url));

        let data: Value = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let response: ListVoicesResponse = serde_json::from_value(data.clone())
            .map_err(|e| structural(&data, &format!("неожиданный список голосов Google: {}", e)))?;

        Ok(response
            .voices
            .into_iter()
            .map(|entry| {
                let voice = GoogleVoice {
                    language_code: entry.language_codes.into_iter().next().unwrap_or_default(),
                    natural_sample_rate_hz: entry.natural_sample_rate_hertz,
                    ssml_gender: entry.ssml_gender,
                    name: entry.name,
                };
                (voice.name.clone(), voice)
            })
            .collect())
    }

    /// Синтезирует LINEAR16 аудио и сохраняет его во временный `.wav` файл
    pub async fn synthesize(&self, text: &str, voice: &GoogleVoice, speaking_rate: f64) -> Result<PathBuf> {
        if voice.language_code.is_empty() {
            return Err(Error::new(ErrorType::Validation, "для голоса Google TTS нужен код языка"));
        }

        let request = SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceSelection {
                language_code: &voice.language_code,
                name: Some(voice.name.as_str()).filter(|n| !n.is_empty()),
                ssml_gender: voice.ssml_gender.unwrap_or_default(),
            },
            audio_config: AudioConfig {
                audio_encoding: "LINEAR16",
                speaking_rate,
            },
        };

        let token = self.auth.access_token().await?;
        let url = format!("{}/v1/text:synthesize", self.api_base);
        log_debug(&format!(
            "Google TTS запрос: голос '{}' ({}), {} символов",
            voice.name,
            voice.language_code,
            text.chars().count()
        ));

        let data: Value = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let encoded = data
            .get("audioContent")
            .and_then(Value::as_str)
            .ok_or_else(|| structural(&data, "в ответе Google TTS нет audioContent"))?;
        let audio = STANDARD
            .decode(encoded)
            .map_err(|e| Error::new(ErrorType::UnexpectedResponse, &format!("некорректное base64 аудио: {}", e)))?;

        write_temp_audio(&audio, ".wav").await
    }
}

fn structural(payload: &Value, message: &str) -> Error {
    log_error::<(), _>(payload_snapshot(payload), message).ok();
    Error::new(ErrorType::UnexpectedResponse, message)
}

/// Google TTS как движок в реестре провайдеров.
///
/// Клиент создается при первом обращении через реестр клиентов; при
/// нестандартном `synthesis_timeout` у движка свой реестр.
#[derive(Debug, Clone)]
pub struct GoogleTtsEngine {
    credentials: Option<PathBuf>,
    clients: Arc<GoogleClientRegistry>,
}

impl GoogleTtsEngine {
    pub const NAME: &'static str = "Google TTS";

    pub fn new(credentials: Option<PathBuf>, clients: Arc<GoogleClientRegistry>) -> Self {
        Self { credentials, clients }
    }

    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(
            config.google_credentials.clone(),
            GoogleClientRegistry::for_timeout(config.synthesis_timeout),
        )
    }

    async fn client(&self) -> Result<Arc<GoogleCloudTts>> {
        self.clients.get(self.credentials.as_deref()).await
    }
}

#[async_trait]
impl TtsProvider for GoogleTtsEngine {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn available_voices(&self) -> Result<Vec<String>> {
        Ok(self.client().await?.list_voices().await?.into_keys().collect())
    }

    async fn synthesize(&self, request: &SpeechRequest) -> Result<PathBuf> {
        let mut voice = match request.voice.as_deref() {
            Some(name) if !name.is_empty() => GoogleVoice::from_name(name),
            _ => GoogleVoice::default(),
        };
        if let Some(language) = request.language.as_deref().filter(|l| !l.trim().is_empty()) {
            voice.language_code = language.trim().to_string();
        }
        self.client().await?.synthesize(&request.text, &voice, request.speed).await
    }
}

fn credentials_or_env(credentials: Option<&Path>) -> Option<PathBuf> {
    credentials
        .map(Path::to_path_buf)
        .or_else(|| ProviderConfig::from_env().google_credentials)
}

/// Каталог голосов Google с учетными данными из аргумента или окружения
pub async fn google_cloud_available_voices(credentials: Option<&Path>) -> Result<BTreeMap<String, GoogleVoice>> {
    let path = credentials_or_env(credentials);
    GoogleClientRegistry::global()
        .get(path.as_deref())
        .await?
        .list_voices()
        .await
}

/// Синтезирует речь выбранным голосом Google
pub async fn google_cloud_synthesize(
    text: &str,
    voice: &GoogleVoice,
    speaking_rate: f64,
    credentials: Option<&Path>,
) -> Result<PathBuf> {
    let path = credentials_or_env(credentials);
    GoogleClientRegistry::global()
        .get(path.as_deref())
        .await?
        .synthesize(text, voice, speaking_rate)
        .await
}

/// Синтезирует речь голосом Google по умолчанию для языка
pub async fn google_tts(text: &str, language_code: &str) -> Result<PathBuf> {
    google_cloud_synthesize(text, &GoogleVoice::for_language(language_code), 1.0, None).await
}
