use super::Translator;
use crate::config::{ProviderConfig, ENV_DEEPLX_API_URL};
use crate::error::{Error, ErrorType, Result};
use crate::language::normalize_language;
use crate::logging::{log_debug, log_error, payload_snapshot};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Ключи ответа, в которых разные реализации DeepLX возвращают перевод
const RESPONSE_KEYS: [&str; 3] = ["data", "result", "translated_text"];

/// Тело запроса к DeepLX
#[derive(Debug, Serialize)]
struct DeepLxRequest<'a> {
    text: &'a str,
    source_lang: String,
    target_lang: String,
}

/// Клиент самостоятельно развернутого DeepLX сервиса
#[derive(Debug, Clone)]
pub struct DeepLxTranslator {
    api_url: Option<String>,
    client: reqwest::Client,
}

impl DeepLxTranslator {
    pub const NAME: &'static str = "DeepLX";

    /// Создает клиент для сервиса по адресу `api_url`
    pub fn new(api_url: Option<String>, timeout: std::time::Duration) -> Self {
        Self {
            api_url,
            client: crate::http_client(timeout),
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(config.deeplx_api_url.clone(), config.translation_timeout)
    }

    /// Переводит текст через DeepLX
    pub async fn translate(&self, text: &str, source_lang: Option<&str>, target_lang: &str) -> Result<String> {
        let api_url = self.api_url.as_deref().ok_or_else(|| {
            Error::new(ErrorType::Configuration, &format!("переменная {} не задана", ENV_DEEPLX_API_URL))
        })?;

        let target = normalize_language(Some(target_lang)).ok_or_else(|| {
            Error::new(ErrorType::Validation, "для перевода DeepLX нужен target_lang")
        })?;
        let request = DeepLxRequest {
            text,
            source_lang: normalize_language(source_lang).unwrap_or_else(|| "AUTO".to_string()),
            target_lang: target,
        };

        let url = format!("{}/translate", api_url.trim_end_matches('/'));
        log_debug(&format!(
            "DeepLX запрос к {}: {} -> {}",
            url, request.source_lang, request.target_lang
        ));

        let response = self.client.post(&url).json(&request).send().await?;
        log_debug(&format!("Получен ответ от DeepLX, статус: {}", response.status()));

        let data: Value = response.error_for_status()?.json().await?;
        extract_translation(&data)
    }
}

/// Возвращает первое строковое значение среди известных ключей ответа
fn extract_translation(data: &Value) -> Result<String> {
    let found = RESPONSE_KEYS
        .iter()
        .find_map(|key| data.get(key).and_then(Value::as_str));

    match found {
        Some(text) => Ok(text.to_string()),
        None => {
            log_error::<(), _>(payload_snapshot(data), "Неожиданный ответ DeepLX").ok();
            Err(Error::new(
                ErrorType::UnexpectedResponse,
                "в ответе DeepLX нет data, result или translated_text",
            ))
        }
    }
}

#[async_trait]
impl Translator for DeepLxTranslator {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn translate(&self, text: &str, source_lang: Option<&str>, target_lang: &str) -> Result<String> {
        DeepLxTranslator::translate(self, text, source_lang, target_lang).await
    }
}

/// Переводит текст через DeepLX с настройками из окружения
pub async fn deeplx_translate(text: &str, source_lang: Option<&str>, target_lang: &str) -> Result<String> {
    DeepLxTranslator::from_config(&ProviderConfig::from_env())
        .translate(text, source_lang, target_lang)
        .await
}
