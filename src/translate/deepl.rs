use super::Translator;
use crate::config::{ProviderConfig, ENV_DEEPL_API_KEY};
use crate::error::{Error, ErrorType, Result};
use crate::language::normalize_language;
use crate::logging::{log_debug, log_error, payload_snapshot};
use async_trait::async_trait;
use serde_json::Value;

/// Клиент официального DeepL API
#[derive(Debug, Clone)]
pub struct DeepLTranslator {
    api_key: Option<String>,
    endpoint: String,
    client: reqwest::Client,
}

impl DeepLTranslator {
    pub const NAME: &'static str = "DeepL";

    /// Создает клиент с явным ключом и адресом метода перевода
    pub fn new(api_key: Option<String>, endpoint: impl Into<String>, timeout: std::time::Duration) -> Self {
        Self {
            api_key,
            endpoint: endpoint.into(),
            client: crate::http_client(timeout),
        }
    }

    /// Создает клиент из общих настроек провайдеров
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(
            config.deepl_api_key.clone(),
            config.deepl_endpoint.clone(),
            config.translation_timeout,
        )
    }

    /// Переводит текст через DeepL
    pub async fn translate(&self, text: &str, source_lang: Option<&str>, target_lang: &str) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            Error::new(ErrorType::Configuration, &format!("переменная {} не задана", ENV_DEEPL_API_KEY))
        })?;

        let source = normalize_language(source_lang);
        let target = normalize_language(Some(target_lang)).ok_or_else(|| {
            Error::new(ErrorType::Validation, "для перевода DeepL нужен target_lang")
        })?;

        let mut form = vec![
            ("auth_key", api_key.to_string()),
            ("text", text.to_string()),
            ("target_lang", target.clone()),
        ];
        if let Some(source) = &source {
            form.push(("source_lang", source.clone()));
        }

        log_debug(&format!(
            "DeepL запрос: {} символов, {} -> {}",
            text.chars().count(),
            source.as_deref().unwrap_or("auto"),
            target
        ));

        let response = self
            .client
            .post(&self.endpoint)
            .form(&form)
            .send()
            .await?;

        log_debug(&format!("Получен ответ от DeepL, статус: {}", response.status()));

        let data: Value = response.error_for_status()?.json().await?;
        extract_translation(&data)
    }
}

/// Достает `translations[0].text` из ответа DeepL
fn extract_translation(data: &Value) -> Result<String> {
    match data.pointer("/translations/0/text").and_then(Value::as_str) {
        Some(text) => Ok(text.to_string()),
        None => {
            log_error::<(), _>(payload_snapshot(data), "Неожиданный ответ DeepL").ok();
            Err(Error::new(
                ErrorType::UnexpectedResponse,
                "в ответе DeepL нет translations[0].text",
            ))
        }
    }
}

#[async_trait]
impl Translator for DeepLTranslator {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn translate(&self, text: &str, source_lang: Option<&str>, target_lang: &str) -> Result<String> {
        DeepLTranslator::translate(self, text, source_lang, target_lang).await
    }
}

/// Переводит текст через DeepL с настройками из окружения
pub async fn deepl_translate(text: &str, source_lang: Option<&str>, target_lang: &str) -> Result<String> {
    DeepLTranslator::from_config(&ProviderConfig::from_env())
        .translate(text, source_lang, target_lang)
        .await
}
