//! Клиент для Gradio-совместимых сервисов синтеза речи.
//!
//! Аргументы передаются позиционно в `{"data": [...]}`, ответ приходит в том же
//! виде. Аудио возвращается либо inline как data URI, либо ссылкой на файл на
//! сервере, который нужно скачать отдельным запросом.

use crate::error::{Error, ErrorType, Result};
use crate::logging::{log_debug, log_error, payload_snapshot};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};

/// Источник аудио, найденный в ответе Gradio
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioSource {
    /// Аудио пришло в самом ответе
    Inline(Vec<u8>),
    /// Аудио нужно скачать по адресу
    Remote(String),
}

/// Клиент Gradio сервиса
#[derive(Debug, Clone)]
pub struct GradioClient {
    base_url: String,
    client: reqwest::Client,
}

impl GradioClient {
    /// Создает клиент; пустой адрес считается ошибкой конфигурации
    pub fn new(base_url: &str, timeout: std::time::Duration) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            client: crate::http_client(timeout),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Вызывает функцию `api_name` и возвращает JSON ответа целиком
    pub async fn call(&self, api_name: &str, data: Vec<Value>) -> Result<Value> {
        let url = format!("{}{}", self.base_url, api_name);
        log_debug(&format!("Gradio запрос к {} ({} аргументов)", url, data.len()));

        let response = self
            .client
            .post(&url)
            .json(&json!({ "data": data }))
            .send()
            .await?;
        log_debug(&format!("Получен ответ от {}, статус: {}", url, response.status()));

        Ok(response.error_for_status()?.json().await?)
    }

    /// Вызывает функцию синтеза и скачивает аудио из поля `data` ответа
    pub async fn call_for_audio(&self, api_name: &str, data: Vec<Value>) -> Result<Vec<u8>> {
        let result = self.call(api_name, data).await?;
        let payload = result.get("data").unwrap_or(&Value::Null);
        self.download_audio(payload).await
    }

    /// Получает байты аудио из полезной нагрузки ответа
    pub async fn download_audio(&self, payload: &Value) -> Result<Vec<u8>> {
        match resolve_audio(&self.base_url, payload)? {
            AudioSource::Inline(bytes) => Ok(bytes),
            AudioSource::Remote(url) => {
                log_debug(&format!("Скачивание аудио: {}", url));
                let response = self.client.get(&url).send().await?.error_for_status()?;
                Ok(response.bytes().await?.to_vec())
            }
        }
    }
}

/// Убирает пробелы и завершающий `/` из адреса сервиса
pub fn normalize_base_url(url: &str) -> Result<String> {
    let url = url.trim();
    if url.is_empty() {
        return Err(Error::new(
            ErrorType::Configuration,
            "не задан адрес удаленного TTS сервиса",
        ));
    }
    Ok(url.strip_suffix('/').unwrap_or(url).to_string())
}

/// Декодирует base64 содержимое data URI
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let (_, encoded) = uri
        .split_once(',')
        .ok_or_else(|| Error::new(ErrorType::UnexpectedResponse, "некорректный data URI"))?;
    STANDARD
        .decode(encoded.trim())
        .map_err(|e| Error::new(ErrorType::UnexpectedResponse, &format!("некорректное base64 аудио: {}", e)))
}

/// Определяет, где лежит аудио в ответе Gradio
pub fn resolve_audio(base_url: &str, payload: &Value) -> Result<AudioSource> {
    let payload = match payload {
        Value::Array(items) => items.first().ok_or_else(|| structural(payload, "пустой аудио ответ"))?,
        other => other,
    };

    let file_ref = match payload {
        Value::Object(map) => {
            if let Some(uri) = map.get("data").and_then(Value::as_str).filter(|d| d.starts_with("data:")) {
                return decode_data_uri(uri).map(AudioSource::Inline);
            }
            ["path", "name", "url"]
                .iter()
                .filter_map(|key| map.get(*key).and_then(Value::as_str))
                .find(|value| !value.is_empty())
        }
        Value::String(value) if value.starts_with("data:") => {
            return decode_data_uri(value).map(AudioSource::Inline);
        }
        Value::String(value) => Some(value.as_str()).filter(|v| !v.is_empty()),
        _ => return Err(structural(payload, "неподдерживаемый тип ответа Gradio")),
    };

    let file_ref = file_ref.ok_or_else(|| structural(payload, "в аудио ответе нет ссылки на файл"))?;

    if file_ref.starts_with("http") {
        Ok(AudioSource::Remote(file_ref.to_string()))
    } else {
        Ok(AudioSource::Remote(format!(
            "{}/file={}",
            normalize_base_url(base_url)?,
            file_ref.trim_start_matches('/')
        )))
    }
}

fn structural(payload: &Value, message: &str) -> Error {
    log_error::<(), _>(payload_snapshot(payload), message).ok();
    Error::new(ErrorType::UnexpectedResponse, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://localhost:7861";

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url(" http://host:7861/ ").unwrap(), "http://host:7861");
        assert_eq!(normalize_base_url("http://host:7861").unwrap(), "http://host:7861");
        assert!(matches!(normalize_base_url("  "), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_inline_data_uri_object() {
        let payload = json!([{ "data": "data:audio/wav;base64,UklGRg==", "name": "audio.wav" }]);
        assert_eq!(
            resolve_audio(BASE, &payload).unwrap(),
            AudioSource::Inline(b"RIFF".to_vec())
        );
    }

    #[test]
    fn test_inline_data_uri_string() {
        let payload = json!("data:audio/wav;base64,UklGRg==");
        assert_eq!(
            resolve_audio(BASE, &payload).unwrap(),
            AudioSource::Inline(b"RIFF".to_vec())
        );
    }

    #[test]
    fn test_file_references() {
        assert_eq!(
            resolve_audio(BASE, &json!([{ "path": "/tmp/gradio/out.wav" }])).unwrap(),
            AudioSource::Remote("http://localhost:7861/file=tmp/gradio/out.wav".into())
        );
        assert_eq!(
            resolve_audio(BASE, &json!({ "path": "", "name": "out.wav" })).unwrap(),
            AudioSource::Remote("http://localhost:7861/file=out.wav".into())
        );
        assert_eq!(
            resolve_audio(BASE, &json!(["https://cdn.example.com/out.wav"])).unwrap(),
            AudioSource::Remote("https://cdn.example.com/out.wav".into())
        );
    }

    #[test]
    fn test_structural_errors() {
        for payload in [json!([]), json!(null), json!(42), json!({ "is_file": true }), json!("")] {
            assert!(matches!(
                resolve_audio(BASE, &payload),
                Err(Error::UnexpectedResponse(_))
            ));
        }
    }

    #[test]
    fn test_bad_base64() {
        assert!(matches!(
            decode_data_uri("data:audio/wav;base64,@@@"),
            Err(Error::UnexpectedResponse(_))
        ));
        assert!(decode_data_uri("no-comma").is_err());
    }
}
