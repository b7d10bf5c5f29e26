use std::path::PathBuf;
use std::time::Duration;

/// Официальный endpoint бесплатного тарифа DeepL
pub const DEEPL_FREE_ENDPOINT: &str = "https://api-free.deepl.com/v2/translate";
/// Адрес StyleTTS2 по умолчанию
pub const STYLETTS2_DEFAULT_URL: &str = "http://localhost:7861";
/// Адрес VibeVoice по умолчанию
pub const VIBEVOICE_DEFAULT_URL: &str = "http://localhost:7890";

pub const ENV_DEEPL_API_KEY: &str = "DEEPL_API_KEY";
pub const ENV_DEEPLX_API_URL: &str = "DEEPLX_API_URL";
pub const ENV_STYLETTS2_URL: &str = "STYLETTS2_URL";
pub const ENV_VIBEVOICE_URL: &str = "VIBEVOICE_URL";
pub const ENV_GOOGLE_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Настройки всех провайдеров перевода и синтеза речи
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    /// Ключ DeepL API
    pub deepl_api_key: Option<String>,

    /// Адрес метода перевода DeepL
    pub deepl_endpoint: String,

    /// Базовый адрес DeepLX сервиса, например http://localhost:1188
    pub deeplx_api_url: Option<String>,

    /// Базовый адрес Gradio сервиса StyleTTS2
    pub styletts2_url: String,

    /// Базовый адрес Gradio сервиса VibeVoice
    pub vibevoice_url: String,

    /// Путь к JSON файлу учетных данных Google
    pub google_credentials: Option<PathBuf>,

    /// Таймаут запросов перевода
    pub translation_timeout: Duration,

    /// Таймаут запросов синтеза речи
    pub synthesis_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            deepl_api_key: None,
            deepl_endpoint: DEEPL_FREE_ENDPOINT.to_string(),
            deeplx_api_url: None,
            styletts2_url: STYLETTS2_DEFAULT_URL.to_string(),
            vibevoice_url: VIBEVOICE_DEFAULT_URL.to_string(),
            google_credentials: None,
            translation_timeout: Duration::from_secs(60),
            synthesis_timeout: Duration::from_secs(300),
        }
    }
}

impl ProviderConfig {
    /// Читает настройки из переменных окружения процесса
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Читает настройки через произвольную функцию поиска переменных
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        Self {
            deepl_api_key: value(ENV_DEEPL_API_KEY),
            deeplx_api_url: value(ENV_DEEPLX_API_URL),
            styletts2_url: value(ENV_STYLETTS2_URL).unwrap_or(defaults.styletts2_url),
            vibevoice_url: value(ENV_VIBEVOICE_URL).unwrap_or(defaults.vibevoice_url),
            google_credentials: value(ENV_GOOGLE_CREDENTIALS).map(PathBuf::from),
            ..defaults
        }
    }

    /// Устанавливает ключ DeepL
    pub fn with_deepl_api_key(mut self, key: impl Into<String>) -> Self {
        self.deepl_api_key = Some(key.into());
        self
    }

    /// Устанавливает адрес DeepLX
    pub fn with_deeplx_api_url(mut self, url: impl Into<String>) -> Self {
        self.deeplx_api_url = Some(url.into());
        self
    }

    /// Устанавливает путь к учетным данным Google
    pub fn with_google_credentials(mut self, path: impl Into<PathBuf>) -> Self {
        self.google_credentials = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_env_empty() {
        let config = ProviderConfig::from_lookup(|_| None);
        assert_eq!(config, ProviderConfig::default());
        assert_eq!(config.styletts2_url, "http://localhost:7861");
        assert_eq!(config.vibevoice_url, "http://localhost:7890");
        assert_eq!(config.translation_timeout, Duration::from_secs(60));
        assert_eq!(config.synthesis_timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_reads_all_variables() {
        let config = ProviderConfig::from_lookup(lookup_from(&[
            ("DEEPL_API_KEY", "secret:fx"),
            ("DEEPLX_API_URL", "http://localhost:1188/"),
            ("STYLETTS2_URL", "http://tts:7861"),
            ("VIBEVOICE_URL", "http://vibe:7890"),
            ("GOOGLE_APPLICATION_CREDENTIALS", "/etc/gcp.json"),
        ]));

        assert_eq!(config.deepl_api_key.as_deref(), Some("secret:fx"));
        assert_eq!(config.deeplx_api_url.as_deref(), Some("http://localhost:1188/"));
        assert_eq!(config.styletts2_url, "http://tts:7861");
        assert_eq!(config.vibevoice_url, "http://vibe:7890");
        assert_eq!(config.google_credentials, Some(PathBuf::from("/etc/gcp.json")));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = ProviderConfig::from_lookup(lookup_from(&[
            ("DEEPL_API_KEY", "   "),
            ("STYLETTS2_URL", ""),
        ]));
        assert!(config.deepl_api_key.is_none());
        assert_eq!(config.styletts2_url, STYLETTS2_DEFAULT_URL);
    }
}
