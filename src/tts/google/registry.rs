use super::{GoogleCloudTts, GoogleEndpoints};
use crate::error::Result;
use crate::logging::log_debug;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Таймаут запросов клиентов общего реестра
pub const DEFAULT_SYNTHESIS_TIMEOUT: Duration = Duration::from_secs(300);

static GLOBAL: Lazy<Arc<GoogleClientRegistry>> = Lazy::new(|| Arc::new(GoogleClientRegistry::new()));

/// Реестр клиентов Google TTS: один клиент на файл учетных данных.
///
/// Блокировка удерживается на время создания клиента, поэтому параллельные
/// вызовы с одним путем получают один и тот же экземпляр.
#[derive(Debug)]
pub struct GoogleClientRegistry {
    endpoints: GoogleEndpoints,
    timeout: Duration,
    clients: Mutex<HashMap<PathBuf, Arc<GoogleCloudTts>>>,
}

impl GoogleClientRegistry {
    pub fn new() -> Self {
        Self::with_endpoints(GoogleEndpoints::default(), DEFAULT_SYNTHESIS_TIMEOUT)
    }

    pub fn with_endpoints(endpoints: GoogleEndpoints, timeout: Duration) -> Self {
        Self {
            endpoints,
            timeout,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Общий реестр процесса
    pub fn global() -> Arc<Self> {
        GLOBAL.clone()
    }

    /// Общий реестр, если его таймаут совпадает с нужным, иначе отдельный
    pub fn for_timeout(timeout: Duration) -> Arc<Self> {
        if timeout == DEFAULT_SYNTHESIS_TIMEOUT {
            Self::global()
        } else {
            Arc::new(Self::with_endpoints(GoogleEndpoints::default(), timeout))
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Возвращает клиент для файла учетных данных, создавая его при первом обращении
    pub async fn get(&self, credentials: Option<&Path>) -> Result<Arc<GoogleCloudTts>> {
        let mut clients = self.clients.lock().await;

        if let Some(path) = credentials {
            if let Some(client) = clients.get(path) {
                log_debug(&format!("Используется кэшированный клиент Google TTS для {}", path.display()));
                return Ok(client.clone());
            }
        }

        let client = Arc::new(GoogleCloudTts::from_credentials_file(credentials, &self.endpoints, self.timeout).await?);
        if let Some(path) = credentials {
            clients.insert(path.to_path_buf(), client.clone());
        }
        Ok(client)
    }

    /// Количество созданных клиентов
    pub async fn len(&self) -> usize {
        self.clients.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for GoogleClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[tokio::test]
    async fn test_failed_construction_is_not_cached() {
        let registry = GoogleClientRegistry::new();
        let result = registry.get(Some(Path::new("/nonexistent/gcp.json"))).await;
        assert!(matches!(result, Err(Error::Configuration(_))));
        assert!(registry.is_empty().await);
    }

    #[test]
    fn test_for_timeout() {
        assert!(Arc::ptr_eq(
            &GoogleClientRegistry::for_timeout(DEFAULT_SYNTHESIS_TIMEOUT),
            &GoogleClientRegistry::global()
        ));

        let custom = GoogleClientRegistry::for_timeout(Duration::from_secs(20));
        assert!(!Arc::ptr_eq(&custom, &GoogleClientRegistry::global()));
        assert_eq!(custom.timeout(), Duration::from_secs(20));
    }

    #[tokio::test]
    async fn test_reuses_client_per_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.json");
        std::fs::write(
            &path,
            r#"{"type": "authorized_user", "client_id": "c", "client_secret": "s", "refresh_token": "r"}"#,
        )
        .unwrap();

        let registry = GoogleClientRegistry::new();
        let first = registry.get(Some(&path)).await.unwrap();
        let second = registry.get(Some(&path)).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len().await, 1);
    }
}
