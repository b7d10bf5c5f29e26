//! OAuth токены для Google Cloud по JSON файлу учетных данных.
//!
//! Поддерживаются ключи сервисного аккаунта (JWT, подписанный RS256) и
//! учетные данные пользователя из `gcloud auth application-default login`
//! (refresh token).

use crate::error::{Error, ErrorType, Result};
use crate::logging::log_debug;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

/// Ключ сервисного аккаунта
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub key_type: String,
    #[serde(default)]
    pub project_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

/// Учетные данные пользователя gcloud
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthorizedUserCredentials {
    #[serde(rename = "type")]
    pub cred_type: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone)]
pub enum GoogleCredentials {
    ServiceAccount(ServiceAccountKey),
    AuthorizedUser(AuthorizedUserCredentials),
}

impl GoogleCredentials {
    /// Разбирает содержимое JSON файла учетных данных
    pub fn parse(json_str: &str) -> Result<Self> {
        let json_obj: serde_json::Value = serde_json::from_str(json_str)?;

        match json_obj.get("type").and_then(|t| t.as_str()) {
            Some("service_account") => Ok(Self::ServiceAccount(serde_json::from_value(json_obj)?)),
            Some("authorized_user") => Ok(Self::AuthorizedUser(serde_json::from_value(json_obj)?)),
            other => Err(Error::new(
                ErrorType::Configuration,
                &format!("неподдерживаемый тип учетных данных Google: {:?}", other),
            )),
        }
    }
}

/// OAuth токен со временем истечения
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Токен считается истекшим за 5 минут до срока
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at - Duration::minutes(5)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: i64,
    iat: i64,
}

/// Выдает и кэширует токены доступа
#[derive(Debug)]
pub struct GoogleAuth {
    credentials: GoogleCredentials,
    oauth_token_url: String,
    token_cache: RwLock<Option<AccessToken>>,
    client: reqwest::Client,
}

impl GoogleAuth {
    pub fn new(credentials: GoogleCredentials, oauth_token_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            credentials,
            oauth_token_url: oauth_token_url.into(),
            token_cache: RwLock::new(None),
            client,
        }
    }

    /// Возвращает действующий токен, при необходимости запрашивая новый
    pub async fn access_token(&self) -> Result<String> {
        if let Some(token) = self.token_cache.read().await.as_ref() {
            if !token.is_expired() {
                return Ok(token.token.clone());
            }
        }

        let mut cache = self.token_cache.write().await;
        if let Some(token) = cache.as_ref() {
            if !token.is_expired() {
                return Ok(token.token.clone());
            }
        }

        let token = match &self.credentials {
            GoogleCredentials::ServiceAccount(key) => self.service_account_token(key).await?,
            GoogleCredentials::AuthorizedUser(creds) => self.authorized_user_token(creds).await?,
        };
        let value = token.token.clone();
        *cache = Some(token);
        Ok(value)
    }

    async fn service_account_token(&self, key: &ServiceAccountKey) -> Result<AccessToken> {
        use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: &key.client_email,
            scope: CLOUD_PLATFORM_SCOPE,
            aud: &key.token_uri,
            exp: now + 3600,
            iat: now,
        };
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        let jwt = encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)?;

        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", jwt.as_str()),
        ];
        self.exchange(&key.token_uri, &params).await
    }

    async fn authorized_user_token(&self, creds: &AuthorizedUserCredentials) -> Result<AccessToken> {
        let params = [
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
            ("refresh_token", creds.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];
        self.exchange(&self.oauth_token_url, &params).await
    }

    async fn exchange(&self, url: &str, params: &[(&str, &str)]) -> Result<AccessToken> {
        log_debug(&format!("Запрос OAuth токена: {}", url));
        let response: TokenResponse = self
            .client
            .post(url)
            .form(params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let token = response
            .access_token
            .ok_or_else(|| Error::new(ErrorType::Auth, "в ответе на запрос токена нет access_token"))?;

        Ok(AccessToken {
            token,
            expires_at: expiry_after(Utc::now(), response.expires_in)?,
        })
    }
}

/// Время истечения токена; `expires_in` вне диапазона chrono считается ошибкой авторизации
fn expiry_after(now: DateTime<Utc>, expires_in: i64) -> Result<DateTime<Utc>> {
    Duration::try_seconds(expires_in)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| Error::new(ErrorType::Auth, &format!("некорректный expires_in: {}", expires_in)))
}
