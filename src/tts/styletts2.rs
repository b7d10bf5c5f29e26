use super::{write_temp_audio, GradioClient, SpeechRequest, TtsProvider};
use crate::config::ProviderConfig;
use crate::error::{Error, ErrorType, Result};
use crate::logging::log_info;
use async_trait::async_trait;
use serde_json::json;
use std::path::PathBuf;

/// Голоса украинской мультиспикерной модели StyleTTS2
pub const STYLETTS2_UA_VOICES: [&str; 31] = [
    "Інна Гелевера",
    "Анастасія Павленко",
    "Артем Окороков",
    "Вʼячеслав Дудко",
    "Вероніка Дорош",
    "Влада Муравець",
    "Вікторія Левченко",
    "Гаська Шиян",
    "Денис Денисенко",
    "Катерина Потапенко",
    "Кирило Татарченко",
    "Людмила Чиркова",
    "Марина Панас",
    "Марися Нікітюк",
    "Марта Мольфар",
    "Марічка Штирбулова",
    "Матвій Ніколаєв",
    "Михайло Тишин",
    "Олександр Ролдугін",
    "Олена Шверк",
    "Павло Буковський",
    "Петро Філяк",
    "Поліна Еккерт",
    "Поліна Еккерт(хлопчик)",
    "Роман Куліш",
    "Слава Красовська",
    "Тарас Василюк",
    "Тетяна Гончарова",
    "Тетяна Лукинюк",
    "Юрій Вихованець",
    "Юрій Кудрявець",
];

const SYNTHESIZE_API: &str = "/synthesize";
const DEFAULT_MODEL: &str = "multi";

/// Копия списка поддерживаемых голосов
pub fn styletts2_available_voices() -> Vec<String> {
    STYLETTS2_UA_VOICES.iter().map(|v| v.to_string()).collect()
}

/// Клиент StyleTTS2-UA
#[derive(Debug, Clone)]
pub struct StyleTts2Tts {
    gradio: GradioClient,
    model_name: String,
}

impl StyleTts2Tts {
    pub const NAME: &'static str = "StyleTTS2-UA";
    pub const DEFAULT_VOICE: &'static str = "Інна Гелевера";

    pub fn new(base_url: &str, timeout: std::time::Duration) -> Result<Self> {
        Ok(Self {
            gradio: GradioClient::new(base_url, timeout)?,
            model_name: DEFAULT_MODEL.to_string(),
        })
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        Self::new(&config.styletts2_url, config.synthesis_timeout)
    }

    /// Устанавливает имя модели на сервере
    pub fn with_model(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }

    /// Синтезирует речь выбранным голосом
    pub async fn synthesize(&self, text: &str, voice_name: &str, speed: f64) -> Result<PathBuf> {
        if !STYLETTS2_UA_VOICES.contains(&voice_name) {
            return Err(Error::new(
                ErrorType::Validation,
                &format!("неподдерживаемый голос StyleTTS2: {}", voice_name),
            ));
        }

        log_info(&format!("StyleTTS2 синтез голосом {}: {} символов", voice_name, text.chars().count()));
        let audio = self
            .gradio
            .call_for_audio(
                SYNTHESIZE_API,
                vec![json!(self.model_name), json!(text), json!(speed), json!(voice_name)],
            )
            .await?;

        write_temp_audio(&audio, ".wav").await
    }
}

#[async_trait]
impl TtsProvider for StyleTts2Tts {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn available_voices(&self) -> Result<Vec<String>> {
        Ok(styletts2_available_voices())
    }

    async fn synthesize(&self, request: &SpeechRequest) -> Result<PathBuf> {
        let voice = request.voice.as_deref().unwrap_or(Self::DEFAULT_VOICE);
        StyleTts2Tts::synthesize(self, &request.text, voice, request.speed).await
    }
}

/// Синтезирует речь на сервере `base_url` или на адресе из окружения
pub async fn styletts2_synthesize(
    text: &str,
    voice_name: &str,
    model_name: &str,
    speed: f64,
    base_url: Option<&str>,
) -> Result<PathBuf> {
    let config = ProviderConfig::from_env();
    let base = base_url.unwrap_or(&config.styletts2_url);
    StyleTts2Tts::new(base, config.synthesis_timeout)?
        .with_model(model_name)
        .synthesize(text, voice_name, speed)
        .await
}

/// Синтезирует речь с моделью и скоростью по умолчанию
pub async fn styletts2_ua_tts(text: &str, voice_name: &str) -> Result<PathBuf> {
    styletts2_synthesize(text, voice_name, DEFAULT_MODEL, 1.0, None).await
}
