use super::{write_temp_audio, GradioClient, SpeechRequest, TtsProvider};
use crate::config::ProviderConfig;
use crate::error::Result;
use crate::logging::{log_info, log_warning};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::PathBuf;

/// Голоса, которые поставляются с VibeVoice по умолчанию
pub const VIBEVOICE_DEFAULT_VOICES: [&str; 10] = [
    "zh-Xinran_woman",
    "en-Alice_woman_bgm",
    "zh-Anchen_man_bgm",
    "in-Samuel_man",
    "en-Alice_woman",
    "en-Frank_man",
    "zh-Bowen_man",
    "en-Maya_woman",
    "en-Carter_man",
    "en-Yasser_man",
];

const SPEAKERS_API: &str = "/update_speaker_visibility";
const GENERATE_API: &str = "/generate_podcast_wrapper";
/// Сервис всегда принимает четыре слота голосов
const VOICE_SLOTS: usize = 4;
/// Аргумент `/update_speaker_visibility`: сколько слотов показать
const VISIBLE_SPEAKERS: u32 = 4;

/// Список голосов VibeVoice с указанием, откуда он получен
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceCatalog {
    /// Список получен от сервиса
    Live(Vec<String>),
    /// Сервис недоступен или вернул пустой список, используются голоса по умолчанию
    Default(Vec<String>),
}

impl VoiceCatalog {
    pub fn default_voices() -> Self {
        Self::Default(VIBEVOICE_DEFAULT_VOICES.iter().map(|v| v.to_string()).collect())
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }

    pub fn voices(&self) -> &[String] {
        match self {
            Self::Live(voices) | Self::Default(voices) => voices,
        }
    }

    pub fn into_voices(self) -> Vec<String> {
        match self {
            Self::Live(voices) | Self::Default(voices) => voices,
        }
    }
}

/// Параметры генерации VibeVoice
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VibeVoiceOptions {
    /// Classifier-free guidance
    pub cfg_scale: f64,
    /// Количество спикеров в диалоге
    pub num_speakers: u32,
}

impl Default for VibeVoiceOptions {
    fn default() -> Self {
        Self {
            cfg_scale: 1.3,
            num_speakers: 1,
        }
    }
}

/// Клиент VibeVoice
#[derive(Debug, Clone)]
pub struct VibeVoiceTts {
    gradio: GradioClient,
    options: VibeVoiceOptions,
}

impl VibeVoiceTts {
    pub const NAME: &'static str = "VibeVoice";
    pub const DEFAULT_VOICE: &'static str = "en-Alice_woman";

    pub fn new(base_url: &str, timeout: std::time::Duration) -> Result<Self> {
        Ok(Self {
            gradio: GradioClient::new(base_url, timeout)?,
            options: VibeVoiceOptions::default(),
        })
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        Self::new(&config.vibevoice_url, config.synthesis_timeout)
    }

    pub fn with_options(mut self, options: VibeVoiceOptions) -> Self {
        self.options = options;
        self
    }

    /// Запрашивает голоса у сервиса, при любой ошибке возвращает список по умолчанию
    pub async fn voice_catalog(&self) -> VoiceCatalog {
        match self.gradio.call(SPEAKERS_API, vec![json!(VISIBLE_SPEAKERS)]).await {
            Ok(result) => {
                let voices = collect_voices(&result);
                if voices.is_empty() {
                    log_warning("VibeVoice вернул пустой список голосов, используются голоса по умолчанию");
                    VoiceCatalog::default_voices()
                } else {
                    VoiceCatalog::Live(voices)
                }
            }
            Err(e) => {
                log_warning(&format!("Не удалось получить голоса VibeVoice: {}", e));
                VoiceCatalog::default_voices()
            }
        }
    }

    /// Синтезирует речь одним голосом во всех слотах
    pub async fn synthesize(&self, text: &str, voice_name: &str) -> Result<PathBuf> {
        log_info(&format!("VibeVoice синтез голосом {}: {} символов", voice_name, text.chars().count()));

        let mut payload = vec![json!(self.options.num_speakers), json!(text)];
        payload.extend(std::iter::repeat(json!(voice_name)).take(VOICE_SLOTS));
        payload.push(json!(self.options.cfg_scale));

        let audio = self.gradio.call_for_audio(GENERATE_API, payload).await?;
        write_temp_audio(&audio, ".wav").await
    }
}

/// Собирает уникальные строки из колонок-массивов поля `data`
fn collect_voices(result: &Value) -> Vec<String> {
    let mut voices: Vec<String> = Vec::new();
    let columns = result.get("data").and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[]);

    for column in columns.iter().filter_map(Value::as_array) {
        for entry in column.iter().filter_map(Value::as_str) {
            if !voices.iter().any(|v| v == entry) {
                voices.push(entry.to_string());
            }
        }
    }
    voices
}

#[async_trait]
impl TtsProvider for VibeVoiceTts {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn available_voices(&self) -> Result<Vec<String>> {
        Ok(self.voice_catalog().await.into_voices())
    }

    async fn synthesize(&self, request: &SpeechRequest) -> Result<PathBuf> {
        let voice = request.voice.as_deref().unwrap_or(Self::DEFAULT_VOICE);
        VibeVoiceTts::synthesize(self, &request.text, voice).await
    }
}

/// Голоса VibeVoice с сервера `base_url` или с адреса из окружения
pub async fn vibevoice_available_voices(base_url: Option<&str>) -> VoiceCatalog {
    let config = ProviderConfig::from_env();
    match VibeVoiceTts::new(base_url.unwrap_or(&config.vibevoice_url), config.synthesis_timeout) {
        Ok(tts) => tts.voice_catalog().await,
        Err(e) => {
            log_warning(&format!("Не удалось получить голоса VibeVoice: {}", e));
            VoiceCatalog::default_voices()
        }
    }
}

/// Синтезирует речь через VibeVoice
pub async fn vibevoice_synthesize(
    text: &str,
    voice_name: &str,
    options: VibeVoiceOptions,
    base_url: Option<&str>,
) -> Result<PathBuf> {
    let config = ProviderConfig::from_env();
    VibeVoiceTts::new(base_url.unwrap_or(&config.vibevoice_url), config.synthesis_timeout)?
        .with_options(options)
        .synthesize(text, voice_name)
        .await
}
