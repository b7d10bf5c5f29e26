use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

mod audio_file;
pub mod gradio;
pub mod google;
mod styletts2;
mod vibevoice;

pub use audio_file::write_temp_audio;
pub use gradio::GradioClient;
pub use google::{
    google_cloud_available_voices, google_cloud_synthesize, google_tts, GoogleClientRegistry,
    GoogleCloudTts, GoogleEndpoints, GoogleTtsEngine, GoogleVoice, SsmlGender,
};
pub use styletts2::{
    styletts2_available_voices, styletts2_synthesize, styletts2_ua_tts, StyleTts2Tts,
    STYLETTS2_UA_VOICES,
};
pub use vibevoice::{
    vibevoice_available_voices, vibevoice_synthesize, VibeVoiceOptions, VibeVoiceTts, VoiceCatalog,
    VIBEVOICE_DEFAULT_VOICES,
};

/// Запрос на синтез речи
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    /// Текст для озвучки
    pub text: String,
    /// Имя голоса; `None` означает голос провайдера по умолчанию
    pub voice: Option<String>,
    /// Код языка, используется Google TTS
    pub language: Option<String>,
    /// Скорость речи
    pub speed: f64,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: None,
            language: None,
            speed: 1.0,
        }
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }
}

/// Интерфейс для TTS провайдеров
#[async_trait]
pub trait TtsProvider: Send + Sync {
    /// Имя движка в списке TTS
    fn name(&self) -> &str;

    /// Возвращает список доступных голосов
    async fn available_voices(&self) -> Result<Vec<String>>;

    /// Синтезирует речь во временный `.wav` файл и возвращает путь к нему.
    /// Файл принадлежит вызывающей стороне.
    async fn synthesize(&self, request: &SpeechRequest) -> Result<PathBuf>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_request_builder() {
        let request = SpeechRequest::new("Привіт")
            .with_voice("Марта Мольфар")
            .with_language("uk-UA")
            .with_speed(1.2);

        assert_eq!(request.text, "Привіт");
        assert_eq!(request.voice.as_deref(), Some("Марта Мольфар"));
        assert_eq!(request.language.as_deref(), Some("uk-UA"));
        assert_eq!(request.speed, 1.2);
        assert_eq!(SpeechRequest::new("x").speed, 1.0);
    }
}
