//! Дополнительные провайдеры перевода и синтеза речи для конвейера дубляжа видео.
//!
//! Переводчики: DeepL и DeepLX. TTS движки: Google Cloud TTS, StyleTTS2-UA и
//! VibeVoice. Все провайдеры доступны по имени через [`ProviderRegistry`].

pub mod error;
pub mod config;
pub mod language;
pub mod translate;
pub mod tts;
pub mod registry;
pub mod patch;
pub mod logging;

pub use error::{Error, Result, ErrorType};
pub use logging::{
    setup_logging, setup_test_logging, log_error, log_warning, log_info, log_debug, log_trace
};
pub use config::ProviderConfig;
pub use language::normalize_language;
pub use translate::{Translator, DeepLTranslator, DeepLxTranslator, deepl_translate, deeplx_translate};
pub use tts::{
    TtsProvider, SpeechRequest, GoogleCloudTts, GoogleTtsEngine, GoogleVoice, SsmlGender,
    GoogleClientRegistry, StyleTts2Tts, VibeVoiceTts, VibeVoiceOptions, VoiceCatalog,
    google_tts, google_cloud_synthesize, google_cloud_available_voices,
    styletts2_ua_tts, styletts2_synthesize, styletts2_available_voices,
    vibevoice_synthesize, vibevoice_available_voices,
};
pub use registry::ProviderRegistry;
pub use patch::{PatchPlan, PatchOutcome, ProviderGroup};

/// HTTP клиент с фиксированным таймаутом
pub(crate) fn http_client(timeout: std::time::Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            log_warning(&format!("Не удалось настроить HTTP клиент, используется клиент по умолчанию: {}", e));
            reqwest::Client::new()
        })
}
