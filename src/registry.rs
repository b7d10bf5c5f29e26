use crate::config::ProviderConfig;
use crate::error::{Error, ErrorType, Result};
use crate::logging::{log_debug, log_warning};
use crate::translate::{DeepLTranslator, DeepLxTranslator, Translator};
use crate::tts::{GoogleTtsEngine, SpeechRequest, StyleTts2Tts, TtsProvider, VibeVoiceTts};
use std::path::PathBuf;
use std::sync::Arc;

/// Реестр провайдеров, через который приложение выбирает переводчик и TTS движок по имени.
///
/// Порядок регистрации сохраняется и совпадает с порядком в списках интерфейса.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    translators: Vec<Arc<dyn Translator>>,
    tts_engines: Vec<Arc<dyn TtsProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Реестр со всеми встроенными провайдерами.
    ///
    /// Gradio сервис с пустым адресом пропускается с предупреждением.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let mut registry = Self::new();
        registry.register_translator(Arc::new(DeepLTranslator::from_config(config)))?;
        registry.register_translator(Arc::new(DeepLxTranslator::from_config(config)))?;
        registry.register_tts_engine(Arc::new(GoogleTtsEngine::from_config(config)))?;

        match StyleTts2Tts::from_config(config) {
            Ok(engine) => registry.register_tts_engine(Arc::new(engine))?,
            Err(e) => log_warning(&format!("StyleTTS2-UA не зарегистрирован: {}", e)),
        }
        match VibeVoiceTts::from_config(config) {
            Ok(engine) => registry.register_tts_engine(Arc::new(engine))?,
            Err(e) => log_warning(&format!("VibeVoice не зарегистрирован: {}", e)),
        }

        Ok(registry)
    }

    /// Добавляет переводчик; повторное имя считается ошибкой
    pub fn register_translator(&mut self, translator: Arc<dyn Translator>) -> Result<()> {
        if self.translator(translator.name()).is_some() {
            return Err(duplicate(translator.name()));
        }
        log_debug(&format!("Зарегистрирован переводчик {}", translator.name()));
        self.translators.push(translator);
        Ok(())
    }

    /// Добавляет TTS движок; повторное имя считается ошибкой
    pub fn register_tts_engine(&mut self, engine: Arc<dyn TtsProvider>) -> Result<()> {
        if self.tts_engine(engine.name()).is_some() {
            return Err(duplicate(engine.name()));
        }
        log_debug(&format!("Зарегистрирован TTS движок {}", engine.name()));
        self.tts_engines.push(engine);
        Ok(())
    }

    pub fn translator_names(&self) -> Vec<&str> {
        self.translators.iter().map(|t| t.name()).collect()
    }

    pub fn tts_engine_names(&self) -> Vec<&str> {
        self.tts_engines.iter().map(|e| e.name()).collect()
    }

    pub fn translator(&self, name: &str) -> Option<Arc<dyn Translator>> {
        self.translators.iter().find(|t| t.name() == name).cloned()
    }

    pub fn tts_engine(&self, name: &str) -> Option<Arc<dyn TtsProvider>> {
        self.tts_engines.iter().find(|e| e.name() == name).cloned()
    }

    /// Переводит текст выбранным переводчиком
    pub async fn translate(
        &self,
        name: &str,
        text: &str,
        source_lang: Option<&str>,
        target_lang: &str,
    ) -> Result<String> {
        let translator = self
            .translator(name)
            .ok_or_else(|| unknown("переводчик", name))?;
        translator.translate(text, source_lang, target_lang).await
    }

    /// Синтезирует речь выбранным движком
    pub async fn synthesize(&self, name: &str, request: &SpeechRequest) -> Result<PathBuf> {
        let engine = self.tts_engine(name).ok_or_else(|| unknown("TTS движок", name))?;
        engine.synthesize(request).await
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("translators", &self.translator_names())
            .field("tts_engines", &self.tts_engine_names())
            .finish()
    }
}

fn duplicate(name: &str) -> Error {
    Error::new(ErrorType::Validation, &format!("провайдер уже зарегистрирован: {}", name))
}

fn unknown(kind: &str, name: &str) -> Error {
    Error::new(ErrorType::Validation, &format!("неизвестный {}: {}", kind, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_providers_in_order() {
        let registry = ProviderRegistry::from_config(&ProviderConfig::default()).unwrap();
        assert_eq!(registry.translator_names(), vec!["DeepL", "DeepLX"]);
        assert_eq!(
            registry.tts_engine_names(),
            vec!["Google TTS", "StyleTTS2-UA", "VibeVoice"]
        );
    }

    #[test]
    fn test_blank_gradio_url_skips_engine() {
        let config = ProviderConfig {
            vibevoice_url: " ".to_string(),
            ..ProviderConfig::default()
        };
        let registry = ProviderRegistry::from_config(&config).unwrap();
        assert_eq!(registry.tts_engine_names(), vec!["Google TTS", "StyleTTS2-UA"]);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let config = ProviderConfig::default();
        let mut registry = ProviderRegistry::from_config(&config).unwrap();
        let result = registry.register_translator(Arc::new(DeepLTranslator::from_config(&config)));
        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(registry.translator_names().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_provider() {
        let registry = ProviderRegistry::new();
        assert!(matches!(
            registry.translate("Yandex", "Hi", None, "uk").await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            registry.synthesize("Silero", &SpeechRequest::new("Hi")).await,
            Err(Error::Validation(_))
        ));
    }
}
