use crate::error::Result;
use async_trait::async_trait;

mod deepl;
mod deeplx;

pub use deepl::{deepl_translate, DeepLTranslator};
pub use deeplx::{deeplx_translate, DeepLxTranslator};

/// Интерфейс для провайдеров перевода
#[async_trait]
pub trait Translator: Send + Sync {
    /// Имя провайдера, под которым он показывается в списке переводчиков
    fn name(&self) -> &str;

    /// Переводит текст. `source_lang` равный `None` или "auto" включает автоопределение
    async fn translate(&self, text: &str, source_lang: Option<&str>, target_lang: &str) -> Result<String>;
}
