use thiserror::Error;

/// Категории ошибок адаптеров
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    /// Не задан ключ, URL или файл учетных данных
    Configuration,
    /// Ответ сервиса не совпал ни с одной ожидаемой структурой
    UnexpectedResponse,
    /// Неподдерживаемый голос, язык или имя провайдера
    Validation,
    /// Ошибка получения OAuth токена
    Auth,
    /// Ошибка ввода/вывода
    Io,
}

/// Ошибки, которые могут возникнуть при обращении к провайдерам
#[derive(Debug, Error)]
pub enum Error {
    #[error("Ошибка конфигурации: {0}")]
    Configuration(String),

    #[error("Ошибка HTTP запроса: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Неожиданная структура ответа: {0}")]
    UnexpectedResponse(String),

    #[error("Неверные параметры: {0}")]
    Validation(String),

    #[error("Ошибка авторизации: {0}")]
    Auth(String),

    #[error("Ошибка ввода/вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка сериализации JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Logged(String),
}

impl Error {
    /// Создает новую ошибку указанного типа с сообщением
    pub fn new(error_type: ErrorType, message: &str) -> Self {
        match error_type {
            ErrorType::Configuration => Self::Configuration(message.to_string()),
            ErrorType::UnexpectedResponse => Self::UnexpectedResponse(message.to_string()),
            ErrorType::Validation => Self::Validation(message.to_string()),
            ErrorType::Auth => Self::Auth(message.to_string()),
            ErrorType::Io => Self::Io(std::io::Error::new(std::io::ErrorKind::Other, message)),
        }
    }

    /// Возвращает категорию ошибки, если она однозначна
    pub fn error_type(&self) -> Option<ErrorType> {
        match self {
            Self::Configuration(_) => Some(ErrorType::Configuration),
            Self::UnexpectedResponse(_) => Some(ErrorType::UnexpectedResponse),
            Self::Validation(_) => Some(ErrorType::Validation),
            Self::Auth(_) => Some(ErrorType::Auth),
            Self::Io(_) => Some(ErrorType::Io),
            Self::Http(_) | Self::Json(_) | Self::Logged(_) => None,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Auth(err.to_string())
    }
}

/// Результат с обработкой ошибок
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_maps_to_variant() {
        assert!(matches!(
            Error::new(ErrorType::Configuration, "DEEPL_API_KEY"),
            Error::Configuration(_)
        ));
        assert!(matches!(
            Error::new(ErrorType::Validation, "voice"),
            Error::Validation(_)
        ));
        assert_eq!(
            Error::new(ErrorType::UnexpectedResponse, "x").error_type(),
            Some(ErrorType::UnexpectedResponse)
        );
        assert_eq!(Error::Logged("x".into()).error_type(), None);
    }
}
