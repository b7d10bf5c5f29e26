use env_logger::Builder;
use log::{debug, error, info, trace, warn, LevelFilter, Log};
use std::io::Write;
use std::sync::Once;

static INIT: Once = Once::new();

/// Максимальная длина снимка ответа в логах
const SNAPSHOT_LIMIT: usize = 512;

#[derive(Clone)]
pub struct TestLogger {
    level: LevelFilter,
}

impl TestLogger {
    pub fn new(level: LevelFilter) -> Self {
        Self { level }
    }
}

impl Log for TestLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            println!(
                "{} [{}] {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

/// Настраивает логирование для библиотеки
pub fn setup_logging(level: LevelFilter) {
    let mut builder = Builder::new();

    builder.filter_level(level);
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} [{}] - {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.args()
        )
    });

    // Повторная инициализация не считается ошибкой
    if builder.try_init().is_ok() {
        info!("Логирование настроено с уровнем: {}", level);
    }
}

/// Настраивает логирование для тестов
pub fn setup_test_logging(level: LevelFilter) {
    INIT.call_once(|| {
        if log::set_boxed_logger(Box::new(TestLogger::new(level))).is_ok() {
            log::set_max_level(level);
        }
    });
}

/// Логирует ошибку и возвращает её
pub fn log_error<T, E: std::fmt::Display>(err: E, message: &str) -> Result<T, crate::error::Error> {
    let error_message = format!("{}: {}", message, err);
    error!("{}", error_message);
    Err(crate::error::Error::Logged(error_message))
}

/// Логирует предупреждение
pub fn log_warning(message: &str) {
    warn!("{}", message);
}

/// Логирует информационное сообщение
pub fn log_info(message: &str) {
    info!("{}", message);
}

/// Логирует отладочное сообщение
pub fn log_debug(message: &str) {
    debug!("{}", message);
}

/// Логирует трассировочное сообщение
pub fn log_trace(message: &str) {
    trace!("{}", message);
}

/// Сокращенное представление JSON ответа для логов
pub fn payload_snapshot(payload: &serde_json::Value) -> String {
    let rendered = payload.to_string();
    if rendered.chars().count() <= SNAPSHOT_LIMIT {
        return rendered;
    }
    let mut truncated: String = rendered.chars().take(SNAPSHOT_LIMIT).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_log_error_returns_logged_error() {
        setup_test_logging(LevelFilter::Debug);

        let result: Result<(), _> = log_error("boom", "Запрос не удался");
        match result {
            Err(crate::error::Error::Logged(message)) => {
                assert_eq!(message, "Запрос не удался: boom");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_payload_snapshot_short() {
        let payload = json!({"data": "Bonjour"});
        assert_eq!(payload_snapshot(&payload), r#"{"data":"Bonjour"}"#);
    }

    #[test]
    fn test_payload_snapshot_truncates() {
        let payload = json!({ "data": "я".repeat(2000) });
        let snapshot = payload_snapshot(&payload);
        assert!(snapshot.ends_with("..."));
        assert_eq!(snapshot.chars().count(), SNAPSHOT_LIMIT + 3);
    }
}
