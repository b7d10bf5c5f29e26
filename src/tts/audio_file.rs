use crate::error::{Error, Result};
use crate::logging::{log_debug, log_warning};
use std::path::PathBuf;

/// Сохраняет аудио во временный файл, который не удаляется автоматически
pub async fn write_temp_audio(audio: &[u8], suffix: &str) -> Result<PathBuf> {
    if audio.len() < 100 {
        log_warning(&format!("Получены подозрительно малые аудио данные: {} байт", audio.len()));
    }

    let (_, path) = tempfile::Builder::new()
        .prefix("dub_")
        .suffix(suffix)
        .tempfile()?
        .keep()
        .map_err(|e| Error::Io(e.error))?;

    tokio::fs::write(&path, audio).await?;
    log_debug(&format!("Аудио ({} байт) сохранено в {}", audio.len(), path.display()));

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_survives_and_has_suffix() {
        let path = write_temp_audio(b"RIFF0000WAVEfmt ", ".wav").await.unwrap();

        assert!(path.exists());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("wav"));
        assert_eq!(std::fs::read(&path).unwrap(), b"RIFF0000WAVEfmt ");

        std::fs::remove_file(path).unwrap();
    }
}
