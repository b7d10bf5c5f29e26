/// Значения, означающие автоопределение исходного языка
const AUTO_DETECT_MARKERS: [&str; 2] = ["auto", "automatic detection"];

/// Нормализует код языка.
///
/// Возвращает `None` для пустого значения и маркеров автоопределения,
/// иначе код в верхнем регистре без пробелов по краям.
pub fn normalize_language(code: Option<&str>) -> Option<String> {
    let code = code?.trim();
    if code.is_empty() {
        return None;
    }
    let lowered = code.to_lowercase();
    if AUTO_DETECT_MARKERS.contains(&lowered.as_str()) {
        return None;
    }
    Some(code.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unspecified_values() {
        assert_eq!(normalize_language(None), None);
        assert_eq!(normalize_language(Some("")), None);
        assert_eq!(normalize_language(Some("   ")), None);
        assert_eq!(normalize_language(Some("auto")), None);
        assert_eq!(normalize_language(Some("AUTO")), None);
        assert_eq!(normalize_language(Some("Automatic detection")), None);
    }

    #[test]
    fn test_upper_cases_codes() {
        assert_eq!(normalize_language(Some("es")).as_deref(), Some("ES"));
        assert_eq!(normalize_language(Some(" en-us ")).as_deref(), Some("EN-US"));
        assert_eq!(normalize_language(Some("PT-BR")).as_deref(), Some("PT-BR"));
    }

    #[test]
    fn test_case_insensitive() {
        for code in ["uk", "De", "zh-Hans", "Auto", "EN-gb"] {
            assert_eq!(
                normalize_language(Some(code)),
                normalize_language(Some(&code.to_lowercase()))
            );
        }
    }
}
