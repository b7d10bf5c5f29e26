//! Встраивание новых провайдеров в исходник основного приложения.
//!
//! Патч текстовый: добавляет импорты, новые имена в списки переводчиков и TTS
//! движков и ветки `elif` после существующих. Группа провайдеров применяется
//! целиком: если для нее не найден список или ветка `elif`, группа
//! пропускается. Если не применилась ни одна группа, файл остается
//! нетронутым. Повторный запуск ничего не меняет.

use crate::error::{Error, ErrorType, Result};
use crate::logging::{log_debug, log_info, log_warning};
use regex::{Captures, Regex};
use std::path::Path;

/// Группа провайдеров, встраиваемая рядом с уже существующим
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderGroup {
    /// Имя списка в приложении, например `TRANSLATORS`
    pub list_name: String,
    /// Переменная, по которой ветвится выбор провайдера
    pub selector: String,
    /// Существующий провайдер, после которого вставляются новые
    pub anchor: String,
    /// Новые имена для списка
    pub entries: Vec<String>,
    /// Ветки `elif`, вставляемые после ветки `anchor`
    pub branch_block: String,
}

impl ProviderGroup {
    fn branch_marker(&self) -> Option<String> {
        self.entries
            .first()
            .map(|entry| format!("{} == \"{}\"", self.selector, entry))
    }

    fn list_marker(&self) -> Option<String> {
        self.entries.first().map(|entry| format!("\"{}\"", entry))
    }
}

/// Набор изменений для исходника приложения
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchPlan {
    /// Строки импорта, вставляемые после последнего импорта верхнего уровня
    pub import_block: String,
    pub groups: Vec<ProviderGroup>,
}

impl Default for PatchPlan {
    fn default() -> Self {
        Self {
            import_block: [
                "",
                "# === CUSTOM PROVIDERS ===",
                "from custom_translators import deepl_translate, deeplx_translate",
                "from custom_tts import google_tts, styletts2_ua_tts",
                "# ========================",
            ]
            .join("\n"),
            groups: vec![
                ProviderGroup {
                    list_name: "TRANSLATORS".to_string(),
                    selector: "translator".to_string(),
                    anchor: "Google Translate".to_string(),
                    entries: vec!["DeepL".to_string(), "DeepLX".to_string()],
                    branch_block: [
                        "",
                        "        elif translator == \"DeepL\":",
                        "            translated_text = deepl_translate(text_to_translate, source_lang, target_lang)",
                        "        elif translator == \"DeepLX\":",
                        "            translated_text = deeplx_translate(text_to_translate, source_lang, target_lang)",
                    ]
                    .join("\n"),
                },
                ProviderGroup {
                    list_name: "TTS_ENGINES".to_string(),
                    selector: "tts_engine".to_string(),
                    anchor: "Edge TTS".to_string(),
                    entries: vec!["Google TTS".to_string(), "StyleTTS2-UA".to_string()],
                    branch_block: [
                        "",
                        "        elif tts_engine == \"Google TTS\":",
                        "            audio_path = google_tts(translated_text, lang=target_lang)",
                        "        elif tts_engine == \"StyleTTS2-UA\":",
                        "            audio_path = styletts2_ua_tts(translated_text, voice_name=\"Інна Гелевера\")",
                    ]
                    .join("\n"),
                },
            ],
        }
    }
}

/// Результат применения патча
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    Patched(String),
    Unchanged,
}

impl PatchOutcome {
    pub fn is_patched(&self) -> bool {
        matches!(self, Self::Patched(_))
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::new(ErrorType::Validation, &format!("некорректный шаблон патча: {}", e)))
}

/// Результат одной подстановки внутри группы
#[derive(Debug, Clone, PartialEq, Eq)]
struct Substitution {
    content: String,
    /// Сколько мест изменено
    applied: usize,
    /// Изменение уже есть в тексте после прошлого запуска
    present: bool,
}

impl Substitution {
    fn unchanged(content: &str, present: bool) -> Self {
        Self {
            content: content.to_string(),
            applied: 0,
            present,
        }
    }

    /// Подстановка либо сделана, либо уже была сделана раньше
    fn is_satisfied(&self) -> bool {
        self.applied > 0 || self.present
    }
}

/// Дописывает новые имена в список после `anchor`
fn extend_list(content: &str, group: &ProviderGroup) -> Result<Substitution> {
    let Some(marker) = group.list_marker() else {
        return Ok(Substitution::unchanged(content, false));
    };

    let pattern = format!(
        r#"({}\s*=\s*\[[^\]]*")({})"([^\]]*\])"#,
        regex::escape(&group.list_name),
        regex::escape(&group.anchor)
    );
    let additions: String = group.entries.iter().map(|e| format!(", \"{}\"", e)).collect();

    let mut applied = 0;
    let mut present = false;
    let patched = compile(&pattern)?.replace_all(content, |caps: &Captures| {
        if caps[0].contains(&marker) {
            present = true;
            return caps[0].to_string();
        }
        applied += 1;
        format!("{}{}\"{}{}", &caps[1], &caps[2], additions, &caps[3])
    });
    Ok(Substitution {
        content: patched.into_owned(),
        applied,
        present,
    })
}

/// Вставляет ветки `elif` перед следующим `elif`/`else`/`if` после ветки `anchor`
fn insert_branches(content: &str, group: &ProviderGroup) -> Result<Substitution> {
    let Some(marker) = group.branch_marker() else {
        return Ok(Substitution::unchanged(content, false));
    };
    if content.contains(&marker) {
        return Ok(Substitution::unchanged(content, true));
    }

    let pattern = format!(
        r#"(?s)(elif {} == "{}":.*?)(\s+elif|\s+else|\s+if)"#,
        regex::escape(&group.selector),
        regex::escape(&group.anchor)
    );

    let mut applied = 0;
    let patched = compile(&pattern)?.replace_all(content, |caps: &Captures| {
        applied += 1;
        format!("{}{}{}", &caps[1], group.branch_block, &caps[2])
    });
    Ok(Substitution {
        content: patched.into_owned(),
        applied,
        present: false,
    })
}

/// Применяет группу целиком: и список, и ветки, либо ничего
fn apply_group(content: &str, group: &ProviderGroup) -> Result<Option<(String, usize)>> {
    let list = extend_list(content, group)?;
    let branches = insert_branches(&list.content, group)?;

    log_debug(&format!(
        "{}: обновлено списков {}, вставлено блоков веток {}",
        group.list_name, list.applied, branches.applied
    ));

    if !list.is_satisfied() || !branches.is_satisfied() {
        log_warning(&format!(
            "{}: {} не найден, группа пропущена",
            group.list_name,
            if list.is_satisfied() { "шаблон ветки elif" } else { "список" }
        ));
        return Ok(None);
    }

    let changed = list.applied + branches.applied;
    if changed == 0 {
        log_debug(&format!("{}: изменения уже применены", group.list_name));
        return Ok(None);
    }
    Ok(Some((branches.content, changed)))
}

/// Вставляет блок импортов после последней строки `import`/`from` верхнего уровня
fn insert_imports(content: &str, import_block: &str) -> String {
    let mut lines: Vec<&str> = content.lines().collect();
    let last_import = lines
        .iter()
        .rposition(|line| line.starts_with("import ") || line.starts_with("from "))
        .unwrap_or(0);

    let at = (last_import + 1).min(lines.len());
    lines.insert(at, import_block);

    let mut patched = lines.join("\n");
    if content.ends_with('\n') {
        patched.push('\n');
    }
    patched
}

/// Применяет план к тексту исходника
pub fn apply(content: &str, plan: &PatchPlan) -> Result<PatchOutcome> {
    let mut patched = content.to_string();
    let mut total = 0;

    for group in &plan.groups {
        if let Some((next, changed)) = apply_group(&patched, group)? {
            total += changed;
            patched = next;
        }
    }

    if total == 0 {
        return Ok(PatchOutcome::Unchanged);
    }

    Ok(PatchOutcome::Patched(insert_imports(&patched, &plan.import_block)))
}

/// Применяет план к файлу; файл перезаписывается только при изменениях
pub fn apply_file<P: AsRef<Path>>(path: P, plan: &PatchPlan) -> Result<PatchOutcome> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let outcome = apply(&content, plan)?;

    match &outcome {
        PatchOutcome::Patched(patched) => {
            std::fs::write(path, patched)?;
            log_info(&format!("{} успешно пропатчен", path.display()));
        }
        PatchOutcome::Unchanged => {
            log_info(&format!("{} не изменен", path.display()));
        }
    }
    Ok(outcome)
}
