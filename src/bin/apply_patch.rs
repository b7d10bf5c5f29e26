use anyhow::Context;
use clap::Parser;
use dubbing_providers::patch::{self, PatchOutcome, PatchPlan};
use dubbing_providers::setup_logging;
use log::LevelFilter;
use std::path::PathBuf;

/// Встраивает DeepL, DeepLX, Google TTS и StyleTTS2-UA в исходник приложения
#[derive(Debug, Parser)]
#[command(name = "apply-patch", version)]
struct Args {
    /// Файл приложения, который нужно пропатчить
    #[arg(long, default_value = "app_rvc.py")]
    target: PathBuf,

    /// Вывести результат в stdout, не изменяя файл
    #[arg(long)]
    dry_run: bool,

    /// Подробный лог
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    setup_logging(if args.verbose { LevelFilter::Debug } else { LevelFilter::Info });

    let plan = PatchPlan::default();

    if args.dry_run {
        let content = std::fs::read_to_string(&args.target)
            .with_context(|| format!("не удалось прочитать {}", args.target.display()))?;
        match patch::apply(&content, &plan)? {
            PatchOutcome::Patched(patched) => print!("{}", patched),
            PatchOutcome::Unchanged => eprintln!("{}: изменений нет", args.target.display()),
        }
        return Ok(());
    }

    match patch::apply_file(&args.target, &plan)
        .with_context(|| format!("не удалось пропатчить {}", args.target.display()))?
    {
        PatchOutcome::Patched(_) => println!("✅ {} успешно пропатчен", args.target.display()),
        PatchOutcome::Unchanged => println!("{}: шаблоны не найдены или уже применены", args.target.display()),
    }
    Ok(())
}
