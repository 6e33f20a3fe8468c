//! Логирование: отдельный файл на каждый запуск плюс вывод в консоль.
//!
//! Имя файла - `<log_name>_<YYYYmmdd_HHMMSS>.log` в папке `log_dir`.
//! Уровень задается через `RUST_LOG`, по умолчанию `info`.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter};

use crate::config::AppConfig;

/// Путь лог-файла для запуска, начатого в `started`
pub fn log_file_path(
    log_dir: &Path,
    log_name: &str,
    started: chrono::DateTime<chrono::Local>,
) -> PathBuf {
    log_dir.join(format!("{}_{}.log", log_name, started.format("%Y%m%d_%H%M%S")))
}

/// Инициализирует глобальный подписчик. Возвращенный guard нужно держать
/// до конца работы процесса, иначе хвост лога не будет записан.
pub fn init(config: &AppConfig) -> Result<(WorkerGuard, PathBuf)> {
    std::fs::create_dir_all(&config.log_dir).with_context(|| {
        format!("Failed to create log directory: {}", config.log_dir.display())
    })?;

    let path = log_file_path(&config.log_dir, &config.log_name, chrono::Local::now());
    let file_name = path
        .file_name()
        .context("Log file path has no file name")?
        .to_owned();

    let appender = tracing_appender::rolling::never(&config.log_dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Failed to create env filter")?;

    let console_layer = fmt::layer().with_target(false);
    let file_layer = fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!("Logging to {}", path.display());
    Ok((guard, path))
}
