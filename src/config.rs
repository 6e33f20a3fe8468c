//! Настройки сервиса

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

use crate::types::CleanOptions;

pub const CONFIG_ENV: &str = "LISTINGS_ML_CONFIG";
pub const LOG_DIR_ENV: &str = "LISTINGS_ML_LOG_DIR";
pub const ADDR_ENV: &str = "LISTINGS_ML_ADDR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Папка для логов, по файлу на запуск
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Префикс имени лог-файла
    #[serde(default = "default_log_name")]
    pub log_name: String,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// Опции очистки, если запрос их не задает
    #[serde(default)]
    pub clean: CleanOptions,
    #[serde(default = "default_folds")]
    pub folds: usize,
}

fn default_log_dir() -> PathBuf { PathBuf::from("logs") }
fn default_log_name() -> String { "listings_ml".to_string() }
fn default_bind_addr() -> SocketAddr { SocketAddr::from(([0, 0, 0, 0], 8000)) }
fn default_folds() -> usize { 3 }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            log_name: default_log_name(),
            bind_addr: default_bind_addr(),
            clean: CleanOptions::default(),
            folds: default_folds(),
        }
    }
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Файл из `LISTINGS_ML_CONFIG` (если задан), затем переменные окружения
    pub fn load() -> Result<Self> {
        let config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(LOG_DIR_ENV) {
            self.log_dir = PathBuf::from(dir);
        }
        if let Some(addr) = lookup(ADDR_ENV) {
            self.bind_addr = addr
                .parse()
                .with_context(|| format!("Invalid {ADDR_ENV}: {addr}"))?;
        }
        Ok(self)
    }
}
