use serde::{Deserialize, Serialize};
use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::currency::{CurrencyCode, LocaleConfig};
use crate::errors::EngineError;

const DEFAULT_DIR_NAME: &str = ".household_core";
const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";
const HOME_ENV: &str = "HOUSEHOLD_CORE_HOME";

/// Household policy knobs read by the engine and the report renderer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// How long before the due date a completion is accepted.
    pub early_completion_window_hours: i64,
    /// Rank rotation candidates by laziness-scaled scores instead of raw credit.
    pub order_by_scaled_score: bool,
    pub currency: CurrencyCode,
    pub locale: LocaleConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            early_completion_window_hours: 24,
            order_by_scaled_score: false,
            currency: CurrencyCode::default(),
            locale: LocaleConfig::default(),
        }
    }
}

/// Loads and stores `EngineConfig` as JSON.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Uses `$HOUSEHOLD_CORE_HOME/config.json`, defaulting to `~/.household_core`.
    pub fn new() -> Self {
        Self::with_path(app_data_dir().join(CONFIG_FILE))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Missing files yield the defaults.
    pub fn load(&self) -> Result<EngineConfig, EngineError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            tracing::debug!(path = %self.path.display(), "no config file, using defaults");
            Ok(EngineConfig::default())
        }
    }

    pub fn save(&self, config: &EngineConfig) -> Result<(), EngineError> {
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Application data directory, honouring the `HOUSEHOLD_CORE_HOME` override.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), EngineError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("absent.json"));
        assert_eq!(manager.load().unwrap(), EngineConfig::default());
    }

    #[test]
    fn save_then_load_preserves_policy() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("nested").join("config.json"));
        let config = EngineConfig {
            early_completion_window_hours: 6,
            order_by_scaled_score: true,
            currency: CurrencyCode::new("chf"),
            ..EngineConfig::default()
        };
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
        assert!(!tmp_path(manager.path()).exists());
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"order_by_scaled_score": true}"#).unwrap();
        let config = ConfigManager::with_path(&path).load().unwrap();
        assert!(config.order_by_scaled_score);
        assert_eq!(config.early_completion_window_hours, 24);
    }
}
