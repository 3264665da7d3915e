use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::{
    core::utils::{ensure_dir, PathResolver},
    currency::{CurrencyCode, FormatOptions, LocaleConfig},
    ledger::WriteMode,
    storage::write_atomic,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub locale: LocaleConfig,
    pub currency: CurrencyCode,
    #[serde(skip_serializing_if = "is_default_format")]
    pub format: FormatOptions,
    pub ledger_file: PathBuf,
    pub categories_file: PathBuf,
    pub users_file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings_goal: Option<Decimal>,
    pub write_mode: WriteMode,
}

fn is_default_format(value: &FormatOptions) -> bool {
    value == &FormatOptions::default()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: LocaleConfig::default(),
            currency: CurrencyCode::default(),
            format: FormatOptions::default(),
            ledger_file: PathBuf::from("ledger.csv"),
            categories_file: PathBuf::from("categories.csv"),
            users_file: PathBuf::from("users.json"),
            savings_goal: None,
            write_mode: WriteMode::default(),
        }
    }
}

/// Loads and stores [`Config`] under `<data dir>/config/config.json`.
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_base_dir(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        ensure_dir(&base)?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
            base,
        })
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, json.as_bytes())?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    /// Absolute location of a data file named in the config.
    pub fn data_path(&self, file: &Path) -> PathBuf {
        PathResolver::data_file_in(&self.base, file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.currency.as_str(), "BRL");
        assert_eq!(config.write_mode, WriteMode::Optimistic);
        assert_eq!(
            manager.data_path(&config.ledger_file),
            dir.path().join("ledger.csv")
        );
    }

    #[test]
    fn save_round_trips_and_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = Config {
            savings_goal: Some(Decimal::new(30000, 0)),
            write_mode: WriteMode::LastWriteWins,
            ..Config::default()
        };
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);

        let raw = fs::read_to_string(manager.path()).unwrap();
        assert!(raw.contains("\"last_write_wins\""));
        assert!(!manager.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn partial_file_fills_remaining_fields() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        ensure_dir(manager.path().parent().unwrap()).unwrap();
        fs::write(manager.path(), r#"{ "currency": "USD" }"#).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.currency, CurrencyCode::new("USD"));
        assert_eq!(config.locale, LocaleConfig::default());
    }
}
