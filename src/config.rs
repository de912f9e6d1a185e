// SPDX-License-Identifier: GPL-3.0-only

//! User configuration handling
//!
//! Configuration is a small JSON file under the platform config directory.
//! Missing or unreadable files fall back to defaults; saving creates the
//! directory on demand.

use crate::constants::{APP_ID, DEFAULT_LOCALE};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Locale tag used when the locale store holds no selection
    pub locale: String,
    /// Override for the store data directory (mainly for kiosks/tests)
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            data_dir: None,
        }
    }
}

impl Config {
    /// Path of the config file, if a config directory can be resolved.
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_ID).join("config.json"))
    }

    /// Load the configuration, falling back to defaults on any failure.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = ?path, error = %e, "Ignoring unreadable config");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Persist the configuration as pretty-printed JSON.
    pub fn save(&self) -> AppResult<()> {
        let path =
            Self::path().ok_or_else(|| AppError::Config("no config directory".to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Config(e.to_string()))?;
        }
        let raw = serde_json::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(&path, raw).map_err(|e| AppError::Config(e.to_string()))?;
        Ok(())
    }

    /// Directory where the persisted stores live.
    pub fn store_dir(&self) -> Option<PathBuf> {
        match &self.data_dir {
            Some(dir) => Some(dir.clone()),
            None => dirs::data_dir().map(|d| d.join(APP_ID)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_json() {
        let config = Config::default();
        let raw = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&raw).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.locale, DEFAULT_LOCALE);
        assert!(config.data_dir.is_none());
    }
}
