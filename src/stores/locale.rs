// SPDX-License-Identifier: GPL-3.0-only

//! Persisted locale selection
//!
//! Stores the active locale tag and rejects tags with no embedded catalog,
//! so a stale or hand-edited file can never select a language the app
//! cannot render.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::Config;
use crate::constants::{DEFAULT_LOCALE, LOCALE_FILE};
use crate::errors::StoreError;
use crate::i18n;

#[derive(Debug, Serialize, Deserialize)]
struct StoredLocale {
    locale: String,
}

#[derive(Debug)]
pub struct LocaleStore {
    path: PathBuf,
    locale: String,
}

impl LocaleStore {
    pub fn load(config: &Config) -> Result<Self, StoreError> {
        let dir = config.store_dir().ok_or(StoreError::NoDataDir)?;
        let path = dir.join(LOCALE_FILE);

        let stored = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<StoredLocale>(&raw) {
                Ok(stored) => Some(stored.locale),
                Err(e) => {
                    warn!(path = ?path, error = %e, "Ignoring unreadable locale file");
                    None
                }
            },
            Err(_) => None,
        };

        let locale = stored
            .filter(|tag| i18n::is_available(tag))
            .unwrap_or_else(|| {
                if i18n::is_available(&config.locale) {
                    config.locale.clone()
                } else {
                    DEFAULT_LOCALE.to_string()
                }
            });

        Ok(Self { path, locale })
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Switches the locale. Unknown tags are ignored, mirroring the setter
    /// in the deployed app. Returns whether the selection changed.
    pub fn set_locale(&mut self, tag: &str) -> bool {
        if !i18n::is_available(tag) {
            warn!(tag, "Ignoring unknown locale");
            return false;
        }
        if self.locale == tag {
            return false;
        }
        self.locale = tag.to_string();
        self.persist();
        true
    }

    fn persist(&self) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(path = ?self.path, error = %e, "Failed to create store directory");
                return;
            }
        }
        let stored = StoredLocale {
            locale: self.locale.clone(),
        };
        match serde_json::to_string(&stored) {
            Ok(raw) => {
                if let Err(e) = std::fs::write(&self.path, raw) {
                    warn!(path = ?self.path, error = %e, "Failed to persist locale");
                }
            }
            Err(e) => warn!(error = %e, "Failed to encode locale"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &std::path::Path) -> Config {
        Config {
            data_dir: Some(dir.to_path_buf()),
            ..Config::default()
        }
    }

    #[test]
    fn defaults_to_english() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocaleStore::load(&config_in(dir.path())).unwrap();
        assert_eq!(store.locale(), "en");
    }

    #[test]
    fn selection_persists_and_unknown_tags_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = LocaleStore::load(&config_in(dir.path())).unwrap();
            assert!(store.set_locale("uk"));
            assert!(!store.set_locale("tlh"));
        }
        let store = LocaleStore::load(&config_in(dir.path())).unwrap();
        assert_eq!(store.locale(), "uk");
    }

    #[test]
    fn stale_stored_tag_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(LOCALE_FILE),
            r#"{"locale":"removed-locale"}"#,
        )
        .unwrap();
        let store = LocaleStore::load(&config_in(dir.path())).unwrap();
        assert_eq!(store.locale(), "en");
    }
}
