// SPDX-License-Identifier: GPL-3.0-only

//! Persistent string-list store
//!
//! A list of room ids stored as a JSON array in one file. Loading tolerates
//! missing or corrupt files (they become an empty list, with a warning);
//! every mutation writes straight back to disk, best effort.

use std::path::{Path, PathBuf};

use tracing::warn;

/// A persisted, duplicate-free list of string ids. Order of insertion is
/// preserved.
#[derive(Debug)]
pub struct PersistedList {
    path: PathBuf,
    items: Vec<String>,
}

impl PersistedList {
    /// Opens the list stored in `dir/file`, creating an empty one when
    /// nothing is stored yet.
    pub fn open(dir: &Path, file: &str) -> Self {
        let path = dir.join(file);
        let items = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(items) => items,
                Err(e) => {
                    warn!(path = ?path, error = %e, "Ignoring unreadable store file");
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };
        Self { path, items }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item == id)
    }

    /// Appends `id` unless already present. Returns whether the list changed.
    pub fn add(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.items.push(id.to_string());
        self.persist();
        true
    }

    /// Removes `id`. Returns whether the list changed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item != id);
        if self.items.len() == before {
            return false;
        }
        self.persist();
        true
    }

    /// Flips membership of `id` and returns the new state.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.contains(id) {
            self.remove(id);
            false
        } else {
            self.add(id);
            true
        }
    }

    fn persist(&self) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(path = ?self.path, error = %e, "Failed to create store directory");
                return;
            }
        }
        match serde_json::to_string(&self.items) {
            Ok(raw) => {
                if let Err(e) = std::fs::write(&self.path, raw) {
                    warn!(path = ?self.path, error = %e, "Failed to persist store");
                }
            }
            Err(e) => warn!(error = %e, "Failed to encode store"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_idempotent_and_ordered() {
        let dir = tempfile::tempdir().unwrap();
        let mut list = PersistedList::open(dir.path(), "list.json");

        assert!(list.add("329"));
        assert!(list.add("101"));
        assert!(!list.add("329"));
        assert_eq!(list.items(), ["329", "101"]);
    }

    #[test]
    fn mutations_survive_a_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut list = PersistedList::open(dir.path(), "list.json");
            list.add("312");
            list.toggle("324");
            list.toggle("312");
        }
        let list = PersistedList::open(dir.path(), "list.json");
        assert_eq!(list.items(), ["324"]);
    }

    #[test]
    fn corrupt_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("list.json"), "{not json").unwrap();
        let list = PersistedList::open(dir.path(), "list.json");
        assert!(list.items().is_empty());
    }
}
