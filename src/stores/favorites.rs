// SPDX-License-Identifier: GPL-3.0-only

//! Favorite rooms

use crate::config::Config;
use crate::constants::FAVORITES_FILE;
use crate::errors::StoreError;
use crate::stores::persisted::PersistedList;

/// The user's favorite room ids. Same persistence behavior as
/// [`crate::stores::Bookmarks`], kept in a separate file.
#[derive(Debug)]
pub struct Favorites {
    list: PersistedList,
}

impl Favorites {
    pub fn load(config: &Config) -> Result<Self, StoreError> {
        let dir = config.store_dir().ok_or(StoreError::NoDataDir)?;
        Ok(Self {
            list: PersistedList::open(&dir, FAVORITES_FILE),
        })
    }

    pub fn ids(&self) -> &[String] {
        self.list.items()
    }

    pub fn is_favorite(&self, room_id: &str) -> bool {
        self.list.contains(room_id)
    }

    pub fn add(&mut self, room_id: &str) -> bool {
        self.list.add(room_id)
    }

    pub fn remove(&mut self, room_id: &str) -> bool {
        self.list.remove(room_id)
    }

    /// Returns whether the room is a favorite after the flip.
    pub fn toggle(&mut self, room_id: &str) -> bool {
        self.list.toggle(room_id)
    }
}
