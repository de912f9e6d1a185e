// SPDX-License-Identifier: GPL-3.0-only

//! Bookmarked rooms

use crate::config::Config;
use crate::constants::BOOKMARKS_FILE;
use crate::errors::StoreError;
use crate::stores::persisted::PersistedList;

/// The user's bookmarked room ids.
#[derive(Debug)]
pub struct Bookmarks {
    list: PersistedList,
}

impl Bookmarks {
    pub fn load(config: &Config) -> Result<Self, StoreError> {
        let dir = config.store_dir().ok_or(StoreError::NoDataDir)?;
        Ok(Self {
            list: PersistedList::open(&dir, BOOKMARKS_FILE),
        })
    }

    pub fn ids(&self) -> &[String] {
        self.list.items()
    }

    pub fn is_bookmarked(&self, room_id: &str) -> bool {
        self.list.contains(room_id)
    }

    pub fn add(&mut self, room_id: &str) -> bool {
        self.list.add(room_id)
    }

    pub fn remove(&mut self, room_id: &str) -> bool {
        self.list.remove(room_id)
    }

    /// Returns whether the room is bookmarked after the flip.
    pub fn toggle(&mut self, room_id: &str) -> bool {
        self.list.toggle(room_id)
    }
}
