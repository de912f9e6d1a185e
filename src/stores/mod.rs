// SPDX-License-Identifier: GPL-3.0-only

//! Persistent and session state
//!
//! Small stores mirroring the app's user state: bookmark and favorite room
//! lists and the locale selection persist as JSON files under the data
//! directory; the room selection is session-only.

pub mod bookmarks;
pub mod favorites;
pub mod locale;
pub mod persisted;
pub mod selection;

pub use bookmarks::Bookmarks;
pub use favorites::Favorites;
pub use locale::LocaleStore;
pub use persisted::PersistedList;
pub use selection::Selection;
