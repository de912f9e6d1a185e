// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the persisted stores

use wayfinder::Config;
use wayfinder::stores::{Bookmarks, Favorites, LocaleStore};

fn config_in(dir: &std::path::Path) -> Config {
    Config {
        data_dir: Some(dir.to_path_buf()),
        ..Config::default()
    }
}

#[test]
fn bookmarks_and_favorites_are_independent_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    {
        let mut bookmarks = Bookmarks::load(&config).unwrap();
        let mut favorites = Favorites::load(&config).unwrap();
        bookmarks.add("101");
        favorites.add("329");
    }

    let bookmarks = Bookmarks::load(&config).unwrap();
    let favorites = Favorites::load(&config).unwrap();
    assert!(bookmarks.is_bookmarked("101"));
    assert!(!bookmarks.is_bookmarked("329"));
    assert!(favorites.is_favorite("329"));
    assert!(!favorites.is_favorite("101"));
}

#[test]
fn toggle_reports_the_new_membership() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let mut bookmarks = Bookmarks::load(&config).unwrap();

    assert!(bookmarks.toggle("312"));
    assert!(!bookmarks.toggle("312"));
    assert!(!bookmarks.is_bookmarked("312"));
}

#[test]
fn corrupt_store_file_degrades_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("bookmarks.json"), "][").unwrap();

    let config = config_in(dir.path());
    let mut bookmarks = Bookmarks::load(&config).unwrap();
    assert!(bookmarks.ids().is_empty());

    // The store heals itself on the next write.
    bookmarks.add("324");
    let reloaded = Bookmarks::load(&config).unwrap();
    assert_eq!(reloaded.ids(), ["324"]);
}

#[test]
fn locale_selection_round_trips_with_the_other_stores() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    {
        let mut locale = LocaleStore::load(&config).unwrap();
        assert!(locale.set_locale("uk"));
    }

    let locale = LocaleStore::load(&config).unwrap();
    assert_eq!(locale.locale(), "uk");
}
