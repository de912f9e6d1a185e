// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for the navigation core
//!
//! This module provides command-line functionality for:
//! - Listing and searching rooms
//! - Running tag detection over a still image
//! - Managing the bookmark and favorite lists
//! - Switching the UI locale

use std::path::PathBuf;

use wayfinder::Config;
use wayfinder::data::{self, Room, RoomKind};
use wayfinder::detector::{DetectOutcome, TagWorker};
use wayfinder::i18n::Translator;
use wayfinder::stores::{Bookmarks, Favorites, LocaleStore};

/// List rooms, optionally limited to one floor or a search term.
pub fn list_rooms(
    floor: Option<i32>,
    search: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let translator = current_translator()?;

    let rooms: Vec<(&Room, i32)> = match (&search, floor) {
        (Some(term), _) => data::search(term)
            .into_iter()
            .filter(|(_, level)| floor.is_none_or(|f| *level == f))
            .collect(),
        (None, Some(level)) => {
            let Some(f) = data::floor(level) else {
                return Err(format!("No floor {level} in the building").into());
            };
            f.rooms.iter().map(|room| (room, level)).collect()
        }
        (None, None) => data::building()
            .iter()
            .flat_map(|f| f.rooms.iter().map(move |room| (room, f.level)))
            .collect(),
    };

    if rooms.is_empty() {
        if let Some(term) = &search {
            println!("{}", translator.translate("search.empty", &[("term", term)]));
        }
        return Ok(());
    }

    let mut last_level = None;
    for (room, level) in rooms {
        if last_level != Some(level) {
            println!(
                "{}",
                translator.translate("room.floor", &[("level", &level.to_string())])
            );
            last_level = Some(level);
        }

        let kind = translator.translate(&format!("room.kind.{}", kind_key(&room.kind)), &[]);
        let mut line = format!("  {:<6} {} ({})", room.id, room.name, kind);
        if let Some(nickname) = &room.nickname {
            line.push_str(&format!(" \"{nickname}\""));
        }
        if room.tag {
            line.push_str("  [tag]");
        }
        if room.panorama.is_some() {
            line.push_str("  [panorama]");
        }
        println!("{line}");
    }

    Ok(())
}

/// Run tag detection over a grayscale-converted image file and print the
/// detection records as JSON.
pub fn detect_image(image: PathBuf, pretty: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (pixels, width, height) = load_grayscale(&image)?;

    let rt = tokio::runtime::Runtime::new()?;
    let outcome = rt.block_on(async {
        let mut worker = TagWorker::spawn();
        if !worker.wait_ready().await {
            return Ok::<_, Box<dyn std::error::Error>>(DetectOutcome::NotReady);
        }
        Ok(worker.detect_frame(pixels, width, height).await?)
    })?;

    match outcome {
        DetectOutcome::NotReady => Err("Detector failed to start".into()),
        DetectOutcome::Failed => Err("Detection failed for this image".into()),
        DetectOutcome::Tags(tags) => {
            let json = if pretty {
                serde_json::to_string_pretty(&tags)?
            } else {
                serde_json::to_string(&tags)?
            };
            println!("{json}");
            Ok(())
        }
    }
}

/// Detect tags in an image and resolve them to rooms.
pub fn locate(image: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let translator = current_translator()?;
    let (pixels, width, height) = load_grayscale(&image)?;

    let rt = tokio::runtime::Runtime::new()?;
    let tags = rt.block_on(async {
        let mut worker = TagWorker::spawn();
        if !worker.wait_ready().await {
            return Err::<_, Box<dyn std::error::Error>>("Detector failed to start".into());
        }
        Ok(worker.detect(pixels, width, height).await)
    })?;

    if tags.is_empty() {
        println!("{}", translator.translate("detector.ready", &[]));
        return Ok(());
    }

    for tag in tags {
        match data::room_for_tag(tag.id) {
            Some((room, level)) => {
                let place = format!("{} ({})", room.name, room.id);
                println!(
                    "{} - {}",
                    translator.translate("detector.located", &[("room", &place)]),
                    translator.translate("room.floor", &[("level", &level.to_string())])
                );
            }
            None => {
                println!(
                    "{}",
                    translator
                        .translate("detector.unknown_tag", &[("id", &tag.id.to_string())])
                );
            }
        }
    }

    Ok(())
}

/// Action on a persisted room list.
pub enum ListAction {
    Add(String),
    Remove(String),
    List,
}

pub fn bookmark(action: ListAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();
    let mut bookmarks = Bookmarks::load(&config)?;

    match action {
        ListAction::Add(room_id) => {
            check_room(&room_id)?;
            if bookmarks.add(&room_id) {
                println!("Bookmarked {room_id}");
            } else {
                println!("{room_id} is already bookmarked");
            }
        }
        ListAction::Remove(room_id) => {
            if bookmarks.remove(&room_id) {
                println!("Removed bookmark for {room_id}");
            } else {
                println!("{room_id} was not bookmarked");
            }
        }
        ListAction::List => {
            for id in bookmarks.ids() {
                print_room_line(id);
            }
        }
    }

    Ok(())
}

pub fn favorite(action: ListAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();
    let mut favorites = Favorites::load(&config)?;

    match action {
        ListAction::Add(room_id) => {
            check_room(&room_id)?;
            if favorites.add(&room_id) {
                println!("Added {room_id} to favorites");
            } else {
                println!("{room_id} is already a favorite");
            }
        }
        ListAction::Remove(room_id) => {
            if favorites.remove(&room_id) {
                println!("Removed {room_id} from favorites");
            } else {
                println!("{room_id} was not a favorite");
            }
        }
        ListAction::List => {
            for id in favorites.ids() {
                print_room_line(id);
            }
        }
    }

    Ok(())
}

/// Show or change the stored locale.
pub fn locale(set: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();
    let mut store = LocaleStore::load(&config)?;

    match set {
        Some(tag) => {
            if store.set_locale(&tag) {
                println!("Locale set to {tag}");
            } else if store.locale() == tag {
                println!("Locale is already {tag}");
            } else {
                return Err(format!(
                    "Unknown locale '{tag}' (available: {})",
                    wayfinder::i18n::available_locales().join(", ")
                )
                .into());
            }
        }
        None => {
            println!("Current locale: {}", store.locale());
            println!(
                "Available: {}",
                wayfinder::i18n::available_locales().join(", ")
            );
        }
    }

    Ok(())
}

/// Translator for the currently stored locale.
fn current_translator() -> Result<Translator, Box<dyn std::error::Error>> {
    let config = Config::load();
    let store = LocaleStore::load(&config)?;
    Ok(Translator::new(store.locale()))
}

fn check_room(room_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    if data::room_by_id(room_id).is_none() {
        return Err(format!("No room '{room_id}' in the building").into());
    }
    Ok(())
}

fn print_room_line(id: &str) {
    match data::room_by_id(id) {
        Some((room, level)) => println!("  {:<6} {} (floor {level})", room.id, room.name),
        None => println!("  {id:<6} (no longer in the building data)"),
    }
}

fn kind_key(kind: &RoomKind) -> &'static str {
    match kind {
        RoomKind::Room => "room",
        RoomKind::Auditorium => "auditorium",
        RoomKind::Lab => "lab",
        RoomKind::Office => "office",
        RoomKind::Meeting => "meeting",
        RoomKind::Staircase => "staircase",
        RoomKind::Corridor => "corridor",
        RoomKind::Spacer => "spacer",
    }
}

/// Load an image file and convert it to a tight grayscale buffer.
fn load_grayscale(path: &PathBuf) -> Result<(Vec<u8>, u32, u32), Box<dyn std::error::Error>> {
    let img = image::open(path)?;
    let gray = img.to_luma8();
    let (width, height) = gray.dimensions();
    Ok((gray.into_raw(), width, height))
}
