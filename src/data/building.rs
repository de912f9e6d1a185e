// SPDX-License-Identifier: GPL-3.0-only

//! Per-floor room layout of the campus building
//!
//! The table is static configuration: rooms are axis-aligned cells on a
//! floor grid, a few carry a panorama and some carry a printed fiducial tag.
//! Tag ids are assigned in table order over the tagged rooms, which is how a
//! detection made by the [`crate::detector`] is anchored to a room.

use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// What a floor cell is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomKind {
    Room,
    Auditorium,
    Lab,
    Office,
    Meeting,
    Staircase,
    Corridor,
    Spacer,
}

/// One cell on a floor plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    pub kind: RoomKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Relative URL of a panorama image, when one was captured for the room.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panorama: Option<String>,
    /// Whether a fiducial tag is mounted at the room entrance.
    pub tag: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub level: i32,
    pub rooms: Vec<Room>,
}

fn room(id: &str, name: &str, kind: RoomKind, x: f32, y: f32, w: f32, h: f32) -> Room {
    Room {
        id: id.to_string(),
        name: name.to_string(),
        nickname: None,
        kind,
        x,
        y,
        width: w,
        height: h,
        panorama: None,
        tag: false,
    }
}

fn tagged(mut r: Room) -> Room {
    r.tag = true;
    r
}

fn with_panorama(mut r: Room, url: &str) -> Room {
    r.panorama = Some(url.to_string());
    r
}

static BUILDING: LazyLock<Vec<Floor>> = LazyLock::new(|| {
    use RoomKind::*;
    vec![
        Floor {
            level: 1,
            rooms: vec![
                tagged(with_panorama(
                    room("101", "101", Room, 1.0, 1.0, 2.0, 1.0),
                    "/panoramas/101/pano.jpg",
                )),
                room("102", "102", Room, 3.0, 1.0, 2.0, 1.0),
                room("103", "103", Room, 5.0, 1.0, 2.0, 1.0),
                room("104", "104", Room, 7.0, 1.0, 2.0, 1.0),
                room("105", "105", Room, 9.0, 1.0, 2.0, 1.0),
                room("106", "106", Room, 11.0, 1.0, 2.0, 1.0),
                room("c1", "Corridor", Corridor, 1.0, 2.0, 12.0, 1.0),
                room("107", "107", Room, 1.0, 3.0, 3.0, 1.0),
                room("108", "108", Room, 4.0, 3.0, 3.0, 1.0),
                room("109", "109", Auditorium, 7.0, 3.0, 6.0, 1.0),
                room("s1_up", "Stairs Up", Staircase, 3.0, 2.0, 1.0, 1.0),
            ],
        },
        Floor {
            level: 2,
            rooms: vec![
                room("c3", "Corridor", Corridor, 0.0, 0.0, 1.0, 20.0),
                // Right side
                room("319", "319", Room, 1.0, 0.0, 2.0, 3.0),
                room("321", "321", Room, 1.0, 3.0, 2.0, 2.0),
                room("floor2_staircase1", "STAIRS", Staircase, 1.0, 5.0, 2.0, 1.0),
                room("323", "323", Room, 1.0, 6.0, 2.0, 2.0),
                room("325", "325", Room, 1.0, 8.0, 2.0, 3.0),
                room("327", "327", Room, 1.0, 11.0, 2.0, 3.0),
                room("floor2_staircase2", "STAIRS", Staircase, 1.0, 14.0, 2.0, 1.0),
                tagged(room("329", "329", Room, 1.0, 15.0, 2.0, 2.0)),
                room("331", "331", Room, 1.0, 17.0, 2.0, 3.0),
                // Left side
                tagged(with_panorama(
                    room("312", "312", Room, -2.0, 0.0, 2.0, 3.0),
                    "/panoramas/312/pano.jpg",
                )),
                room("314", "314", Room, -2.0, 3.0, 2.0, 2.5),
                room("316", "316", Room, -2.0, 5.5, 2.0, 3.0),
                room("318", "318", Room, -2.0, 8.5, 2.0, 2.5),
                room("320", "320", Room, -2.0, 11.0, 2.0, 3.0),
                room("322", "322", Room, -2.0, 14.0, 2.0, 3.0),
                tagged(room("324", "324", Room, -2.0, 17.0, 2.0, 3.0)),
            ],
        },
        Floor {
            level: 3,
            rooms: vec![
                room("201", "201", Room, 1.0, 1.0, 2.0, 1.0),
                room("202", "202", Room, 3.0, 1.0, 2.0, 1.0),
                room("203", "203", Room, 5.0, 1.0, 2.0, 1.0),
                room("204", "204", Room, 7.0, 1.0, 2.0, 1.0),
                room("205", "205", Room, 9.0, 1.0, 2.0, 1.0),
                room("206", "206", Room, 11.0, 1.0, 2.0, 1.0),
                room("c2", "Corridor", Corridor, 1.0, 2.0, 12.0, 1.0),
                room("207", "207", Lab, 1.0, 3.0, 4.0, 1.0),
                room("208", "208", Lab, 5.0, 3.0, 4.0, 1.0),
                room("209", "209", Lab, 9.0, 3.0, 4.0, 1.0),
                room("s3_down", "Stairs Down", Staircase, 3.0, 2.0, 1.0, 1.0),
                room("s3_up", "Stairs Up", Staircase, 8.0, 2.0, 1.0, 1.0),
            ],
        },
        Floor {
            level: 4,
            rooms: vec![
                room("401", "401", Room, 1.0, 1.0, 2.0, 1.0),
                room("402", "402", Room, 3.0, 1.0, 2.0, 1.0),
                room("c4", "Corridor", Corridor, 1.0, 2.0, 4.0, 12.0),
                room("407", "407", Room, 5.0, 2.0, 1.0, 1.0),
            ],
        },
    ]
});

/// All floors, ordered by level.
pub fn building() -> &'static [Floor] {
    &BUILDING
}

/// Floor by level number.
pub fn floor(level: i32) -> Option<&'static Floor> {
    building().iter().find(|f| f.level == level)
}

/// First room matching the given id, with its floor level.
pub fn room_by_id(id: &str) -> Option<(&'static Room, i32)> {
    building()
        .iter()
        .flat_map(|f| f.rooms.iter().map(move |r| (r, f.level)))
        .find(|(r, _)| r.id == id)
}

/// Room anchored by a detected fiducial tag id.
///
/// Tag ids are assigned in table order over rooms with `tag` set, so the
/// mapping stays stable as long as tagged rooms are only appended.
pub fn room_for_tag(tag_id: u32) -> Option<(&'static Room, i32)> {
    building()
        .iter()
        .flat_map(|f| f.rooms.iter().map(move |r| (r, f.level)))
        .filter(|(r, _)| r.tag)
        .nth(tag_id as usize)
}

/// Case-insensitive room search over id, name and nickname.
pub fn search(term: &str) -> Vec<(&'static Room, i32)> {
    let needle = term.to_lowercase();
    building()
        .iter()
        .flat_map(|f| f.rooms.iter().map(move |r| (r, f.level)))
        .filter(|(r, _)| {
            r.id.to_lowercase().contains(&needle)
                || r.name.to_lowercase().contains(&needle)
                || r.nickname
                    .as_deref()
                    .is_some_and(|n| n.to_lowercase().contains(&needle))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_floors_in_order() {
        let floors = building();
        assert_eq!(floors.len(), 4);
        assert_eq!(
            floors.iter().map(|f| f.level).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn tag_ids_follow_table_order() {
        // 101 carries the first mounted tag, then floor 2 right side, left side.
        assert_eq!(room_for_tag(0).unwrap().0.id, "101");
        assert_eq!(room_for_tag(1).unwrap().0.id, "329");
        assert_eq!(room_for_tag(2).unwrap().0.id, "312");
        assert_eq!(room_for_tag(3).unwrap().0.id, "324");
        assert!(room_for_tag(4).is_none());
    }

    #[test]
    fn room_lookup_reports_floor() {
        let (room, level) = room_by_id("207").unwrap();
        assert_eq!(room.kind, RoomKind::Lab);
        assert_eq!(level, 3);
        assert!(room_by_id("no-such-room").is_none());
    }

    #[test]
    fn search_is_case_insensitive() {
        let hits = search("corridor");
        assert!(hits.len() >= 4);
        assert!(hits.iter().all(|(r, _)| r.kind == RoomKind::Corridor));
    }
}
