// SPDX-License-Identifier: GPL-3.0-only

//! Static campus data tables

pub mod building;

pub use building::{Floor, Room, RoomKind, building, floor, room_by_id, room_for_tag, search};
