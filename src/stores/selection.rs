// SPDX-License-Identifier: GPL-3.0-only

//! In-memory room selection
//!
//! Tracks which room detail view is open. Closing keeps the last selection
//! around so the view can animate out without losing its content.

#[derive(Debug, Default)]
pub struct Selection {
    selected: Option<String>,
    open: bool,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_room(&mut self, room_id: &str) {
        self.selected = Some(room_id.to_string());
        self.open = true;
    }

    pub fn close_room(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_keeps_the_selection() {
        let mut selection = Selection::new();
        selection.open_room("204");
        assert!(selection.is_open());

        selection.close_room();
        assert!(!selection.is_open());
        assert_eq!(selection.selected(), Some("204"));
    }
}
