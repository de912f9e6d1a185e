// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Application identifier used for config and data directories.
pub const APP_ID: &str = "wayfinder";

/// File name of the persisted bookmark list.
pub const BOOKMARKS_FILE: &str = "bookmarks.json";

/// File name of the persisted favorite list.
pub const FAVORITES_FILE: &str = "favorites.json";

/// File name of the persisted locale selection.
pub const LOCALE_FILE: &str = "locale.json";

/// Locale used when no selection is stored or the stored tag is unknown.
pub const DEFAULT_LOCALE: &str = "en";

/// Fixed detector configuration passed to the module once at startup.
///
/// The binding never reconfigures the module after initialization; these
/// mirror the values the deployed app ships with.
pub mod detector_defaults {
    /// Input downsampling factor before quad extraction.
    pub const QUAD_DECIMATE: f32 = 2.0;
    /// Pre-detection blur sigma; 0.0 disables blurring.
    pub const QUAD_SIGMA: f32 = 0.0;
    /// Worker thread count inside the module.
    pub const NTHREADS: u32 = 1;
    /// Whether detected quad edges are refined against the image gradient.
    pub const REFINE_EDGES: bool = true;
    /// Cap on detections per frame; 0 means unlimited.
    pub const MAX_DETECTIONS: u32 = 0;
    /// Whether a pose estimate is computed per detection.
    pub const RETURN_POSE: bool = true;
    /// Whether the alternative pose solution is included in the result.
    pub const RETURN_SOLUTIONS: bool = true;
}

/// Tag family geometry: modules per marker side, including the black border.
pub const TAG_GRID_SIZE: usize = 7;

/// Bits per side of the inner code grid.
pub const TAG_CODE_SIZE: usize = TAG_GRID_SIZE - 2;

/// Maximum per-marker Hamming distance accepted during decoding.
pub const TAG_MAX_HAMMING: u32 = 1;

/// Edge length in pixels of the square patch markers are warped to
/// before sampling the bit grid (8 px per module).
pub const TAG_WARP_SIZE: usize = TAG_GRID_SIZE * 8;

/// Physical tag edge length in meters assumed when no per-tag size is set.
pub const DEFAULT_TAG_SIZE_M: f64 = 0.15;

/// Fraction of detect calls that log an input-frame diagnostic sample.
pub const FRAME_DIAG_RATE: f64 = 0.01;

/// Fraction of non-empty results that log the decoded detection JSON.
pub const RESULT_DIAG_RATE: f64 = 0.1;
