// SPDX-License-Identifier: GPL-3.0-only

//! Built-in tag family
//!
//! Markers are a 7x7 module grid: a one-module black border around a 5x5
//! code area. Each code row carries two id bits through one of four row
//! patterns, giving 1024 distinct ids with per-row error correction. The
//! campus deployment only mounts a handful of low ids, but decoding is
//! id-agnostic.

use crate::constants::{TAG_CODE_SIZE, TAG_GRID_SIZE};

/// Row bit patterns indexed by the two data bits they encode.
const ROW_PATTERNS: [u8; 4] = [0b10000, 0b10111, 0b01001, 0b01110];

/// Result of decoding a sampled bit grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    pub id: u32,
    pub hamming: u32,
}

/// Decoder for the built-in family.
#[derive(Debug, Clone, Copy)]
pub struct TagFamily {
    /// Total Hamming distance accepted across all rows.
    pub max_hamming: u32,
}

impl TagFamily {
    pub fn new(max_hamming: u32) -> Self {
        Self { max_hamming }
    }

    /// Decodes a row-major `TAG_CODE_SIZE`-squared bit grid (0/1 values).
    /// Returns `None` when the accumulated distance exceeds the limit.
    pub fn decode(&self, bits: &[u8]) -> Option<Decoded> {
        debug_assert_eq!(bits.len(), TAG_CODE_SIZE * TAG_CODE_SIZE);

        let mut id = 0u32;
        let mut hamming = 0u32;

        for row in 0..TAG_CODE_SIZE {
            let mut word = 0u8;
            for col in 0..TAG_CODE_SIZE {
                word = (word << 1) | bits[row * TAG_CODE_SIZE + col];
            }

            let mut data = 0u32;
            let mut dist = u32::MAX;
            for (candidate, &pattern) in ROW_PATTERNS.iter().enumerate() {
                let d = (word ^ pattern).count_ones();
                if d < dist {
                    data = candidate as u32;
                    dist = d;
                }
            }

            id = (id << 2) | data;
            hamming += dist;
            if hamming > self.max_hamming {
                return None;
            }
        }

        Some(Decoded { id, hamming })
    }

    /// Encodes an id into its row-major bit grid. Ids wrap at 10 bits.
    pub fn encode(id: u32) -> [u8; TAG_CODE_SIZE * TAG_CODE_SIZE] {
        let mut bits = [0u8; TAG_CODE_SIZE * TAG_CODE_SIZE];
        for row in 0..TAG_CODE_SIZE {
            let data = (id >> (2 * (TAG_CODE_SIZE - 1 - row))) & 0b11;
            let pattern = ROW_PATTERNS[data as usize];
            for col in 0..TAG_CODE_SIZE {
                bits[row * TAG_CODE_SIZE + col] =
                    (pattern >> (TAG_CODE_SIZE - 1 - col)) & 1;
            }
        }
        bits
    }
}

/// Rotates a square bit grid a quarter turn, matching one clockwise corner
/// rotation of the candidate quad.
pub fn rotate_grid(src: &[u8], dim: usize) -> Vec<u8> {
    let mut dst = vec![0u8; dim * dim];
    for i in 0..dim {
        for j in 0..dim {
            dst[j * dim + (dim - 1 - i)] = src[i * dim + j];
        }
    }
    dst
}

/// Renders a marker as a grayscale bitmap: black border and code zeros,
/// white code ones. Returns the bitmap and its edge length,
/// `TAG_GRID_SIZE * module_px`.
pub fn render_marker(id: u32, module_px: usize) -> (Vec<u8>, usize) {
    let bits = TagFamily::encode(id);
    let edge = TAG_GRID_SIZE * module_px;
    let mut img = vec![0u8; edge * edge];

    for row in 0..TAG_CODE_SIZE {
        for col in 0..TAG_CODE_SIZE {
            if bits[row * TAG_CODE_SIZE + col] == 1 {
                let y0 = (row + 1) * module_px;
                let x0 = (col + 1) * module_px;
                for y in y0..y0 + module_px {
                    for x in x0..x0 + module_px {
                        img[y * edge + x] = 255;
                    }
                }
            }
        }
    }

    (img, edge)
}
