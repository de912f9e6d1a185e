// SPDX-License-Identifier: GPL-3.0-only

//! Suzuki-Abe border following over a binarized image
//!
//! Works on an `i32` scratch grid one pixel larger on every side than the
//! input, so tracing never needs bounds checks. Labels written into the grid
//! distinguish already-visited borders.

use crate::vision::{GrayView, Pixel};

/// One traced boundary chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    /// Boundary pixels in trace order.
    pub points: Vec<Pixel>,
    /// True when this chain bounds a hole inside another component.
    pub hole: bool,
}

/// Offsets of the 8-connected neighborhood, counterclockwise from east.
const NEIGHBORS: [[i32; 2]; 8] = [
    [1, 0],
    [1, -1],
    [0, -1],
    [-1, -1],
    [-1, 0],
    [-1, 1],
    [0, 1],
    [1, 1],
];

/// Flattened neighbor offsets for a padded grid of the given row width,
/// doubled so a sweep can run past index 7 without wrapping.
fn neighbor_deltas(row_width: i32) -> [i32; 16] {
    let mut deltas = [0i32; 16];
    for (i, [dx, dy]) in NEIGHBORS.iter().enumerate() {
        let delta = dx + dy * row_width;
        deltas[i] = delta;
        deltas[i + 8] = delta;
    }
    deltas
}

/// Writes the 0/1-compressed image into `grid` surrounded by a zero border.
/// `grid` must hold `(width + 2) * (height + 2)` cells.
fn pad_binary(src: &GrayView, grid: &mut [i32]) {
    let width = src.width as usize;
    let height = src.height as usize;
    let padded = width + 2;

    grid[..padded].fill(0);
    for y in 0..height {
        let dst_row = (y + 1) * padded;
        let src_row = y * width;
        grid[dst_row] = 0;
        for x in 0..width {
            grid[dst_row + 1 + x] = if src.data[src_row + x] == 0 { 0 } else { 1 };
        }
        grid[dst_row + padded - 1] = 0;
    }
    grid[(height + 1) * padded..].fill(0);
}

/// Traces one border starting at `pos`, marking visited cells with `label`.
fn trace_border(
    grid: &mut [i32],
    pos: usize,
    label: i32,
    mut point: Pixel,
    hole: bool,
    deltas: &[i32; 16],
) -> Contour {
    let mut contour = Contour {
        points: Vec::new(),
        hole,
    };

    // Scan backwards from the entry direction for the first set neighbor.
    let mut s: usize = if hole { 0 } else { 4 };
    let mut s_end = s;
    let mut pos1;

    loop {
        s = s.wrapping_sub(1) & 7;
        pos1 = (pos as isize + deltas[s] as isize) as usize;
        if grid[pos1] != 0 {
            break;
        }
        if s == s_end {
            break;
        }
    }

    if s == s_end {
        // Isolated pixel.
        grid[pos] = -label;
        contour.points.push(point);
        return contour;
    }

    let mut pos3 = pos;
    loop {
        s_end = s;

        let mut pos4;
        loop {
            s = (s + 1) & 15;
            pos4 = (pos3 as isize + deltas[s] as isize) as usize;
            if grid[pos4] != 0 {
                break;
            }
        }
        s &= 7;

        // An exit through the right edge of the sweep closes the border on
        // this cell; interior cells get the positive label once.
        if (s.wrapping_sub(1) as u32) < s_end as u32 {
            grid[pos3] = -label;
        } else if grid[pos3] == 1 {
            grid[pos3] = label;
        }

        contour.points.push(point);
        point.x += NEIGHBORS[s][0];
        point.y += NEIGHBORS[s][1];

        if pos4 == pos && pos3 == pos1 {
            break;
        }
        pos3 = pos4;
        s = (s + 4) & 7;
    }

    contour
}

/// Finds all outer and hole borders of the binarized image. `scratch` must
/// hold `(width + 2) * (height + 2)` cells and is overwritten.
pub fn find_contours(src: &GrayView, scratch: &mut [i32]) -> Vec<Contour> {
    let width = src.width as usize;
    let height = src.height as usize;
    let mut contours = Vec::new();

    pad_binary(src, scratch);
    let deltas = neighbor_deltas((width + 2) as i32);

    let mut pos = width + 3; // first interior cell
    let mut label = 1;

    for y in 0..height {
        for x in 0..width {
            let cell = scratch[pos];
            if cell != 0 {
                let outer = cell == 1 && scratch[pos - 1] == 0;
                let hole = !outer && cell >= 1 && scratch[pos + 1] == 0;

                if outer || hole {
                    label += 1;
                    let start = Pixel::new(x as i32, y as i32);
                    contours.push(trace_border(scratch, pos, label, start, hole, &deltas));
                }
            }
            pos += 1;
        }
        pos += 2; // right border, then left border of the next row
    }

    contours
}

/// Scratch size required by [`find_contours`] for a given image.
pub fn scratch_len(width: u32, height: u32) -> usize {
    ((width + 2) as usize) * ((height + 2) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_binary_wraps_with_zeros() {
        let data = [1, 0, 1, 0, 1, 0, 0, 0, 1];
        let src = GrayView::new(&data, 3, 3).unwrap();
        let mut grid = vec![0i32; 25];
        pad_binary(&src, &mut grid);

        for i in 0..5 {
            assert_eq!(grid[i], 0);
            assert_eq!(grid[20 + i], 0);
        }
        let expected = [1, 0, 1, 0, 1, 0, 0, 0, 1];
        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(grid[(y + 1) * 5 + 1 + x], expected[y * 3 + x]);
            }
        }
    }

    #[test]
    fn square_ring_yields_outer_and_hole_borders() {
        let data = [
            0, 0, 0, 0, 0, //
            0, 255, 255, 255, 0, //
            0, 255, 0, 255, 0, //
            0, 255, 255, 255, 0, //
            0, 0, 0, 0, 0,
        ];
        let src = GrayView::new(&data, 5, 5).unwrap();
        let mut scratch = vec![0i32; scratch_len(5, 5)];
        let contours = find_contours(&src, &mut scratch);

        assert_eq!(contours.len(), 2);
        assert!(!contours[0].hole);
        assert!(contours[1].hole);
    }

    #[test]
    fn isolated_pixel_is_a_single_point_contour() {
        let mut data = vec![0u8; 25];
        data[12] = 255;
        let src = GrayView::new(&data, 5, 5).unwrap();
        let mut scratch = vec![0i32; scratch_len(5, 5)];
        let contours = find_contours(&src, &mut scratch);

        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].points, vec![Pixel::new(2, 2)]);
    }
}
