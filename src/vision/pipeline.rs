// SPDX-License-Identifier: GPL-3.0-only

//! Marker detection pipeline
//!
//! Candidate quads come from contour tracing over an adaptively thresholded
//! image; each candidate is warped flat, rebinarized with Otsu and decoded
//! against the tag family in all four rotations.

use crate::constants::{TAG_CODE_SIZE, TAG_GRID_SIZE, TAG_WARP_SIZE};
use crate::vision::family::{self, Decoded, TagFamily};
use crate::vision::{GrayView, Quad, Region, contours, ops, quad};
use tracing::trace;

/// Tunables for one pipeline run.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Integer decimation step derived from the configured factor; 1 keeps
    /// full resolution.
    pub decimate: u32,
    /// Pre-threshold blur radius; 0 disables.
    pub blur_radius: u32,
    /// Cap on returned markers; 0 means unlimited.
    pub max_detections: u32,
    /// Hamming tolerance handed to the family decoder.
    pub max_hamming: u32,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            decimate: 1,
            blur_radius: 0,
            max_detections: 0,
            max_hamming: crate::constants::TAG_MAX_HAMMING,
        }
    }
}

/// A decoded marker in full-resolution image coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerDetection {
    pub id: u32,
    pub hamming: u32,
    /// Clockwise corners, first corner matching the decoded orientation.
    pub corners: Quad,
    pub center: [f32; 2],
}

/// Runs the full pipeline over a grayscale frame.
pub fn detect_markers(image: &GrayView, options: &PipelineOptions) -> Vec<MarkerDetection> {
    let step = options.decimate.max(1) as usize;

    // Work at reduced resolution, scale corners back afterwards.
    let reducible = image.width as usize / step >= TAG_GRID_SIZE
        && image.height as usize / step >= TAG_GRID_SIZE;
    let decimated = if step > 1 && reducible {
        Some(ops::decimate(image, step))
    } else {
        None
    };
    let work_view = match &decimated {
        Some((buf, w, h)) => GrayView {
            data: buf,
            width: *w,
            height: *h,
        },
        None => *image,
    };
    let scale = if work_view.width == image.width {
        1.0
    } else {
        step as f32
    };

    let blurred;
    let work = if options.blur_radius > 0 {
        let mut buf = vec![0u8; work_view.len()];
        ops::box_mean(&work_view, &mut buf, options.blur_radius as usize);
        blurred = buf;
        GrayView {
            data: &blurred,
            width: work_view.width,
            height: work_view.height,
        }
    } else {
        work_view
    };

    let mut thresholded = vec![0u8; work.len()];
    ops::adaptive_threshold(&work, &mut thresholded, 2, 7);
    let thresh_view = GrayView {
        data: &thresholded,
        width: work.width,
        height: work.height,
    };

    let mut scratch = vec![0i32; contours::scratch_len(work.width, work.height)];
    let traced = contours::find_contours(&thresh_view, &mut scratch);

    let mut candidates = find_candidates(&traced, work.width);
    for candidate in candidates.iter_mut() {
        quad::make_clockwise(candidate);
    }
    let min_dist = f32::max(10.0, work.width as f32 * 0.05);
    let candidates = drop_nested(candidates, min_dist);

    trace!(
        contours = traced.len(),
        candidates = candidates.len(),
        width = work.width,
        height = work.height,
        "quad extraction"
    );

    let family = TagFamily::new(options.max_hamming);
    let mut markers = Vec::new();
    let mut warped = vec![0u8; TAG_WARP_SIZE * TAG_WARP_SIZE];

    for candidate in candidates {
        ops::warp_quad(&work, &mut warped, &candidate, TAG_WARP_SIZE);

        let cut = ops::otsu(&warped);
        let mut binary = vec![0u8; warped.len()];
        ops::threshold(&warped, &mut binary, cut);
        let patch = GrayView {
            data: &binary,
            width: TAG_WARP_SIZE as u32,
            height: TAG_WARP_SIZE as u32,
        };

        if let Some((decoded, corners)) = decode_patch(&patch, &family, candidate) {
            let corners = scale_quad(&corners, scale);
            let center = [
                (corners[0][0] + corners[1][0] + corners[2][0] + corners[3][0]) / 4.0,
                (corners[0][1] + corners[1][1] + corners[2][1] + corners[3][1]) / 4.0,
            ];
            markers.push(MarkerDetection {
                id: decoded.id,
                hamming: decoded.hamming,
                corners,
                center,
            });
        }
    }

    if options.max_detections > 0 && markers.len() > options.max_detections as usize {
        markers.truncate(options.max_detections as usize);
    }
    markers
}

/// Filters traced contours down to convex quads of plausible size.
fn find_candidates(traced: &[contours::Contour], image_width: u32) -> Vec<Quad> {
    let min_points = (image_width as f32 * 0.01) as usize;
    let mut candidates = Vec::new();

    for contour in traced {
        if contour.points.len() < min_points.max(4) {
            continue;
        }
        let epsilon = contour.points.len() as f64 * 0.05;
        let poly = quad::approx_polygon(&contour.points, epsilon);

        if poly.len() == 4 && quad::is_convex(&poly) && quad::min_edge_length(&poly) >= 5.0 {
            candidates.push([
                [poly[0].x as f32, poly[0].y as f32],
                [poly[1].x as f32, poly[1].y as f32],
                [poly[2].x as f32, poly[2].y as f32],
                [poly[3].x as f32, poly[3].y as f32],
            ]);
        }
    }
    candidates
}

/// Removes near-coincident quads (typically the inner border of the same
/// marker), keeping the one with the larger perimeter.
fn drop_nested(candidates: Vec<Quad>, min_dist: f32) -> Vec<Quad> {
    let len = candidates.len();
    let mut dropped = vec![false; len];

    for i in 0..len {
        for j in (i + 1)..len {
            let mut dist = 0.0;
            for k in 0..4 {
                let dx = candidates[i][k][0] - candidates[j][k][0];
                let dy = candidates[i][k][1] - candidates[j][k][1];
                dist += dx * dx + dy * dy;
            }
            if dist / 4.0 < min_dist * min_dist {
                if quad::perimeter(&candidates[i]) < quad::perimeter(&candidates[j]) {
                    dropped[i] = true;
                } else {
                    dropped[j] = true;
                }
            }
        }
    }

    candidates
        .into_iter()
        .zip(dropped)
        .filter(|(_, d)| !d)
        .map(|(c, _)| c)
        .collect()
}

/// Samples the warped patch into a bit grid and decodes it, trying all four
/// rotations. Returns the decode and the corners rotated to match.
fn decode_patch(
    patch: &GrayView,
    family: &TagFamily,
    mut corners: Quad,
) -> Option<(Decoded, Quad)> {
    let cell = (patch.width as usize) / TAG_GRID_SIZE;
    let majority = (cell * cell) / 2;

    // Border modules must be black.
    for i in 0..TAG_GRID_SIZE {
        let inc = if i == 0 || i == TAG_GRID_SIZE - 1 {
            1
        } else {
            TAG_GRID_SIZE - 1
        };
        let mut j = 0;
        while j < TAG_GRID_SIZE {
            let region = Region {
                x: (j * cell) as u32,
                y: (i * cell) as u32,
                width: cell as u32,
                height: cell as u32,
            };
            if ops::count_nonzero(patch, &region) > majority {
                return None;
            }
            j += inc;
        }
    }

    // Majority-sample the code grid.
    let mut bits = vec![0u8; TAG_CODE_SIZE * TAG_CODE_SIZE];
    for i in 0..TAG_CODE_SIZE {
        for j in 0..TAG_CODE_SIZE {
            let region = Region {
                x: ((j + 1) * cell) as u32,
                y: ((i + 1) * cell) as u32,
                width: cell as u32,
                height: cell as u32,
            };
            bits[i * TAG_CODE_SIZE + j] =
                (ops::count_nonzero(patch, &region) > majority) as u8;
        }
    }

    let mut best: Option<(Decoded, Quad)> = None;
    for rotation in 0..4 {
        if let Some(decoded) = family.decode(&bits) {
            let better = best.map_or(true, |(b, _)| decoded.hamming < b.hamming);
            if better {
                best = Some((decoded, corners));
            }
            if decoded.hamming == 0 {
                break;
            }
        }
        if rotation < 3 {
            bits = family::rotate_grid(&bits, TAG_CODE_SIZE);
            corners = [corners[1], corners[2], corners[3], corners[0]];
        }
    }
    best
}

fn scale_quad(quad: &Quad, scale: f32) -> Quad {
    [
        [quad[0][0] * scale, quad[0][1] * scale],
        [quad[1][0] * scale, quad[1][1] * scale],
        [quad[2][0] * scale, quad[2][1] * scale],
        [quad[3][0] * scale, quad[3][1] * scale],
    ]
}
