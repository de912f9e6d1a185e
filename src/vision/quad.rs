// SPDX-License-Identifier: GPL-3.0-only

//! Polygon approximation and quad geometry

use crate::vision::{Pixel, Point, Quad};

/// Douglas-Peucker simplification of a closed contour. `epsilon` scales the
/// allowed deviation from the straight segments.
pub fn approx_polygon(contour: &[Pixel], epsilon: f64) -> Vec<Pixel> {
    let len = contour.len();
    if len == 0 {
        return Vec::new();
    }

    #[derive(Clone, Copy)]
    struct Span {
        start: usize,
        end: usize,
    }

    let mut poly = Vec::new();
    let mut stack: Vec<Span> = Vec::new();
    let epsilon_sq = epsilon * epsilon;

    // Pick a starting vertex by twice chasing the farthest point, so the
    // seed lies near an extreme of the shape.
    let mut k = 0;
    let mut far = Span { start: 0, end: 0 };
    let mut start_pt = contour[0];
    let mut max_dist = 0.0;

    for _ in 0..3 {
        max_dist = 0.0;
        k = (k + far.start) % len;
        start_pt = contour[k];
        k += 1;
        if k == len {
            k = 0;
        }

        for j in 1..len {
            let pt = contour[k];
            k += 1;
            if k == len {
                k = 0;
            }

            let dx = (pt.x - start_pt.x) as f64;
            let dy = (pt.y - start_pt.y) as f64;
            let dist = dx * dx + dy * dy;
            if dist > max_dist {
                max_dist = dist;
                far.start = j;
            }
        }
    }

    if max_dist <= epsilon_sq {
        poly.push(start_pt);
    } else {
        let seed = Span {
            start: k,
            end: far.start + k,
        };
        let mut right = Span {
            start: seed.end - if seed.end >= len { len } else { 0 },
            end: seed.start,
        };
        if right.end < right.start {
            right.end += len;
        }

        stack.push(right);
        // The left span keeps the unwrapped end so ranges stay monotonic.
        stack.push(seed);
    }

    while let Some(mut span) = stack.pop() {
        let end_pt = contour[span.end % len];
        k = span.start % len;
        start_pt = contour[k];
        k += 1;
        if k == len {
            k = 0;
        }

        let within_eps;
        if span.end <= span.start + 1 {
            within_eps = true;
        } else {
            max_dist = 0.0;
            let dx = (end_pt.x - start_pt.x) as f64;
            let dy = (end_pt.y - start_pt.y) as f64;

            for i in (span.start + 1)..span.end {
                let pt = contour[k];
                k += 1;
                if k == len {
                    k = 0;
                }

                let dist = (((pt.y - start_pt.y) as f64) * dx
                    - ((pt.x - start_pt.x) as f64) * dy)
                    .abs();
                if dist > max_dist {
                    max_dist = dist;
                    far.start = i;
                }
            }

            within_eps = max_dist * max_dist <= epsilon_sq * (dx * dx + dy * dy);
        }

        if within_eps {
            poly.push(start_pt);
        } else {
            let right = Span {
                start: far.start,
                end: span.end,
            };
            span.end = far.start;
            stack.push(right);
            stack.push(span);
        }
    }

    poly
}

/// Whether the closed polygon is strictly convex.
pub fn is_convex(poly: &[Pixel]) -> bool {
    let len = poly.len();
    if len == 0 {
        return false;
    }

    let mut orientation = 0;
    let mut prev = poly[len - 1];
    let mut cur = poly[0];
    let mut dx0 = cur.x - prev.x;
    let mut dy0 = cur.y - prev.y;

    let mut j = 0;
    for _ in 0..len {
        j += 1;
        if j == len {
            j = 0;
        }
        prev = cur;
        cur = poly[j];

        let dx = cur.x - prev.x;
        let dy = cur.y - prev.y;

        // i64 keeps the cross product from overflowing on large images.
        let cross_a = (dx as i64) * (dy0 as i64);
        let cross_b = (dy as i64) * (dx0 as i64);
        orientation |= if cross_b > cross_a {
            1
        } else if cross_b < cross_a {
            2
        } else {
            3
        };
        if orientation == 3 {
            return false;
        }

        dx0 = dx;
        dy0 = dy;
    }

    true
}

/// Length of the shortest polygon edge.
pub fn min_edge_length(poly: &[Pixel]) -> f64 {
    let len = poly.len();
    if len <= 1 {
        return 0.0;
    }

    let mut min_sq = f64::INFINITY;
    let mut j = len - 1;
    for i in 0..len {
        let dx = (poly[i].x - poly[j].x) as f64;
        let dy = (poly[i].y - poly[j].y) as f64;
        min_sq = min_sq.min(dx * dx + dy * dy);
        j = i;
    }
    min_sq.sqrt()
}

/// Closed perimeter of a quad.
pub fn perimeter(quad: &Quad) -> f32 {
    let mut total = 0.0;
    for i in 0..4 {
        let [x1, y1] = quad[i];
        let [x2, y2] = quad[(i + 1) % 4];
        total += ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt();
    }
    total
}

/// Reorders corners in place so they wind clockwise in image coordinates.
pub fn make_clockwise(quad: &mut Quad) {
    let dx1 = quad[1][0] - quad[0][0];
    let dy1 = quad[1][1] - quad[0][1];
    let dx2 = quad[2][0] - quad[0][0];
    let dy2 = quad[2][1] - quad[0][1];
    if dx1 * dy2 - dy1 * dx2 < 0.0 {
        quad.swap(1, 3);
    }
}

/// Homography taking the unit square `(0,0)-(1,1)` onto the quad, as a
/// row-major 3x3 with `h[8] == 1`. Corner order: `(0,0) -> quad[0]`,
/// `(1,0) -> quad[1]`, `(1,1) -> quad[2]`, `(0,1) -> quad[3]`.
pub fn unit_square_to_quad(quad: &Quad) -> [f64; 9] {
    let mut h = [0.0f64; 9];
    let px = (quad[0][0] - quad[1][0] + quad[2][0] - quad[3][0]) as f64;
    let py = (quad[0][1] - quad[1][1] + quad[2][1] - quad[3][1]) as f64;

    if px == 0.0 && py == 0.0 {
        // Parallelogram: affine case.
        h[0] = (quad[1][0] - quad[0][0]) as f64;
        h[1] = (quad[2][0] - quad[1][0]) as f64;
        h[2] = quad[0][0] as f64;
        h[3] = (quad[1][1] - quad[0][1]) as f64;
        h[4] = (quad[2][1] - quad[1][1]) as f64;
        h[5] = quad[0][1] as f64;
        h[8] = 1.0;
    } else {
        let dx1 = (quad[1][0] - quad[2][0]) as f64;
        let dx2 = (quad[3][0] - quad[2][0]) as f64;
        let dy1 = (quad[1][1] - quad[2][1]) as f64;
        let dy2 = (quad[3][1] - quad[2][1]) as f64;
        let den = dx1 * dy2 - dx2 * dy1;

        h[6] = (px * dy2 - dx2 * py) / den;
        h[7] = (dx1 * py - px * dy1) / den;
        h[8] = 1.0;
        h[0] = (quad[1][0] - quad[0][0]) as f64 + h[6] * (quad[1][0] as f64);
        h[1] = (quad[3][0] - quad[0][0]) as f64 + h[7] * (quad[3][0] as f64);
        h[2] = quad[0][0] as f64;
        h[3] = (quad[1][1] - quad[0][1]) as f64 + h[6] * (quad[1][1] as f64);
        h[4] = (quad[3][1] - quad[0][1]) as f64 + h[7] * (quad[3][1] as f64);
        h[5] = quad[0][1] as f64;
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convexity_detects_a_dent() {
        let square = vec![
            Pixel::new(0, 0),
            Pixel::new(1, 0),
            Pixel::new(1, 1),
            Pixel::new(0, 1),
        ];
        assert!(is_convex(&square));

        let dented = vec![
            Pixel::new(0, 0),
            Pixel::new(2, 0),
            Pixel::new(2, 1),
            Pixel::new(1, 1),
            Pixel::new(1, 2),
            Pixel::new(0, 2),
        ];
        assert!(!is_convex(&dented));
    }

    #[test]
    fn min_edge_of_unit_square() {
        let square = vec![
            Pixel::new(0, 0),
            Pixel::new(1, 0),
            Pixel::new(1, 1),
            Pixel::new(0, 1),
        ];
        assert!((min_edge_length(&square) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn approx_collapses_collinear_vertices() {
        let contour = vec![
            Pixel::new(0, 0),
            Pixel::new(1, 0),
            Pixel::new(10, 0),
            Pixel::new(10, 1),
            Pixel::new(10, 10),
            Pixel::new(9, 10),
            Pixel::new(0, 10),
            Pixel::new(0, 9),
        ];
        let poly = approx_polygon(&contour, 2.0);
        assert_eq!(poly.len(), 4);
    }

    #[test]
    fn clockwise_swaps_counterclockwise_input() {
        let mut quad = [[0.0, 0.0], [0.0, 10.0], [10.0, 10.0], [10.0, 0.0]];
        make_clockwise(&mut quad);
        assert_eq!(quad[1], [10.0, 0.0]);
        assert_eq!(quad[3], [0.0, 10.0]);
    }

    #[test]
    fn homography_hits_all_four_corners() {
        let quad: Quad = [[2.0, 3.0], [12.0, 4.0], [11.0, 15.0], [1.0, 13.0]];
        let h = unit_square_to_quad(&quad);
        let map = |u: f64, v: f64| {
            let w = h[6] * u + h[7] * v + h[8];
            (
                (h[0] * u + h[1] * v + h[2]) / w,
                (h[3] * u + h[4] * v + h[5]) / w,
            )
        };
        let corners = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        for (i, &(u, v)) in corners.iter().enumerate() {
            let (x, y) = map(u, v);
            assert!((x - quad[i][0] as f64).abs() < 1e-9);
            assert!((y - quad[i][1] as f64).abs() < 1e-9);
        }
    }
}
