// SPDX-License-Identifier: GPL-3.0-only

//! Grayscale pixel operations backing the pipeline

use crate::vision::{GrayView, Quad, Region};

/// Binarize against a fixed threshold: `<= threshold` becomes 0, the rest 255.
pub fn threshold(src: &[u8], dst: &mut [u8], threshold: u8) {
    for (d, &s) in dst.iter_mut().zip(src.iter()) {
        *d = if s <= threshold { 0 } else { 255 };
    }
}

/// Otsu's threshold: maximizes between-class variance over the histogram.
pub fn otsu(src: &[u8]) -> u8 {
    let mut hist = [0u32; 256];
    for &pixel in src {
        hist[pixel as usize] += 1;
    }

    let total = src.len() as f64;
    let sum: f64 = hist
        .iter()
        .enumerate()
        .map(|(v, &n)| (v as f64) * (n as f64))
        .sum();

    let mut best = 0u8;
    let mut best_variance = 0.0;
    let mut weight_bg = 0.0;
    let mut sum_bg = 0.0;

    for (value, &count) in hist.iter().enumerate() {
        weight_bg += count as f64;
        if weight_bg == 0.0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg == 0.0 {
            break;
        }
        sum_bg += (value as f64) * (count as f64);

        let mean_delta = sum_bg / weight_bg - (sum - sum_bg) / weight_fg;
        let variance = weight_bg * weight_fg * mean_delta * mean_delta;
        if variance > best_variance {
            best_variance = variance;
            best = value as u8;
        }
    }

    best
}

/// Separable box mean with clamped borders. Window is `2 * radius + 1` wide.
pub fn box_mean(src: &GrayView, dst: &mut [u8], radius: usize) {
    let width = src.width as usize;
    let height = src.height as usize;
    let window = 2 * radius + 1;

    // Horizontal pass into a u16 scratch row sum, then vertical pass.
    let mut rows = vec![0u16; width * height];
    for y in 0..height {
        let row = &src.data[y * width..(y + 1) * width];
        for x in 0..width {
            let mut sum = 0u32;
            for k in 0..window {
                let sx = (x + k).saturating_sub(radius).min(width - 1);
                sum += row[sx] as u32;
            }
            rows[y * width + x] = (sum / window as u32) as u16;
        }
    }

    for x in 0..width {
        for y in 0..height {
            let mut sum = 0u32;
            for k in 0..window {
                let sy = (y + k).saturating_sub(radius).min(height - 1);
                sum += rows[sy * width + x] as u32;
            }
            dst[y * width + x] = (sum / window as u32) as u8;
        }
    }
}

/// Adaptive threshold: a pixel turns white when it is at least `delta`
/// darker than its local box mean. Dark marker ink on light paper comes
/// out as foreground.
pub fn adaptive_threshold(src: &GrayView, dst: &mut [u8], radius: usize, delta: u8) {
    let mut blurred = vec![0u8; src.len()];
    box_mean(src, &mut blurred, radius);

    for i in 0..src.len() {
        let diff = src.data[i] as i16 - blurred[i] as i16;
        dst[i] = if diff <= -(delta as i16) { 255 } else { 0 };
    }
}

/// Nearest-neighbor decimation by an integer step. Returns the packed
/// buffer and its dimensions.
pub fn decimate(src: &GrayView, step: usize) -> (Vec<u8>, u32, u32) {
    let width = src.width as usize;
    let height = src.height as usize;
    let dw = width / step;
    let dh = height / step;
    let mut out = Vec::with_capacity(dw * dh);

    for y in 0..dh {
        let row = (y * step) * width;
        for x in 0..dw {
            out.push(src.data[row + x * step]);
        }
    }

    (out, dw as u32, dh as u32)
}

/// Extracts a `size`-by-`size` patch of the quad interior via perspective
/// transform and bilinear sampling.
pub fn warp_quad(src: &GrayView, dst: &mut [u8], quad: &Quad, size: usize) {
    let width = src.width as usize;
    let height = src.height as usize;
    let h = crate::vision::quad::unit_square_to_quad(quad);
    let denom = (size - 1) as f64;

    for i in 0..size {
        let v = i as f64 / denom;
        for j in 0..size {
            let u = j as f64 / denom;

            let w = h[6] * u + h[7] * v + h[8];
            let x = (h[0] * u + h[1] * v + h[2]) / w;
            let y = (h[3] * u + h[4] * v + h[5]) / w;

            let sx0 = x.clamp(0.0, (width - 1) as f64) as usize;
            let sy0 = y.clamp(0.0, (height - 1) as f64) as usize;
            let sx1 = (sx0 + 1).min(width - 1);
            let sy1 = (sy0 + 1).min(height - 1);
            let fx = (x - sx0 as f64).clamp(0.0, 1.0);
            let fy = (y - sy0 as f64).clamp(0.0, 1.0);

            let p00 = src.data[sy0 * width + sx0] as f64;
            let p01 = src.data[sy0 * width + sx1] as f64;
            let p10 = src.data[sy1 * width + sx0] as f64;
            let p11 = src.data[sy1 * width + sx1] as f64;

            let value = (1.0 - fy) * ((1.0 - fx) * p00 + fx * p01)
                + fy * ((1.0 - fx) * p10 + fx * p11);
            dst[i * size + j] = value as u8;
        }
    }
}

/// Counts non-zero pixels within a region. The region must lie inside the
/// image.
pub fn count_nonzero(src: &GrayView, region: &Region) -> usize {
    let width = src.width as usize;
    let mut count = 0;
    for y in region.y..(region.y + region.height) {
        let row = (y as usize) * width;
        for x in region.x..(region.x + region.width) {
            if src.data[row + x as usize] != 0 {
                count += 1;
            }
        }
    }
    count
}
