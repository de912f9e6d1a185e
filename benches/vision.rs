// SPDX-License-Identifier: GPL-3.0-only

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use wayfinder::vision::family::render_marker;
use wayfinder::vision::{GrayView, PipelineOptions, contours, detect_markers, ops};

const SIZES: [(usize, usize); 3] = [(320, 240), (640, 480), (1280, 720)];

fn gradient_image(width: usize, height: usize) -> Vec<u8> {
    (0..width * height).map(|i| (i % 256) as u8).collect()
}

fn marker_image(width: usize, height: usize) -> Vec<u8> {
    let mut img = vec![255u8; width * height];
    let (marker, edge) = render_marker(3, 8);
    let ox = (width - edge) / 2;
    let oy = (height - edge) / 2;
    for y in 0..edge {
        for x in 0..edge {
            img[(oy + y) * width + ox + x] = marker[y * edge + x];
        }
    }
    img
}

fn bench_adaptive_threshold(c: &mut Criterion) {
    let mut group = c.benchmark_group("AdaptiveThreshold");
    for &(width, height) in SIZES.iter() {
        let data = gradient_image(width, height);
        let src = GrayView::new(&data, width as u32, height as u32)
            .expect("dimensions match");
        let mut out = vec![0u8; width * height];
        let size_str = format!("{}x{}", width, height);

        group.bench_with_input(BenchmarkId::from_parameter(&size_str), &size_str, |b, _| {
            b.iter(|| ops::adaptive_threshold(black_box(&src), black_box(&mut out), 2, 7))
        });
    }
    group.finish();
}

fn bench_contours(c: &mut Criterion) {
    let mut group = c.benchmark_group("Contours");
    for &(width, height) in SIZES.iter() {
        let data = marker_image(width, height);
        let src = GrayView::new(&data, width as u32, height as u32)
            .expect("dimensions match");
        let mut binary = vec![0u8; width * height];
        ops::adaptive_threshold(&src, &mut binary, 2, 7);
        let thresholded = GrayView::new(&binary, width as u32, height as u32)
            .expect("dimensions match");
        let mut scratch = vec![0i32; contours::scratch_len(width as u32, height as u32)];
        let size_str = format!("{}x{}", width, height);

        group.bench_with_input(BenchmarkId::from_parameter(&size_str), &size_str, |b, _| {
            b.iter(|| contours::find_contours(black_box(&thresholded), black_box(&mut scratch)))
        });
    }
    group.finish();
}

fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("DetectMarkers");
    for &(width, height) in SIZES.iter() {
        let data = marker_image(width, height);
        let src = GrayView::new(&data, width as u32, height as u32)
            .expect("dimensions match");
        let options = PipelineOptions {
            decimate: 2,
            ..Default::default()
        };
        let size_str = format!("{}x{}", width, height);

        group.bench_with_input(BenchmarkId::from_parameter(&size_str), &size_str, |b, _| {
            b.iter(|| detect_markers(black_box(&src), black_box(&options)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_adaptive_threshold,
    bench_contours,
    bench_full_pipeline
);
criterion_main!(benches);
