// SPDX-License-Identifier: GPL-3.0-only

//! In-process detection engine
//!
//! Implements [`DetectionModule`] over the pipeline in [`crate::vision`].
//! The module owns a flat byte arena standing in for linear memory: frames
//! are copied in at a fixed offset and the JSON result is written back out
//! behind them, with the length-prefixed header the binding expects.

use std::collections::HashMap;

use nalgebra::Matrix3;
use tracing::warn;

use crate::constants::{DEFAULT_TAG_SIZE_M, TAG_MAX_HAMMING};
use crate::detector::module::{DetectionModule, DetectorConfig};
use crate::detector::{TagDetection, TagPose, TagPoseSolution, WirePoint};
use crate::errors::DetectorError;
use crate::vision::{self, GrayView, PipelineOptions, PoseEstimator};

/// Result header offset; offset 0 is reserved so it can signal failure.
const HEADER_OFFSET: usize = 8;
/// Start of the frame input region.
const IMG_OFFSET: usize = 16;

#[derive(Debug, Clone, Copy)]
struct PoseInfo {
    fx: f64,
    fy: f64,
    cx: f64,
    cy: f64,
}

#[derive(Debug, Clone, Copy)]
struct FrameGeometry {
    width: u32,
    height: u32,
    stride: u32,
}

/// The built-in detection engine.
pub struct TagModule {
    memory: Vec<u8>,
    initialized: bool,
    config: DetectorConfig,
    max_hamming: u32,
    pose_info: Option<PoseInfo>,
    tag_sizes: HashMap<u32, f64>,
    frame: Option<FrameGeometry>,
}

impl TagModule {
    pub fn new() -> Self {
        Self {
            memory: vec![0; IMG_OFFSET],
            initialized: false,
            config: DetectorConfig::default(),
            max_hamming: TAG_MAX_HAMMING,
            pose_info: None,
            tag_sizes: HashMap::new(),
            frame: None,
        }
    }

    fn tag_size(&self, id: u32) -> f64 {
        self.tag_sizes.get(&id).copied().unwrap_or(DEFAULT_TAG_SIZE_M)
    }

    /// Repacks the strided input region into a tight grayscale buffer.
    fn frame_pixels(&self, geometry: &FrameGeometry) -> Vec<u8> {
        let width = geometry.width as usize;
        let height = geometry.height as usize;
        let stride = geometry.stride as usize;

        let mut pixels = Vec::with_capacity(width * height);
        for row in 0..height {
            let start = IMG_OFFSET + row * stride;
            pixels.extend_from_slice(&self.memory[start..start + width]);
        }
        pixels
    }

    fn estimate_pose(
        &self,
        marker: &vision::MarkerDetection,
        geometry: &FrameGeometry,
    ) -> TagPose {
        let info = self.pose_info.unwrap_or(PoseInfo {
            fx: geometry.width as f64,
            fy: geometry.width as f64,
            cx: geometry.width as f64 / 2.0,
            cy: geometry.height as f64 / 2.0,
        });

        // POSIT wants points centered on the principal point with y up.
        let mut centered = [[0.0f64; 2]; 4];
        for (dst, corner) in centered.iter_mut().zip(marker.corners.iter()) {
            dst[0] = corner[0] as f64 - info.cx;
            dst[1] = info.cy - corner[1] as f64;
        }

        let estimator = PoseEstimator::new(self.tag_size(marker.id), info.fx);
        let pair = estimator.estimate(&centered);

        let asol = self.config.return_solutions.then(|| TagPoseSolution {
            rotation: matrix_rows(&pair.alternative.rotation),
            translation: pair.alternative.translation.into(),
            error: pair.alternative.error,
        });

        TagPose {
            rotation: matrix_rows(&pair.best.rotation),
            translation: pair.best.translation.into(),
            error: pair.best.error,
            asol,
        }
    }

    fn run_detection(&self, geometry: &FrameGeometry) -> Vec<TagDetection> {
        let pixels = self.frame_pixels(geometry);
        let Some(view) = GrayView::new(&pixels, geometry.width, geometry.height) else {
            return Vec::new();
        };

        let options = PipelineOptions {
            decimate: (self.config.quad_decimate.max(1.0)) as u32,
            blur_radius: (self.config.quad_sigma * 2.0).ceil() as u32,
            max_detections: self.config.max_detections,
            max_hamming: self.max_hamming,
        };

        vision::detect_markers(&view, &options)
            .into_iter()
            .map(|marker| {
                let pose = self
                    .config
                    .return_pose
                    .then(|| self.estimate_pose(&marker, geometry));
                TagDetection {
                    id: marker.id,
                    hamming: marker.hamming,
                    size: pose.is_some().then(|| self.tag_size(marker.id)),
                    center: WirePoint {
                        x: marker.center[0] as f64,
                        y: marker.center[1] as f64,
                    },
                    corners: [
                        wire_point(marker.corners[0]),
                        wire_point(marker.corners[1]),
                        wire_point(marker.corners[2]),
                        wire_point(marker.corners[3]),
                    ],
                    pose,
                }
            })
            .collect()
    }
}

impl Default for TagModule {
    fn default() -> Self {
        Self::new()
    }
}

fn wire_point(point: [f32; 2]) -> WirePoint {
    WirePoint {
        x: point[0] as f64,
        y: point[1] as f64,
    }
}

fn matrix_rows(m: &Matrix3<f64>) -> [[f64; 3]; 3] {
    [
        [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
        [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
        [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
    ]
}

impl DetectionModule for TagModule {
    fn init(&mut self) -> Result<(), DetectorError> {
        self.initialized = true;
        Ok(())
    }

    fn set_detector_options(&mut self, config: &DetectorConfig) {
        self.config = *config;
    }

    fn set_family(&mut self, max_hamming: u32) {
        self.max_hamming = max_hamming;
    }

    fn set_pose_info(&mut self, fx: f64, fy: f64, cx: f64, cy: f64) {
        self.pose_info = Some(PoseInfo { fx, fy, cx, cy });
    }

    fn set_tag_size(&mut self, tag_id: u32, size: f64) {
        self.tag_sizes.insert(tag_id, size);
    }

    fn set_img_buffer(&mut self, width: u32, height: u32, stride: u32) -> u32 {
        let needed = IMG_OFFSET + (stride as usize) * (height as usize);
        if self.memory.len() < needed {
            self.memory.resize(needed, 0);
        }
        self.frame = Some(FrameGeometry {
            width,
            height,
            stride,
        });
        IMG_OFFSET as u32
    }

    fn detect(&mut self) -> u32 {
        if !self.initialized {
            return 0;
        }
        let Some(geometry) = self.frame else {
            return 0;
        };

        let detections = self.run_detection(&geometry);
        let json = match serde_json::to_vec(&detections) {
            Ok(json) => json,
            Err(err) => {
                warn!(error = %err, "failed to encode detection result");
                return 0;
            }
        };

        // The result lives directly behind the frame region.
        let json_offset = IMG_OFFSET
            + (geometry.stride as usize) * (geometry.height as usize);
        let needed = json_offset + json.len();
        if self.memory.len() < needed {
            self.memory.resize(needed, 0);
        }
        self.memory[json_offset..needed].copy_from_slice(&json);

        let len_bytes = (json.len() as u32).to_le_bytes();
        let ptr_bytes = (json_offset as u32).to_le_bytes();
        self.memory[HEADER_OFFSET..HEADER_OFFSET + 4].copy_from_slice(&len_bytes);
        self.memory[HEADER_OFFSET + 4..HEADER_OFFSET + 8].copy_from_slice(&ptr_bytes);

        HEADER_OFFSET as u32
    }

    fn destroy(&mut self) {
        self.initialized = false;
        self.frame = None;
        self.memory.clear();
        self.memory.resize(IMG_OFFSET, 0);
    }

    fn memory(&self) -> &[u8] {
        &self.memory
    }

    fn memory_mut(&mut self) -> &mut [u8] {
        &mut self.memory
    }
}
