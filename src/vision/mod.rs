// SPDX-License-Identifier: GPL-3.0-only

//! Marker detection pipeline
//!
//! A pure-Rust fiducial detector operating on grayscale byte buffers. The
//! [`crate::detector`] module drives it through the detection-module
//! interface; nothing in here knows about the binding's wire format.
//!
//! Stages: adaptive threshold, border following, quad candidate extraction,
//! perspective warp and bit-grid decoding against the built-in tag family,
//! plus POSIT pose estimation for accepted markers.

pub mod contours;
pub mod family;
pub mod ops;
pub mod pipeline;
pub mod pose;
pub mod quad;

pub use family::TagFamily;
pub use pipeline::{MarkerDetection, PipelineOptions, detect_markers};
pub use pose::{PoseEstimator, PosePair, PoseSolution};

/// Borrowed grayscale image, row-major, one byte per pixel.
#[derive(Debug, Clone, Copy)]
pub struct GrayView<'a> {
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
}

impl<'a> GrayView<'a> {
    /// Wraps a buffer, returning `None` when it does not hold exactly
    /// `width * height` bytes.
    pub fn new(data: &'a [u8], width: u32, height: u32) -> Option<Self> {
        if data.len() == (width as usize) * (height as usize) {
            Some(Self {
                data,
                width,
                height,
            })
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Axis-aligned pixel region inside an image.
#[derive(Debug, Clone, Copy)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// 2D point in pixel coordinates.
pub type Point = [f32; 2];

/// Integer pixel coordinates used during contour tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pixel {
    pub x: i32,
    pub y: i32,
}

impl Pixel {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// The four corners of a quad, clockwise in image coordinates.
pub type Quad = [Point; 4];
