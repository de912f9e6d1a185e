// SPDX-License-Identifier: GPL-3.0-only

//! Detection-module interface
//!
//! The binding talks to its detection engine exclusively through this trait:
//! a handful of configuration calls plus raw linear-memory access. Image
//! input and the JSON result both travel through that memory, so a test can
//! substitute a fake module and corrupt the wire bytes at will.

use crate::constants::detector_defaults;
use crate::errors::DetectorError;

/// Detector options, set once right after the module loads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorConfig {
    /// Input decimation factor; 2.0 halves both dimensions.
    pub quad_decimate: f32,
    /// Gaussian blur sigma applied before quad extraction; 0.0 disables.
    pub quad_sigma: f32,
    pub nthreads: u32,
    pub refine_edges: bool,
    /// Cap on detections per frame; 0 means unlimited.
    pub max_detections: u32,
    pub return_pose: bool,
    /// When pose is returned, also include the alternative hypothesis.
    pub return_solutions: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            quad_decimate: detector_defaults::QUAD_DECIMATE,
            quad_sigma: detector_defaults::QUAD_SIGMA,
            nthreads: detector_defaults::NTHREADS,
            refine_edges: detector_defaults::REFINE_EDGES,
            max_detections: detector_defaults::MAX_DETECTIONS,
            return_pose: detector_defaults::RETURN_POSE,
            return_solutions: detector_defaults::RETURN_SOLUTIONS,
        }
    }
}

/// The call surface a detection engine presents to the binding.
///
/// `set_img_buffer` returns a byte offset into the module's linear memory;
/// the binding copies the grayscale frame there and then calls `detect`,
/// which returns the offset of a result header: a little-endian `u32` length
/// followed at `+4` by a little-endian `u32` offset of that many UTF-8 JSON
/// bytes. A zero return means detection could not run.
pub trait DetectionModule {
    fn init(&mut self) -> Result<(), DetectorError>;

    fn set_detector_options(&mut self, config: &DetectorConfig);

    /// Selects the tag family by its Hamming-correction tolerance.
    fn set_family(&mut self, max_hamming: u32);

    /// Camera intrinsics for pose estimation: focal lengths and principal
    /// point, all in pixels.
    fn set_pose_info(&mut self, fx: f64, fy: f64, cx: f64, cy: f64);

    /// Physical edge length in meters for one tag id.
    fn set_tag_size(&mut self, tag_id: u32, size: f64);

    /// Prepares an input buffer for a frame of the given geometry and
    /// returns its offset in linear memory.
    fn set_img_buffer(&mut self, width: u32, height: u32, stride: u32) -> u32;

    /// Runs detection over the last prepared buffer. Returns the result
    /// header offset, or 0 on failure.
    fn detect(&mut self) -> u32;

    fn destroy(&mut self);

    fn memory(&self) -> &[u8];

    fn memory_mut(&mut self) -> &mut [u8];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_the_fixed_tuple() {
        let config = DetectorConfig::default();
        assert_eq!(config.quad_decimate, 2.0);
        assert_eq!(config.quad_sigma, 0.0);
        assert_eq!(config.nthreads, 1);
        assert!(config.refine_edges);
        assert_eq!(config.max_detections, 0);
        assert!(config.return_pose);
        assert!(config.return_solutions);
    }
}
