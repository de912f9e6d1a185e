// SPDX-License-Identifier: GPL-3.0-only

//! Tag detector binding
//!
//! Drives a detection module through a narrow memory-and-calls interface:
//! the frame is copied into the module's linear memory, `detect` returns a
//! pointer to a length-prefixed UTF-8 JSON header, and the binding parses
//! the result out. [`worker::TagWorker`] wraps the whole thing behind an
//! async proxy so frame processing never blocks callers.

pub mod binding;
pub mod module;
pub mod tag_module;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use binding::Detector;
pub use module::{DetectionModule, DetectorConfig};
pub use tag_module::TagModule;
pub use worker::TagWorker;

/// 2D point as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WirePoint {
    pub x: f64,
    pub y: f64,
}

/// One pose hypothesis on the wire: rotation matrix, translation vector and
/// reprojection error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagPoseSolution {
    #[serde(rename = "R")]
    pub rotation: [[f64; 3]; 3],
    #[serde(rename = "t")]
    pub translation: [f64; 3],
    #[serde(rename = "e")]
    pub error: f64,
}

/// Pose block of a detection record. `asol` carries the alternative POSIT
/// hypothesis when the module is configured to return both solutions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagPose {
    #[serde(rename = "R")]
    pub rotation: [[f64; 3]; 3],
    #[serde(rename = "t")]
    pub translation: [f64; 3],
    #[serde(rename = "e")]
    pub error: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asol: Option<TagPoseSolution>,
}

/// One detected tag as encoded in the module's JSON result array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagDetection {
    pub id: u32,
    #[serde(default)]
    pub hamming: u32,
    /// Physical tag edge length in meters used for the pose estimate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    pub center: WirePoint,
    pub corners: [WirePoint; 4],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pose: Option<TagPose>,
}

/// Outcome of one `detect` call. Callers that only care about tags can
/// flatten it with [`DetectOutcome::into_tags`]; the variants let them tell
/// warm-up and transient failures apart from a genuinely empty frame.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectOutcome {
    /// The module has not finished loading, or failed to load.
    NotReady,
    /// This call failed (bad buffer, marshaling fault); the detector stays
    /// usable for subsequent frames.
    Failed,
    /// Detection ran; the list may be empty.
    Tags(Vec<TagDetection>),
}

impl DetectOutcome {
    /// Collapses the tri-state to the classic best-effort list.
    pub fn into_tags(self) -> Vec<TagDetection> {
        match self {
            DetectOutcome::Tags(tags) => tags,
            DetectOutcome::NotReady | DetectOutcome::Failed => Vec::new(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, DetectOutcome::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_record_round_trips_through_json() {
        let record = TagDetection {
            id: 2,
            hamming: 0,
            size: Some(0.15),
            center: WirePoint { x: 32.0, y: 32.0 },
            corners: [
                WirePoint { x: 12.0, y: 12.0 },
                WirePoint { x: 52.0, y: 12.0 },
                WirePoint { x: 52.0, y: 52.0 },
                WirePoint { x: 12.0, y: 52.0 },
            ],
            pose: None,
        };

        let json = serde_json::to_string(&[record.clone()]).unwrap();
        let parsed: Vec<TagDetection> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vec![record]);
    }

    #[test]
    fn pose_fields_use_short_wire_names() {
        let pose = TagPose {
            rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            translation: [0.0, 0.0, 1.5],
            error: 0.3,
            asol: None,
        };
        let json = serde_json::to_string(&pose).unwrap();
        assert!(json.contains("\"R\""));
        assert!(json.contains("\"t\""));
        assert!(json.contains("\"e\""));
        assert!(!json.contains("asol"));
    }

    #[test]
    fn outcome_flattens_to_tags() {
        assert!(DetectOutcome::NotReady.into_tags().is_empty());
        assert!(DetectOutcome::Failed.into_tags().is_empty());
        assert!(DetectOutcome::Failed.is_failure());
        assert!(!DetectOutcome::Tags(Vec::new()).is_failure());
    }
}
