// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the detector binding
//!
//! Exercises the binding against the built-in engine and against a scripted
//! fake module that injects wire-level faults.

use wayfinder::detector::{
    DetectOutcome, DetectionModule, Detector, DetectorConfig, TagWorker,
};
use wayfinder::errors::DetectorError;
use wayfinder::vision::family::render_marker;

/// Renders a marker centered on a white canvas.
fn synthetic_frame(id: u32, module_px: usize, canvas: usize) -> Vec<u8> {
    let (marker, edge) = render_marker(id, module_px);
    let mut img = vec![255u8; canvas * canvas];
    let offset = (canvas - edge) / 2;
    for y in 0..edge {
        for x in 0..edge {
            img[(offset + y) * canvas + offset + x] = marker[y * edge + x];
        }
    }
    img
}

#[test]
fn all_black_frame_detects_nothing() {
    let mut detector = Detector::with_default_module(|| {});
    let outcome = detector.detect_frame(&vec![0u8; 64 * 64], 64, 64);
    assert_eq!(outcome, DetectOutcome::Tags(Vec::new()));
}

#[test]
fn centered_synthetic_tag_is_found_with_its_corners() {
    let frame = synthetic_frame(2, 6, 64);

    let mut detector = Detector::with_default_module(|| {});
    let tags = detector.detect(&frame, 64, 64);

    assert_eq!(tags.len(), 1);
    let tag = &tags[0];
    assert_eq!(tag.id, 2);

    assert!((tag.center.x - 32.0).abs() < 3.0);
    assert!((tag.center.y - 32.0).abs() < 3.0);

    // The marker occupies 42x42 pixels at offset 11; every rendered corner
    // must match one detected corner within a few pixels.
    let expected = [(11.0, 11.0), (52.0, 11.0), (52.0, 52.0), (11.0, 52.0)];
    for (ex, ey) in expected {
        let matched = tag.corners.iter().any(|corner| {
            (corner.x - ex).abs() < 3.0 && (corner.y - ey).abs() < 3.0
        });
        assert!(matched, "no detected corner near ({ex}, {ey}): {:?}", tag.corners);
    }
}

#[test]
fn detect_is_idempotent_across_identical_frames() {
    let frame = synthetic_frame(1, 6, 64);
    let mut detector = Detector::with_default_module(|| {});

    let first = detector.detect(&frame, 64, 64);
    let second = detector.detect(&frame, 64, 64);
    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
}

#[test]
fn ready_callback_fires_once_the_module_loads() {
    let mut fired = false;
    let detector = Detector::with_default_module(|| fired = true);
    assert!(fired);
    assert!(detector.ready());
}

#[test]
fn failed_load_reports_not_ready_forever() {
    let mut detector = Detector::new(
        || Err::<FakeModule, _>(DetectorError::ModuleLoadFailed("missing".into())),
        || panic!("ready callback must not fire on a failed load"),
    );

    let outcome = detector.detect_frame(&vec![0u8; 16 * 16], 16, 16);
    assert_eq!(outcome, DetectOutcome::NotReady);
    assert!(outcome.into_tags().is_empty());
}

#[test]
fn mismatched_buffer_is_rejected_before_the_module_runs() {
    let mut detector = Detector::with_default_module(|| {});

    let outcome = detector.detect_frame(&vec![0u8; 100], 64, 64);
    assert_eq!(outcome, DetectOutcome::Failed);

    // The detector is still usable afterwards.
    let outcome = detector.detect_frame(&vec![255u8; 64 * 64], 64, 64);
    assert_eq!(outcome, DetectOutcome::Tags(Vec::new()));
}

// --- wire-level fault injection -----------------------------------------

/// What the fake module writes when `detect` is called.
enum Script {
    /// Return a null result pointer.
    NullPtr,
    /// A header announcing zero JSON bytes.
    ZeroLen,
    /// A header whose body is not valid JSON.
    Garbage,
    /// A header pointing past the end of memory.
    OutOfBounds,
    /// A fixed well-formed JSON payload.
    Payload(&'static str),
}

struct FakeModule {
    memory: Vec<u8>,
    script: Script,
}

impl FakeModule {
    fn new(script: Script) -> Self {
        Self {
            memory: vec![0; 4096],
            script,
        }
    }

    fn write_result(&mut self, body: &[u8], announced_ptr: u32) -> u32 {
        let header = 8usize;
        let json_offset = 1024usize;
        self.memory[json_offset..json_offset + body.len()].copy_from_slice(body);
        self.memory[header..header + 4].copy_from_slice(&(body.len() as u32).to_le_bytes());
        self.memory[header + 4..header + 8].copy_from_slice(&announced_ptr.to_le_bytes());
        header as u32
    }
}

impl DetectionModule for FakeModule {
    fn init(&mut self) -> Result<(), DetectorError> {
        Ok(())
    }

    fn set_detector_options(&mut self, _config: &DetectorConfig) {}
    fn set_family(&mut self, _max_hamming: u32) {}
    fn set_pose_info(&mut self, _fx: f64, _fy: f64, _cx: f64, _cy: f64) {}
    fn set_tag_size(&mut self, _tag_id: u32, _size: f64) {}

    fn set_img_buffer(&mut self, _width: u32, height: u32, stride: u32) -> u32 {
        let needed = 16 + (stride as usize) * (height as usize);
        if self.memory.len() < needed {
            self.memory.resize(needed, 0);
        }
        16
    }

    fn detect(&mut self) -> u32 {
        match self.script {
            Script::NullPtr => 0,
            Script::ZeroLen => self.write_result(b"", 1024),
            Script::Garbage => self.write_result(b"{not json at all", 1024),
            Script::OutOfBounds => {
                let len = 64u32;
                let header = 8usize;
                self.memory[header..header + 4].copy_from_slice(&len.to_le_bytes());
                let mem_len = self.memory.len() as u32;
                self.memory[header + 4..header + 8].copy_from_slice(&mem_len.to_le_bytes());
                header as u32
            }
            Script::Payload(json) => self.write_result(json.as_bytes(), 1024),
        }
    }

    fn destroy(&mut self) {}

    fn memory(&self) -> &[u8] {
        &self.memory
    }

    fn memory_mut(&mut self) -> &mut [u8] {
        &mut self.memory
    }
}

fn scripted_detector(script: Script) -> Detector<FakeModule> {
    Detector::new(|| Ok(FakeModule::new(script)), || {})
}

#[test]
fn null_result_pointer_is_a_transient_failure() {
    let mut detector = scripted_detector(Script::NullPtr);
    let outcome = detector.detect_frame(&vec![0u8; 16 * 16], 16, 16);
    assert_eq!(outcome, DetectOutcome::Failed);
}

#[test]
fn zero_length_result_means_no_detections() {
    let mut detector = scripted_detector(Script::ZeroLen);
    let outcome = detector.detect_frame(&vec![0u8; 16 * 16], 16, 16);
    assert_eq!(outcome, DetectOutcome::Tags(Vec::new()));
}

#[test]
fn malformed_json_degrades_without_raising() {
    let mut detector = scripted_detector(Script::Garbage);
    let outcome = detector.detect_frame(&vec![0u8; 16 * 16], 16, 16);
    assert_eq!(outcome, DetectOutcome::Failed);
    assert!(outcome.into_tags().is_empty());
}

#[test]
fn out_of_bounds_result_is_caught() {
    let mut detector = scripted_detector(Script::OutOfBounds);
    let outcome = detector.detect_frame(&vec![0u8; 16 * 16], 16, 16);
    assert_eq!(outcome, DetectOutcome::Failed);
}

#[test]
fn well_formed_payload_parses_into_records() {
    let json = r#"[{"id":7,"hamming":0,"center":{"x":32.0,"y":32.0},
        "corners":[{"x":12.0,"y":12.0},{"x":52.0,"y":12.0},
                   {"x":52.0,"y":52.0},{"x":12.0,"y":52.0}]}]"#;
    let mut detector = scripted_detector(Script::Payload(json));

    let tags = detector.detect(&vec![0u8; 16 * 16], 16, 16);
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].id, 7);
    assert!(tags[0].pose.is_none());
}

#[tokio::test]
async fn worker_end_to_end_detects_the_synthetic_tag() {
    let frame = synthetic_frame(3, 6, 64);

    let mut worker = TagWorker::spawn();
    assert!(worker.wait_ready().await);

    let tags = worker.detect(frame, 64, 64).await;
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].id, 3);

    // Default options request pose with both solutions.
    let pose = tags[0].pose.as_ref().expect("pose enabled by default");
    assert!(pose.translation[2] > 0.0);
    assert!(pose.asol.is_some());
}
