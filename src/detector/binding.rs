// SPDX-License-Identifier: GPL-3.0-only

//! The detector binding proper
//!
//! Owns a [`DetectionModule`] and turns raw grayscale frames into parsed
//! detection lists. Per-call failures never poison the binding: a bad frame
//! or a marshaling fault yields [`DetectOutcome::Failed`] and the next call
//! starts clean.

use rand::RngExt;
use tracing::{debug, info, warn};

use crate::constants::{FRAME_DIAG_RATE, RESULT_DIAG_RATE};
use crate::detector::module::{DetectionModule, DetectorConfig};
use crate::detector::tag_module::TagModule;
use crate::detector::{DetectOutcome, TagDetection};
use crate::errors::DetectorError;

pub struct Detector<M: DetectionModule> {
    module: Option<M>,
    config: DetectorConfig,
}

impl Detector<TagModule> {
    /// Builds a detector over the built-in engine.
    pub fn with_default_module<R: FnOnce()>(on_ready: R) -> Self {
        Self::new(|| Ok(TagModule::new()), on_ready)
    }
}

impl<M: DetectionModule> Detector<M> {
    /// Loads and configures a detection module. `on_ready` fires once the
    /// module is initialized; when loading fails the detector stays in the
    /// not-ready state and every `detect_frame` call reports that.
    pub fn new<F, R>(loader: F, on_ready: R) -> Self
    where
        F: FnOnce() -> Result<M, DetectorError>,
        R: FnOnce(),
    {
        let module = match loader() {
            Ok(mut module) => match module.init() {
                Ok(()) => {
                    module.set_detector_options(&DetectorConfig::default());
                    info!("detector ready");
                    on_ready();
                    Some(module)
                }
                Err(err) => {
                    warn!(error = %err, "detection module failed to initialize");
                    None
                }
            },
            Err(err) => {
                warn!(error = %err, "detection module failed to load");
                None
            }
        };

        Self {
            module,
            config: DetectorConfig::default(),
        }
    }

    pub fn ready(&self) -> bool {
        self.module.is_some()
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Runs detection over one grayscale frame. The buffer must hold exactly
    /// `width * height` bytes; anything else is rejected before touching the
    /// module.
    pub fn detect_frame(&mut self, image: &[u8], width: u32, height: u32) -> DetectOutcome {
        let Some(module) = self.module.as_mut() else {
            debug!("detect called before the module is ready");
            return DetectOutcome::NotReady;
        };

        let expected = (width as usize) * (height as usize);
        if image.len() != expected {
            warn!(
                got = image.len(),
                expected,
                width,
                height,
                "frame buffer does not match its dimensions"
            );
            return DetectOutcome::Failed;
        }

        let mut rng = rand::rng();
        if rng.random::<f64>() < FRAME_DIAG_RATE {
            debug!(
                width,
                height,
                bytes = image.len(),
                head = ?&image[..image.len().min(10)],
                "frame diagnostics"
            );
        }

        let offset = module.set_img_buffer(width, height, width) as usize;
        let memory = module.memory_mut();
        let Some(input) = memory.get_mut(offset..offset + expected) else {
            warn!(offset, expected, "module returned an undersized input buffer");
            return DetectOutcome::Failed;
        };
        input.copy_from_slice(image);

        let header = module.detect() as usize;
        if header == 0 {
            warn!("detection returned a null result");
            return DetectOutcome::Failed;
        }

        let memory = module.memory();
        let Some(header_bytes) = memory.get(header..header + 8) else {
            warn!(header, "result header lies outside module memory");
            return DetectOutcome::Failed;
        };
        let len = u32::from_le_bytes([
            header_bytes[0],
            header_bytes[1],
            header_bytes[2],
            header_bytes[3],
        ]) as usize;
        if len == 0 {
            return DetectOutcome::Tags(Vec::new());
        }
        let ptr = u32::from_le_bytes([
            header_bytes[4],
            header_bytes[5],
            header_bytes[6],
            header_bytes[7],
        ]) as usize;

        let Some(json) = memory.get(ptr..ptr + len) else {
            warn!(ptr, len, "result body lies outside module memory");
            return DetectOutcome::Failed;
        };

        let tags: Vec<TagDetection> = match serde_json::from_slice(json) {
            Ok(tags) => tags,
            Err(err) => {
                warn!(error = %err, "failed to parse detection result");
                return DetectOutcome::Failed;
            }
        };

        if !tags.is_empty() && rng.random::<f64>() < RESULT_DIAG_RATE {
            debug!(result = %String::from_utf8_lossy(json), "detection diagnostics");
        }

        DetectOutcome::Tags(tags)
    }

    /// Best-effort variant: collapses warm-up and failures to an empty list.
    pub fn detect(&mut self, image: &[u8], width: u32, height: u32) -> Vec<TagDetection> {
        self.detect_frame(image, width, height).into_tags()
    }
}

impl<M: DetectionModule> Drop for Detector<M> {
    fn drop(&mut self) {
        if let Some(mut module) = self.module.take() {
            module.destroy();
        }
    }
}
