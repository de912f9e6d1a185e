// SPDX-License-Identifier: GPL-3.0-only

//! Async detector proxy
//!
//! Detection is CPU work, so the detector lives on its own thread and
//! callers talk to it through channels. The proxy preserves request/response
//! pairing with a oneshot per call and publishes readiness through a watch
//! channel so callers can await warm-up instead of polling empty results.

use std::thread;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, warn};

use crate::detector::binding::Detector;
use crate::detector::module::DetectionModule;
use crate::detector::tag_module::TagModule;
use crate::detector::{DetectOutcome, TagDetection};
use crate::errors::DetectorError;

/// Load state published by the worker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Ready,
    /// The module failed to load; every detect call will report not-ready.
    Failed,
}

struct DetectRequest {
    image: Vec<u8>,
    width: u32,
    height: u32,
    reply: oneshot::Sender<DetectOutcome>,
}

/// Handle to a detector running on a dedicated thread. Handles are cheap to
/// clone; the thread shuts down once the last one is dropped.
#[derive(Clone)]
pub struct TagWorker {
    requests: mpsc::Sender<DetectRequest>,
    ready: watch::Receiver<ReadyState>,
}

impl TagWorker {
    /// Spawns a worker over the built-in engine.
    pub fn spawn() -> Self {
        Self::spawn_with(|| Ok(TagModule::new()))
    }

    /// Spawns a worker over any module loader. The loader runs on the worker
    /// thread, so a slow load never blocks the caller.
    pub fn spawn_with<M, F>(loader: F) -> Self
    where
        M: DetectionModule + Send + 'static,
        F: FnOnce() -> Result<M, DetectorError> + Send + 'static,
    {
        // Capacity 1: a frame in flight plus one queued; older frames are
        // stale anyway.
        let (tx, mut rx) = mpsc::channel::<DetectRequest>(1);
        let (ready_tx, ready_rx) = watch::channel(ReadyState::Loading);

        thread::spawn(move || {
            let mut detector = Detector::new(loader, || {});
            let state = if detector.ready() {
                ReadyState::Ready
            } else {
                ReadyState::Failed
            };
            let _ = ready_tx.send(state);

            while let Some(request) = rx.blocking_recv() {
                let outcome =
                    detector.detect_frame(&request.image, request.width, request.height);
                if request.reply.send(outcome).is_err() {
                    debug!("detect caller went away before the result was ready");
                }
            }
        });

        Self {
            requests: tx,
            ready: ready_rx,
        }
    }

    /// Current load state.
    pub fn ready_state(&self) -> ReadyState {
        *self.ready.borrow()
    }

    /// Waits until the module either becomes ready or fails to load.
    /// Returns true when the detector is usable.
    pub async fn wait_ready(&mut self) -> bool {
        loop {
            match *self.ready.borrow_and_update() {
                ReadyState::Ready => return true,
                ReadyState::Failed => return false,
                ReadyState::Loading => {}
            }
            if self.ready.changed().await.is_err() {
                return false;
            }
        }
    }

    /// Runs detection for one frame on the worker thread.
    pub async fn detect_frame(
        &self,
        image: Vec<u8>,
        width: u32,
        height: u32,
    ) -> Result<DetectOutcome, DetectorError> {
        let (reply, response) = oneshot::channel();
        let request = DetectRequest {
            image,
            width,
            height,
            reply,
        };

        if self.requests.send(request).await.is_err() {
            warn!("detector worker is gone");
            return Err(DetectorError::WorkerGone);
        }
        response.await.map_err(|_| DetectorError::WorkerGone)
    }

    /// Best-effort variant matching the classic binding surface.
    pub async fn detect(&self, image: Vec<u8>, width: u32, height: u32) -> Vec<TagDetection> {
        match self.detect_frame(image, width, height).await {
            Ok(outcome) => outcome.into_tags(),
            Err(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn worker_reports_ready_and_detects_nothing_on_a_flat_frame() {
        let mut worker = TagWorker::spawn();
        assert!(worker.wait_ready().await);

        let outcome = worker
            .detect_frame(vec![0u8; 32 * 32], 32, 32)
            .await
            .unwrap();
        assert_eq!(outcome, DetectOutcome::Tags(Vec::new()));
    }

    #[tokio::test]
    async fn failed_load_resolves_wait_ready_to_false() {
        let mut worker = TagWorker::spawn_with(|| {
            Err::<TagModule, _>(DetectorError::ModuleLoadFailed("missing".into()))
        });

        assert!(!worker.wait_ready().await);
        let outcome = worker
            .detect_frame(vec![0u8; 16 * 16], 16, 16)
            .await
            .unwrap();
        assert_eq!(outcome, DetectOutcome::NotReady);
    }

    #[tokio::test]
    async fn mismatched_buffer_fails_without_killing_the_worker() {
        let mut worker = TagWorker::spawn();
        assert!(worker.wait_ready().await);

        let bad = worker.detect_frame(vec![0u8; 10], 32, 32).await.unwrap();
        assert!(bad.is_failure());

        // The next well-formed frame still works.
        let good = worker
            .detect_frame(vec![0u8; 32 * 32], 32, 32)
            .await
            .unwrap();
        assert_eq!(good, DetectOutcome::Tags(Vec::new()));
    }
}
