//! Frame-skip scheduling and landmark result caching.
//!
//! Inference runs on frame indices where `index % (frame_skip + 1) == 0`;
//! every other frame reuses the most recent result. The cached result carries
//! the index of the frame it came from so staleness is checked, not assumed.

use std::sync::Arc;
use tracing::debug;
use trichshot_models::LandmarkSet;

use crate::error::{VisionError, VisionResult};

/// What to do with the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    RunInference,
    UseCached,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::RunInference => "run_inference",
            Decision::UseCached => "use_cached",
        }
    }
}

/// The frame-skip rule on its own.
pub fn decide(frame_index: u64, frame_skip: u32) -> Decision {
    if frame_index % (frame_skip as u64 + 1) == 0 {
        Decision::RunInference
    } else {
        Decision::UseCached
    }
}

/// Landmarks from the last inference run.
#[derive(Debug, Clone)]
pub struct CachedLandmarks {
    /// Frame index the landmarks were computed for
    pub frame_index: u64,
    pub landmarks: Arc<Vec<LandmarkSet>>,
}

/// Per-frame scheduler with a single-entry result cache.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    frame_skip: u32,
    next_index: u64,
    cache: Option<CachedLandmarks>,
}

impl FrameScheduler {
    pub fn new(frame_skip: u32) -> Self {
        Self {
            frame_skip,
            next_index: 0,
            cache: None,
        }
    }

    pub fn frame_skip(&self) -> u32 {
        self.frame_skip
    }

    /// Change the skip factor; takes effect on the next decision.
    pub fn set_frame_skip(&mut self, frame_skip: u32) {
        if frame_skip != self.frame_skip {
            debug!(from = self.frame_skip, to = frame_skip, "Frame skip changed");
            self.frame_skip = frame_skip;
        }
    }

    /// Number of decisions made so far.
    pub fn frames_seen(&self) -> u64 {
        self.next_index
    }

    /// Decide for the next frame and advance the frame counter.
    ///
    /// Returns the frame index alongside the decision. Before the cache is
    /// primed, and whenever the cached result is older than `frame_skip`
    /// frames, the decision is always [`Decision::RunInference`].
    pub fn next_decision(&mut self) -> (u64, Decision) {
        let index = self.next_index;
        self.next_index += 1;

        let decision = match &self.cache {
            None => Decision::RunInference,
            Some(cached) => match decide(index, self.frame_skip) {
                Decision::RunInference => Decision::RunInference,
                Decision::UseCached if index - cached.frame_index > self.frame_skip as u64 => {
                    debug!(
                        frame_index = index,
                        cached_from = cached.frame_index,
                        "Cached landmarks too old, forcing inference"
                    );
                    Decision::RunInference
                }
                Decision::UseCached => Decision::UseCached,
            },
        };

        (index, decision)
    }

    /// Store the result of an inference run (an empty result is still a result).
    pub fn store(&mut self, frame_index: u64, landmarks: Vec<LandmarkSet>) -> Arc<Vec<LandmarkSet>> {
        let landmarks = Arc::new(landmarks);
        self.cache = Some(CachedLandmarks {
            frame_index,
            landmarks: Arc::clone(&landmarks),
        });
        landmarks
    }

    /// The cached landmarks, or `NoCachedResult` before the first inference.
    pub fn cached(&self) -> VisionResult<Arc<Vec<LandmarkSet>>> {
        self.cache
            .as_ref()
            .map(|c| Arc::clone(&c.landmarks))
            .ok_or(VisionError::NoCachedResult)
    }

    /// Frames between the cached result and the most recent decision.
    pub fn staleness(&self) -> Option<u64> {
        let cached = self.cache.as_ref()?;
        Some(self.next_index.saturating_sub(1).saturating_sub(cached.frame_index))
    }

    /// Forget the cache and restart counting from frame 0.
    pub fn reset(&mut self) {
        self.next_index = 0;
        self.cache = None;
    }
}
