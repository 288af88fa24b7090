//! Hand landmark inference seam.
//!
//! The landmark model itself lives outside this crate; anything that can turn
//! a frame into hand keypoints plugs in through [`LandmarkProvider`].

use async_trait::async_trait;
use trichshot_models::LandmarkSet;

use crate::error::VisionResult;
use crate::frame::Frame;

/// Hand landmark inference provider.
///
/// Calls may take a while; the pipeline runs each one on its own task, bounds
/// it with a timeout and treats any error as "no hands" for that frame.
///
/// `infer` must not block the executor. CPU-bound models should run their
/// forward pass under `tokio::task::spawn_blocking` and await the result.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LandmarkProvider: Send + Sync {
    /// Detect hands in a frame.
    ///
    /// # Returns
    /// One landmark set per detected hand, possibly empty.
    async fn infer(&self, frame: &Frame) -> VisionResult<Vec<LandmarkSet>>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

/// Provider that never detects anything.
///
/// Used when no landmark model is wired in; the rest of the pipeline (capture,
/// scheduling, stats) still runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLandmarkProvider;

#[async_trait]
impl LandmarkProvider for NullLandmarkProvider {
    async fn infer(&self, _frame: &Frame) -> VisionResult<Vec<LandmarkSet>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "null"
    }
}
