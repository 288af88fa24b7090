//! Hand detection: inference seam, frame-skip scheduling and proximity scoring.

pub mod provider;
pub mod proximity;
pub mod scheduler;

pub use provider::{LandmarkProvider, NullLandmarkProvider};
pub use proximity::{evaluate, ProximityResult};
pub use scheduler::{decide, CachedLandmarks, Decision, FrameScheduler};

#[cfg(test)]
pub use provider::MockLandmarkProvider;
