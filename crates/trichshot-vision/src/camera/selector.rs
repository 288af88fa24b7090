//! Camera enumeration and preference ordering.

use std::sync::Arc;
use tracing::{debug, info, warn};
use trichshot_models::CameraCandidate;

use super::classify::classify;
use super::probe::{DeviceProbe, SystemProbe};

/// Default number of device indices probed (`/dev/video0` .. `/dev/video9`).
pub const DEFAULT_MAX_DEVICES: u32 = 10;

/// Enumerates cameras and orders them by preference (external first).
#[derive(Clone)]
pub struct CameraSelector {
    probe: Arc<dyn DeviceProbe>,
    max_devices: u32,
}

impl Default for CameraSelector {
    fn default() -> Self {
        Self::new(Arc::new(SystemProbe::new()))
    }
}

impl CameraSelector {
    pub fn new(probe: Arc<dyn DeviceProbe>) -> Self {
        Self {
            probe,
            max_devices: DEFAULT_MAX_DEVICES,
        }
    }

    pub fn with_max_devices(mut self, max_devices: u32) -> Self {
        self.max_devices = max_devices;
        self
    }

    /// Probe device indices and return working cameras, best first.
    ///
    /// Devices that fail to open are skipped; enumeration itself never fails.
    pub fn enumerate(&self) -> Vec<CameraCandidate> {
        let mut candidates = Vec::new();

        for index in 0..self.max_devices {
            if !self.probe.exists(index) {
                continue;
            }

            match self.probe.probe(index) {
                Ok(info) => {
                    let class = classify(info.name.as_deref());
                    let name = info.name.unwrap_or_else(|| "Unknown".to_string());
                    let mut candidate = CameraCandidate::new(index, name, class);
                    if let Some(resolution) = info.resolution {
                        candidate = candidate.with_resolution(resolution);
                    }
                    debug!(index, camera = %candidate, "Camera probed");
                    candidates.push(candidate);
                }
                Err(e) => {
                    warn!(index, error = %e, "Skipping camera that could not be probed");
                }
            }
        }

        order_candidates(&mut candidates);

        if candidates.is_empty() {
            warn!("No working cameras detected");
        } else {
            for candidate in &candidates {
                info!("{}", candidate.describe());
            }
        }

        candidates
    }

    /// The most preferred working camera, if any.
    pub fn preferred(&self) -> Option<CameraCandidate> {
        self.enumerate().into_iter().next()
    }
}

/// Sort by preference rank; discovery order is kept within a rank.
pub fn order_candidates(candidates: &mut [CameraCandidate]) {
    candidates.sort_by_key(|c| c.rank());
}
