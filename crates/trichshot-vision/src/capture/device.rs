//! Capture device abstraction.
//!
//! Devices are blocking and owned by exactly one capture thread. Dropping a
//! device releases the underlying camera handle.

use trichshot_models::{CameraCandidate, PerformanceSettings};

use crate::error::VisionResult;

/// Pixels read from a device, before sequencing/timestamping.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pub width: u32,
    pub height: u32,
    /// Packed BGR8 bytes
    pub data: Vec<u8>,
}

/// A camera handle that yields frames.
pub trait CaptureDevice: Send {
    /// Block until the next image is available.
    ///
    /// `Ok(None)` means the stream has ended.
    fn read(&mut self) -> VisionResult<Option<CapturedImage>>;

    /// Re-apply resolution/FPS hints. Devices may ignore them.
    fn apply_settings(&mut self, settings: &PerformanceSettings) -> VisionResult<()>;

    /// Device label for logging.
    fn label(&self) -> String;
}

/// Opens capture devices for a camera candidate.
pub trait DeviceOpener: Send + Sync {
    fn open(
        &self,
        candidate: &CameraCandidate,
        settings: &PerformanceSettings,
    ) -> VisionResult<Box<dyn CaptureDevice>>;
}
