//! OpenCV `VideoCapture` backed camera device.

use opencv::{
    core::{self, Mat},
    prelude::*,
    videoio::{
        VideoCapture, CAP_ANY, CAP_PROP_FPS, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH,
    },
};
use tracing::{debug, info, warn};
use trichshot_models::{CameraCandidate, PerformanceSettings};

use super::device::{CaptureDevice, CapturedImage, DeviceOpener};
use crate::error::{VisionError, VisionResult};

/// A local camera opened through OpenCV.
pub struct OpenCvDevice {
    index: u32,
    cap: VideoCapture,
    mirror: bool,
    raw: Mat,
    flipped: Mat,
}

impl OpenCvDevice {
    /// Open `/dev/video{index}` and confirm it delivers a frame.
    pub fn open(index: u32, settings: &PerformanceSettings, mirror: bool) -> VisionResult<Self> {
        let cap = VideoCapture::new(index as i32, CAP_ANY)
            .map_err(|e| VisionError::device_unavailable(index, e.to_string()))?;
        if !cap.is_opened().unwrap_or(false) {
            return Err(VisionError::device_unavailable(index, "could not open camera"));
        }

        let mut device = Self {
            index,
            cap,
            mirror,
            raw: Mat::default(),
            flipped: Mat::default(),
        };
        device.apply_settings(settings)?;

        // A camera that opens but never delivers is as good as missing.
        if device.read()?.is_none() {
            return Err(VisionError::device_unavailable(
                index,
                "camera opened but cannot read frames",
            ));
        }

        info!(index, mirror, "Camera opened");
        Ok(device)
    }
}

impl CaptureDevice for OpenCvDevice {
    fn read(&mut self) -> VisionResult<Option<CapturedImage>> {
        let ok = self
            .cap
            .read(&mut self.raw)
            .map_err(|e| VisionError::device_unavailable(self.index, e.to_string()))?;
        if !ok || self.raw.empty() {
            return Ok(None);
        }

        let src = if self.mirror {
            core::flip(&self.raw, &mut self.flipped, 1)?;
            &self.flipped
        } else {
            &self.raw
        };

        let width = src.cols() as u32;
        let height = src.rows() as u32;
        let data = if src.is_continuous() {
            src.data_bytes()?.to_vec()
        } else {
            src.try_clone()?.data_bytes()?.to_vec()
        };

        Ok(Some(CapturedImage { width, height, data }))
    }

    fn apply_settings(&mut self, settings: &PerformanceSettings) -> VisionResult<()> {
        let hints = [
            (CAP_PROP_FRAME_WIDTH, settings.resolution.width as f64),
            (CAP_PROP_FRAME_HEIGHT, settings.resolution.height as f64),
            (CAP_PROP_FPS, settings.target_fps as f64),
        ];
        for (prop, value) in hints {
            // Devices report false for unsupported hints; that is not an error.
            if !self.cap.set(prop, value)? {
                debug!(index = self.index, prop, value, "Camera ignored capture hint");
            }
        }

        let actual_w = self.cap.get(CAP_PROP_FRAME_WIDTH).unwrap_or(0.0);
        let actual_h = self.cap.get(CAP_PROP_FRAME_HEIGHT).unwrap_or(0.0);
        if actual_w as u32 != settings.resolution.width || actual_h as u32 != settings.resolution.height {
            warn!(
                index = self.index,
                requested = %settings.resolution,
                actual = format!("{}x{}", actual_w, actual_h),
                "Camera delivers a different resolution than requested"
            );
        }
        Ok(())
    }

    fn label(&self) -> String {
        format!("opencv:{}", self.index)
    }
}

impl Drop for OpenCvDevice {
    fn drop(&mut self) {
        if let Err(e) = self.cap.release() {
            warn!(index = self.index, error = %e, "Failed to release camera");
        } else {
            debug!(index = self.index, "Camera handle released");
        }
    }
}

/// Opens cameras through OpenCV.
#[derive(Debug, Clone, Default)]
pub struct OpenCvOpener {
    mirror: bool,
}

impl OpenCvOpener {
    pub fn new(mirror: bool) -> Self {
        Self { mirror }
    }
}

impl DeviceOpener for OpenCvOpener {
    fn open(
        &self,
        candidate: &CameraCandidate,
        settings: &PerformanceSettings,
    ) -> VisionResult<Box<dyn CaptureDevice>> {
        Ok(Box::new(OpenCvDevice::open(candidate.index, settings, self.mirror)?))
    }
}
