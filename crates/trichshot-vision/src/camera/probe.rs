//! Device probing for camera enumeration.

use std::path::PathBuf;
use tracing::debug;
use trichshot_models::Resolution;

use crate::error::{VisionError, VisionResult};

/// What a probe learned about one device.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProbeInfo {
    /// Human-readable name, when the platform exposes one
    pub name: Option<String>,
    /// Resolution of the frame read while probing
    pub resolution: Option<Resolution>,
}

/// Probes camera devices by index.
///
/// Implementations must release any handle they open before returning.
#[cfg_attr(test, mockall::automock)]
pub trait DeviceProbe: Send + Sync {
    /// Whether a device node exists at `index`.
    fn exists(&self, index: u32) -> bool;

    /// Open the device, confirm it delivers frames, and report what was seen.
    fn probe(&self, index: u32) -> VisionResult<ProbeInfo>;
}

/// Probe backed by V4L2 sysfs names and, with the `opencv` feature, a test read.
#[derive(Debug, Clone)]
pub struct SystemProbe {
    dev_root: PathBuf,
    sysfs_root: PathBuf,
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemProbe {
    pub fn new() -> Self {
        Self {
            dev_root: PathBuf::from("/dev"),
            sysfs_root: PathBuf::from("/sys/class/video4linux"),
        }
    }

    /// Use alternate roots for `/dev` and the video4linux sysfs class.
    pub fn with_roots(dev_root: impl Into<PathBuf>, sysfs_root: impl Into<PathBuf>) -> Self {
        Self {
            dev_root: dev_root.into(),
            sysfs_root: sysfs_root.into(),
        }
    }

    fn device_node(&self, index: u32) -> PathBuf {
        self.dev_root.join(format!("video{}", index))
    }

    /// Read the card name V4L2 publishes for the device.
    pub fn read_name(&self, index: u32) -> Option<String> {
        let path = self.sysfs_root.join(format!("video{}", index)).join("name");
        match std::fs::read_to_string(&path) {
            Ok(name) => {
                let name = name.trim();
                (!name.is_empty()).then(|| name.to_string())
            }
            Err(e) => {
                debug!(index, path = %path.display(), error = %e, "Camera name unavailable");
                None
            }
        }
    }

    #[cfg(feature = "opencv")]
    fn test_read(&self, index: u32) -> VisionResult<Option<Resolution>> {
        use opencv::core::Mat;
        use opencv::prelude::*;
        use opencv::videoio::{VideoCapture, CAP_ANY};

        let mut cap = VideoCapture::new(index as i32, CAP_ANY)
            .map_err(|e| VisionError::device_unavailable(index, e.to_string()))?;
        let opened = cap.is_opened().unwrap_or(false);
        if !opened {
            return Err(VisionError::device_unavailable(index, "device did not open"));
        }

        let mut frame = Mat::default();
        let read = cap.read(&mut frame).unwrap_or(false);
        let _ = cap.release();

        if !read || frame.empty() {
            return Err(VisionError::device_unavailable(index, "opened but delivered no frame"));
        }
        Ok(Some(Resolution::new(frame.cols() as u32, frame.rows() as u32)))
    }

    #[cfg(not(feature = "opencv"))]
    fn test_read(&self, _index: u32) -> VisionResult<Option<Resolution>> {
        Ok(None)
    }
}

impl DeviceProbe for SystemProbe {
    fn exists(&self, index: u32) -> bool {
        self.device_node(index).exists()
    }

    fn probe(&self, index: u32) -> VisionResult<ProbeInfo> {
        if !self.exists(index) {
            return Err(VisionError::device_unavailable(index, "no device node"));
        }
        let resolution = self.test_read(index)?;
        Ok(ProbeInfo {
            name: self.read_name(index),
            resolution,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_name_from_sysfs() {
        let dir = tempfile::tempdir().unwrap();
        let card = dir.path().join("video3");
        std::fs::create_dir_all(&card).unwrap();
        std::fs::write(card.join("name"), "HD Pro Webcam C920\n").unwrap();

        let probe = SystemProbe::with_roots(dir.path(), dir.path());
        assert_eq!(probe.read_name(3).as_deref(), Some("HD Pro Webcam C920"));
        assert_eq!(probe.read_name(4), None);
    }

    #[test]
    fn test_missing_node_is_unavailable() {
        let probe = SystemProbe::with_roots("/nonexistent-dev", "/nonexistent-sys");
        assert!(!probe.exists(0));
        assert!(matches!(
            probe.probe(0),
            Err(VisionError::DeviceUnavailable { index: 0, .. })
        ));
    }
}
