//! Frame acquisition.
//!
//! A [`FrameSource`] owns one open camera and a dedicated capture thread.
//! Frames reach the pipeline through a single latest-frame slot, so a slow
//! consumer sees fresh frames rather than a backlog.

pub mod device;
#[cfg(feature = "opencv")]
pub mod opencv_device;
pub mod slot;
pub mod source;

pub use device::{CaptureDevice, CapturedImage, DeviceOpener};
#[cfg(feature = "opencv")]
pub use opencv_device::{OpenCvDevice, OpenCvOpener};
pub use slot::{frame_slot, FrameReader, FrameWriter};
pub use source::{FrameSource, DEFAULT_RELEASE_TIMEOUT, MAX_CONSECUTIVE_READ_FAILURES};
