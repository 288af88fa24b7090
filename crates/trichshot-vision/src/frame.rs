//! Captured frame type.

use std::time::Instant;

/// An immutable BGR8 frame as delivered by a capture device.
///
/// Frames travel through the pipeline as `Arc<Frame>` and are never mutated
/// after capture; each capture tick produces a new frame.
#[derive(Debug, Clone)]
pub struct Frame {
    width: u32,
    height: u32,
    /// Monotonic capture sequence number, starting at 0 per stream
    sequence: u64,
    captured_at: Instant,
    /// Packed BGR pixels, `width * height * 3` bytes
    data: Vec<u8>,
}

impl Frame {
    /// Bytes per pixel for BGR8.
    pub const CHANNELS: usize = 3;

    /// Create a frame from packed BGR bytes.
    ///
    /// Returns `None` when `data` does not match the dimensions.
    pub fn new(width: u32, height: u32, sequence: u64, captured_at: Instant, data: Vec<u8>) -> Option<Self> {
        let expected = width as usize * height as usize * Self::CHANNELS;
        if data.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            sequence,
            captured_at,
            data,
        })
    }

    /// A uniformly black frame, used for synthetic streams.
    pub fn blank(width: u32, height: u32, sequence: u64, captured_at: Instant) -> Self {
        Self {
            width,
            height,
            sequence,
            captured_at,
            data: vec![0; width as usize * height as usize * Self::CHANNELS],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn captured_at(&self) -> Instant {
        self.captured_at
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Age of the frame relative to `now`.
    pub fn age(&self, now: Instant) -> std::time::Duration {
        now.saturating_duration_since(self.captured_at)
    }
}
