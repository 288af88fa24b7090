//! Single-slot, latest-frame-wins handoff between capture and pipeline.
//!
//! The writer replaces whatever frame is pending; the reader always gets the
//! most recent one. Frames are published whole behind an `Arc`, so a reader
//! never observes a partially written frame.

use std::sync::Arc;
use tokio::sync::watch;

use crate::frame::Frame;

/// Create a connected writer/reader pair.
pub fn frame_slot() -> (FrameWriter, FrameReader) {
    let (tx, rx) = watch::channel(None);
    (
        FrameWriter { tx },
        FrameReader {
            rx,
            last_sequence: None,
            overwritten: 0,
        },
    )
}

/// Capture side of the slot. Dropping it ends the stream.
#[derive(Debug)]
pub struct FrameWriter {
    tx: watch::Sender<Option<Arc<Frame>>>,
}

impl FrameWriter {
    /// Publish a frame, replacing any frame the reader has not taken yet.
    pub fn publish(&self, frame: Frame) {
        self.tx.send_replace(Some(Arc::new(frame)));
    }

    /// Whether the reader side is gone.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Pipeline side of the slot.
#[derive(Debug)]
pub struct FrameReader {
    rx: watch::Receiver<Option<Arc<Frame>>>,
    last_sequence: Option<u64>,
    overwritten: u64,
}

impl FrameReader {
    /// Wait for a frame newer than the last one returned.
    ///
    /// Returns `None` once the writer is dropped (end of stream).
    pub async fn next(&mut self) -> Option<Arc<Frame>> {
        loop {
            if self.rx.changed().await.is_err() {
                return None;
            }
            let frame = self.rx.borrow_and_update().clone();
            if let Some(frame) = frame {
                self.note_sequence(frame.sequence());
                return Some(frame);
            }
        }
    }

    /// Take the pending frame without waiting, if there is one.
    pub fn try_next(&mut self) -> Option<Arc<Frame>> {
        if !self.rx.has_changed().unwrap_or(false) {
            return None;
        }
        let frame = self.rx.borrow_and_update().clone()?;
        self.note_sequence(frame.sequence());
        Some(frame)
    }

    /// Frames replaced in the slot before the reader took them.
    pub fn overwritten(&self) -> u64 {
        self.overwritten
    }

    fn note_sequence(&mut self, sequence: u64) {
        if let Some(last) = self.last_sequence {
            self.overwritten += sequence.saturating_sub(last + 1);
        }
        self.last_sequence = Some(sequence);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn frame(seq: u64) -> Frame {
        Frame::blank(2, 2, seq, Instant::now())
    }

    #[tokio::test]
    async fn test_latest_frame_wins() {
        let (writer, mut reader) = frame_slot();
        writer.publish(frame(0));
        writer.publish(frame(1));
        writer.publish(frame(2));

        let got = reader.next().await.unwrap();
        assert_eq!(got.sequence(), 2);
        assert!(reader.try_next().is_none());
    }

    #[tokio::test]
    async fn test_counts_overwritten_frames() {
        let (writer, mut reader) = frame_slot();
        writer.publish(frame(0));
        assert_eq!(reader.next().await.unwrap().sequence(), 0);

        writer.publish(frame(1));
        writer.publish(frame(2));
        writer.publish(frame(3));
        assert_eq!(reader.next().await.unwrap().sequence(), 3);
        assert_eq!(reader.overwritten(), 2);
    }

    #[tokio::test]
    async fn test_end_of_stream_when_writer_dropped() {
        let (writer, mut reader) = frame_slot();
        drop(writer);
        assert!(reader.next().await.is_none());
    }
}
