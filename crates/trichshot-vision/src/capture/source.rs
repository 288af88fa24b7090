//! Frame source: a camera device driven by its own capture thread.
//!
//! The capture thread reads at the device's pace (capped at the target FPS)
//! and publishes into a [`frame_slot`], so inference latency on the consumer
//! side never stalls camera reads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tokio::sync::{oneshot, watch};
use tracing::{debug, error, info, warn};
use trichshot_models::{CameraCandidate, PerformanceSettings};

use super::device::{CaptureDevice, DeviceOpener};
use super::slot::{frame_slot, FrameReader, FrameWriter};
use crate::error::{VisionError, VisionResult};
use crate::frame::Frame;

/// Consecutive read errors tolerated before the stream is declared dead.
pub const MAX_CONSECUTIVE_READ_FAILURES: u32 = 5;

/// How long `close` waits for the capture thread to release the camera.
pub const DEFAULT_RELEASE_TIMEOUT: Duration = Duration::from_secs(2);

/// An open camera streaming frames into a latest-frame slot.
pub struct FrameSource {
    camera: CameraCandidate,
    reader: FrameReader,
    stop: Arc<AtomicBool>,
    released: Option<oneshot::Receiver<VisionResult<()>>>,
    thread: Option<JoinHandle<()>>,
}

impl FrameSource {
    /// Open `candidate` and start capturing.
    ///
    /// Blocks while the device opens. Settings changes published on
    /// `settings` are re-applied to the device as hints.
    pub fn open(
        opener: &dyn DeviceOpener,
        candidate: &CameraCandidate,
        settings: watch::Receiver<PerformanceSettings>,
    ) -> VisionResult<Self> {
        let initial = *settings.borrow();
        let device = opener.open(candidate, &initial)?;
        Self::spawn(candidate.clone(), device, settings)
    }

    /// Start capturing from an already opened device.
    pub fn spawn(
        camera: CameraCandidate,
        device: Box<dyn CaptureDevice>,
        settings: watch::Receiver<PerformanceSettings>,
    ) -> VisionResult<Self> {
        let (writer, reader) = frame_slot();
        let stop = Arc::new(AtomicBool::new(false));
        let (released_tx, released_rx) = oneshot::channel();

        let worker = CaptureWorker {
            device,
            writer,
            settings,
            stop: Arc::clone(&stop),
            camera_index: camera.index,
        };

        let thread = std::thread::Builder::new()
            .name(format!("capture-{}", camera.index))
            .spawn(move || {
                let ended = worker.run();
                let _ = released_tx.send(ended);
            })
            .map_err(|e| VisionError::internal(format!("failed to spawn capture thread: {}", e)))?;

        info!(camera = %camera, "Capture started");

        Ok(Self {
            camera,
            reader,
            stop,
            released: Some(released_rx),
            thread: Some(thread),
        })
    }

    /// Camera this source is reading from.
    pub fn camera(&self) -> &CameraCandidate {
        &self.camera
    }

    /// Wait for the next (most recent) frame; `None` at end of stream.
    pub async fn next_frame(&mut self) -> Option<Arc<Frame>> {
        self.reader.next().await
    }

    /// Frames the pipeline never saw because a newer one replaced them.
    pub fn frames_overwritten(&self) -> u64 {
        self.reader.overwritten()
    }

    /// Stop capturing and wait (bounded) for the camera to be released.
    ///
    /// Returns why capture ended: `Ok` when it stopped on request,
    /// `EndOfStream` or `DeviceUnavailable` when the camera gave out first,
    /// `Timeout` when the thread has not released the camera in time.
    pub async fn close(mut self, timeout: Duration) -> VisionResult<()> {
        self.stop.store(true, Ordering::Release);

        let Some(released) = self.released.take() else {
            return Ok(());
        };
        match tokio::time::timeout(timeout, released).await {
            Ok(ended) => {
                if let Some(thread) = self.thread.take() {
                    let _ = thread.join();
                }
                info!(camera = %self.camera, "Capture stopped, camera released");
                ended.unwrap_or_else(|_| Err(VisionError::internal("capture thread exited without a result")))
            }
            Err(_) => {
                error!(
                    camera = %self.camera,
                    timeout_ms = timeout.as_millis() as u64,
                    "Capture thread did not stop in time; it will release the camera when its read returns"
                );
                Err(VisionError::Timeout(timeout.as_millis() as u64))
            }
        }
    }
}

impl Drop for FrameSource {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
    }
}

struct CaptureWorker {
    device: Box<dyn CaptureDevice>,
    writer: FrameWriter,
    settings: watch::Receiver<PerformanceSettings>,
    stop: Arc<AtomicBool>,
    camera_index: u32,
}

impl CaptureWorker {
    fn run(mut self) -> VisionResult<()> {
        let label = self.device.label();
        let mut current = *self.settings.borrow_and_update();
        let mut sequence: u64 = 0;
        let mut failures: u32 = 0;
        let mut ended = Ok(());

        debug!(device = %label, "Capture loop running");

        while !self.stop.load(Ordering::Acquire) && !self.writer.is_closed() {
            if self.settings.has_changed().unwrap_or(false) {
                let next = *self.settings.borrow_and_update();
                if next.resolution != current.resolution || next.target_fps != current.target_fps {
                    if let Err(e) = self.device.apply_settings(&next) {
                        warn!(device = %label, error = %e, "Failed to apply capture settings");
                    }
                }
                current = next;
            }

            let started = Instant::now();
            match self.device.read() {
                Ok(Some(image)) => {
                    failures = 0;
                    match Frame::new(image.width, image.height, sequence, Instant::now(), image.data) {
                        Some(frame) => {
                            self.writer.publish(frame);
                            sequence += 1;
                        }
                        None => warn!(device = %label, "Discarding frame with mismatched buffer size"),
                    }
                }
                Ok(None) => {
                    info!(device = %label, "Camera stream ended");
                    ended = Err(VisionError::EndOfStream {
                        index: self.camera_index,
                    });
                    break;
                }
                Err(e) => {
                    failures += 1;
                    warn!(device = %label, error = %e, failures, "Failed to read frame from camera");
                    if failures >= MAX_CONSECUTIVE_READ_FAILURES {
                        error!(
                            device = %label,
                            camera_index = self.camera_index,
                            "Camera unavailable after repeated read failures"
                        );
                        ended = Err(VisionError::device_unavailable(
                            self.camera_index,
                            format!("{} consecutive read failures, last: {}", failures, e),
                        ));
                        break;
                    }
                }
            }

            // Cap delivery at the target rate; slower devices just run slower.
            let interval = current.frame_interval();
            let elapsed = started.elapsed();
            if elapsed < interval && !self.stop.load(Ordering::Acquire) {
                std::thread::sleep(interval - elapsed);
            }
        }

        // Release the device before signalling; the writer drop ends the stream.
        drop(self.device);
        drop(self.writer);
        debug!(device = %label, frames = sequence, "Capture loop exited");
        ended
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::device::CapturedImage;
    use std::sync::atomic::AtomicUsize;
    use trichshot_models::{CameraClass, PerformanceMode};

    struct CountingDevice {
        remaining: Option<usize>,
        dropped: Arc<AtomicBool>,
        applied: Arc<AtomicUsize>,
    }

    impl CaptureDevice for CountingDevice {
        fn read(&mut self) -> VisionResult<Option<CapturedImage>> {
            if let Some(n) = self.remaining.as_mut() {
                if *n == 0 {
                    return Ok(None);
                }
                *n -= 1;
            }
            Ok(Some(CapturedImage {
                width: 4,
                height: 4,
                data: vec![0; 48],
            }))
        }

        fn apply_settings(&mut self, _settings: &PerformanceSettings) -> VisionResult<()> {
            self.applied.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn label(&self) -> String {
            "counting".to_string()
        }
    }

    impl Drop for CountingDevice {
        fn drop(&mut self) {
            self.dropped.store(true, Ordering::SeqCst);
        }
    }

    fn fast_settings() -> PerformanceSettings {
        PerformanceMode::High.settings().with_target_fps(100)
    }

    #[tokio::test]
    async fn test_stream_ends_and_device_released() {
        let dropped = Arc::new(AtomicBool::new(false));
        let device = CountingDevice {
            remaining: Some(3),
            dropped: Arc::clone(&dropped),
            applied: Arc::new(AtomicUsize::new(0)),
        };
        let (_tx, rx) = watch::channel(fast_settings());
        let cam = CameraCandidate::new(0, "test", CameraClass::Unknown);

        let mut source = FrameSource::spawn(cam, Box::new(device), rx).unwrap();
        let mut last = None;
        while let Some(frame) = source.next_frame().await {
            last = Some(frame.sequence());
        }
        assert_eq!(last, Some(2));
        let ended = source.close(Duration::from_secs(1)).await;
        assert!(matches!(ended, Err(VisionError::EndOfStream { index: 0 })));
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_close_releases_running_device() {
        let dropped = Arc::new(AtomicBool::new(false));
        let device = CountingDevice {
            remaining: None,
            dropped: Arc::clone(&dropped),
            applied: Arc::new(AtomicUsize::new(0)),
        };
        let (_tx, rx) = watch::channel(fast_settings());
        let cam = CameraCandidate::new(1, "test", CameraClass::External);

        let mut source = FrameSource::spawn(cam, Box::new(device), rx).unwrap();
        assert!(source.next_frame().await.is_some());
        assert!(source.close(Duration::from_secs(1)).await.is_ok());
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_settings_change_reapplied() {
        let applied = Arc::new(AtomicUsize::new(0));
        let device = CountingDevice {
            remaining: None,
            dropped: Arc::new(AtomicBool::new(false)),
            applied: Arc::clone(&applied),
        };
        let (tx, rx) = watch::channel(fast_settings());
        let cam = CameraCandidate::new(0, "test", CameraClass::Unknown);

        let mut source = FrameSource::spawn(cam, Box::new(device), rx).unwrap();
        assert!(source.next_frame().await.is_some());
        tx.send_replace(fast_settings().with_resolution(trichshot_models::Resolution::new(320, 240)));

        // Give the capture loop a few iterations to notice the change.
        for _ in 0..5 {
            source.next_frame().await;
        }
        assert_eq!(applied.load(Ordering::SeqCst), 1);
        source.close(Duration::from_secs(1)).await.unwrap();
    }

    struct BrokenDevice;

    impl CaptureDevice for BrokenDevice {
        fn read(&mut self) -> VisionResult<Option<CapturedImage>> {
            Err(VisionError::internal("select() timeout"))
        }

        fn apply_settings(&mut self, _settings: &PerformanceSettings) -> VisionResult<()> {
            Ok(())
        }

        fn label(&self) -> String {
            "broken".to_string()
        }
    }

    #[tokio::test]
    async fn test_repeated_read_failures_end_stream() {
        let (_tx, rx) = watch::channel(fast_settings());
        let cam = CameraCandidate::new(3, "test", CameraClass::External);

        let mut source = FrameSource::spawn(cam, Box::new(BrokenDevice), rx).unwrap();
        assert!(source.next_frame().await.is_none());
        let ended = source.close(Duration::from_secs(1)).await;
        assert!(matches!(ended, Err(VisionError::DeviceUnavailable { index: 3, .. })));
    }
}
