//! Session statistics.
//!
//! Counters are plain atomics: the pipeline increments, presentation reads.
//! Readers get eventually consistent values, which is all the display needs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Instant;

use chrono::{DateTime, Utc};
use trichshot_models::StatsSnapshot;

/// Something the pipeline did that the session counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatEvent {
    FrameCaptured,
    FrameProcessed,
    FrameSkipped,
    AlertTriggered,
    InferenceFailed,
}

#[derive(Debug, Clone, Copy)]
struct SessionStart {
    wall: DateTime<Utc>,
    mono: Instant,
}

impl SessionStart {
    fn now() -> Self {
        Self {
            wall: Utc::now(),
            mono: Instant::now(),
        }
    }
}

/// Additive counters for one monitoring session.
#[derive(Debug)]
pub struct SessionStats {
    frames_captured: AtomicU64,
    frames_processed: AtomicU64,
    frames_skipped: AtomicU64,
    alerts_triggered: AtomicU64,
    inference_failures: AtomicU64,
    started: RwLock<SessionStart>,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            frames_captured: AtomicU64::new(0),
            frames_processed: AtomicU64::new(0),
            frames_skipped: AtomicU64::new(0),
            alerts_triggered: AtomicU64::new(0),
            inference_failures: AtomicU64::new(0),
            started: RwLock::new(SessionStart::now()),
        }
    }

    pub fn record(&self, event: StatEvent) {
        let counter = match event {
            StatEvent::FrameCaptured => &self.frames_captured,
            StatEvent::FrameProcessed => &self.frames_processed,
            StatEvent::FrameSkipped => &self.frames_skipped,
            StatEvent::AlertTriggered => &self.alerts_triggered,
            StatEvent::InferenceFailed => &self.inference_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let started = self.start();
        StatsSnapshot {
            frames_captured: self.frames_captured.load(Ordering::Relaxed),
            frames_processed: self.frames_processed.load(Ordering::Relaxed),
            frames_skipped: self.frames_skipped.load(Ordering::Relaxed),
            alerts_triggered: self.alerts_triggered.load(Ordering::Relaxed),
            inference_failures: self.inference_failures.load(Ordering::Relaxed),
            started_at: started.wall,
            session_secs: started.mono.elapsed().as_secs(),
        }
    }

    /// Zero every counter and restart the session clock.
    pub fn reset(&self) {
        for counter in [
            &self.frames_captured,
            &self.frames_processed,
            &self.frames_skipped,
            &self.alerts_triggered,
            &self.inference_failures,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
        let mut started = self.started.write().unwrap_or_else(|e| e.into_inner());
        *started = SessionStart::now();
    }

    fn start(&self) -> SessionStart {
        *self.started.read().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}
