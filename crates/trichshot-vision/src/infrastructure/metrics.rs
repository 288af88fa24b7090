//! Pipeline metrics.
//!
//! Recorded through the `metrics` facade; the binary decides which recorder
//! (if any) collects them.

use metrics::{counter, gauge, histogram};

/// Metric names as constants for consistency.
pub mod names {
    // Frame flow
    pub const FRAMES_CAPTURED_TOTAL: &str = "trichshot_frames_captured_total";
    pub const FRAMES_PROCESSED_TOTAL: &str = "trichshot_frames_processed_total";
    pub const FRAMES_SKIPPED_TOTAL: &str = "trichshot_frames_skipped_total";
    pub const FRAMES_OVERWRITTEN_TOTAL: &str = "trichshot_frames_overwritten_total";
    pub const FRAME_AGE_SECONDS: &str = "trichshot_frame_age_seconds";
    pub const FRAME_SKIP: &str = "trichshot_frame_skip";

    // Inference
    pub const INFERENCE_DURATION_SECONDS: &str = "trichshot_inference_duration_seconds";
    pub const INFERENCE_FAILURES_TOTAL: &str = "trichshot_inference_failures_total";
    pub const INFERENCE_CIRCUIT_OPEN: &str = "trichshot_inference_circuit_open";

    // Alerts
    pub const ALERTS_TRIGGERED_TOTAL: &str = "trichshot_alerts_triggered_total";
    pub const OVERLAY_VISIBLE: &str = "trichshot_overlay_visible";
    pub const WATCHDOG_EXPIRIES_TOTAL: &str = "trichshot_watchdog_expiries_total";

    // Cameras
    pub const CAMERA_OPEN_FAILURES_TOTAL: &str = "trichshot_camera_open_failures_total";
}

pub fn record_frame_captured(age_secs: f64) {
    counter!(names::FRAMES_CAPTURED_TOTAL).increment(1);
    histogram!(names::FRAME_AGE_SECONDS).record(age_secs);
}

pub fn record_frame_processed(provider: &'static str, duration_secs: f64) {
    let labels = [("provider", provider)];
    counter!(names::FRAMES_PROCESSED_TOTAL, &labels).increment(1);
    histogram!(names::INFERENCE_DURATION_SECONDS, &labels).record(duration_secs);
}

pub fn record_frame_skipped() {
    counter!(names::FRAMES_SKIPPED_TOTAL).increment(1);
}

pub fn record_frames_overwritten(count: u64) {
    if count > 0 {
        counter!(names::FRAMES_OVERWRITTEN_TOTAL).increment(count);
    }
}

pub fn record_inference_failure(reason: &'static str) {
    let labels = [("reason", reason)];
    counter!(names::INFERENCE_FAILURES_TOTAL, &labels).increment(1);
}

pub fn set_circuit_open(open: bool) {
    gauge!(names::INFERENCE_CIRCUIT_OPEN).set(if open { 1.0 } else { 0.0 });
}

pub fn set_frame_skip(frame_skip: u32) {
    gauge!(names::FRAME_SKIP).set(frame_skip as f64);
}

pub fn record_alert_triggered() {
    counter!(names::ALERTS_TRIGGERED_TOTAL).increment(1);
}

pub fn set_overlay_visible(visible: bool) {
    gauge!(names::OVERLAY_VISIBLE).set(if visible { 1.0 } else { 0.0 });
}

pub fn record_watchdog_expiry() {
    counter!(names::WATCHDOG_EXPIRIES_TOTAL).increment(1);
}

pub fn record_camera_open_failure(camera_index: u32) {
    let labels = [("camera", camera_index.to_string())];
    counter!(names::CAMERA_OPEN_FAILURES_TOTAL, &labels).increment(1);
}
