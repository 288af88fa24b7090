//! Runtime controls: danger zone, performance settings and camera refresh.
//!
//! Every change is validated before it is published; a rejected change leaves
//! the previous value in effect.

use std::sync::Arc;

use tokio::sync::{watch, Notify};
use tracing::{info, warn};
use trichshot_models::{DangerZone, PerformanceMode, PerformanceSettings, ValidationError};

use crate::config::PerformanceOverrides;
use crate::error::MonitorResult;

/// Cloneable handle for changing a running monitor.
#[derive(Clone)]
pub struct ControlHandle {
    zone_tx: Arc<watch::Sender<DangerZone>>,
    settings_tx: Arc<watch::Sender<PerformanceSettings>>,
    refresh: Arc<Notify>,
    max_frame_skip: u32,
}

impl ControlHandle {
    pub fn new(zone: DangerZone, settings: PerformanceSettings, max_frame_skip: u32) -> MonitorResult<Self> {
        zone.validate()?;
        settings.validate()?;
        let (zone_tx, _) = watch::channel(zone);
        let (settings_tx, _) = watch::channel(settings);
        Ok(Self {
            zone_tx: Arc::new(zone_tx),
            settings_tx: Arc::new(settings_tx),
            refresh: Arc::new(Notify::new()),
            max_frame_skip,
        })
    }

    pub fn zone(&self) -> DangerZone {
        *self.zone_tx.borrow()
    }

    pub fn settings(&self) -> PerformanceSettings {
        *self.settings_tx.borrow()
    }

    pub fn subscribe_zone(&self) -> watch::Receiver<DangerZone> {
        self.zone_tx.subscribe()
    }

    pub fn subscribe_settings(&self) -> watch::Receiver<PerformanceSettings> {
        self.settings_tx.subscribe()
    }

    /// Move the vertical band, keeping any horizontal narrowing.
    pub fn set_danger_zone(&self, top_pct: f64, bottom_pct: f64) -> MonitorResult<DangerZone> {
        let current = self.zone();
        self.set_zone(DangerZone {
            top_pct,
            bottom_pct,
            ..current
        })
    }

    /// Replace the whole zone.
    pub fn set_zone(&self, zone: DangerZone) -> MonitorResult<DangerZone> {
        if let Err(e) = zone.validate() {
            warn!(error = %e, "Rejected danger zone change");
            return Err(e.into());
        }
        self.zone_tx.send_replace(zone);
        info!(top = zone.top_pct, bottom = zone.bottom_pct, "Danger zone updated");
        Ok(zone)
    }

    /// Switch to a named preset (`low`, `balanced`, `high`).
    pub fn set_performance_mode(&self, name: &str) -> MonitorResult<PerformanceSettings> {
        let mode: PerformanceMode = name.parse().map_err(|e: ValidationError| {
            warn!(mode = name, "Rejected unknown performance mode");
            e
        })?;
        let settings = mode.settings();
        self.settings_tx.send_replace(settings);
        info!(
            mode = %mode,
            resolution = %settings.resolution,
            fps = settings.target_fps,
            frame_skip = settings.frame_skip,
            "Performance mode changed"
        );
        Ok(settings)
    }

    /// Apply individual overrides on top of the current settings.
    pub fn set_overrides(&self, overrides: PerformanceOverrides) -> MonitorResult<PerformanceSettings> {
        let settings = overrides.apply(self.settings());
        self.set_settings(settings)
    }

    /// Replace the settings wholesale.
    pub fn set_settings(&self, settings: PerformanceSettings) -> MonitorResult<PerformanceSettings> {
        if let Err(e) = settings.validate() {
            warn!(error = %e, "Rejected performance settings change");
            return Err(e.into());
        }
        if settings.frame_skip > self.max_frame_skip {
            let e = ValidationError::InvalidFrameSkip {
                value: settings.frame_skip,
                max: self.max_frame_skip,
            };
            warn!(error = %e, "Rejected performance settings change");
            return Err(e.into());
        }
        self.settings_tx.send_replace(settings);
        info!(
            resolution = %settings.resolution,
            fps = settings.target_fps,
            frame_skip = settings.frame_skip,
            "Performance settings updated"
        );
        Ok(settings)
    }

    /// Ask a paused monitor to enumerate cameras again.
    pub fn refresh_cameras(&self) {
        self.refresh.notify_one();
    }

    pub(crate) fn refresh_requested(&self) -> Arc<Notify> {
        Arc::clone(&self.refresh)
    }
}
