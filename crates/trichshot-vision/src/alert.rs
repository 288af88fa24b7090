//! Alert state machine.
//!
//! ```text
//!            in zone                 elapsed >= duration
//!   Idle ─────────────▶ Triggered ─────────────────────▶ Cooling
//!    ▲                     ▲                                │
//!    │                     └── in zone, debounce elapsed ───┤
//!    └──────────────────────── not in zone ─────────────────┘
//! ```
//!
//! Time is passed in rather than read, so every transition is testable
//! without sleeping.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use trichshot_models::{AlertPhase, AlertSnapshot, ValidationError};

/// Timing for the alert state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertConfig {
    /// How long the overlay stays up per trigger
    pub duration: Duration,
    /// Minimum time in `Cooling` before a sustained presence re-triggers
    pub debounce: Duration,
    /// Period of the watchdog tick that ends overdue overlays
    pub watchdog_interval: Duration,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(1500),
            debounce: Duration::from_millis(500),
            watchdog_interval: Duration::from_millis(250),
        }
    }
}

impl AlertConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.duration.is_zero() {
            return Err(ValidationError::MustBePositive {
                field: "alert_duration_ms",
            });
        }
        if self.watchdog_interval.is_zero() {
            return Err(ValidationError::MustBePositive {
                field: "watchdog_interval_ms",
            });
        }
        Ok(())
    }

    /// Longest the overlay can stay visible.
    pub fn max_overlay_time(&self) -> Duration {
        self.duration + self.watchdog_interval
    }
}

/// Overlay change requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSignal {
    /// Entered `Triggered`; show the overlay with this alert number
    OverlayOn { alert_number: u64 },
    /// Left `Triggered`; hide the overlay
    OverlayOff,
}

/// Owns the single alert state of a session.
#[derive(Debug, Clone)]
pub struct AlertController {
    config: AlertConfig,
    phase: AlertPhase,
    triggered_at: Option<Instant>,
    triggered_wall: Option<DateTime<Utc>>,
    cooling_since: Option<Instant>,
    alert_number: u64,
}

impl AlertController {
    pub fn new(config: AlertConfig) -> Self {
        Self {
            config,
            phase: AlertPhase::Idle,
            triggered_at: None,
            triggered_wall: None,
            cooling_since: None,
            alert_number: 0,
        }
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    pub fn phase(&self) -> AlertPhase {
        self.phase
    }

    /// Alerts triggered since the last reset.
    pub fn alert_count(&self) -> u64 {
        self.alert_number
    }

    /// Feed one proximity observation. Evaluation errors should be passed as
    /// `in_zone = false`.
    pub fn update(&mut self, in_zone: bool, now: Instant) -> Option<AlertSignal> {
        match self.phase {
            AlertPhase::Idle if in_zone => Some(self.trigger(now)),
            AlertPhase::Idle => None,
            AlertPhase::Triggered => self.expire(now),
            AlertPhase::Cooling if !in_zone => {
                debug!("Hand left danger zone, alert rearmed");
                self.phase = AlertPhase::Idle;
                self.cooling_since = None;
                None
            }
            AlertPhase::Cooling => {
                let cooled = self
                    .cooling_since
                    .map(|since| now.saturating_duration_since(since) >= self.config.debounce)
                    .unwrap_or(true);
                if cooled {
                    Some(self.trigger(now))
                } else {
                    None
                }
            }
        }
    }

    /// Timer-driven check; ends an overdue overlay without a fresh observation.
    pub fn watchdog(&mut self, now: Instant) -> Option<AlertSignal> {
        if self.phase != AlertPhase::Triggered {
            return None;
        }
        let signal = self.expire(now);
        if signal.is_some() {
            debug!("Watchdog ended overlay");
        }
        signal
    }

    /// Drop to `Idle` when observations stop (camera lost, session stopped).
    ///
    /// The alert count is kept so numbering continues within the session.
    pub fn stand_down(&mut self) -> Option<AlertSignal> {
        let was_visible = self.phase == AlertPhase::Triggered;
        self.phase = AlertPhase::Idle;
        self.triggered_at = None;
        self.cooling_since = None;
        if was_visible {
            debug!(alert_number = self.alert_number, "Alert stood down");
            Some(AlertSignal::OverlayOff)
        } else {
            None
        }
    }

    pub fn snapshot(&self) -> AlertSnapshot {
        AlertSnapshot {
            phase: self.phase,
            triggered_at: self.triggered_wall,
            duration_ms: self.config.duration.as_millis() as u64,
            alert_number: self.alert_number,
        }
    }

    /// Back to `Idle` with the alert count cleared.
    pub fn reset(&mut self) {
        self.phase = AlertPhase::Idle;
        self.triggered_at = None;
        self.triggered_wall = None;
        self.cooling_since = None;
        self.alert_number = 0;
    }

    fn trigger(&mut self, now: Instant) -> AlertSignal {
        self.alert_number += 1;
        self.phase = AlertPhase::Triggered;
        self.triggered_at = Some(now);
        self.triggered_wall = Some(Utc::now());
        self.cooling_since = None;
        info!(alert_number = self.alert_number, "Hand in danger zone, alert triggered");
        AlertSignal::OverlayOn {
            alert_number: self.alert_number,
        }
    }

    fn expire(&mut self, now: Instant) -> Option<AlertSignal> {
        let elapsed = self.triggered_at.map(|t| now.saturating_duration_since(t))?;
        if elapsed < self.config.duration {
            return None;
        }
        self.phase = AlertPhase::Cooling;
        self.cooling_since = Some(now);
        debug!(elapsed_ms = elapsed.as_millis() as u64, "Alert overlay expired");
        Some(AlertSignal::OverlayOff)
    }
}

impl Default for AlertController {
    fn default() -> Self {
        Self::new(AlertConfig::default())
    }
}
