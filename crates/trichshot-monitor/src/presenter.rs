//! Console presentation of pipeline ticks and monitor status.
//!
//! The presenter only reads: it follows the tick and status channels and
//! prints overlay edges, status changes and a periodic stats line.

use std::io::Write;
use std::time::Duration;

use tokio::sync::watch;
use tracing::warn;
use trichshot_models::{AlertSnapshot, DangerZone, MonitorStatus, StatsSnapshot};
use trichshot_vision::PipelineTick;

/// Overlay banner for an active alert.
pub fn render_overlay(alert: &AlertSnapshot) -> String {
    format!(
        "!!! WARNING #{} - hands in the danger zone !!!",
        alert.alert_number
    )
}

/// Stats line, e.g. `Session time: 00:01:05 | Warnings triggered: 3`.
pub fn render_stats(stats: &StatsSnapshot) -> String {
    format!(
        "Session time: {} | Warnings triggered: {}",
        stats.session_time(),
        stats.alerts_triggered
    )
}

pub fn render_zone(zone: &DangerZone) -> String {
    let mut line = format!(
        "Danger zone: {:.0}%-{:.0}% of frame height",
        zone.top_pct * 100.0,
        zone.bottom_pct * 100.0
    );
    if zone.is_narrowed() {
        line.push_str(&format!(
            ", {:.0}%-{:.0}% of width",
            zone.left_pct * 100.0,
            zone.right_pct * 100.0
        ));
    }
    line
}

/// Writes presentation lines to any sink.
pub struct ConsolePresenter<W: Write> {
    out: W,
    overlay_shown: Option<u64>,
    zone: Option<DangerZone>,
}

impl<W: Write> ConsolePresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            overlay_shown: None,
            zone: None,
        }
    }

    /// Render changes carried by a tick. Returns the lines written.
    pub fn on_tick(&mut self, tick: &PipelineTick) -> Vec<String> {
        let mut lines = Vec::new();

        if self.zone != Some(tick.zone) {
            self.zone = Some(tick.zone);
            lines.push(render_zone(&tick.zone));
        }

        match (tick.alert.overlay_visible(), self.overlay_shown) {
            (true, shown) if shown != Some(tick.alert.alert_number) => {
                self.overlay_shown = Some(tick.alert.alert_number);
                lines.push(render_overlay(&tick.alert));
            }
            (false, Some(_)) => {
                self.overlay_shown = None;
                lines.push("Warning cleared".to_string());
            }
            _ => {}
        }

        self.emit(&lines);
        lines
    }

    pub fn on_status(&mut self, status: &MonitorStatus) -> String {
        let line = status.label();
        if !status.is_monitoring() {
            self.overlay_shown = None;
        }
        self.emit(std::slice::from_ref(&line));
        line
    }

    pub fn on_stats(&mut self, stats: &StatsSnapshot) -> String {
        let line = render_stats(stats);
        self.emit(std::slice::from_ref(&line));
        line
    }

    fn emit(&mut self, lines: &[String]) {
        for line in lines {
            if let Err(e) = writeln!(self.out, "{}", line) {
                warn!(error = %e, "Failed to write to console");
                return;
            }
        }
        let _ = self.out.flush();
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> ConsolePresenter<W> {
    /// Follow the channels until shutdown or until the pipeline goes away.
    pub async fn run(
        mut self,
        mut ticks: watch::Receiver<PipelineTick>,
        mut status: watch::Receiver<MonitorStatus>,
        stats_interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> W {
        let mut stats_timer = tokio::time::interval(stats_interval);
        stats_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        stats_timer.tick().await;

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                changed = ticks.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let tick = ticks.borrow_and_update().clone();
                    self.on_tick(&tick);
                }
                changed = status.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let current = status.borrow_and_update().clone();
                    self.on_status(&current);
                }
                _ = stats_timer.tick() => {
                    let stats = ticks.borrow().stats.clone();
                    self.on_stats(&stats);
                }
            }
        }

        self.out
    }
}
