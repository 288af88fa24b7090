//! Session control: camera fallback, pipeline lifecycle and status.
//!
//! A session walks the preferred camera order, opening each candidate until
//! one streams. When a camera fails to open or stops delivering, the next
//! candidate is tried; with none left the session pauses in
//! [`MonitorStatus::NoCamera`] until cameras are refreshed or shutdown.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn, Instrument};
use trichshot_models::{CameraCandidate, MonitorStatus, SessionId, StatsSnapshot};
use trichshot_vision::infrastructure::metrics;
use trichshot_vision::{
    CameraSelector, DeviceOpener, FrameSource, LandmarkProvider, MonitorPipeline, PipelineTick,
    RunOutcome, SessionStats, VisionError,
};

use crate::config::MonitorConfig;
use crate::control::ControlHandle;
use crate::error::{MonitorError, MonitorResult};
use crate::logging::SessionLogger;
use crate::session_log::SessionLog;

/// Summary produced when a session ends.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub session_id: SessionId,
    pub stats: StatsSnapshot,
    /// Last camera that streamed, if any
    pub camera: Option<CameraCandidate>,
    pub alert_log: Option<PathBuf>,
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Session {} ended", self.session_id)?;
        writeln!(f, "  Session time: {}", self.stats.session_time())?;
        writeln!(f, "  Warnings triggered: {}", self.stats.alerts_triggered)?;
        writeln!(
            f,
            "  Frames: {} captured, {} inferred, {} reused, {} inference failures",
            self.stats.frames_captured,
            self.stats.frames_processed,
            self.stats.frames_skipped,
            self.stats.inference_failures
        )?;
        match &self.camera {
            Some(camera) => writeln!(f, "  {}", camera.describe())?,
            None => writeln!(f, "  Camera: none")?,
        }
        if let Some(path) = &self.alert_log {
            writeln!(f, "  Alert log: {}", path.display())?;
        }
        Ok(())
    }
}

/// One monitoring session and the resources it owns.
pub struct MonitorSession {
    config: MonitorConfig,
    selector: CameraSelector,
    opener: Arc<dyn DeviceOpener>,
    control: ControlHandle,
    pipeline: MonitorPipeline,
    status_tx: watch::Sender<MonitorStatus>,
    session_log: Option<Arc<SessionLog>>,
    last_camera: Option<CameraCandidate>,
}

impl MonitorSession {
    pub fn new(
        config: MonitorConfig,
        selector: CameraSelector,
        opener: Arc<dyn DeviceOpener>,
        provider: Arc<dyn LandmarkProvider>,
        control: ControlHandle,
    ) -> MonitorResult<Self> {
        let stats = Arc::new(SessionStats::new());
        let mut pipeline = MonitorPipeline::new(
            provider,
            config.pipeline_config(),
            control.subscribe_zone(),
            control.subscribe_settings(),
            stats,
        )?;

        let session_log = match &config.session_log {
            Some(path) => {
                let log = Arc::new(SessionLog::open(path)?);
                pipeline = pipeline.with_sink(log.clone());
                Some(log)
            }
            None => None,
        };

        let (status_tx, _) = watch::channel(MonitorStatus::Stopped);

        Ok(Self {
            config,
            selector,
            opener,
            control,
            pipeline,
            status_tx,
            session_log,
            last_camera: None,
        })
    }

    pub fn control(&self) -> ControlHandle {
        self.control.clone()
    }

    pub fn subscribe_ticks(&self) -> watch::Receiver<PipelineTick> {
        self.pipeline.subscribe()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<MonitorStatus> {
        self.status_tx.subscribe()
    }

    pub fn session_id(&self) -> &SessionId {
        self.pipeline.session_id()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.pipeline.stats()
    }

    /// Start over: counters zeroed, alert `Idle`, new session ID.
    pub fn restart(&mut self) {
        self.pipeline.reset();
        self.last_camera = None;
        info!(session_id = %self.pipeline.session_id(), "Session restarted");
    }

    /// Monitor until `shutdown` is set.
    ///
    /// Camera failures never end the session; they move it to the next
    /// candidate or to `NoCamera`.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> MonitorResult<SessionReport> {
        let logger = SessionLogger::new(self.pipeline.session_id());
        let span = logger.create_span();
        let result = self.run_inner(&mut shutdown, &logger).instrument(span).await;

        // No frames will arrive to end an overlay after this point.
        self.pipeline.stand_down();
        self.set_status(MonitorStatus::Stopped);
        result?;

        let report = self.report();
        logger.log_completion(&format!(
            "{} alerts in {}",
            report.stats.alerts_triggered,
            report.stats.session_time()
        ));
        Ok(report)
    }

    async fn run_inner(
        &mut self,
        shutdown: &mut watch::Receiver<bool>,
        logger: &SessionLogger,
    ) -> MonitorResult<()> {
        logger.log_start(&format!(
            "zone {:.2}-{:.2}, {}",
            self.control.zone().top_pct,
            self.control.zone().bottom_pct,
            self.config.performance_mode
        ));
        let refresh = self.control.refresh_requested();

        loop {
            if *shutdown.borrow() {
                return Ok(());
            }

            self.set_status(MonitorStatus::Starting);
            let candidates = self.enumerate().await?;

            for candidate in candidates {
                if *shutdown.borrow() {
                    return Ok(());
                }

                let mut source = match self.open(&candidate).await {
                    Ok(source) => source,
                    Err(e) => {
                        metrics::record_camera_open_failure(candidate.index);
                        logger.log_warning(&format!("could not open {}: {}", candidate, e));
                        continue;
                    }
                };

                let camera_logger = logger.clone().with_camera(&candidate);
                camera_logger.log_progress(&candidate.describe());
                self.set_status(MonitorStatus::Monitoring {
                    camera: candidate.clone(),
                });
                self.pipeline.set_camera(Some(candidate.clone()));
                self.last_camera = Some(candidate.clone());

                let outcome = self.pipeline.run(&mut source, shutdown.clone()).await;
                self.pipeline.stand_down();
                let ended = source.close(self.config.release_timeout).await;
                self.pipeline.set_camera(None);

                match (outcome, ended) {
                    (RunOutcome::Stopped, Ok(())) => return Ok(()),
                    (RunOutcome::Stopped, Err(e @ VisionError::Timeout(_))) => {
                        camera_logger.log_error(&format!("camera not released cleanly: {}", e));
                        return Ok(());
                    }
                    (RunOutcome::Stopped, Err(_)) => return Ok(()),
                    (RunOutcome::EndOfStream, ended) => {
                        let reason = ended.err().map(|e| e.to_string()).unwrap_or_default();
                        camera_logger.log_warning(&format!(
                            "camera stopped delivering frames ({}), trying next camera",
                            reason
                        ));
                    }
                }
            }

            self.set_status(MonitorStatus::NoCamera);
            logger.log_warning("no usable camera, detection paused");

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return Ok(());
                    }
                }
                _ = refresh.notified() => {
                    info!("Camera refresh requested");
                }
            }
        }
    }

    /// Enumerate cameras off the async runtime; the preferred index goes first.
    async fn enumerate(&self) -> MonitorResult<Vec<CameraCandidate>> {
        let selector = self.selector.clone();
        let mut candidates = tokio::task::spawn_blocking(move || selector.enumerate())
            .await
            .map_err(|e| MonitorError::task_failed(format!("camera enumeration: {}", e)))?;

        if let Some(index) = self.config.camera_index {
            prefer_index(&mut candidates, index);
        }
        Ok(candidates)
    }

    async fn open(&self, candidate: &CameraCandidate) -> MonitorResult<FrameSource> {
        let opener = Arc::clone(&self.opener);
        let candidate = candidate.clone();
        let settings = self.control.subscribe_settings();
        let source = tokio::task::spawn_blocking(move || {
            FrameSource::open(opener.as_ref(), &candidate, settings)
        })
        .await
        .map_err(|e| MonitorError::task_failed(format!("camera open: {}", e)))??;
        Ok(source)
    }

    fn set_status(&self, status: MonitorStatus) {
        let changed = *self.status_tx.borrow() != status;
        if changed {
            info!("{}", status.label());
            self.status_tx.send_replace(status);
        }
    }

    fn report(&self) -> SessionReport {
        SessionReport {
            session_id: self.pipeline.session_id().clone(),
            stats: self.pipeline.stats(),
            camera: self.last_camera.clone(),
            alert_log: self.session_log.as_ref().map(|log| log.path().to_path_buf()),
        }
    }
}

/// Move the camera with `index` to the front, if present.
pub fn prefer_index(candidates: &mut Vec<CameraCandidate>, index: u32) {
    if let Some(pos) = candidates.iter().position(|c| c.index == index) {
        let preferred = candidates.remove(pos);
        candidates.insert(0, preferred);
    } else {
        warn!(index, "Configured camera not found, using preference order");
    }
}
