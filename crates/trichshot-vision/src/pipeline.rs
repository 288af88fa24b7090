//! The monitoring pipeline: frames in, alert state out.
//!
//! Each frame goes through the scheduler (run inference or reuse the cache),
//! proximity evaluation against the current danger zone and the alert state
//! machine. After every frame and every watchdog expiry a [`PipelineTick`] is
//! published for presentation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use trichshot_models::{
    AlertLogEvent, AlertSnapshot, CameraCandidate, DangerZone, LandmarkSet, PerformanceSettings,
    SessionId, StatsSnapshot, ValidationError, MAX_FRAME_SKIP,
};

use crate::alert::{AlertConfig, AlertController, AlertSignal};
use crate::capture::FrameSource;
use crate::detection::{evaluate, Decision, FrameScheduler, LandmarkProvider, ProximityResult};
use crate::error::{VisionError, VisionResult};
use crate::frame::Frame;
use crate::infrastructure::metrics;
use crate::infrastructure::CircuitBreaker;
use crate::stats::{SessionStats, StatEvent};

/// Default bound on a single inference call.
pub const DEFAULT_INFERENCE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Pipeline tuning.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub alert: AlertConfig,
    /// Inference calls taking longer are abandoned and count as failures
    pub inference_timeout: Duration,
    /// Ceiling for frame skip, including skip added under resource pressure
    pub max_frame_skip: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            alert: AlertConfig::default(),
            inference_timeout: DEFAULT_INFERENCE_TIMEOUT,
            max_frame_skip: MAX_FRAME_SKIP,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.alert.validate()?;
        if self.inference_timeout.is_zero() {
            return Err(ValidationError::MustBePositive {
                field: "inference_timeout_ms",
            });
        }
        if self.max_frame_skip > MAX_FRAME_SKIP {
            return Err(ValidationError::InvalidFrameSkip {
                value: self.max_frame_skip,
                max: MAX_FRAME_SKIP,
            });
        }
        Ok(())
    }
}

/// Everything presentation needs to render one update.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineTick {
    pub alert: AlertSnapshot,
    pub zone: DangerZone,
    pub camera: Option<CameraCandidate>,
    pub stats: StatsSnapshot,
    pub proximity: ProximityResult,
    pub settings: PerformanceSettings,
    /// Frame skip in effect, including pressure adjustments
    pub effective_frame_skip: u32,
    /// Index of the last frame processed, `None` before the first
    pub frame_index: Option<u64>,
}

/// Receives one record per triggered alert.
pub trait AlertSink: Send + Sync {
    fn record(&self, event: &AlertLogEvent) -> VisionResult<()>;
}

/// What happened to one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    pub frame_index: u64,
    pub decision: Decision,
    pub in_zone: bool,
    pub signal: Option<AlertSignal>,
    /// Inference ran (or was due) and failed
    pub inference_failed: bool,
}

/// Why [`MonitorPipeline::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Shutdown was requested
    Stopped,
    /// The frame source ended (camera lost or stream closed)
    EndOfStream,
}

struct FramePlan {
    index: u64,
    decision: Decision,
    circuit_open: bool,
}

type Inferred = (VisionResult<Vec<LandmarkSet>>, Duration);

/// Scheduler, evaluator and alert state for one session.
pub struct MonitorPipeline {
    provider: Arc<dyn LandmarkProvider>,
    breaker: CircuitBreaker,
    scheduler: FrameScheduler,
    alert: AlertController,
    stats: Arc<SessionStats>,
    config: PipelineConfig,
    zone_rx: watch::Receiver<DangerZone>,
    settings_rx: watch::Receiver<PerformanceSettings>,
    pressure_skip: u32,
    camera: Option<CameraCandidate>,
    session_id: SessionId,
    sink: Option<Arc<dyn AlertSink>>,
    tick_tx: watch::Sender<PipelineTick>,
    last_proximity: ProximityResult,
    last_index: Option<u64>,
}

impl MonitorPipeline {
    pub fn new(
        provider: Arc<dyn LandmarkProvider>,
        config: PipelineConfig,
        zone_rx: watch::Receiver<DangerZone>,
        settings_rx: watch::Receiver<PerformanceSettings>,
        stats: Arc<SessionStats>,
    ) -> VisionResult<Self> {
        config.validate()?;

        let settings = *settings_rx.borrow();
        let frame_skip = settings.frame_skip.min(config.max_frame_skip);
        let alert = AlertController::new(config.alert);
        let initial = PipelineTick {
            alert: alert.snapshot(),
            zone: *zone_rx.borrow(),
            camera: None,
            stats: stats.snapshot(),
            proximity: ProximityResult::default(),
            settings,
            effective_frame_skip: frame_skip,
            frame_index: None,
        };
        let (tick_tx, _) = watch::channel(initial);
        metrics::set_frame_skip(frame_skip);

        Ok(Self {
            provider,
            breaker: CircuitBreaker::default(),
            scheduler: FrameScheduler::new(frame_skip),
            alert,
            stats,
            config,
            zone_rx,
            settings_rx,
            pressure_skip: 0,
            camera: None,
            session_id: SessionId::new(),
            sink: None,
            tick_tx,
            last_proximity: ProximityResult::default(),
            last_index: None,
        })
    }

    pub fn with_sink(mut self, sink: Arc<dyn AlertSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = session_id;
        self
    }

    /// Receive a [`PipelineTick`] after every state change.
    pub fn subscribe(&self) -> watch::Receiver<PipelineTick> {
        self.tick_tx.subscribe()
    }

    /// Camera the frames come from; reported in ticks and alert records.
    ///
    /// Switching cameras drops cached landmarks, so the next frame always
    /// runs inference.
    pub fn set_camera(&mut self, camera: Option<CameraCandidate>) {
        if self.camera != camera {
            self.scheduler.reset();
            self.last_proximity = ProximityResult::default();
            self.last_index = None;
        }
        self.camera = camera;
        self.publish();
    }

    /// End any visible alert once frames stop arriving. Stats and the
    /// alert count are kept.
    pub fn stand_down(&mut self) -> Option<AlertSignal> {
        let signal = self.alert.stand_down();
        if signal.is_some() {
            metrics::set_overlay_visible(false);
        }
        self.publish();
        signal
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn alert(&self) -> AlertSnapshot {
        self.alert.snapshot()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn effective_frame_skip(&self) -> u32 {
        self.scheduler.frame_skip()
    }

    /// Shed load after a resource-pressure signal: one more skipped frame
    /// between inference runs, up to `max_frame_skip`.
    pub fn apply_resource_pressure(&mut self) {
        let base = self.settings_rx.borrow().frame_skip;
        if base + self.pressure_skip < self.config.max_frame_skip {
            self.pressure_skip += 1;
            warn!(
                pressure_skip = self.pressure_skip,
                frame_skip = base + self.pressure_skip,
                "Resource pressure, raising frame skip"
            );
        }
        self.sync_frame_skip();
    }

    /// Start a fresh session: counters zeroed, alert `Idle`, cache dropped.
    pub fn reset(&mut self) {
        self.stats.reset();
        self.alert.reset();
        self.scheduler.reset();
        self.breaker.reset();
        self.pressure_skip = 0;
        self.last_proximity = ProximityResult::default();
        self.last_index = None;
        self.session_id = SessionId::new();
        self.sync_frame_skip();
        metrics::set_overlay_visible(false);
        self.publish();
        debug!(session_id = %self.session_id, "Pipeline reset");
    }

    /// Run one frame through the pipeline.
    pub async fn process_frame(&mut self, frame: Arc<Frame>) -> FrameOutcome {
        let plan = self.plan(&frame);
        let inferred = if plan.decision == Decision::RunInference && !plan.circuit_open {
            Some(
                infer_bounded(
                    Arc::clone(&self.provider),
                    Arc::clone(&frame),
                    self.config.inference_timeout,
                )
                .await,
            )
        } else {
            None
        };
        self.complete(&frame, plan, inferred, Instant::now())
    }

    /// Timer-driven alert check, independent of frames.
    pub fn watchdog(&mut self, now: Instant) -> Option<AlertSignal> {
        let signal = self.alert.watchdog(now);
        if signal.is_some() {
            metrics::record_watchdog_expiry();
            metrics::set_overlay_visible(false);
            self.publish();
        }
        signal
    }

    /// Consume frames until shutdown or end of stream.
    ///
    /// The watchdog keeps ticking while inference is in flight. Shutdown
    /// drops any in-flight inference; its result is never applied.
    pub async fn run(
        &mut self,
        source: &mut FrameSource,
        mut shutdown: watch::Receiver<bool>,
    ) -> RunOutcome {
        let mut watchdog = tokio::time::interval(self.config.alert.watchdog_interval);
        watchdog.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut overwritten = source.frames_overwritten();

        if *shutdown.borrow() {
            return RunOutcome::Stopped;
        }

        info!(
            session_id = %self.session_id,
            camera = ?self.camera.as_ref().map(|c| c.index),
            provider = self.provider.name(),
            "Pipeline running"
        );

        loop {
            let frame = tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return RunOutcome::Stopped;
                    }
                    continue;
                }
                _ = watchdog.tick() => {
                    self.watchdog(Instant::now());
                    continue;
                }
                frame = source.next_frame() => match frame {
                    Some(frame) => frame,
                    None => {
                        info!(session_id = %self.session_id, "Frame source ended");
                        return RunOutcome::EndOfStream;
                    }
                },
            };

            let now_overwritten = source.frames_overwritten();
            metrics::record_frames_overwritten(now_overwritten - overwritten);
            overwritten = now_overwritten;

            let plan = self.plan(&frame);
            let inferred = if plan.decision == Decision::RunInference && !plan.circuit_open {
                let work = infer_bounded(
                    Arc::clone(&self.provider),
                    Arc::clone(&frame),
                    self.config.inference_timeout,
                );
                tokio::pin!(work);
                loop {
                    tokio::select! {
                        biased;
                        changed = shutdown.changed() => {
                            if changed.is_err() || *shutdown.borrow() {
                                debug!(frame_index = plan.index, "Discarding in-flight inference on shutdown");
                                return RunOutcome::Stopped;
                            }
                        }
                        _ = watchdog.tick() => {
                            self.watchdog(Instant::now());
                        }
                        result = &mut work => break Some(result),
                    }
                }
            } else {
                None
            };

            self.complete(&frame, plan, inferred, Instant::now());
        }
    }

    fn sync_frame_skip(&mut self) {
        let base = self.settings_rx.borrow().frame_skip;
        let effective = (base + self.pressure_skip).min(self.config.max_frame_skip);
        if effective != self.scheduler.frame_skip() {
            self.scheduler.set_frame_skip(effective);
            metrics::set_frame_skip(effective);
        }
    }

    fn plan(&mut self, frame: &Frame) -> FramePlan {
        self.stats.record(StatEvent::FrameCaptured);
        metrics::record_frame_captured(frame.age(Instant::now()).as_secs_f64());

        self.sync_frame_skip();

        let (index, decision) = self.scheduler.next_decision();
        let circuit_open = decision == Decision::RunInference && !self.breaker.allow(Instant::now());
        metrics::set_circuit_open(circuit_open);

        FramePlan {
            index,
            decision,
            circuit_open,
        }
    }

    fn complete(
        &mut self,
        frame: &Frame,
        plan: FramePlan,
        inferred: Option<Inferred>,
        now: Instant,
    ) -> FrameOutcome {
        let mut inference_failed = false;

        let hands = match plan.decision {
            Decision::UseCached => {
                self.stats.record(StatEvent::FrameSkipped);
                metrics::record_frame_skipped();
                match self.scheduler.cached() {
                    Ok(hands) => hands,
                    Err(e) => {
                        warn!(frame_index = plan.index, error = %e, "No cached landmarks, treating as empty");
                        Arc::new(Vec::new())
                    }
                }
            }
            Decision::RunInference => {
                self.stats.record(StatEvent::FrameProcessed);
                let result = match inferred {
                    Some((result, elapsed)) => {
                        metrics::record_frame_processed(self.provider.name(), elapsed.as_secs_f64());
                        result
                    }
                    None => Err(VisionError::inference_unavailable("circuit open")),
                };

                match result {
                    Ok(hands) => {
                        if !plan.circuit_open {
                            self.breaker.success();
                        }
                        self.scheduler.store(plan.index, hands)
                    }
                    Err(e) => {
                        inference_failed = true;
                        self.stats.record(StatEvent::InferenceFailed);
                        metrics::record_inference_failure(e.kind());
                        if !plan.circuit_open {
                            self.breaker.failure(now);
                        }
                        if matches!(e, VisionError::ResourceExhausted(_)) {
                            self.apply_resource_pressure();
                        }
                        warn!(
                            frame_index = plan.index,
                            provider = self.provider.name(),
                            error = %e,
                            "Inference failed, treating frame as no hands"
                        );
                        self.scheduler.store(plan.index, Vec::new())
                    }
                }
            }
        };

        let zone = *self.zone_rx.borrow_and_update();
        let proximity = evaluate(&hands, &zone, frame.height());
        let in_zone = !inference_failed && proximity.any_in_zone;

        let signal = self.alert.update(in_zone, now);
        match signal {
            Some(AlertSignal::OverlayOn { alert_number }) => {
                self.stats.record(StatEvent::AlertTriggered);
                metrics::record_alert_triggered();
                metrics::set_overlay_visible(true);
                self.log_alert(alert_number, &proximity);
            }
            Some(AlertSignal::OverlayOff) => metrics::set_overlay_visible(false),
            None => {}
        }

        self.last_proximity = proximity;
        self.last_index = Some(plan.index);
        self.publish();

        FrameOutcome {
            frame_index: plan.index,
            decision: plan.decision,
            in_zone,
            signal,
            inference_failed,
        }
    }

    fn log_alert(&self, alert_number: u64, proximity: &ProximityResult) {
        let Some(sink) = &self.sink else {
            return;
        };
        let event = AlertLogEvent {
            session_id: self.session_id.clone(),
            alert_number,
            timestamp: Utc::now(),
            proximity_score: proximity.score,
            min_distance_to_zone: proximity.min_distance_to_zone,
            camera_index: self.camera.as_ref().map(|c| c.index),
            camera_name: self.camera.as_ref().map(|c| c.display_name.clone()),
        };
        if let Err(e) = sink.record(&event) {
            warn!(alert_number, error = %e, "Failed to record alert event");
        }
    }

    fn publish(&self) {
        let tick = PipelineTick {
            alert: self.alert.snapshot(),
            zone: *self.zone_rx.borrow(),
            camera: self.camera.clone(),
            stats: self.stats.snapshot(),
            proximity: self.last_proximity.clone(),
            settings: *self.settings_rx.borrow(),
            effective_frame_skip: self.scheduler.frame_skip(),
            frame_index: self.last_index,
        };
        self.tick_tx.send_replace(tick);
    }
}

/// Aborts the inference task when the pipeline stops waiting for it.
struct AbortOnDrop(tokio::task::AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Run one inference on its own task, bounded by `timeout`.
async fn infer_bounded(
    provider: Arc<dyn LandmarkProvider>,
    frame: Arc<Frame>,
    timeout: Duration,
) -> Inferred {
    let started = Instant::now();
    let task = tokio::spawn(async move { provider.infer(&frame).await });
    let _guard = AbortOnDrop(task.abort_handle());

    let result = match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(VisionError::internal(format!("inference task failed: {}", e))),
        Err(_) => Err(VisionError::Timeout(timeout.as_millis() as u64)),
    };
    (result, started.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::MockLandmarkProvider;
    use crate::detection::NullLandmarkProvider;
    use std::sync::Mutex;
    use trichshot_models::{AlertPhase, CameraClass};

    fn frame(seq: u64) -> Arc<Frame> {
        Arc::new(Frame::blank(8, 8, seq, Instant::now()))
    }

    fn pipeline(
        provider: Arc<dyn LandmarkProvider>,
        settings: PerformanceSettings,
    ) -> (MonitorPipeline, watch::Sender<DangerZone>, watch::Sender<PerformanceSettings>) {
        let (zone_tx, zone_rx) = watch::channel(DangerZone::new(0.3, 0.6).unwrap());
        let (settings_tx, settings_rx) = watch::channel(settings);
        let pipeline = MonitorPipeline::new(
            provider,
            PipelineConfig::default(),
            zone_rx,
            settings_rx,
            Arc::new(SessionStats::new()),
        )
        .unwrap();
        (pipeline, zone_tx, settings_tx)
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<AlertLogEvent>>,
    }

    impl AlertSink for RecordingSink {
        fn record(&self, event: &AlertLogEvent) -> VisionResult<()> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_hand_in_zone_triggers_and_logs() {
        let mut provider = MockLandmarkProvider::new();
        provider
            .expect_infer()
            .returning(|_| Ok(vec![LandmarkSet::from_points(&[(0.5, 0.5)])]));
        provider.expect_name().return_const("mock");

        let sink = Arc::new(RecordingSink::default());
        let settings = PerformanceSettings::default().with_frame_skip(0);
        let (pipeline, _zone, _settings) = pipeline(Arc::new(provider), settings);
        let mut pipeline = pipeline.with_sink(sink.clone());
        pipeline.set_camera(Some(CameraCandidate::new(1, "HD Pro Webcam C920", CameraClass::External)));

        let outcome = pipeline.process_frame(frame(0)).await;
        assert!(outcome.in_zone);
        assert_eq!(outcome.signal, Some(AlertSignal::OverlayOn { alert_number: 1 }));

        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].camera_index, Some(1));
        assert_eq!(events[0].proximity_score, 1.0);
    }

    #[tokio::test]
    async fn test_inference_error_counts_as_out_of_zone() {
        let mut provider = MockLandmarkProvider::new();
        provider
            .expect_infer()
            .returning(|_| Err(VisionError::inference_unavailable("model crashed")));
        provider.expect_name().return_const("mock");

        let (mut pipeline, _zone, _settings) =
            pipeline(Arc::new(provider), PerformanceSettings::default().with_frame_skip(0));

        let outcome = pipeline.process_frame(frame(0)).await;
        assert!(outcome.inference_failed);
        assert!(!outcome.in_zone);
        assert_eq!(pipeline.alert().phase, AlertPhase::Idle);
        assert_eq!(pipeline.stats().inference_failures, 1);
    }

    #[tokio::test]
    async fn test_resource_exhausted_raises_frame_skip() {
        let mut provider = MockLandmarkProvider::new();
        provider
            .expect_infer()
            .returning(|_| Err(VisionError::ResourceExhausted("out of memory".into())));
        provider.expect_name().return_const("mock");

        let (mut pipeline, _zone, settings_tx) =
            pipeline(Arc::new(provider), PerformanceSettings::default().with_frame_skip(1));
        assert_eq!(pipeline.effective_frame_skip(), 1);

        pipeline.process_frame(frame(0)).await;
        assert_eq!(pipeline.effective_frame_skip(), 2);

        // The chosen settings stay as published; only the effective skip moves.
        assert_eq!(settings_tx.borrow().frame_skip, 1);
        let tick = pipeline.subscribe().borrow().clone();
        assert_eq!(tick.settings.frame_skip, 1);
        assert_eq!(tick.effective_frame_skip, 2);
    }

    #[tokio::test]
    async fn test_frame_skip_follows_settings() {
        let (mut pipeline, _zone, settings_tx) = pipeline(
            Arc::new(NullLandmarkProvider),
            PerformanceSettings::default().with_frame_skip(0),
        );
        pipeline.process_frame(frame(0)).await;
        settings_tx.send_replace(PerformanceSettings::default().with_frame_skip(3));
        pipeline.process_frame(frame(1)).await;
        assert_eq!(pipeline.effective_frame_skip(), 3);
    }

    #[tokio::test]
    async fn test_zone_change_applies_to_next_frame() {
        let mut provider = MockLandmarkProvider::new();
        provider
            .expect_infer()
            .returning(|_| Ok(vec![LandmarkSet::from_points(&[(0.5, 0.9)])]));
        provider.expect_name().return_const("mock");

        let (mut pipeline, zone_tx, _settings) =
            pipeline(Arc::new(provider), PerformanceSettings::default().with_frame_skip(0));
        assert!(!pipeline.process_frame(frame(0)).await.in_zone);

        zone_tx.send_replace(DangerZone::new(0.8, 1.0).unwrap());
        assert!(pipeline.process_frame(frame(1)).await.in_zone);
    }

    #[tokio::test]
    async fn test_ticks_published() {
        let (mut pipeline, _zone, _settings) =
            pipeline(Arc::new(NullLandmarkProvider), PerformanceSettings::default());
        let mut ticks = pipeline.subscribe();
        pipeline.process_frame(frame(0)).await;
        assert!(ticks.has_changed().unwrap());
        let tick = ticks.borrow_and_update().clone();
        assert_eq!(tick.frame_index, Some(0));
        assert_eq!(tick.stats.frames_processed, 1);

        let json = serde_json::to_value(&tick).unwrap();
        assert_eq!(json["alert"]["phase"], "idle");
        assert_eq!(json["effective_frame_skip"], tick.effective_frame_skip);
    }

    #[tokio::test]
    async fn test_camera_switch_forces_fresh_inference() {
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let mut provider = MockLandmarkProvider::new();
        provider.expect_infer().returning(move |_| {
            // Only the first camera ever sees a hand.
            if seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                Ok(vec![LandmarkSet::from_points(&[(0.5, 0.5)])])
            } else {
                Ok(Vec::new())
            }
        });
        provider.expect_name().return_const("mock");

        let (mut pipeline, _zone, _settings) =
            pipeline(Arc::new(provider), PerformanceSettings::default().with_frame_skip(2));
        pipeline.set_camera(Some(CameraCandidate::new(1, "USB Camera", CameraClass::External)));
        assert!(pipeline.process_frame(frame(0)).await.in_zone);
        pipeline.stand_down();

        pipeline.set_camera(None);
        pipeline.set_camera(Some(CameraCandidate::new(0, "Integrated Camera", CameraClass::Integrated)));
        let outcome = pipeline.process_frame(frame(1)).await;
        assert_eq!(outcome.frame_index, 0);
        assert_eq!(outcome.decision, Decision::RunInference);
        assert!(!outcome.in_zone);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
        assert_eq!(pipeline.stats().alerts_triggered, 1);
    }

    #[tokio::test]
    async fn test_stand_down_ends_overlay_and_keeps_stats() {
        let mut provider = MockLandmarkProvider::new();
        provider
            .expect_infer()
            .returning(|_| Ok(vec![LandmarkSet::from_points(&[(0.5, 0.5)])]));
        provider.expect_name().return_const("mock");

        let (mut pipeline, _zone, _settings) =
            pipeline(Arc::new(provider), PerformanceSettings::default().with_frame_skip(0));
        let mut ticks = pipeline.subscribe();
        pipeline.process_frame(frame(0)).await;
        assert_eq!(pipeline.alert().phase, AlertPhase::Triggered);

        assert_eq!(pipeline.stand_down(), Some(AlertSignal::OverlayOff));
        assert_eq!(ticks.borrow_and_update().alert.phase, AlertPhase::Idle);
        assert_eq!(pipeline.stats().alerts_triggered, 1);
        assert_eq!(pipeline.alert().alert_number, 1);
        assert_eq!(pipeline.stand_down(), None);
    }

    /// Blocks its thread inside `infer`, the way a careless CPU-bound model would.
    struct BlockingProvider;

    #[async_trait::async_trait]
    impl LandmarkProvider for BlockingProvider {
        async fn infer(&self, _frame: &Frame) -> VisionResult<Vec<LandmarkSet>> {
            std::thread::sleep(Duration::from_millis(600));
            Ok(Vec::new())
        }

        fn name(&self) -> &'static str {
            "blocking"
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_blocking_provider_still_times_out() {
        let (_zone_tx, zone_rx) = watch::channel(DangerZone::default());
        let (_settings_tx, settings_rx) =
            watch::channel(PerformanceSettings::default().with_frame_skip(0));
        let config = PipelineConfig {
            inference_timeout: Duration::from_millis(50),
            ..PipelineConfig::default()
        };
        let mut pipeline = MonitorPipeline::new(
            Arc::new(BlockingProvider),
            config,
            zone_rx,
            settings_rx,
            Arc::new(SessionStats::new()),
        )
        .unwrap();

        let started = Instant::now();
        let outcome = pipeline.process_frame(frame(0)).await;
        assert!(outcome.inference_failed);
        assert!(started.elapsed() < Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let (_zone_tx, zone_rx) = watch::channel(DangerZone::default());
        let (_settings_tx, settings_rx) = watch::channel(PerformanceSettings::default());
        let config = PipelineConfig {
            inference_timeout: Duration::ZERO,
            ..PipelineConfig::default()
        };
        let result = MonitorPipeline::new(
            Arc::new(NullLandmarkProvider),
            config,
            zone_rx,
            settings_rx,
            Arc::new(SessionStats::new()),
        );
        assert!(matches!(result, Err(VisionError::ConfigurationInvalid(_))));
    }
}
