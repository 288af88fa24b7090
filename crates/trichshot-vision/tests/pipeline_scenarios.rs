//! End-to-end pipeline scenarios with synthetic frames and scripted providers.

use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::watch;
use trichshot_models::{
    AlertPhase, CameraCandidate, CameraClass, DangerZone, LandmarkSet, PerformanceSettings,
};
use trichshot_vision::{
    AlertConfig, AlertSignal, CaptureDevice, CapturedImage, Decision, Frame, FrameSource,
    LandmarkProvider, MonitorPipeline, PipelineConfig, RunOutcome, SessionStats, VisionError,
    VisionResult,
};

/// Reports a hand at `y` for frames whose sequence falls in `hand_frames`.
struct ScriptedProvider {
    hand_frames: RangeInclusive<u64>,
    y: f64,
    calls: AtomicUsize,
}

#[async_trait]
impl LandmarkProvider for ScriptedProvider {
    async fn infer(&self, frame: &Frame) -> VisionResult<Vec<LandmarkSet>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hand_frames.contains(&frame.sequence()) {
            Ok(vec![LandmarkSet::from_points(&[(0.5, self.y), (0.55, self.y + 0.3)])])
        } else {
            Ok(Vec::new())
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Answers the first call with a hand in the zone, then never answers again.
struct StallingProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl LandmarkProvider for StallingProvider {
    async fn infer(&self, _frame: &Frame) -> VisionResult<Vec<LandmarkSet>> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            return Ok(vec![LandmarkSet::from_points(&[(0.5, 0.5)])]);
        }
        std::future::pending::<()>().await;
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "stalling"
    }
}

/// Endless (or bounded) stream of blank frames.
struct SyntheticCamera {
    remaining: Option<u32>,
}

impl CaptureDevice for SyntheticCamera {
    fn read(&mut self) -> VisionResult<Option<CapturedImage>> {
        if let Some(n) = self.remaining.as_mut() {
            if *n == 0 {
                return Ok(None);
            }
            *n -= 1;
        }
        Ok(Some(CapturedImage {
            width: 16,
            height: 12,
            data: vec![0; 16 * 12 * 3],
        }))
    }

    fn apply_settings(&mut self, _settings: &PerformanceSettings) -> VisionResult<()> {
        Ok(())
    }

    fn label(&self) -> String {
        "synthetic".to_string()
    }
}

fn build_pipeline(
    provider: Arc<dyn LandmarkProvider>,
    frame_skip: u32,
    config: PipelineConfig,
) -> (
    MonitorPipeline,
    watch::Sender<DangerZone>,
    watch::Sender<PerformanceSettings>,
) {
    let zone = DangerZone::new(0.3, 0.6).unwrap();
    let settings = PerformanceSettings::default()
        .with_frame_skip(frame_skip)
        .with_target_fps(100);
    let (zone_tx, zone_rx) = watch::channel(zone);
    let (settings_tx, settings_rx) = watch::channel(settings);
    let pipeline = MonitorPipeline::new(
        provider,
        config,
        zone_rx,
        settings_rx,
        Arc::new(SessionStats::new()),
    )
    .unwrap();
    (pipeline, zone_tx, settings_tx)
}

async fn feed_ten_frames(frame_skip: u32) -> (MonitorPipeline, Vec<(u64, Option<AlertSignal>)>) {
    let provider = Arc::new(ScriptedProvider {
        hand_frames: 4..=6,
        y: 0.5,
        calls: AtomicUsize::new(0),
    });
    let (mut pipeline, _zone, _settings) =
        build_pipeline(provider, frame_skip, PipelineConfig::default());

    let mut signals = Vec::new();
    for seq in 0..10 {
        let frame = Arc::new(Frame::blank(640, 480, seq, Instant::now()));
        let outcome = pipeline.process_frame(frame).await;
        signals.push((outcome.frame_index, outcome.signal));
    }
    (pipeline, signals)
}

#[tokio::test]
async fn test_ten_frame_scenario_triggers_once_at_frame_four() {
    for (frame_skip, expected_processed) in [(0u32, 10u64), (1, 5)] {
        let (pipeline, signals) = feed_ten_frames(frame_skip).await;

        let triggers: Vec<u64> = signals
            .iter()
            .filter(|(_, s)| matches!(s, Some(AlertSignal::OverlayOn { .. })))
            .map(|(i, _)| *i)
            .collect();
        assert_eq!(triggers, vec![4], "frame_skip={}", frame_skip);

        let stats = pipeline.stats();
        assert_eq!(stats.alerts_triggered, 1);
        assert_eq!(stats.frames_processed, expected_processed);
        assert_eq!(stats.frames_skipped, 10 - expected_processed);
        assert_eq!(stats.frames_captured, 10);
    }
}

#[tokio::test]
async fn test_frame_skip_schedule_on_live_pipeline() {
    let provider = Arc::new(ScriptedProvider {
        hand_frames: 0..=0,
        y: 0.9,
        calls: AtomicUsize::new(0),
    });
    let (mut pipeline, _zone, _settings) =
        build_pipeline(provider.clone(), 2, PipelineConfig::default());

    let mut decisions = Vec::new();
    for seq in 0..9 {
        let frame = Arc::new(Frame::blank(8, 8, seq, Instant::now()));
        decisions.push(pipeline.process_frame(frame).await.decision);
    }
    let runs: Vec<usize> = decisions
        .iter()
        .enumerate()
        .filter(|(_, d)| **d == Decision::RunInference)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(runs, vec![0, 3, 6]);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_restart_resets_stats_and_alert() {
    let (mut pipeline, _) = feed_ten_frames(0).await;
    assert_eq!(pipeline.alert().phase, AlertPhase::Triggered);
    let old_session = pipeline.session_id().clone();

    pipeline.reset();

    let stats = pipeline.stats();
    assert_eq!(stats.frames_processed, 0);
    assert_eq!(stats.frames_skipped, 0);
    assert_eq!(stats.alerts_triggered, 0);
    assert_eq!(pipeline.alert().phase, AlertPhase::Idle);
    assert_eq!(pipeline.alert().alert_number, 0);
    assert_ne!(pipeline.session_id(), &old_session);

    // First frame after restart must run inference again.
    let outcome = pipeline
        .process_frame(Arc::new(Frame::blank(8, 8, 0, Instant::now())))
        .await;
    assert_eq!(outcome.decision, Decision::RunInference);
}

#[tokio::test]
async fn test_watchdog_bounds_overlay_with_stalled_provider() {
    let alert = AlertConfig {
        duration: Duration::from_millis(200),
        debounce: Duration::from_millis(100),
        watchdog_interval: Duration::from_millis(50),
    };
    let config = PipelineConfig {
        alert,
        inference_timeout: Duration::from_secs(30),
        ..PipelineConfig::default()
    };
    let provider = Arc::new(StallingProvider {
        calls: AtomicUsize::new(0),
    });
    let (mut pipeline, _zone, settings_tx) = build_pipeline(provider, 0, config);
    let mut ticks = pipeline.subscribe();

    let camera = CameraCandidate::new(0, "synthetic", CameraClass::Unknown);
    let mut source = FrameSource::spawn(
        camera,
        Box::new(SyntheticCamera { remaining: None }),
        settings_tx.subscribe(),
    )
    .unwrap();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(async move {
        let outcome = pipeline.run(&mut source, shutdown_rx).await;
        let closed = source.close(Duration::from_secs(1)).await;
        assert!(closed.is_ok());
        outcome
    });

    let wait = Duration::from_secs(5);
    tokio::time::timeout(wait, ticks.wait_for(|t| t.alert.phase == AlertPhase::Triggered))
        .await
        .expect("alert never triggered")
        .unwrap();
    let seen_triggered = Instant::now();

    tokio::time::timeout(wait, ticks.wait_for(|t| t.alert.phase != AlertPhase::Triggered))
        .await
        .expect("overlay never ended")
        .unwrap();
    let overlay_time = seen_triggered.elapsed();
    assert!(
        overlay_time <= alert.max_overlay_time() + Duration::from_millis(150),
        "overlay stayed up for {:?}",
        overlay_time
    );

    shutdown_tx.send_replace(true);
    let outcome = tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("pipeline did not stop with inference in flight")
        .unwrap();
    assert_eq!(outcome, RunOutcome::Stopped);
}

#[tokio::test]
async fn test_run_returns_at_end_of_stream() {
    let provider = Arc::new(ScriptedProvider {
        hand_frames: 0..=0,
        y: 0.5,
        calls: AtomicUsize::new(0),
    });
    let (mut pipeline, _zone, settings_tx) =
        build_pipeline(provider, 0, PipelineConfig::default());

    let camera = CameraCandidate::new(2, "synthetic", CameraClass::External);
    pipeline.set_camera(Some(camera.clone()));
    let mut source = FrameSource::spawn(
        camera,
        Box::new(SyntheticCamera { remaining: Some(5) }),
        settings_tx.subscribe(),
    )
    .unwrap();

    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let outcome = tokio::time::timeout(Duration::from_secs(5), pipeline.run(&mut source, shutdown_rx))
        .await
        .unwrap();
    assert_eq!(outcome, RunOutcome::EndOfStream);
    assert!(pipeline.stats().frames_captured >= 1);
    let ended = source.close(Duration::from_secs(1)).await;
    assert!(matches!(ended, Err(VisionError::EndOfStream { index: 2 })));
}
