//! Hand proximity monitor binary.

use std::sync::Arc;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trichshot_monitor::{ConsolePresenter, ControlHandle, MonitorConfig, MonitorSession};
use trichshot_vision::{CameraSelector, DeviceOpener, NullLandmarkProvider, SystemProbe};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Colored output for interactive use, JSON when piped to a collector
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("trichshot=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting trichshot monitor");

    let config = MonitorConfig::from_env();
    info!("Monitor config: {:?}", config);

    let metrics = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "Metrics recorder not installed");
            None
        }
    };

    let selector = CameraSelector::new(Arc::new(SystemProbe::new())).with_max_devices(config.max_devices);
    let opener = camera_opener(config.mirror);

    warn!("No hand landmark model configured; detection will never report hands");
    let provider = Arc::new(NullLandmarkProvider);

    let control = ControlHandle::new(
        config.zone,
        config.performance_settings(),
        config.max_frame_skip,
    )?;

    let stats_interval = config.stats_interval;
    let print_metrics = config.print_metrics;
    let mut session = MonitorSession::new(config, selector, opener, provider, control)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let presenter = ConsolePresenter::new(std::io::stdout());
    let presenter_handle = tokio::spawn(presenter.run(
        session.subscribe_ticks(),
        session.subscribe_status(),
        stats_interval,
        shutdown_rx.clone(),
    ));

    // Setup signal handler
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        shutdown_tx.send_replace(true);
    });

    let report = match session.run(shutdown_rx).await {
        Ok(report) => report,
        Err(e) => {
            error!("Session error: {}", e);
            return Err(e.into());
        }
    };

    presenter_handle.await.ok();

    println!("{}", report);
    if print_metrics {
        print_metrics_snapshot(metrics.as_ref());
    }

    info!("Monitor shutdown complete");
    Ok(())
}

#[cfg(feature = "opencv")]
fn camera_opener(mirror: bool) -> Arc<dyn DeviceOpener> {
    Arc::new(trichshot_vision::OpenCvOpener::new(mirror))
}

#[cfg(not(feature = "opencv"))]
fn camera_opener(_mirror: bool) -> Arc<dyn DeviceOpener> {
    warn!("Built without the opencv feature; no camera can be opened");
    Arc::new(UnavailableOpener)
}

#[cfg(not(feature = "opencv"))]
struct UnavailableOpener;

#[cfg(not(feature = "opencv"))]
impl DeviceOpener for UnavailableOpener {
    fn open(
        &self,
        candidate: &trichshot_models::CameraCandidate,
        _settings: &trichshot_models::PerformanceSettings,
    ) -> trichshot_vision::VisionResult<Box<dyn trichshot_vision::CaptureDevice>> {
        Err(trichshot_vision::VisionError::device_unavailable(
            candidate.index,
            "camera backend not compiled in",
        ))
    }
}

fn print_metrics_snapshot(handle: Option<&PrometheusHandle>) {
    match handle {
        Some(handle) => println!("{}", handle.render()),
        None => println!("metrics unavailable"),
    }
}
