//! Monitor configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;
use trichshot_models::{DangerZone, PerformanceMode, PerformanceSettings, Resolution, MAX_FRAME_SKIP};
use trichshot_vision::camera::DEFAULT_MAX_DEVICES;
use trichshot_vision::capture::DEFAULT_RELEASE_TIMEOUT;
use trichshot_vision::pipeline::DEFAULT_INFERENCE_TIMEOUT;
use trichshot_vision::{AlertConfig, PipelineConfig};

/// Individual overrides on top of a performance preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerformanceOverrides {
    pub resolution: Option<Resolution>,
    pub target_fps: Option<u32>,
    pub frame_skip: Option<u32>,
}

impl PerformanceOverrides {
    /// Apply the overrides to a preset's settings.
    pub fn apply(&self, base: PerformanceSettings) -> PerformanceSettings {
        let mut settings = base;
        if let Some(resolution) = self.resolution {
            settings = settings.with_resolution(resolution);
        }
        if let Some(fps) = self.target_fps {
            settings = settings.with_target_fps(fps);
        }
        if let Some(skip) = self.frame_skip {
            settings = settings.with_frame_skip(skip);
        }
        settings
    }

    pub fn is_empty(&self) -> bool {
        self.resolution.is_none() && self.target_fps.is_none() && self.frame_skip.is_none()
    }
}

/// Monitor configuration.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Initial danger zone
    pub zone: DangerZone,
    /// Initial performance preset
    pub performance_mode: PerformanceMode,
    /// Overrides applied on top of the preset
    pub overrides: PerformanceOverrides,
    /// Overlay duration per alert
    pub alert_duration: Duration,
    /// Re-trigger suppression while cooling
    pub debounce: Duration,
    /// Watchdog period bounding overlay time
    pub watchdog_interval: Duration,
    /// Bound on a single inference call
    pub inference_timeout: Duration,
    /// Ceiling for frame skip under resource pressure
    pub max_frame_skip: u32,
    /// Camera to try first, ahead of the preference order
    pub camera_index: Option<u32>,
    /// Device indices probed during enumeration
    pub max_devices: u32,
    /// Mirror frames horizontally (selfie view)
    pub mirror: bool,
    /// Append-only alert log (JSON Lines); disabled when unset
    pub session_log: Option<PathBuf>,
    /// How often the console prints session stats
    pub stats_interval: Duration,
    /// How long to wait for the camera to be released on stop
    pub release_timeout: Duration,
    /// Print Prometheus metrics in the end-of-session report
    pub print_metrics: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        let alert = AlertConfig::default();
        Self {
            zone: DangerZone::default(),
            performance_mode: PerformanceMode::default(),
            overrides: PerformanceOverrides::default(),
            alert_duration: alert.duration,
            debounce: alert.debounce,
            watchdog_interval: alert.watchdog_interval,
            inference_timeout: DEFAULT_INFERENCE_TIMEOUT,
            max_frame_skip: MAX_FRAME_SKIP,
            camera_index: None,
            max_devices: DEFAULT_MAX_DEVICES,
            mirror: true,
            session_log: None,
            stats_interval: Duration::from_secs(10),
            release_timeout: DEFAULT_RELEASE_TIMEOUT,
            print_metrics: false,
        }
    }
}

impl MonitorConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from any key lookup. Invalid values are logged and the
    /// default is kept.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let zone = DangerZone {
            top_pct: parse_or(&lookup, "TRICH_ZONE_TOP", defaults.zone.top_pct),
            bottom_pct: parse_or(&lookup, "TRICH_ZONE_BOTTOM", defaults.zone.bottom_pct),
            left_pct: parse_or(&lookup, "TRICH_ZONE_LEFT", defaults.zone.left_pct),
            right_pct: parse_or(&lookup, "TRICH_ZONE_RIGHT", defaults.zone.right_pct),
        };
        let zone = match zone.validate() {
            Ok(()) => zone,
            Err(e) => {
                warn!(error = %e, "Ignoring invalid danger zone, using default");
                defaults.zone
            }
        };

        let performance_mode = parse_or(&lookup, "TRICH_PERFORMANCE_MODE", defaults.performance_mode);
        let overrides = PerformanceOverrides {
            resolution: parse_opt(&lookup, "TRICH_RESOLUTION"),
            target_fps: parse_opt(&lookup, "TRICH_TARGET_FPS"),
            frame_skip: parse_opt(&lookup, "TRICH_FRAME_SKIP"),
        };
        let overrides = match overrides.apply(performance_mode.settings()).validate() {
            Ok(()) => overrides,
            Err(e) => {
                warn!(error = %e, mode = %performance_mode, "Ignoring invalid performance overrides");
                PerformanceOverrides::default()
            }
        };

        let max_frame_skip = parse_or(&lookup, "TRICH_MAX_FRAME_SKIP", defaults.max_frame_skip);
        let max_frame_skip = if max_frame_skip > MAX_FRAME_SKIP {
            warn!(value = max_frame_skip, max = MAX_FRAME_SKIP, "TRICH_MAX_FRAME_SKIP too large, clamping");
            MAX_FRAME_SKIP
        } else {
            max_frame_skip
        };

        Self {
            zone,
            performance_mode,
            overrides,
            alert_duration: millis_or(&lookup, "TRICH_ALERT_DURATION_MS", defaults.alert_duration),
            debounce: Duration::from_millis(parse_or(
                &lookup,
                "TRICH_DEBOUNCE_MS",
                defaults.debounce.as_millis() as u64,
            )),
            watchdog_interval: millis_or(&lookup, "TRICH_WATCHDOG_MS", defaults.watchdog_interval),
            inference_timeout: millis_or(
                &lookup,
                "TRICH_INFERENCE_TIMEOUT_MS",
                defaults.inference_timeout,
            ),
            max_frame_skip,
            camera_index: parse_opt(&lookup, "TRICH_CAMERA_INDEX"),
            max_devices: parse_or(&lookup, "TRICH_MAX_DEVICES", defaults.max_devices),
            mirror: parse_or(&lookup, "TRICH_MIRROR", defaults.mirror),
            session_log: lookup("TRICH_SESSION_LOG")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            stats_interval: Duration::from_secs(parse_or(
                &lookup,
                "TRICH_STATS_INTERVAL_SECS",
                defaults.stats_interval.as_secs(),
            ))
            .max(Duration::from_secs(1)),
            release_timeout: millis_or(&lookup, "TRICH_RELEASE_TIMEOUT_MS", defaults.release_timeout),
            print_metrics: parse_or(&lookup, "TRICH_PRINT_METRICS", defaults.print_metrics),
        }
    }

    /// Effective capture/inference settings: preset plus overrides.
    pub fn performance_settings(&self) -> PerformanceSettings {
        self.overrides.apply(self.performance_mode.settings())
    }

    pub fn alert_config(&self) -> AlertConfig {
        AlertConfig {
            duration: self.alert_duration,
            debounce: self.debounce,
            watchdog_interval: self.watchdog_interval,
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            alert: self.alert_config(),
            inference_timeout: self.inference_timeout,
            max_frame_skip: self.max_frame_skip,
        }
    }
}

fn parse_opt<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable setting");
            None
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    parse_opt(lookup, key).unwrap_or(default)
}

/// Millisecond duration; zero is rejected in favour of the default.
fn millis_or<F>(lookup: &F, key: &str, default: Duration) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    match parse_opt::<F, u64>(lookup, key) {
        Some(0) => {
            warn!(key, "Setting must be greater than zero, using default");
            default
        }
        Some(ms) => Duration::from_millis(ms),
        None => default,
    }
}
