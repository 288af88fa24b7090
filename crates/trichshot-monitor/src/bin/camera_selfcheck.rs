use std::sync::Arc;

use trichshot_monitor::MonitorConfig;
use trichshot_vision::{CameraSelector, SystemProbe};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = MonitorConfig::from_env();

    println!(
        "camera-selfcheck: probing {} device indices",
        config.max_devices
    );
    let candidates = enumerate_cameras(config.max_devices).await?;

    if candidates.is_empty() {
        return Err(anyhow::anyhow!("no camera devices found"));
    }
    for (rank, candidate) in candidates.iter().enumerate() {
        println!("  {}. {}", rank + 1, candidate.describe());
    }

    if let Some(index) = config.camera_index {
        if !candidates.iter().any(|c| c.index == index) {
            return Err(anyhow::anyhow!(
                "TRICH_CAMERA_INDEX={} is not among the detected cameras",
                index
            ));
        }
    }

    config.zone.validate()?;
    config.performance_settings().validate()?;

    println!("camera-selfcheck: ok");
    Ok(())
}

async fn enumerate_cameras(
    max_devices: u32,
) -> anyhow::Result<Vec<trichshot_models::CameraCandidate>> {
    let selector = CameraSelector::new(Arc::new(SystemProbe::new())).with_max_devices(max_devices);
    let candidates = tokio::task::spawn_blocking(move || selector.enumerate()).await?;
    Ok(candidates)
}
