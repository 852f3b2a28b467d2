use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::process::Command;

use crate::notifier::Notifier;

// @module: Raspberry Pi temperature monitoring

const CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Parse `vcgencmd measure_temp` output such as `temp=47.2'C`
pub fn parse_temperature(output: &str) -> Option<f32> {
    output
        .trim()
        .strip_prefix("temp=")?
        .trim_end_matches("'C")
        .parse()
        .ok()
}

/// Current CPU temperature, `None` when it can't be read
pub async fn read_cpu_temperature() -> Option<f32> {
    let output = Command::new("vcgencmd").arg("measure_temp").output().await.ok()?;
    if !output.status.success() {
        return None;
    }
    parse_temperature(&String::from_utf8_lossy(&output.stdout))
}

/// Warn through the notifier whenever the temperature exceeds the threshold
pub async fn monitor_system(notifier: Arc<dyn Notifier>, threshold: f32) {
    let mut interval = tokio::time::interval(CHECK_INTERVAL);
    loop {
        interval.tick().await;
        check_temperature(notifier.as_ref(), read_cpu_temperature().await, threshold).await;
    }
}

/// One monitoring step; returns whether a warning was sent
pub async fn check_temperature(notifier: &dyn Notifier, temperature: Option<f32>, threshold: f32) -> bool {
    let Some(temp) = temperature else {
        return false;
    };

    debug!("Current temperature: {:.1}°C", temp);
    if temp <= threshold {
        return false;
    }

    let message = format!("Hitzewarnung: {:.1}°C", temp);
    warn!("{}", message);
    notifier.send_warning(&format!("⚠️ {}", message)).await;
    true
}
