use std::time::Duration;
use tokio::time;
use tracing::{debug, error, info, instrument};

use crate::config::MAX_RECORD_INTERVAL_MINUTES;
use crate::services::WeatherService;

/// Periodically acquire and record the current weather.
///
/// The interval is clamped to `1..=MAX_RECORD_INTERVAL_MINUTES`.
#[instrument(skip(service), fields(interval_minutes = %interval_minutes))]
pub async fn start_record_scheduler(service: WeatherService, interval_minutes: u64) {
    let minutes = interval_minutes.clamp(1, MAX_RECORD_INTERVAL_MINUTES);
    let mut interval = time::interval(Duration::from_secs(minutes * 60));

    info!("Record scheduler started with {} minute interval", minutes);

    loop {
        interval.tick().await;
        debug!("Scheduler tick - recording current weather");

        let current = service.current_weather().await;
        match current.persisted {
            Ok(stored) => {
                info!(
                    "Recorded {}°C from {} as {}",
                    stored.temperature, stored.source, stored.id
                );
            }
            Err(e) => {
                error!("Failed to record current weather: {}", e);
            }
        }
    }
}
