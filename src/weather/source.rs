use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::{self, Instant};
use tracing::{debug, info, instrument, warn};

use crate::config::{Config, SourceKind};
use crate::fetch_error::FetchError;
use crate::fetcher::{OpenWeatherFetcher, UpstreamObservation};
use crate::weather::models::{CanonicalReading, Location, Observation, Provenance};
use crate::weather::synthetic;
use crate::weather::trend::{RandomTrend, TrendEstimator};

/// Where current conditions come from.
#[derive(Clone)]
pub enum WeatherSource {
    /// Live provider, with synthetic fallback when it is unavailable
    OpenWeatherMap(OpenWeatherFetcher),
    /// Calendar-driven synthetic data only
    Synthetic,
}

impl WeatherSource {
    /// Select the source named by configuration. The live provider needs an
    /// API key; without one the station runs on synthetic data.
    pub fn from_config(config: &Config, location: Location) -> Result<Self, FetchError> {
        match (config.weather_source, &config.openweather_api_key) {
            (SourceKind::Synthetic, _) => Ok(WeatherSource::Synthetic),
            (SourceKind::OpenWeatherMap, Some(api_key)) => {
                let fetcher = OpenWeatherFetcher::new(
                    config.openweather_base_url.clone(),
                    api_key.clone(),
                    location,
                    config.upstream_timeout(),
                )?;
                Ok(WeatherSource::OpenWeatherMap(fetcher))
            }
            (SourceKind::OpenWeatherMap, None) => {
                warn!("OPENWEATHER_API_KEY is not set, using synthetic weather data");
                Ok(WeatherSource::Synthetic)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WeatherSource::OpenWeatherMap(_) => "openweathermap",
            WeatherSource::Synthetic => "synthetic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamStatus {
    Available,
    Unavailable,
    /// No live provider is configured
    Synthetic,
}

impl UpstreamStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            UpstreamStatus::Available => "available",
            UpstreamStatus::Unavailable => "unavailable",
            UpstreamStatus::Synthetic => "synthetic",
        }
    }
}

/// A canonical reading together with the raw observation behind it.
#[derive(Debug, Clone)]
pub struct Acquisition {
    pub reading: CanonicalReading,
    pub observation: Observation,
}

/// Upper bound on a health check's own request to the live provider
pub const UPSTREAM_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// How long a live fetch outcome answers health checks without a new request
pub const UPSTREAM_STATUS_TTL: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct WeatherAcquisition {
    source: WeatherSource,
    location: Location,
    trends: Arc<dyn TrendEstimator>,
    check_timeout: Duration,
    last_upstream: Arc<RwLock<Option<(UpstreamStatus, Instant)>>>,
}

impl WeatherAcquisition {
    pub fn new(source: WeatherSource, location: Location) -> Self {
        Self {
            source,
            location,
            trends: Arc::new(RandomTrend),
            check_timeout: UPSTREAM_CHECK_TIMEOUT,
            last_upstream: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_trend_estimator(mut self, trends: Arc<dyn TrendEstimator>) -> Self {
        self.trends = trends;
        self
    }

    pub fn with_check_timeout(mut self, check_timeout: Duration) -> Self {
        self.check_timeout = check_timeout;
        self
    }

    pub fn source(&self) -> &WeatherSource {
        &self.source
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Current conditions for the station. Never fails: an unavailable
    /// upstream degrades to synthetic data.
    pub async fn acquire_current(&self) -> CanonicalReading {
        self.acquire().await.reading
    }

    #[instrument(skip(self), fields(source = self.source.name()))]
    pub async fn acquire(&self) -> Acquisition {
        let observation = self.observe().await;
        debug!(
            provenance = %observation.provenance,
            temperature = observation.temperature,
            "Normalizing observation"
        );
        let reading =
            CanonicalReading::from_observation(&observation, &self.location, self.trends.as_ref());
        Acquisition {
            reading,
            observation,
        }
    }

    /// Reachability of the live provider, for health reporting.
    ///
    /// Answers from the last live fetch when it is younger than
    /// `UPSTREAM_STATUS_TTL`; otherwise issues one request bounded by the
    /// check timeout, independent of the fetcher's own timeout.
    pub async fn upstream_status(&self) -> UpstreamStatus {
        let WeatherSource::OpenWeatherMap(fetcher) = &self.source else {
            return UpstreamStatus::Synthetic;
        };

        if let Some((status, at)) = *self.last_upstream.read().await {
            if at.elapsed() < UPSTREAM_STATUS_TTL {
                debug!(status = status.as_str(), "Reusing recent upstream status");
                return status;
            }
        }

        let status = match time::timeout(self.check_timeout, fetcher.fetch_current()).await {
            Ok(Ok(_)) => UpstreamStatus::Available,
            Ok(Err(e)) => {
                warn!(error = %e, "Upstream weather provider check failed");
                UpstreamStatus::Unavailable
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.check_timeout.as_millis() as u64,
                    "Upstream weather provider check timed out"
                );
                UpstreamStatus::Unavailable
            }
        };
        self.remember_upstream(status).await;
        status
    }

    async fn remember_upstream(&self, status: UpstreamStatus) {
        *self.last_upstream.write().await = Some((status, Instant::now()));
    }

    async fn observe(&self) -> Observation {
        if let WeatherSource::OpenWeatherMap(fetcher) = &self.source {
            let fetched = fetcher.fetch_current().await;
            self.remember_upstream(if fetched.is_ok() {
                UpstreamStatus::Available
            } else {
                UpstreamStatus::Unavailable
            })
            .await;

            match fetched {
                Ok(upstream) => {
                    info!(
                        "Weather data retrieved for {}: {}°C, humidity {}%",
                        self.location.short_name, upstream.temperature, upstream.humidity
                    );
                    return complete_upstream(upstream, Utc::now());
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        timeout = e.is_timeout(),
                        "Upstream weather provider unavailable, falling back to synthetic data"
                    );
                }
            }
        }
        synthetic_observation(Utc::now())
    }
}

/// Fill what the upstream payload left out, seeded by its real values.
fn complete_upstream(upstream: UpstreamObservation, now: DateTime<Utc>) -> Observation {
    let derived = synthetic::derive_missing(upstream.temperature, upstream.humidity, &mut rand::rng());

    Observation {
        temperature: upstream.temperature,
        humidity: upstream.humidity.round() as i32,
        pressure: upstream.pressure.unwrap_or(derived.pressure),
        wind_speed: upstream.wind_speed.unwrap_or(derived.wind_speed),
        wind_direction_degrees: upstream
            .wind_direction_degrees
            .map(normalize_degrees)
            .unwrap_or(derived.wind_direction_degrees),
        precipitation: upstream
            .precipitation
            .unwrap_or(derived.precipitation)
            .max(0.0),
        visibility_km: upstream.visibility_m.map(|m| m / 1000.0),
        provenance: Provenance::OpenWeatherMap,
        observed_at: now,
    }
}

fn synthetic_observation(now: DateTime<Utc>) -> Observation {
    let conditions = synthetic::generate(now, &mut rand::rng());

    Observation {
        temperature: conditions.temperature,
        humidity: conditions.humidity,
        pressure: conditions.pressure,
        wind_speed: conditions.wind_speed,
        wind_direction_degrees: conditions.wind_direction_degrees,
        precipitation: conditions.precipitation,
        visibility_km: None,
        provenance: Provenance::Synthetic,
        observed_at: now,
    }
}

fn normalize_degrees(degrees: f64) -> u16 {
    (degrees.round() as i64).rem_euclid(360) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::models::SIVAS;
    use crate::weather::COMPASS_POINTS;

    fn upstream(temperature: f64, humidity: f64) -> UpstreamObservation {
        UpstreamObservation {
            temperature,
            humidity,
            pressure: None,
            wind_speed: None,
            wind_direction_degrees: None,
            precipitation: None,
            visibility_m: None,
        }
    }

    #[test]
    fn test_complete_upstream_keeps_reported_fields() {
        let reported = UpstreamObservation {
            pressure: Some(1021.0),
            wind_speed: Some(3.4),
            wind_direction_degrees: Some(90.0),
            precipitation: Some(0.0),
            visibility_m: Some(8000.0),
            ..upstream(12.0, 90.0)
        };

        let observation = complete_upstream(reported, Utc::now());
        assert_eq!(observation.pressure, 1021.0);
        assert_eq!(observation.wind_speed, 3.4);
        assert_eq!(observation.wind_direction_degrees, 90);
        assert_eq!(observation.precipitation, 0.0);
        assert_eq!(observation.visibility_km, Some(8.0));
        assert_eq!(observation.humidity, 90);
        assert_eq!(observation.provenance, Provenance::OpenWeatherMap);
    }

    #[test]
    fn test_complete_upstream_derives_absent_fields() {
        for _ in 0..200 {
            let observation = complete_upstream(upstream(20.0, 50.0), Utc::now());
            assert!((1005.75..=1015.75).contains(&observation.pressure));
            assert!((2.0..=12.0).contains(&observation.wind_speed));
            assert!(observation.wind_direction_degrees <= 359);
            assert_eq!(observation.precipitation, 0.0);
        }
    }

    #[test]
    fn test_normalize_degrees_wraps() {
        assert_eq!(normalize_degrees(359.6), 0);
        assert_eq!(normalize_degrees(-10.0), 350);
        assert_eq!(normalize_degrees(45.2), 45);
    }

    #[tokio::test]
    async fn test_synthetic_source_acquires_complete_reading() {
        let acquisition = WeatherAcquisition::new(WeatherSource::Synthetic, SIVAS);
        let Acquisition {
            reading,
            observation,
        } = acquisition.acquire().await;

        assert_eq!(observation.provenance, Provenance::Synthetic);
        assert!(reading.precipitation.value >= 0.0);
        assert!(reading.wind_direction.degrees <= 359);
        assert!(COMPASS_POINTS.contains(&reading.wind_direction.value.as_str()));
        assert_eq!(reading.location, "Sivas, Türkiye");
    }

    #[test]
    fn test_from_config_without_api_key_is_synthetic() {
        let config = Config::from_lookup(|_| None).unwrap();
        let source = WeatherSource::from_config(&config, SIVAS).unwrap();
        assert_eq!(source.name(), "synthetic");
    }

    #[test]
    fn test_from_config_with_api_key_is_live() {
        let config = Config::from_lookup(|name| {
            (name == "OPENWEATHER_API_KEY").then(|| "key".to_string())
        })
        .unwrap();
        let source = WeatherSource::from_config(&config, SIVAS).unwrap();
        assert_eq!(source.name(), "openweathermap");
    }

    #[tokio::test]
    async fn test_synthetic_source_status() {
        let acquisition = WeatherAcquisition::new(WeatherSource::Synthetic, SIVAS);
        assert_eq!(acquisition.upstream_status().await, UpstreamStatus::Synthetic);
    }
}
