use std::sync::Arc;
use tracing::{error, instrument};

use crate::db::{DbError, ReadingStore, StoredReading};
use crate::weather::{CanonicalReading, UpstreamStatus, WeatherAcquisition};

/// Outcome of serving the current weather. The reading is always present;
/// persisting it may have failed independently.
#[derive(Debug)]
pub struct CurrentWeather {
    pub reading: CanonicalReading,
    pub persisted: Result<StoredReading, DbError>,
}

#[derive(Clone)]
pub struct WeatherService {
    acquisition: WeatherAcquisition,
    store: Arc<dyn ReadingStore>,
}

impl WeatherService {
    pub fn new(acquisition: WeatherAcquisition, store: Arc<dyn ReadingStore>) -> Self {
        Self { acquisition, store }
    }

    /// Acquire the current reading and record it.
    #[instrument(skip(self))]
    pub async fn current_weather(&self) -> CurrentWeather {
        let acquisition = self.acquisition.acquire().await;
        let stored = StoredReading::from_acquisition(&acquisition, self.acquisition.location());

        let persisted = match self.store.append(&stored).await {
            Ok(()) => Ok(stored),
            Err(e) => {
                error!(error = %e, "Failed to persist weather reading");
                Err(e)
            }
        };

        CurrentWeather {
            reading: acquisition.reading,
            persisted,
        }
    }

    pub async fn upstream_status(&self) -> UpstreamStatus {
        self.acquisition.upstream_status().await
    }

    pub async fn database_reachable(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Datastore ping failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryReadingStore;
    use crate::weather::{WeatherSource, SIVAS};
    use async_trait::async_trait;

    struct UnreachableStore;

    #[async_trait]
    impl ReadingStore for UnreachableStore {
        async fn append(&self, _reading: &StoredReading) -> Result<(), DbError> {
            Err(DbError::Persistence(sqlx::Error::PoolTimedOut))
        }

        async fn recent(&self, _limit: i64) -> Result<Vec<StoredReading>, DbError> {
            Err(DbError::Persistence(sqlx::Error::PoolTimedOut))
        }

        async fn ping(&self) -> Result<(), DbError> {
            Err(DbError::Persistence(sqlx::Error::PoolTimedOut))
        }
    }

    #[tokio::test]
    async fn test_current_weather_is_recorded() {
        let store = Arc::new(MemoryReadingStore::new());
        let service = WeatherService::new(
            WeatherAcquisition::new(WeatherSource::Synthetic, SIVAS),
            store.clone(),
        );

        let current = service.current_weather().await;
        let stored = current.persisted.unwrap();

        assert_eq!(stored.location, "Sivas");
        assert_eq!(stored.source, "synthetic");
        assert_eq!(stored.temperature, current.reading.temperature.value);
        assert_eq!(stored.pressure, current.reading.pressure.value);
        assert_eq!(stored.wind_direction_text, current.reading.wind_direction.value);
        assert_eq!(
            stored.wind_direction,
            i32::from(current.reading.wind_direction.degrees)
        );

        let recent = store.recent(1).await.unwrap();
        assert_eq!(recent[0].id, stored.id);
    }

    #[tokio::test]
    async fn test_persistence_failure_still_returns_reading() {
        let service = WeatherService::new(
            WeatherAcquisition::new(WeatherSource::Synthetic, SIVAS),
            Arc::new(UnreachableStore),
        );

        let current = service.current_weather().await;
        assert!(matches!(current.persisted, Err(DbError::Persistence(_))));
        assert_eq!(current.reading.location, "Sivas, Türkiye");
        assert!(!service.database_reachable().await);
    }
}
