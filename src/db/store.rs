use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::db::{DbError, StoredReading};

pub const DEFAULT_HISTORY_LIMIT: i64 = 24;

/// Append-only persistence for acquired readings.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Durably add one reading.
    async fn append(&self, reading: &StoredReading) -> Result<(), DbError>;

    /// Up to `limit` readings, newest first. `limit` must be positive.
    async fn recent(&self, limit: i64) -> Result<Vec<StoredReading>, DbError>;

    /// Check that the datastore is reachable.
    async fn ping(&self) -> Result<(), DbError>;
}

pub fn validate_limit(limit: i64) -> Result<i64, DbError> {
    if limit <= 0 {
        return Err(DbError::InvalidArgument(format!(
            "limit must be a positive integer, got {limit}"
        )));
    }
    Ok(limit)
}

/// In-process store used when no database is configured.
#[derive(Clone, Default)]
pub struct MemoryReadingStore {
    readings: Arc<RwLock<Vec<StoredReading>>>,
}

impl MemoryReadingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReadingStore for MemoryReadingStore {
    #[instrument(skip(self, reading), fields(id = %reading.id))]
    async fn append(&self, reading: &StoredReading) -> Result<(), DbError> {
        self.readings.write().await.push(reading.clone());
        debug!("Appended reading to memory store");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn recent(&self, limit: i64) -> Result<Vec<StoredReading>, DbError> {
        let limit = validate_limit(limit)?;
        let readings = self.readings.read().await;

        // Newest insert first so equal timestamps keep read-your-write order
        let mut recent: Vec<StoredReading> = readings.iter().rev().cloned().collect();
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        recent.truncate(limit as usize);

        debug!("Found {} readings", recent.len());
        Ok(recent)
    }

    async fn ping(&self) -> Result<(), DbError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn reading_at(minutes: i64) -> StoredReading {
        StoredReading {
            id: Uuid::new_v4(),
            location: "Sivas".to_string(),
            temperature: 10.0 + minutes as f64,
            wind_speed: 3.0,
            precipitation: 0.0,
            pressure: 1013.2,
            wind_direction: 90,
            wind_direction_text: "E".to_string(),
            humidity: Some(60),
            visibility: None,
            timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
                + Duration::minutes(minutes),
            source: "synthetic".to_string(),
        }
    }

    #[test]
    fn test_validate_limit() {
        assert_eq!(validate_limit(1).unwrap(), 1);
        assert_eq!(validate_limit(24).unwrap(), 24);
        assert!(matches!(validate_limit(0), Err(DbError::InvalidArgument(_))));
        assert!(matches!(validate_limit(-5), Err(DbError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_recent_orders_newest_first_and_truncates() {
        let store = MemoryReadingStore::new();
        for minutes in [5, 1, 9, 3, 7] {
            store.append(&reading_at(minutes)).await.unwrap();
        }

        let recent = store.recent(3).await.unwrap();
        let temperatures: Vec<f64> = recent.iter().map(|r| r.temperature).collect();
        assert_eq!(temperatures, vec![19.0, 17.0, 15.0]);
    }

    #[tokio::test]
    async fn test_recent_with_large_limit_returns_everything() {
        let store = MemoryReadingStore::new();
        store.append(&reading_at(1)).await.unwrap();
        store.append(&reading_at(2)).await.unwrap();

        let recent = store.recent(100).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert!(recent[0].timestamp > recent[1].timestamp);
    }

    #[tokio::test]
    async fn test_recent_rejects_non_positive_limit() {
        let store = MemoryReadingStore::new();
        assert!(matches!(
            store.recent(0).await,
            Err(DbError::InvalidArgument(_))
        ));
        assert!(matches!(
            store.recent(-1).await,
            Err(DbError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_read_your_write_with_equal_timestamps() {
        let store = MemoryReadingStore::new();
        let first = reading_at(0);
        let mut second = reading_at(0);
        second.temperature = 99.0;

        store.append(&first).await.unwrap();
        store.append(&second).await.unwrap();

        let latest = store.recent(1).await.unwrap();
        assert_eq!(latest[0].id, second.id);
    }
}
