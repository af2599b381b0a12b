use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, error, info, instrument};

use crate::db::store::{validate_limit, ReadingStore};
use crate::db::{DbError, StoredReading};

#[derive(Clone)]
pub struct ReadingRepository {
    pool: PgPool,
}

impl ReadingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a single reading; one row, no transaction needed
    #[instrument(skip(self, reading), fields(id = %reading.id, source = %reading.source))]
    pub async fn insert_reading(&self, reading: &StoredReading) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO weather_readings (
                id, location, temperature, wind_speed, precipitation, pressure,
                wind_direction, wind_direction_text, humidity, visibility,
                timestamp, source
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(reading.id)
        .bind(&reading.location)
        .bind(reading.temperature)
        .bind(reading.wind_speed)
        .bind(reading.precipitation)
        .bind(reading.pressure)
        .bind(reading.wind_direction)
        .bind(&reading.wind_direction_text)
        .bind(reading.humidity)
        .bind(reading.visibility)
        .bind(reading.timestamp)
        .bind(&reading.source)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(id = %reading.id, error = %e, "Failed to insert weather reading");
            e
        })?;

        info!(
            "Stored reading for {}: {}°C from {}",
            reading.location, reading.temperature, reading.source
        );
        Ok(())
    }

    /// Most recent readings, newest first; equal timestamps are returned
    /// latest insert first
    #[instrument(skip(self))]
    pub async fn find_recent(&self, limit: i64) -> Result<Vec<StoredReading>, DbError> {
        let limit = validate_limit(limit)?;
        debug!("Querying {} most recent readings", limit);

        let readings = sqlx::query_as::<_, StoredReading>(
            r#"
            SELECT id, location, temperature, wind_speed, precipitation, pressure,
                   wind_direction, wind_direction_text, humidity, visibility,
                   timestamp, source
            FROM weather_readings
            ORDER BY timestamp DESC, seq DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!("Found {} readings", readings.len());
        Ok(readings)
    }
}

#[async_trait]
impl ReadingStore for ReadingRepository {
    async fn append(&self, reading: &StoredReading) -> Result<(), DbError> {
        self.insert_reading(reading).await
    }

    async fn recent(&self, limit: i64) -> Result<Vec<StoredReading>, DbError> {
        self.find_recent(limit).await
    }

    #[instrument(skip(self))]
    async fn ping(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
