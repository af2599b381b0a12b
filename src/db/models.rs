use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::weather::{round_to_tenth, Acquisition, Location};

/// Persisted form of one acquisition.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct StoredReading {
    pub id: Uuid,
    pub location: String,
    pub temperature: f64,
    pub wind_speed: f64,
    pub precipitation: f64,
    pub pressure: f64,
    /// Degrees, `0..=359`
    pub wind_direction: i32,
    pub wind_direction_text: String,
    pub humidity: Option<i32>,
    /// Kilometres
    pub visibility: Option<f64>,
    pub timestamp: DateTime<Utc>,
    pub source: String,
}

impl StoredReading {
    /// Flatten an acquisition, taking the reported (rounded) values.
    pub fn from_acquisition(acquisition: &Acquisition, location: &Location) -> Self {
        let reading = &acquisition.reading;
        let observation = &acquisition.observation;

        Self {
            id: Uuid::new_v4(),
            location: location.short_name.to_string(),
            temperature: reading.temperature.value,
            wind_speed: reading.wind_speed.value,
            precipitation: reading.precipitation.value,
            pressure: reading.pressure.value,
            wind_direction: i32::from(reading.wind_direction.degrees),
            wind_direction_text: reading.wind_direction.value.clone(),
            humidity: Some(observation.humidity),
            visibility: observation.visibility_km.map(round_to_tenth),
            timestamp: Utc::now(),
            source: observation.provenance.as_str().to_string(),
        }
    }
}
