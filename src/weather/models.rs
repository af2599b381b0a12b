use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::weather::compass::{compass_label, round_to_tenth};
use crate::weather::trend::TrendEstimator;

pub const TEMPERATURE_UNIT: &str = "°C";
pub const WIND_SPEED_UNIT: &str = "m/s";
pub const PRECIPITATION_UNIT: &str = "mm";
pub const PRESSURE_UNIT: &str = "hPa";
pub const WIND_DIRECTION_UNIT: &str = "°";

/// The station's fixed location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    /// Shown to API callers, e.g. "Sivas, Türkiye"
    pub display_name: &'static str,
    /// Recorded on stored readings, e.g. "Sivas"
    pub short_name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

pub const SIVAS: Location = Location {
    display_name: "Sivas, Türkiye",
    short_name: "Sivas",
    latitude: 39.7477,
    longitude: 37.0179,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

/// Scalar parameters that carry a trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
    Temperature,
    WindSpeed,
    Precipitation,
    Pressure,
}

impl Parameter {
    pub fn unit(self) -> &'static str {
        match self {
            Parameter::Temperature => TEMPERATURE_UNIT,
            Parameter::WindSpeed => WIND_SPEED_UNIT,
            Parameter::Precipitation => PRECIPITATION_UNIT,
            Parameter::Pressure => PRESSURE_UNIT,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Parameter::Temperature => "thermometer",
            Parameter::WindSpeed => "wind",
            Parameter::Precipitation => "cloud-rain",
            Parameter::Pressure => "gauge",
        }
    }
}

/// Which acquisition path produced a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    OpenWeatherMap,
    Synthetic,
}

impl Provenance {
    pub fn as_str(self) -> &'static str {
        match self {
            Provenance::OpenWeatherMap => "openweathermap",
            Provenance::Synthetic => "synthetic",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw, unrounded conditions as produced by one of the acquisition paths.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub temperature: f64,
    pub humidity: i32,
    pub pressure: f64,
    pub wind_speed: f64,
    /// Always in `0..=359`
    pub wind_direction_degrees: u16,
    pub precipitation: f64,
    pub visibility_km: Option<f64>,
    pub provenance: Provenance,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Measurement {
    pub value: f64,
    pub unit: String,
    pub trend: Trend,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WindDirection {
    /// Compass label, one of N, NNE, ..., NNW
    pub value: String,
    pub degrees: u16,
    pub unit: String,
    pub trend: Trend,
    pub icon: String,
}

/// Normalized, unit-tagged weather snapshot returned to API callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalReading {
    pub temperature: Measurement,
    pub wind_speed: Measurement,
    pub precipitation: Measurement,
    pub pressure: Measurement,
    pub wind_direction: WindDirection,
    pub location: String,
    pub last_update: DateTime<Utc>,
}

impl CanonicalReading {
    /// Round every value to one decimal, attach units, icons and trends.
    pub fn from_observation(
        observation: &Observation,
        location: &Location,
        trends: &dyn TrendEstimator,
    ) -> Self {
        let measure = |parameter: Parameter, raw: f64| Measurement {
            value: round_to_tenth(raw),
            unit: parameter.unit().to_string(),
            trend: trends.estimate(parameter, raw),
            icon: parameter.icon().to_string(),
        };

        let degrees = observation.wind_direction_degrees % 360;

        Self {
            temperature: measure(Parameter::Temperature, observation.temperature),
            wind_speed: measure(Parameter::WindSpeed, observation.wind_speed),
            precipitation: measure(Parameter::Precipitation, observation.precipitation),
            pressure: measure(Parameter::Pressure, observation.pressure),
            wind_direction: WindDirection {
                value: compass_label(f64::from(degrees)).to_string(),
                degrees,
                unit: WIND_DIRECTION_UNIT.to_string(),
                trend: Trend::Stable,
                icon: "compass".to_string(),
            },
            location: location.display_name.to_string(),
            last_update: observation.observed_at,
        }
    }
}
