//! Plausible weather for a temperate continental climate.
//!
//! Two entry points: [`derive_missing`] fills the fields a cheap upstream
//! payload leaves out, seeded by its real temperature and humidity, and
//! [`generate`] builds a whole observation from the calendar alone.

use chrono::{DateTime, Datelike, Timelike, Utc};
use rand::Rng;
use std::f64::consts::PI;

const STANDARD_PRESSURE_HPA: f64 = 1013.25;

/// (min, max) °C per month, January first.
const SEASONAL_TEMPERATURES: [(f64, f64); 12] = [
    (-10.0, 2.0),
    (-9.0, 4.0),
    (-4.0, 10.0),
    (2.0, 17.0),
    (6.0, 21.0),
    (10.0, 26.0),
    (13.0, 30.0),
    (13.0, 30.0),
    (9.0, 26.0),
    (4.0, 19.0),
    (-2.0, 11.0),
    (-7.0, 4.0),
];

pub const HUMIDITY_MIN: i32 = 30;
pub const HUMIDITY_MAX: i32 = 95;

/// Fields derived around a real temperature and humidity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedFields {
    pub pressure: f64,
    pub wind_speed: f64,
    pub wind_direction_degrees: u16,
    pub precipitation: f64,
}

/// A complete synthetic observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticConditions {
    pub temperature: f64,
    pub humidity: i32,
    pub pressure: f64,
    pub wind_speed: f64,
    pub wind_direction_degrees: u16,
    pub precipitation: f64,
}

pub fn derive_missing<R: Rng + ?Sized>(temperature: f64, humidity: f64, rng: &mut R) -> DerivedFields {
    let pressure = STANDARD_PRESSURE_HPA + (temperature - 15.0) * -0.5 + rng.random_range(-5.0..=5.0);

    let precipitation = if humidity <= 60.0 {
        0.0
    } else if humidity <= 80.0 {
        rng.random_range(0.0..=1.0)
    } else {
        rng.random_range(0.0..=3.0)
    };

    DerivedFields {
        pressure,
        wind_speed: rng.random_range(2.0..=12.0),
        wind_direction_degrees: rng.random_range(0..=359),
        precipitation,
    }
}

pub fn generate<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> SyntheticConditions {
    let month = now.month();
    let hour = f64::from(now.hour());

    let (min_temp, max_temp) = seasonal_range(month);
    let variation = ((hour - 6.0) * PI / 12.0).sin() * 0.4;
    let base_temp = min_temp + (max_temp - min_temp) * (0.6 + variation);
    let temperature = base_temp + rng.random_range(-3.0..=3.0);

    let humidity_baseline = if is_winter(month) {
        70
    } else if is_summer(month) {
        50
    } else {
        60
    };
    let humidity =
        (humidity_baseline + rng.random_range(-15..=15)).clamp(HUMIDITY_MIN, HUMIDITY_MAX);

    // Winter and spring are the wet half of the year
    let precipitation = if month == 12 || month <= 5 {
        if rng.random_bool(0.3) {
            rng.random_range(0.1..=4.0)
        } else {
            0.0
        }
    } else if rng.random_bool(0.1) {
        rng.random_range(0.1..=2.0)
    } else {
        0.0
    };

    SyntheticConditions {
        temperature,
        humidity,
        pressure: STANDARD_PRESSURE_HPA + rng.random_range(-15.0..=15.0),
        wind_speed: rng.random_range(3.0..=12.0),
        wind_direction_degrees: rng.random_range(0..=359),
        precipitation,
    }
}

/// Month is 1-based; out-of-range values clamp to the nearest month.
fn seasonal_range(month: u32) -> (f64, f64) {
    let index = month.clamp(1, 12) as usize - 1;
    SEASONAL_TEMPERATURES[index]
}

fn is_winter(month: u32) -> bool {
    matches!(month, 12 | 1 | 2)
}

fn is_summer(month: u32) -> bool {
    matches!(month, 6..=8)
}
