use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::fetch_error::FetchError;
use crate::weather::Location;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Current conditions as reported upstream. Only temperature and humidity are
/// guaranteed; everything else may be absent from a given payload.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamObservation {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction_degrees: Option<f64>,
    /// Last hour of rain, or snow when there was no rain
    pub precipitation: Option<f64>,
    pub visibility_m: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherPayload {
    main: Option<MainSection>,
    wind: Option<WindSection>,
    rain: Option<PrecipitationSection>,
    snow: Option<PrecipitationSection>,
    visibility: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct MainSection {
    temp: Option<f64>,
    humidity: Option<f64>,
    pressure: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WindSection {
    speed: Option<f64>,
    deg: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PrecipitationSection {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
}

/// Client for the OpenWeatherMap current-weather endpoint.
#[derive(Clone)]
pub struct OpenWeatherFetcher {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    location: Location,
}

impl OpenWeatherFetcher {
    pub fn new(
        base_url: String,
        api_key: String,
        location: Location,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            location,
        })
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn fetch_current(&self) -> Result<UpstreamObservation, FetchError> {
        debug!("Requesting current weather from upstream");
        let response = self
            .client
            .get(format!("{}/weather", self.base_url))
            .query(&[
                ("lat", self.location.latitude.to_string()),
                ("lon", self.location.longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
                ("lang", "tr".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        debug!("Received HTTP response with status: {}", status);
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        debug!("Retrieved payload, size: {} bytes", body.len());

        parse_payload(&body)
    }
}

pub fn parse_payload(body: &str) -> Result<UpstreamObservation, FetchError> {
    let payload: CurrentWeatherPayload = serde_json::from_str(body)?;
    let main = payload.main.ok_or(FetchError::MissingField("main"))?;

    let temperature = main.temp.ok_or(FetchError::MissingField("main.temp"))?;
    let humidity = main
        .humidity
        .ok_or(FetchError::MissingField("main.humidity"))?;

    let (wind_speed, wind_direction_degrees) = match payload.wind {
        Some(wind) => (wind.speed, wind.deg),
        None => (None, None),
    };

    let precipitation = payload
        .rain
        .and_then(|r| r.one_hour)
        .or_else(|| payload.snow.and_then(|s| s.one_hour));

    Ok(UpstreamObservation {
        temperature,
        humidity,
        pressure: main.pressure,
        wind_speed,
        wind_direction_degrees,
        precipitation,
        visibility_m: payload.visibility,
    })
}
