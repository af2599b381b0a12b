use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::fetcher::DEFAULT_BASE_URL;

/// Longest accepted recording interval: one week
pub const MAX_RECORD_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    OpenWeatherMap,
    Synthetic,
}

impl FromStr for SourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openweathermap" | "live" => Ok(SourceKind::OpenWeatherMap),
            "synthetic" => Ok(SourceKind::Synthetic),
            _ => Err(ConfigError::Invalid {
                name: "WEATHER_SOURCE",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    /// Absent means readings are kept in memory only
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub server_host: String,
    pub server_port: u16,
    pub weather_source: SourceKind,
    pub openweather_api_key: Option<String>,
    pub openweather_base_url: String,
    pub upstream_timeout_secs: u64,
    /// 0 disables the background recorder
    pub record_interval_minutes: u64,
}

// Keeps the API key out of startup logs
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_configured", &self.database_url.is_some())
            .field("database_max_connections", &self.database_max_connections)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("weather_source", &self.weather_source)
            .field("openweather_api_key_set", &self.openweather_api_key.is_some())
            .field("openweather_base_url", &self.openweather_base_url)
            .field("upstream_timeout_secs", &self.upstream_timeout_secs)
            .field("record_interval_minutes", &self.record_interval_minutes)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Config {
            database_url: get("DATABASE_URL"),
            database_max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", 5)?,
            server_host: get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: parse_or(&get, "SERVER_PORT", 8080)?,
            weather_source: match get("WEATHER_SOURCE") {
                Some(value) => value.parse()?,
                None => SourceKind::OpenWeatherMap,
            },
            openweather_api_key: get("OPENWEATHER_API_KEY"),
            openweather_base_url: get("OPENWEATHER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            upstream_timeout_secs: parse_or(&get, "UPSTREAM_TIMEOUT_SECS", 10)?,
            record_interval_minutes: parse_record_interval(&get)?,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    /// Period of the background recorder, `None` when it is disabled
    pub fn record_interval(&self) -> Option<Duration> {
        (self.record_interval_minutes > 0)
            .then(|| Duration::from_secs(self.record_interval_minutes * 60))
    }
}

fn parse_record_interval<G>(get: &G) -> Result<u64, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let minutes = parse_or(get, "RECORD_INTERVAL_MINUTES", 0)?;
    if minutes > MAX_RECORD_INTERVAL_MINUTES {
        return Err(ConfigError::Invalid {
            name: "RECORD_INTERVAL_MINUTES",
            value: minutes.to_string(),
        });
    }
    Ok(minutes)
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            value,
        }),
        None => Ok(default),
    }
}
