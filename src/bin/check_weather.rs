use clap::Parser;
use std::sync::Arc;

use weather_station_service::config::{Config, SourceKind};
use weather_station_service::db::{pool, ReadingRepository, ReadingStore};
use weather_station_service::fetcher::DEFAULT_BASE_URL;
use weather_station_service::services::WeatherService;
use weather_station_service::weather::{WeatherAcquisition, WeatherSource, SIVAS};

#[derive(Parser)]
#[command(name = "check-weather")]
#[command(about = "Acquire the current Sivas weather once and print it", long_about = None)]
struct Cli {
    /// Acquisition path: openweathermap or synthetic
    #[arg(long, default_value = "openweathermap")]
    source: SourceKind,

    /// OpenWeatherMap API key
    #[arg(long, env = "OPENWEATHER_API_KEY")]
    api_key: Option<String>,

    /// OpenWeatherMap base URL
    #[arg(long, env = "OPENWEATHER_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Upstream timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Store the reading and print the latest stored history
    #[arg(long, requires = "database_url")]
    record: bool,

    /// Database connection string
    #[arg(long, env)]
    database_url: Option<String>,

    /// Number of stored readings to print after recording
    #[arg(long, default_value_t = 5)]
    history: i64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = Config {
        database_url: cli.database_url.clone(),
        database_max_connections: 1,
        server_host: String::new(),
        server_port: 0,
        weather_source: cli.source,
        openweather_api_key: cli.api_key.clone(),
        openweather_base_url: cli.base_url.clone(),
        upstream_timeout_secs: cli.timeout_secs,
        record_interval_minutes: 0,
    };

    let source = WeatherSource::from_config(&config, SIVAS)?;
    println!("Acquiring current weather via {}...\n", source.name());
    let acquisition = WeatherAcquisition::new(source, SIVAS);

    match (cli.record, config.database_url.as_deref()) {
        (true, Some(url)) => {
            let pool = pool::connect(url, config.database_max_connections).await?;
            let store = Arc::new(ReadingRepository::new(pool.clone()));
            let service = WeatherService::new(acquisition, store.clone());

            let current = service.current_weather().await;
            println!("{}", serde_json::to_string_pretty(&current.reading)?);
            let stored = current.persisted?;
            println!("\nStored reading {} ({})", stored.id, stored.source);

            println!("\nLatest {} stored readings:", cli.history);
            for reading in store.recent(cli.history).await? {
                println!(
                    "  {}: {:.1}°C, {:.1} m/s {}, {:.1} mm, {:.1} hPa [{}]",
                    reading.timestamp,
                    reading.temperature,
                    reading.wind_speed,
                    reading.wind_direction_text,
                    reading.precipitation,
                    reading.pressure,
                    reading.source
                );
            }
            pool.close().await;
        }
        _ => {
            let reading = acquisition.acquire_current().await;
            println!("{}", serde_json::to_string_pretty(&reading)?);
        }
    }

    Ok(())
}
