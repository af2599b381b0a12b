pub mod reading_service;
pub mod weather_service;

pub use reading_service::ReadingService;
pub use weather_service::{CurrentWeather, WeatherService};
