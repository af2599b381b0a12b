pub mod compass;
pub mod models;
pub mod source;
pub mod synthetic;
pub mod trend;

pub use compass::{compass_label, round_to_tenth, COMPASS_POINTS};
pub use models::*;
pub use source::{Acquisition, UpstreamStatus, WeatherAcquisition, WeatherSource};
pub use trend::{FixedTrend, RandomTrend, TrendEstimator};
