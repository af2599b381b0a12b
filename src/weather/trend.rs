use rand::Rng;

use crate::weather::models::{Parameter, Trend};

/// Assigns a trend to a freshly acquired value.
///
/// Nothing compares against earlier readings yet; `RandomTrend` is a
/// placeholder. A history-backed estimator can be swapped in through
/// `WeatherAcquisition::with_trend_estimator`.
pub trait TrendEstimator: Send + Sync {
    fn estimate(&self, parameter: Parameter, value: f64) -> Trend;
}

/// Uniform choice among increasing, decreasing and stable.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTrend;

impl TrendEstimator for RandomTrend {
    fn estimate(&self, _parameter: Parameter, _value: f64) -> Trend {
        match rand::rng().random_range(0..3) {
            0 => Trend::Increasing,
            1 => Trend::Decreasing,
            _ => Trend::Stable,
        }
    }
}

/// Always reports the same trend.
#[derive(Debug, Clone, Copy)]
pub struct FixedTrend(pub Trend);

impl TrendEstimator for FixedTrend {
    fn estimate(&self, _parameter: Parameter, _value: f64) -> Trend {
        self.0
    }
}
