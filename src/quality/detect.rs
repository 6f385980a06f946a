use serde::Serialize;

use crate::config::{MarketConfig, QualityConfig};
use crate::dataset::Field;
use crate::sites::Site;

/// Bounds outside which a value counts as an outlier.
///
/// Energy is bounded per site by its nameplate daily output; every other
/// column has a fleet-wide band. Configuration validation keeps nominal
/// generation inside these bounds and injected outliers outside them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutlierThresholds {
    pub price_floor: f64,
    pub price_ceiling: f64,
    /// Downtime at or above this many hours.
    pub downtime_hours: f64,
    pub temperature_min_c: f64,
    pub temperature_max_c: f64,
    pub wind_max_mps: f64,
}

impl OutlierThresholds {
    pub fn from_config(quality: &QualityConfig, market: &MarketConfig) -> Self {
        Self {
            price_floor: market.price_floor,
            price_ceiling: market.price_ceiling,
            downtime_hours: quality.downtime_threshold_hours,
            temperature_min_c: quality.temperature_min_plausible_c,
            temperature_max_c: quality.temperature_max_plausible_c,
            wind_max_mps: quality.wind_max_plausible_mps,
        }
    }

    pub fn is_outlier(&self, site: &Site, field: Field, value: f64) -> bool {
        match field {
            Field::Energy => value < 0.0 || value > site.nameplate_daily_kwh(),
            Field::SpotPrice => value < self.price_floor || value > self.price_ceiling,
            Field::Downtime => value >= self.downtime_hours,
            Field::Temperature => {
                value < self.temperature_min_c || value > self.temperature_max_c
            }
            Field::WindSpeed => value < 0.0 || value > self.wind_max_mps,
        }
    }
}

impl Default for OutlierThresholds {
    fn default() -> Self {
        Self::from_config(&QualityConfig::default(), &MarketConfig::default())
    }
}
