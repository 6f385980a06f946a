//! Site types and the immutable site record.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Kilowatt-hours one megawatt of nameplate capacity delivers in a full day.
pub const KWH_PER_MW_DAY: f64 = 24.0 * 1000.0;

/// Technology class of a site; decides which production model applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteType {
    Solar,
    Wind,
    Battery,
}

impl SiteType {
    pub const ALL: [SiteType; 3] = [SiteType::Solar, SiteType::Wind, SiteType::Battery];

    pub fn as_str(self) -> &'static str {
        match self {
            SiteType::Solar => "solar",
            SiteType::Wind => "wind",
            SiteType::Battery => "battery",
        }
    }

    /// Whether the day's weather drives output. Batteries dispatch on
    /// availability instead.
    pub fn is_weather_driven(self) -> bool {
        !matches!(self, SiteType::Battery)
    }
}

impl fmt::Display for SiteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SiteType {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "solar" => Ok(SiteType::Solar),
            "wind" => Ok(SiteType::Wind),
            "battery" => Ok(SiteType::Battery),
            other => Err(GenerationError::invalid_parameter(
                "site_type",
                format!("unknown site type \"{other}\", expected solar, wind or battery"),
            )),
        }
    }
}

/// A generation or storage facility in the fleet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Site {
    /// Unique short code, e.g. `SOLAR001`.
    pub site_id: String,
    /// Human-readable name.
    pub name: String,
    /// Technology class.
    #[serde(rename = "type")]
    pub site_type: SiteType,
    /// Nameplate capacity (MW). For storage, the discharge rating.
    pub capacity_mw: f64,
}

impl Site {
    pub fn new(
        site_id: impl Into<String>,
        name: impl Into<String>,
        site_type: SiteType,
        capacity_mw: f64,
    ) -> Self {
        Self {
            site_id: site_id.into(),
            name: name.into(),
            site_type,
            capacity_mw,
        }
    }

    /// Physical ceiling on one day's output (kWh).
    pub fn nameplate_daily_kwh(&self) -> f64 {
        self.capacity_mw * KWH_PER_MW_DAY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_type_parses_case_insensitively() {
        assert_eq!("Solar".parse::<SiteType>().ok(), Some(SiteType::Solar));
        assert_eq!(" wind ".parse::<SiteType>().ok(), Some(SiteType::Wind));
        assert_eq!("BATTERY".parse::<SiteType>().ok(), Some(SiteType::Battery));
    }

    #[test]
    fn unknown_site_type_is_invalid_parameter() {
        let err = "hydro".parse::<SiteType>();
        assert!(matches!(
            err,
            Err(GenerationError::InvalidParameter { ref field, .. }) if field == "site_type"
        ));
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for t in SiteType::ALL {
            assert_eq!(t.to_string().parse::<SiteType>().ok(), Some(t));
        }
    }

    #[test]
    fn nameplate_daily_output() {
        let site = Site::new("S", "S", SiteType::Solar, 50.0);
        assert_eq!(site.nameplate_daily_kwh(), 1_200_000.0);
    }

    #[test]
    fn only_battery_ignores_weather() {
        assert!(SiteType::Solar.is_weather_driven());
        assert!(SiteType::Wind.is_weather_driven());
        assert!(!SiteType::Battery.is_weather_driven());
    }
}
