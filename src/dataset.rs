//! Output rows and the ordered dataset.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::GenerationError;
use crate::model::WeatherCondition;
use crate::quality::OutlierThresholds;
use crate::sites::{SiteRegistry, SiteType};

/// Numeric columns eligible for missing-value and outlier injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Field {
    #[serde(rename = "EnergyProduced_kWh")]
    Energy,
    #[serde(rename = "SpotMarketPrice")]
    SpotPrice,
    #[serde(rename = "DowntimeHours")]
    Downtime,
    #[serde(rename = "Temperature_C")]
    Temperature,
    #[serde(rename = "WindSpeed_mps")]
    WindSpeed,
}

impl Field {
    /// Injection order within a row.
    pub const ALL: [Field; 5] = [
        Field::Energy,
        Field::SpotPrice,
        Field::Downtime,
        Field::Temperature,
        Field::WindSpeed,
    ];

    /// Column header in the exported dataset.
    pub fn column(self) -> &'static str {
        match self {
            Field::Energy => "EnergyProduced_kWh",
            Field::SpotPrice => "SpotMarketPrice",
            Field::Downtime => "DowntimeHours",
            Field::Temperature => "Temperature_C",
            Field::WindSpeed => "WindSpeed_mps",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// One site's figures for one day.
///
/// The five injectable readings are `Option` so that missing values survive
/// as absent rather than as a sentinel. `revenue` is fixed at generation
/// time from the clean energy/price pair and is never rewritten afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub site_id: String,
    pub site_name: String,
    pub site_type: SiteType,
    pub energy_produced_kwh: Option<f64>,
    pub spot_market_price: Option<f64>,
    pub revenue: f64,
    pub weather_condition: WeatherCondition,
    pub downtime_hours: Option<f64>,
    pub temperature_c: Option<f64>,
    pub wind_speed_mps: Option<f64>,
}

impl DailyRecord {
    pub fn get(&self, field: Field) -> Option<f64> {
        match field {
            Field::Energy => self.energy_produced_kwh,
            Field::SpotPrice => self.spot_market_price,
            Field::Downtime => self.downtime_hours,
            Field::Temperature => self.temperature_c,
            Field::WindSpeed => self.wind_speed_mps,
        }
    }

    pub fn get_mut(&mut self, field: Field) -> &mut Option<f64> {
        match field {
            Field::Energy => &mut self.energy_produced_kwh,
            Field::SpotPrice => &mut self.spot_market_price,
            Field::Downtime => &mut self.downtime_hours,
            Field::Temperature => &mut self.temperature_c,
            Field::WindSpeed => &mut self.wind_speed_mps,
        }
    }
}

/// Records ordered by date, then registry order, together with the context
/// that produced them: the registry, the outlier bounds and the master seed.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    registry: SiteRegistry,
    thresholds: OutlierThresholds,
    seed: u64,
    records: Vec<DailyRecord>,
}

impl Dataset {
    pub fn new(
        registry: SiteRegistry,
        thresholds: OutlierThresholds,
        seed: u64,
        records: Vec<DailyRecord>,
    ) -> Self {
        Self {
            registry,
            thresholds,
            seed,
            records,
        }
    }

    pub fn registry(&self) -> &SiteRegistry {
        &self.registry
    }

    /// Bounds separating nominal values from outliers.
    pub fn thresholds(&self) -> &OutlierThresholds {
        &self.thresholds
    }

    /// Master seed the records were generated from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub(crate) fn records_mut(&mut self) -> &mut [DailyRecord] {
        &mut self.records
    }

    /// Registry alongside mutable records, for passes that rewrite cells
    /// using per-site context.
    pub(crate) fn parts_mut(&mut self) -> (&SiteRegistry, &mut [DailyRecord]) {
        (&self.registry, &mut self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First and last date present.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.first()?.date;
        let last = self.records.last()?.date;
        Some((first, last))
    }

    /// Checks that every record names a registered site.
    ///
    /// # Errors
    ///
    /// `UnresolvedSiteReference` for the first record whose site is unknown.
    pub fn check_references(&self) -> Result<(), GenerationError> {
        for record in &self.records {
            self.registry.resolve(&record.site_id)?;
        }
        Ok(())
    }

    /// Records matching every supplied filter; date bounds are inclusive.
    pub fn filter<'a>(
        &'a self,
        site_id: Option<&'a str>,
        site_type: Option<SiteType>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> impl Iterator<Item = &'a DailyRecord> + 'a {
        self.records.iter().filter(move |r| {
            site_id.is_none_or(|id| r.site_id == id)
                && site_type.is_none_or(|t| r.site_type == t)
                && from.is_none_or(|f| r.date >= f)
                && to.is_none_or(|t| r.date <= t)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sites::Site;

    fn record(site: &Site, date: NaiveDate) -> DailyRecord {
        DailyRecord {
            date,
            site_id: site.site_id.clone(),
            site_name: site.name.clone(),
            site_type: site.site_type,
            energy_produced_kwh: Some(1000.0),
            spot_market_price: Some(50.0),
            revenue: 50.0,
            weather_condition: WeatherCondition::Sunny,
            downtime_hours: Some(0.2),
            temperature_c: Some(20.0),
            wind_speed_mps: Some(5.0),
        }
    }

    fn two_day_dataset() -> Dataset {
        let reg = SiteRegistry::builtin();
        let mut records = Vec::new();
        for day in [1, 2] {
            let date = NaiveDate::from_ymd_opt(2023, 1, day).unwrap();
            for site in reg.list_sites() {
                records.push(record(site, date));
            }
        }
        Dataset::new(reg, OutlierThresholds::default(), 1, records)
    }

    #[test]
    fn field_accessors_cover_every_column() {
        let site = Site::new("S", "S", SiteType::Solar, 1.0);
        let mut r = record(&site, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        for f in Field::ALL {
            assert!(r.get(f).is_some());
            *r.get_mut(f) = None;
            assert!(r.get(f).is_none());
        }
        assert_eq!(r.revenue, 50.0);
    }

    #[test]
    fn column_names_match_header() {
        let cols: Vec<&str> = Field::ALL.iter().map(|f| f.column()).collect();
        assert_eq!(
            cols,
            [
                "EnergyProduced_kWh",
                "SpotMarketPrice",
                "DowntimeHours",
                "Temperature_C",
                "WindSpeed_mps"
            ]
        );
    }

    #[test]
    fn references_resolve() {
        let ds = two_day_dataset();
        assert!(ds.check_references().is_ok());
    }

    #[test]
    fn unknown_site_is_reported() {
        let mut ds = two_day_dataset();
        ds.records_mut()[3].site_id = "GHOST".to_string();
        assert!(matches!(
            ds.check_references(),
            Err(GenerationError::UnresolvedSiteReference(ref id)) if id == "GHOST"
        ));
    }

    #[test]
    fn filter_by_type_and_date() {
        let ds = two_day_dataset();
        let day2 = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        assert_eq!(ds.filter(None, Some(SiteType::Solar), None, None).count(), 6);
        assert_eq!(ds.filter(None, None, Some(day2), None).count(), 6);
        assert_eq!(ds.filter(Some("WIND002"), None, None, Some(day2)).count(), 2);
        assert_eq!(ds.filter(Some("NOPE"), None, None, None).count(), 0);
    }

    #[test]
    fn date_span_reports_ends() {
        let ds = two_day_dataset();
        let (first, last) = ds.date_span().unwrap();
        assert_eq!(first.to_string(), "2023-01-01");
        assert_eq!(last.to_string(), "2023-01-02");
    }
}
