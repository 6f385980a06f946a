use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::debug;

use crate::config::{MarketConfig, QualityConfig};
use crate::dataset::{Dataset, Field};
use crate::error::GenerationError;
use crate::model::round_dp;
use crate::model::seed::{MISSING_STREAM, OUTLIER_STREAM, derive_seed};

/// Inserts missing values and outliers into a finished dataset.
///
/// Each pass owns a stream derived from the master seed, and every eligible
/// cell consumes one uniform whether or not it is hit, so a given seed marks
/// the same cells on every run and a higher rate only adds cells. Outlier
/// magnitudes come from a per-cell stream, so they never shift the hit draws
/// of later cells.
#[derive(Debug, Clone)]
pub struct QualityInjector {
    cfg: QualityConfig,
    price_ceiling: f64,
    missing_seed: u64,
    outlier_seed: u64,
}

impl QualityInjector {
    pub fn new(quality: &QualityConfig, market: &MarketConfig, master_seed: u64) -> Self {
        Self {
            cfg: quality.clone(),
            price_ceiling: market.price_ceiling,
            missing_seed: derive_seed(master_seed, MISSING_STREAM),
            outlier_seed: derive_seed(master_seed, OUTLIER_STREAM),
        }
    }

    /// Nulls each eligible cell with probability `missing_rate`. Returns the
    /// number of cells nulled.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if `missing_rate` is outside [0, 1].
    pub fn inject_missing(
        &self,
        dataset: &mut Dataset,
        missing_rate: f64,
    ) -> Result<usize, GenerationError> {
        check_rate("missing_rate", missing_rate)?;
        let mut rng = StdRng::seed_from_u64(self.missing_seed);
        let mut nulled = 0;
        for record in dataset.records_mut() {
            for field in Field::ALL {
                let cell = record.get_mut(field);
                if rng.random::<f64>() < missing_rate && cell.is_some() {
                    *cell = None;
                    nulled += 1;
                }
            }
        }
        debug!(nulled, missing_rate, "missing values injected");
        Ok(nulled)
    }

    /// Replaces each present eligible cell with probability `outlier_rate`
    /// by a value far outside its nominal range. Returns the number of cells
    /// replaced. Revenue is left as generated.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if `outlier_rate` is outside [0, 1];
    /// `UnresolvedSiteReference` if a record's site is not registered.
    pub fn inject_outliers(
        &self,
        dataset: &mut Dataset,
        outlier_rate: f64,
    ) -> Result<usize, GenerationError> {
        check_rate("outlier_rate", outlier_rate)?;
        let mut rng = StdRng::seed_from_u64(self.outlier_seed);
        let (registry, records) = dataset.parts_mut();
        let mut replaced = 0;
        for (row, record) in records.iter_mut().enumerate() {
            let nameplate = registry.resolve(&record.site_id)?.nameplate_daily_kwh();
            for (col, field) in Field::ALL.into_iter().enumerate() {
                let hit = rng.random::<f64>() < outlier_rate;
                let cell = record.get_mut(field);
                if hit && cell.is_some() {
                    let cell_index = (row * Field::ALL.len() + col) as u64;
                    let mut value_rng =
                        StdRng::seed_from_u64(derive_seed(self.outlier_seed, cell_index));
                    *cell = Some(self.outlier_value(field, nameplate, &mut value_rng));
                    replaced += 1;
                }
            }
        }
        debug!(replaced, outlier_rate, "outliers injected");
        Ok(replaced)
    }

    fn outlier_value(&self, field: Field, nameplate_kwh: f64, rng: &mut StdRng) -> f64 {
        let q = &self.cfg;
        let value = match field {
            Field::Energy => {
                nameplate_kwh
                    * rng.random_range(q.energy_outlier_min_factor..=q.energy_outlier_max_factor)
            }
            Field::SpotPrice => {
                self.price_ceiling
                    * rng.random_range(q.price_outlier_min_factor..=q.price_outlier_max_factor)
            }
            Field::Downtime => rng.random_range(q.downtime_outlier_min_hours..=24.0),
            Field::Temperature => {
                let magnitude =
                    rng.random_range(q.temperature_outlier_min_c..=q.temperature_outlier_max_c);
                if rng.random_bool(0.5) { magnitude } else { -magnitude }
            }
            Field::WindSpeed => rng.random_range(q.wind_outlier_min_mps..=q.wind_outlier_max_mps),
        };
        round_dp(value, 2)
    }
}

fn check_rate(name: &str, rate: f64) -> Result<(), GenerationError> {
    if (0.0..=1.0).contains(&rate) {
        Ok(())
    } else {
        Err(GenerationError::invalid_parameter(
            format!("quality.{name}"),
            format!("must be in [0.0, 1.0], got {rate}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DailyRecord;
    use crate::model::WeatherCondition;
    use crate::quality::OutlierThresholds;
    use crate::sites::SiteRegistry;
    use chrono::NaiveDate;

    fn flat_dataset(days: u64) -> Dataset {
        let reg = SiteRegistry::builtin();
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let mut records = Vec::new();
        for i in 0..days {
            let date = start + chrono::Days::new(i);
            for site in reg.list_sites() {
                records.push(DailyRecord {
                    date,
                    site_id: site.site_id.clone(),
                    site_name: site.name.clone(),
                    site_type: site.site_type,
                    energy_produced_kwh: Some(1000.0),
                    spot_market_price: Some(50.0),
                    revenue: 50.0,
                    weather_condition: WeatherCondition::Cloudy,
                    downtime_hours: Some(0.5),
                    temperature_c: Some(12.0),
                    wind_speed_mps: Some(6.0),
                });
            }
        }
        Dataset::new(reg, OutlierThresholds::default(), 42, records)
    }

    fn injector(seed: u64) -> QualityInjector {
        QualityInjector::new(&QualityConfig::default(), &MarketConfig::default(), seed)
    }

    fn missing_cells(ds: &Dataset) -> usize {
        ds.records()
            .iter()
            .map(|r| Field::ALL.iter().filter(|f| r.get(**f).is_none()).count())
            .sum()
    }

    #[test]
    fn zero_rates_change_nothing() {
        let mut ds = flat_dataset(30);
        let before = ds.clone();
        let inj = injector(1);
        assert_eq!(inj.inject_missing(&mut ds, 0.0).unwrap(), 0);
        assert_eq!(inj.inject_outliers(&mut ds, 0.0).unwrap(), 0);
        assert_eq!(ds, before);
    }

    #[test]
    fn full_missing_rate_nulls_everything() {
        let mut ds = flat_dataset(5);
        let n = injector(1).inject_missing(&mut ds, 1.0).unwrap();
        assert_eq!(n, ds.len() * Field::ALL.len());
        assert_eq!(missing_cells(&ds), n);
    }

    #[test]
    fn missing_rate_converges() {
        let mut ds = flat_dataset(365);
        let n = injector(3).inject_missing(&mut ds, 0.02).unwrap();
        let cells = (ds.len() * Field::ALL.len()) as f64;
        let observed = n as f64 / cells;
        assert!((observed - 0.02).abs() < 0.005, "observed {observed}");
    }

    #[test]
    fn outliers_skip_missing_cells() {
        let mut ds = flat_dataset(10);
        let inj = injector(4);
        inj.inject_missing(&mut ds, 1.0).unwrap();
        assert_eq!(inj.inject_outliers(&mut ds, 1.0).unwrap(), 0);
        assert_eq!(missing_cells(&ds), ds.len() * Field::ALL.len());
    }

    #[test]
    fn every_outlier_crosses_its_threshold() {
        let mut ds = flat_dataset(20);
        let n = injector(5).inject_outliers(&mut ds, 1.0).unwrap();
        assert_eq!(n, ds.len() * Field::ALL.len());
        let t = *ds.thresholds();
        for r in ds.records() {
            let site = ds.registry().resolve(&r.site_id).unwrap();
            for f in Field::ALL {
                let v = r.get(f).unwrap();
                assert!(t.is_outlier(site, f, v), "{f} = {v} not an outlier");
            }
            let dt = r.downtime_hours.unwrap();
            assert!((0.0..=24.0).contains(&dt));
            assert_eq!(r.revenue, 50.0);
        }
    }

    #[test]
    fn same_seed_same_cells() {
        let mut a = flat_dataset(60);
        let mut b = flat_dataset(60);
        for ds in [&mut a, &mut b] {
            let inj = injector(9);
            inj.inject_missing(ds, 0.05).unwrap();
            inj.inject_outliers(ds, 0.05).unwrap();
        }
        assert_eq!(a, b);
    }

    #[test]
    fn higher_rate_is_superset() {
        let mut low = flat_dataset(60);
        let mut high = flat_dataset(60);
        let inj = injector(10);
        inj.inject_missing(&mut low, 0.02).unwrap();
        inj.inject_missing(&mut high, 0.10).unwrap();
        for (l, h) in low.records().iter().zip(high.records()) {
            for f in Field::ALL {
                if l.get(f).is_none() {
                    assert!(h.get(f).is_none());
                }
            }
        }
    }

    #[test]
    fn higher_outlier_rate_is_superset_with_same_values() {
        let mut low = flat_dataset(365);
        let mut high = flat_dataset(365);
        let inj = injector(3);
        inj.inject_outliers(&mut low, 0.02).unwrap();
        inj.inject_outliers(&mut high, 0.10).unwrap();
        let t = *low.thresholds();
        let mut shared = 0;
        for (l, h) in low.records().iter().zip(high.records()) {
            let site = low.registry().resolve(&l.site_id).unwrap();
            for f in Field::ALL {
                let v = l.get(f).unwrap();
                if t.is_outlier(site, f, v) {
                    assert_eq!(h.get(f), Some(v), "{} {} {f}", l.date, l.site_id);
                    shared += 1;
                }
            }
        }
        assert!(shared > 0);
    }

    #[test]
    fn rate_out_of_range_rejected() {
        let mut ds = flat_dataset(1);
        let inj = injector(1);
        assert!(matches!(
            inj.inject_missing(&mut ds, 1.2),
            Err(GenerationError::InvalidParameter { .. })
        ));
        assert!(inj.inject_outliers(&mut ds, -0.01).is_err());
        assert!(inj.inject_outliers(&mut ds, f64::NAN).is_err());
    }
}
