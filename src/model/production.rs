//! Downtime and daily energy.

use rand::{Rng, rngs::StdRng};
use rand_distr::{Distribution, Exp};

use super::round_dp;
use super::weather::WeatherCondition;
use crate::config::ProductionConfig;
use crate::error::GenerationError;
use crate::sites::{Site, SiteType};

/// Samples per-row downtime from a maintenance event plus a weather outage.
#[derive(Debug, Clone)]
pub struct DowntimeModel {
    cfg: ProductionConfig,
    outage: Exp<f64>,
}

impl DowntimeModel {
    /// # Errors
    ///
    /// `InvalidParameter` if `outage_mean_hours` is not positive.
    pub fn new(cfg: &ProductionConfig) -> Result<Self, GenerationError> {
        if !(cfg.outage_mean_hours.is_finite() && cfg.outage_mean_hours > 0.0) {
            return Err(GenerationError::invalid_parameter(
                "production.outage_mean_hours",
                "must be > 0",
            ));
        }
        let outage = Exp::new(1.0 / cfg.outage_mean_hours).map_err(|e| {
            GenerationError::invalid_parameter("production.outage_mean_hours", e.to_string())
        })?;
        Ok(Self {
            cfg: cfg.clone(),
            outage,
        })
    }

    fn maintenance_probability(&self, site_type: SiteType) -> f64 {
        match site_type {
            SiteType::Solar => self.cfg.maintenance_prob_solar,
            SiteType::Wind => self.cfg.maintenance_prob_wind,
            SiteType::Battery => self.cfg.maintenance_prob_battery,
        }
    }

    /// Hours offline today, in [0, 24].
    ///
    /// Usually a fraction of an hour; occasionally a maintenance window of
    /// several hours. Stormy days stretch the outage tail.
    pub fn sample_downtime(
        &self,
        site_type: SiteType,
        condition: WeatherCondition,
        rng: &mut StdRng,
    ) -> f64 {
        let maintenance = if rng.random_bool(self.maintenance_probability(site_type)) {
            rng.random_range(self.cfg.maintenance_min_hours..=self.cfg.maintenance_max_hours)
        } else {
            0.0
        };

        let storm = if condition == WeatherCondition::Stormy {
            self.cfg.storm_outage_factor
        } else {
            1.0
        };
        let outage = (self.outage.sample(rng) * storm).min(self.cfg.outage_cap_hours);

        round_dp((maintenance + outage).clamp(0.0, 24.0), 2)
    }
}

/// Daily energy (kWh) for `site` given its production multiplier and the
/// hours it was offline. Never negative; never above nameplate output.
pub fn compute_energy(site: &Site, production_multiplier: f64, downtime_hours: f64) -> f64 {
    let available = 1.0 - downtime_hours.clamp(0.0, 24.0) / 24.0;
    let kwh = site.nameplate_daily_kwh() * production_multiplier.clamp(0.0, 1.0) * available;
    round_dp(kwh.max(0.0), 2)
}
