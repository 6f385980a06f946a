//! Market-wide spot price process and revenue.

use chrono::NaiveDate;
use rand::{Rng, rngs::StdRng};
use rand_distr::{Distribution, Normal};

use super::round_dp;
use super::season::price_harmonics;
use crate::calendar::{is_weekday, years_between};
use crate::config::MarketConfig;
use crate::error::GenerationError;

/// Daily spot price ($/MWh): seasonal base, weekday premium, slow drift, an
/// AR(1) deviation and rare upward spikes.
///
/// The deviation carries over from one call to the next, so the model must
/// be fed dates in ascending order from a single dedicated stream.
///
/// ```text
/// dev(t)   = phi * dev(t-1) + N(0, sigma)
/// price(t) = clamp(base(t) + dev(t) + spike(t), floor, ceiling)
/// ```
#[derive(Debug, Clone)]
pub struct SpotPriceModel {
    cfg: MarketConfig,
    /// Reference date for the trend term.
    origin: NaiveDate,
    innovation: Normal<f64>,
    deviation: f64,
}

impl SpotPriceModel {
    /// # Errors
    ///
    /// `InvalidParameter` if `walk_volatility` is negative or not finite.
    pub fn new(cfg: &MarketConfig, origin: NaiveDate) -> Result<Self, GenerationError> {
        let innovation = Normal::new(0.0, cfg.walk_volatility).map_err(|e| {
            GenerationError::invalid_parameter("market.walk_volatility", e.to_string())
        })?;
        Ok(Self {
            cfg: cfg.clone(),
            origin,
            innovation,
            deviation: 0.0,
        })
    }

    /// Deterministic part of the price for `date`.
    pub fn base_price(&self, date: NaiveDate) -> f64 {
        let c = &self.cfg;
        let (annual, semiannual) = price_harmonics(date);
        let weekday = if is_weekday(date) { c.weekday_premium } else { 0.0 };
        c.base_price
            + c.annual_amplitude * annual
            + c.semiannual_amplitude * semiannual
            + weekday
            + c.annual_trend * years_between(self.origin, date)
    }

    /// Advances the walk by one day and returns the price, rounded to cents.
    pub fn sample_price(&mut self, date: NaiveDate, rng: &mut StdRng) -> f64 {
        let c = &self.cfg;
        self.deviation = c.walk_persistence * self.deviation + self.innovation.sample(rng);
        let spike = if rng.random_bool(c.spike_probability) {
            rng.random_range(c.spike_min..=c.spike_max)
        } else {
            0.0
        };
        let raw = self.base_price(date) + self.deviation + spike;
        round_dp(raw, 2).clamp(c.price_floor, c.price_ceiling)
    }
}

/// Revenue ($) for `energy_kwh` sold at `price` $/MWh.
pub fn compute_revenue(energy_kwh: f64, price: f64) -> f64 {
    round_dp(energy_kwh * price / 1000.0, 4)
}
