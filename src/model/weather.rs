//! Seasonal weather model: one correlated draw per (site, date).

use std::fmt;

use chrono::NaiveDate;
use rand::{Rng, rngs::StdRng};
use rand_distr::{Distribution, Gamma, Normal};
use serde::{Deserialize, Serialize};

use super::season::{solar_season, wind_season};
use crate::config::WeatherConfig;
use crate::error::GenerationError;
use crate::sites::SiteType;

/// Categorical daily weather.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherCondition {
    Sunny,
    #[serde(rename = "Partly Cloudy")]
    PartlyCloudy,
    Cloudy,
    Rainy,
    Stormy,
    Foggy,
    Windy,
}

/// How a condition shifts the readings and scales production.
struct ConditionProfile {
    temp_offset_c: f64,
    wind_offset_mps: f64,
    solar_factor: f64,
    wind_factor: f64,
}

impl WeatherCondition {
    pub const ALL: [WeatherCondition; 7] = [
        WeatherCondition::Sunny,
        WeatherCondition::PartlyCloudy,
        WeatherCondition::Cloudy,
        WeatherCondition::Rainy,
        WeatherCondition::Stormy,
        WeatherCondition::Foggy,
        WeatherCondition::Windy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WeatherCondition::Sunny => "Sunny",
            WeatherCondition::PartlyCloudy => "Partly Cloudy",
            WeatherCondition::Cloudy => "Cloudy",
            WeatherCondition::Rainy => "Rainy",
            WeatherCondition::Stormy => "Stormy",
            WeatherCondition::Foggy => "Foggy",
            WeatherCondition::Windy => "Windy",
        }
    }

    fn profile(self) -> ConditionProfile {
        let (temp_offset_c, wind_offset_mps, solar_factor, wind_factor) = match self {
            WeatherCondition::Sunny => (2.0, -1.0, 1.0, 1.0),
            WeatherCondition::PartlyCloudy => (0.0, 0.0, 0.8, 1.0),
            WeatherCondition::Cloudy => (0.0, 0.0, 0.5, 1.0),
            WeatherCondition::Rainy => (-2.0, 0.0, 0.25, 1.0),
            WeatherCondition::Stormy => (-3.0, 7.0, 0.12, 1.1),
            WeatherCondition::Foggy => (-1.5, -2.0, 0.35, 0.9),
            WeatherCondition::Windy => (0.0, 4.0, 0.9, 1.05),
        };
        ConditionProfile {
            temp_offset_c,
            wind_offset_mps,
            solar_factor,
            wind_factor,
        }
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single correlated weather draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherSample {
    pub condition: WeatherCondition,
    pub temperature_c: f64,
    pub wind_speed_mps: f64,
    /// Share of nameplate output realised before downtime, in [0, 1].
    pub production_multiplier: f64,
}

/// Weather and production-multiplier sampler.
///
/// Holds the configured constants and prebuilt noise distributions; carries
/// no per-day state, so the caller decides which stream each draw uses.
#[derive(Debug, Clone)]
pub struct WeatherModel {
    cfg: WeatherConfig,
    temp_noise: Normal<f64>,
    gust: Gamma<f64>,
    temp_clip: f64,
    gust_cap: f64,
}

impl WeatherModel {
    /// Builds the model.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if a noise distribution cannot be constructed from
    /// the configured parameters.
    pub fn new(cfg: &WeatherConfig) -> Result<Self, GenerationError> {
        let temp_noise = Normal::new(0.0, cfg.temp_noise_std_c).map_err(|e| {
            GenerationError::invalid_parameter("weather.temp_noise_std_c", e.to_string())
        })?;
        let gust = Gamma::new(cfg.wind_gust_shape, cfg.wind_gust_scale).map_err(|e| {
            GenerationError::invalid_parameter("weather.wind_gust_shape", e.to_string())
        })?;
        Ok(Self {
            cfg: cfg.clone(),
            temp_noise,
            gust,
            temp_clip: (cfg.noise_clip_sd * cfg.temp_noise_std_c).max(0.0),
            gust_cap: gust_cap(cfg),
        })
    }

    /// Draws the day's condition, readings and production multiplier.
    ///
    /// Draw order: condition, temperature noise, gust, then the per-type
    /// multiplier noise.
    pub fn sample_weather(
        &self,
        site_type: SiteType,
        date: NaiveDate,
        rng: &mut StdRng,
    ) -> WeatherSample {
        let season = solar_season(date);
        let wind_season = wind_season(date);

        let condition = draw_condition(&condition_weights(site_type, season, wind_season), rng);
        let profile = condition.profile();

        let noise = self
            .temp_noise
            .sample(rng)
            .clamp(-self.temp_clip, self.temp_clip);
        let temperature_c =
            self.cfg.temp_mean_c + self.cfg.temp_amplitude_c * season + profile.temp_offset_c + noise;

        let gust = self.gust.sample(rng).min(self.gust_cap);
        let wind_speed_mps = (self.cfg.wind_base_mps
            + self.cfg.wind_amplitude_mps * wind_season
            + profile.wind_offset_mps
            + gust)
            .max(0.0);

        let multiplier = match site_type {
            SiteType::Solar => self.solar_multiplier(season, &profile, temperature_c, rng),
            SiteType::Wind => self.wind_multiplier(wind_speed_mps, &profile, rng),
            SiteType::Battery => self.battery_multiplier(rng),
        };

        WeatherSample {
            condition,
            temperature_c,
            wind_speed_mps,
            production_multiplier: multiplier.clamp(0.0, 1.0),
        }
    }

    fn solar_multiplier(
        &self,
        season: f64,
        profile: &ConditionProfile,
        temperature_c: f64,
        rng: &mut StdRng,
    ) -> f64 {
        let c = &self.cfg;
        let seasonal = (c.solar_seasonal_mean + c.solar_seasonal_amplitude * season).max(0.0);
        let derate = (1.0
            - c.solar_temp_derate_per_c * (temperature_c - c.solar_derate_threshold_c).max(0.0))
        .max(0.5);
        let noise = rng.random_range((1.0 - c.solar_noise_spread)..=(1.0 + c.solar_noise_spread));
        c.solar_peak_capacity_factor * seasonal * profile.solar_factor * derate * noise
    }

    fn wind_multiplier(&self, speed: f64, profile: &ConditionProfile, rng: &mut StdRng) -> f64 {
        let c = &self.cfg;
        let noise = rng.random_range((1.0 - c.wind_noise_spread)..=(1.0 + c.wind_noise_spread));
        self.power_curve(speed) * c.wind_availability * profile.wind_factor * noise
    }

    fn battery_multiplier(&self, rng: &mut StdRng) -> f64 {
        let c = &self.cfg;
        let availability = rng.random_range(c.battery_min_availability..=1.0);
        c.battery_discharge_hours / 24.0 * availability
    }

    /// Normalised turbine output at `speed` m/s: zero below cut-in and at or
    /// above cut-out, cubic up to rated, flat at 1.0 from rated to cut-out.
    pub fn power_curve(&self, speed: f64) -> f64 {
        let c = &self.cfg;
        if speed < c.wind_cut_in_mps || speed >= c.wind_cut_out_mps {
            0.0
        } else if speed >= c.wind_rated_mps {
            1.0
        } else {
            let lo = c.wind_cut_in_mps.powi(3);
            (speed.powi(3) - lo) / (c.wind_rated_mps.powi(3) - lo)
        }
    }
}

fn gust_cap(cfg: &WeatherConfig) -> f64 {
    let mean = cfg.wind_gust_shape * cfg.wind_gust_scale;
    let sd = cfg.wind_gust_shape.sqrt() * cfg.wind_gust_scale;
    mean + cfg.noise_clip_sd * sd
}

/// Lowest and highest temperature the model can produce (°C).
pub fn nominal_temperature_bounds(cfg: &WeatherConfig) -> (f64, f64) {
    let offsets = WeatherCondition::ALL.map(|c| c.profile().temp_offset_c);
    let lo_offset = offsets.iter().copied().fold(f64::INFINITY, f64::min);
    let hi_offset = offsets.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let swing = cfg.temp_amplitude_c.abs();
    let clip = cfg.noise_clip_sd * cfg.temp_noise_std_c;
    (
        cfg.temp_mean_c - swing + lo_offset - clip,
        cfg.temp_mean_c + swing + hi_offset + clip,
    )
}

/// Highest wind speed the model can produce (m/s).
pub fn nominal_wind_max(cfg: &WeatherConfig) -> f64 {
    let hi_offset = WeatherCondition::ALL
        .map(|c| c.profile().wind_offset_mps)
        .into_iter()
        .fold(f64::NEG_INFINITY, f64::max);
    (cfg.wind_base_mps + cfg.wind_amplitude_mps.abs() + hi_offset + gust_cap(cfg)).max(0.0)
}

/// Unnormalised condition weights in `WeatherCondition::ALL` order.
fn condition_weights(site_type: SiteType, season: f64, wind_season: f64) -> [f64; 7] {
    let mut w = [
        0.35 + 0.15 * season,
        0.22,
        0.16 - 0.04 * season,
        0.10 - 0.05 * season,
        0.03 + 0.02 * wind_season.max(0.0),
        0.04 - 0.02 * season,
        0.10 + 0.05 * wind_season,
    ];
    match site_type {
        SiteType::Solar => w[0] *= 1.2,
        SiteType::Wind => w[6] *= 2.0,
        SiteType::Battery => {}
    }
    w.map(|x| x.max(0.001))
}

/// Inverse-CDF draw on a single uniform.
fn draw_condition(weights: &[f64; 7], rng: &mut StdRng) -> WeatherCondition {
    let total: f64 = weights.iter().sum();
    let target = rng.random::<f64>() * total;
    let mut acc = 0.0;
    for (condition, w) in WeatherCondition::ALL.iter().zip(weights) {
        acc += w;
        if target < acc {
            return *condition;
        }
    }
    WeatherCondition::Windy
}
