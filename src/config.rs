//! TOML-based generator configuration and preset definitions.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::GenerationError;
use crate::model::weather;
use crate::sites::registry::builtin_sites;
use crate::sites::{Site, SiteRegistry};

/// Top-level generator configuration parsed from TOML.
///
/// Every section has defaults matching the baseline run (2022-2024, 2%
/// missing, 1% outliers, built-in fleet). Load from TOML with
/// [`GeneratorConfig::from_toml_file`] or use [`GeneratorConfig::baseline`].
/// The value is treated as immutable once handed to the generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Date range and seed.
    #[serde(default)]
    pub run: RunConfig,
    /// Missing-value and outlier injection.
    #[serde(default)]
    pub quality: QualityConfig,
    /// Seasonal and weather model constants.
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Downtime model constants.
    #[serde(default)]
    pub production: ProductionConfig,
    /// Spot price process constants.
    #[serde(default)]
    pub market: MarketConfig,
    /// Fleet catalog. Defaults to the built-in six sites.
    #[serde(default = "builtin_sites")]
    pub sites: Vec<Site>,
}

/// Date range and seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// First generated day (inclusive).
    pub start_date: NaiveDate,
    /// Last generated day (inclusive).
    pub end_date: NaiveDate,
    /// Master seed. `None` draws one from OS entropy at run time.
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
            seed: None,
        }
    }
}

/// Data-quality degradation rates and the outlier shapes/thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QualityConfig {
    /// Per-cell probability of nulling an eligible value (0.0-1.0).
    pub missing_rate: f64,
    /// Per-cell probability of replacing a present value with an outlier (0.0-1.0).
    pub outlier_rate: f64,
    /// Energy outliers are `nameplate_daily_kwh * U(min, max)`.
    pub energy_outlier_min_factor: f64,
    pub energy_outlier_max_factor: f64,
    /// Price outliers are `market.price_ceiling * U(min, max)`.
    pub price_outlier_min_factor: f64,
    pub price_outlier_max_factor: f64,
    /// Downtime outliers are drawn from `[downtime_outlier_min_hours, 24]`.
    pub downtime_outlier_min_hours: f64,
    /// Temperature outliers are `±U(min, max)` °C.
    pub temperature_outlier_min_c: f64,
    pub temperature_outlier_max_c: f64,
    /// Wind outliers are `U(min, max)` m/s.
    pub wind_outlier_min_mps: f64,
    pub wind_outlier_max_mps: f64,
    /// Downtime at or above this is treated as an outlier when detecting.
    pub downtime_threshold_hours: f64,
    /// Plausible temperature band used for detection (°C).
    pub temperature_min_plausible_c: f64,
    pub temperature_max_plausible_c: f64,
    /// Wind speeds above this are treated as outliers when detecting (m/s).
    pub wind_max_plausible_mps: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            missing_rate: 0.02,
            outlier_rate: 0.01,
            energy_outlier_min_factor: 1.5,
            energy_outlier_max_factor: 3.0,
            price_outlier_min_factor: 2.0,
            price_outlier_max_factor: 4.0,
            downtime_outlier_min_hours: 20.0,
            temperature_outlier_min_c: 60.0,
            temperature_outlier_max_c: 90.0,
            wind_outlier_min_mps: 60.0,
            wind_outlier_max_mps: 90.0,
            downtime_threshold_hours: 18.0,
            temperature_min_plausible_c: -40.0,
            temperature_max_plausible_c: 55.0,
            wind_max_plausible_mps: 45.0,
        }
    }
}

/// Seasonal drivers, environmental readings and per-type production curves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeatherConfig {
    /// Annual mean temperature (°C).
    pub temp_mean_c: f64,
    /// Seasonal temperature swing (°C, peak-to-mean).
    pub temp_amplitude_c: f64,
    /// Daily temperature noise standard deviation (°C).
    pub temp_noise_std_c: f64,
    /// Baseline wind speed before seasonal and gust terms (m/s).
    pub wind_base_mps: f64,
    /// Seasonal wind swing (m/s).
    pub wind_amplitude_mps: f64,
    /// Gamma gust term shape.
    pub wind_gust_shape: f64,
    /// Gamma gust term scale (m/s).
    pub wind_gust_scale: f64,
    /// Temperature noise and wind gusts are truncated this many standard
    /// deviations above (and, for temperature, below) their mean.
    pub noise_clip_sd: f64,
    /// Solar capacity factor on a clear midsummer day.
    pub solar_peak_capacity_factor: f64,
    /// Solar seasonal factor is `mean + amplitude * season`.
    pub solar_seasonal_mean: f64,
    pub solar_seasonal_amplitude: f64,
    /// Panel efficiency loss per °C above `solar_derate_threshold_c`.
    pub solar_temp_derate_per_c: f64,
    pub solar_derate_threshold_c: f64,
    /// Half-width of the uniform daily solar noise multiplier.
    pub solar_noise_spread: f64,
    /// Turbine power curve (m/s).
    pub wind_cut_in_mps: f64,
    pub wind_rated_mps: f64,
    pub wind_cut_out_mps: f64,
    /// Fleet availability applied to the turbine power curve (0.0-1.0).
    pub wind_availability: f64,
    /// Half-width of the uniform daily wind noise multiplier.
    pub wind_noise_spread: f64,
    /// Average full-power discharge hours per day for storage.
    pub battery_discharge_hours: f64,
    /// Lower bound of the uniform battery availability draw (0.0-1.0).
    pub battery_min_availability: f64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            temp_mean_c: 15.0,
            temp_amplitude_c: 12.0,
            temp_noise_std_c: 4.0,
            wind_base_mps: 6.0,
            wind_amplitude_mps: 3.0,
            wind_gust_shape: 2.0,
            wind_gust_scale: 1.5,
            noise_clip_sd: 3.5,
            solar_peak_capacity_factor: 0.30,
            solar_seasonal_mean: 0.7,
            solar_seasonal_amplitude: 0.3,
            solar_temp_derate_per_c: 0.004,
            solar_derate_threshold_c: 25.0,
            solar_noise_spread: 0.1,
            wind_cut_in_mps: 3.5,
            wind_rated_mps: 12.0,
            wind_cut_out_mps: 25.0,
            wind_availability: 0.95,
            wind_noise_spread: 0.15,
            battery_discharge_hours: 4.0,
            battery_min_availability: 0.5,
        }
    }
}

/// Maintenance and weather outage model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProductionConfig {
    /// Daily probability of a maintenance event, per site type.
    pub maintenance_prob_solar: f64,
    pub maintenance_prob_wind: f64,
    pub maintenance_prob_battery: f64,
    /// Maintenance event duration bounds (hours).
    pub maintenance_min_hours: f64,
    pub maintenance_max_hours: f64,
    /// Mean of the exponential weather outage (hours).
    pub outage_mean_hours: f64,
    /// Weather outages are capped at this many hours.
    pub outage_cap_hours: f64,
    /// Outage mean multiplier on stormy days.
    pub storm_outage_factor: f64,
}

impl Default for ProductionConfig {
    fn default() -> Self {
        Self {
            maintenance_prob_solar: 0.02,
            maintenance_prob_wind: 0.03,
            maintenance_prob_battery: 0.01,
            maintenance_min_hours: 2.0,
            maintenance_max_hours: 12.0,
            outage_mean_hours: 0.5,
            outage_cap_hours: 3.0,
            storm_outage_factor: 3.0,
        }
    }
}

/// Spot market price process ($/MWh).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarketConfig {
    pub base_price: f64,
    /// Amplitude of the annual sine term.
    pub annual_amplitude: f64,
    /// Amplitude of the semi-annual sine term.
    pub semiannual_amplitude: f64,
    /// Added on Monday-Friday.
    pub weekday_premium: f64,
    /// Drift per year since `run.start_date`.
    pub annual_trend: f64,
    /// AR(1) coefficient of the day-to-day deviation (0.0-1.0).
    pub walk_persistence: f64,
    /// Innovation standard deviation of the deviation.
    pub walk_volatility: f64,
    /// Daily probability of a price spike.
    pub spike_probability: f64,
    pub spike_min: f64,
    pub spike_max: f64,
    /// Hard bounds on the nominal price.
    pub price_floor: f64,
    pub price_ceiling: f64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_price: 45.0,
            annual_amplitude: 10.0,
            semiannual_amplitude: 8.0,
            weekday_premium: 5.0,
            annual_trend: 2.0,
            walk_persistence: 0.85,
            walk_volatility: 6.0,
            spike_probability: 0.02,
            spike_min: 50.0,
            spike_max: 200.0,
            price_floor: 5.0,
            price_ceiling: 500.0,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"quality.missing_rate"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<ConfigError> for GenerationError {
    fn from(e: ConfigError) -> Self {
        GenerationError::InvalidParameter {
            field: e.field,
            message: e.message,
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::baseline()
    }
}

impl GeneratorConfig {
    /// The full three-year run with default degradation rates.
    pub fn baseline() -> Self {
        Self {
            run: RunConfig::default(),
            quality: QualityConfig::default(),
            weather: WeatherConfig::default(),
            production: ProductionConfig::default(),
            market: MarketConfig::default(),
            sites: builtin_sites(),
        }
    }

    /// Baseline without any injected missing values or outliers.
    pub fn clean() -> Self {
        Self {
            quality: QualityConfig {
                missing_rate: 0.0,
                outlier_rate: 0.0,
                ..QualityConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// One seeded month, for quick checks.
    pub fn smoke() -> Self {
        Self {
            run: RunConfig {
                start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
                end_date: NaiveDate::from_ymd_opt(2023, 1, 31).unwrap_or_default(),
                seed: Some(7),
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "clean", "smoke"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "clean" => Ok(Self::clean()),
            "smoke" => Ok(Self::smoke()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid, names an unknown
    /// field, or uses an unknown site type.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.message()))
    }

    /// Builds the site registry described by `sites`.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if the catalog is empty or malformed.
    pub fn registry(&self) -> Result<SiteRegistry, GenerationError> {
        SiteRegistry::new(self.sites.clone())
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let r = &self.run;
        if r.end_date < r.start_date {
            errors.push(ConfigError::new(
                "run.end_date",
                format!("must be >= run.start_date ({})", r.start_date),
            ));
        }

        self.validate_quality(&mut errors);
        self.validate_weather(&mut errors);
        self.validate_production(&mut errors);
        self.validate_market(&mut errors);

        if let Err(GenerationError::InvalidParameter { field, message }) = self.registry() {
            errors.push(ConfigError::new(field, message));
        }

        errors
    }

    fn validate_quality(&self, errors: &mut Vec<ConfigError>) {
        let q = &self.quality;
        unit_interval(errors, "quality.missing_rate", q.missing_rate);
        unit_interval(errors, "quality.outlier_rate", q.outlier_rate);

        if !(q.energy_outlier_min_factor > 1.0) {
            errors.push(ConfigError::new(
                "quality.energy_outlier_min_factor",
                "must be > 1 so energy outliers exceed nameplate output",
            ));
        }
        ordered(
            errors,
            "quality.energy_outlier_max_factor",
            q.energy_outlier_min_factor,
            q.energy_outlier_max_factor,
        );
        if !(q.price_outlier_min_factor > 1.0) {
            errors.push(ConfigError::new(
                "quality.price_outlier_min_factor",
                "must be > 1 so price outliers exceed market.price_ceiling",
            ));
        }
        ordered(
            errors,
            "quality.price_outlier_max_factor",
            q.price_outlier_min_factor,
            q.price_outlier_max_factor,
        );

        let nominal_downtime_max = self.production.maintenance_max_hours + self.production.outage_cap_hours;
        if !(q.downtime_threshold_hours > nominal_downtime_max) {
            errors.push(ConfigError::new(
                "quality.downtime_threshold_hours",
                format!(
                    "must exceed the nominal downtime maximum ({nominal_downtime_max} h = \
                     production.maintenance_max_hours + production.outage_cap_hours)"
                ),
            ));
        }
        if !(q.downtime_outlier_min_hours >= q.downtime_threshold_hours
            && q.downtime_outlier_min_hours <= 24.0)
        {
            errors.push(ConfigError::new(
                "quality.downtime_outlier_min_hours",
                "must lie in [quality.downtime_threshold_hours, 24]",
            ));
        }

        if !(q.temperature_min_plausible_c < q.temperature_max_plausible_c) {
            errors.push(ConfigError::new(
                "quality.temperature_min_plausible_c",
                "must be < quality.temperature_max_plausible_c",
            ));
        }
        if !(q.temperature_outlier_min_c > q.temperature_max_plausible_c
            && -q.temperature_outlier_min_c < q.temperature_min_plausible_c)
        {
            errors.push(ConfigError::new(
                "quality.temperature_outlier_min_c",
                "must place both signs of temperature outliers outside the plausible band",
            ));
        }
        let (t_lo, t_hi) = weather::nominal_temperature_bounds(&self.weather);
        if !(t_lo >= q.temperature_min_plausible_c && t_hi <= q.temperature_max_plausible_c) {
            errors.push(ConfigError::new(
                "quality.temperature_max_plausible_c",
                format!("plausible band must contain nominal temperatures [{t_lo:.1}, {t_hi:.1}]"),
            ));
        }
        ordered(
            errors,
            "quality.temperature_outlier_max_c",
            q.temperature_outlier_min_c,
            q.temperature_outlier_max_c,
        );

        if !(q.wind_max_plausible_mps > 0.0) {
            errors.push(ConfigError::new(
                "quality.wind_max_plausible_mps",
                "must be > 0",
            ));
        }
        let wind_hi = weather::nominal_wind_max(&self.weather);
        if !(wind_hi <= q.wind_max_plausible_mps) {
            errors.push(ConfigError::new(
                "quality.wind_max_plausible_mps",
                format!("must be >= the nominal wind maximum ({wind_hi:.1} m/s)"),
            ));
        }
        if !(q.wind_outlier_min_mps > q.wind_max_plausible_mps) {
            errors.push(ConfigError::new(
                "quality.wind_outlier_min_mps",
                "must be > quality.wind_max_plausible_mps",
            ));
        }
        ordered(
            errors,
            "quality.wind_outlier_max_mps",
            q.wind_outlier_min_mps,
            q.wind_outlier_max_mps,
        );
    }

    fn validate_weather(&self, errors: &mut Vec<ConfigError>) {
        let w = &self.weather;
        finite(errors, "weather.temp_mean_c", w.temp_mean_c);
        finite(errors, "weather.temp_amplitude_c", w.temp_amplitude_c);
        finite(errors, "weather.wind_base_mps", w.wind_base_mps);
        finite(errors, "weather.wind_amplitude_mps", w.wind_amplitude_mps);
        finite(errors, "weather.solar_seasonal_mean", w.solar_seasonal_mean);
        finite(errors, "weather.solar_seasonal_amplitude", w.solar_seasonal_amplitude);
        finite(errors, "weather.solar_derate_threshold_c", w.solar_derate_threshold_c);
        non_negative(errors, "weather.temp_noise_std_c", w.temp_noise_std_c);
        positive(errors, "weather.wind_gust_shape", w.wind_gust_shape);
        positive(errors, "weather.wind_gust_scale", w.wind_gust_scale);
        positive(errors, "weather.noise_clip_sd", w.noise_clip_sd);
        unit_interval(errors, "weather.solar_peak_capacity_factor", w.solar_peak_capacity_factor);
        non_negative(errors, "weather.solar_temp_derate_per_c", w.solar_temp_derate_per_c);
        unit_interval(errors, "weather.solar_noise_spread", w.solar_noise_spread);
        unit_interval(errors, "weather.wind_availability", w.wind_availability);
        unit_interval(errors, "weather.wind_noise_spread", w.wind_noise_spread);
        unit_interval(errors, "weather.battery_min_availability", w.battery_min_availability);

        if !(w.wind_cut_in_mps >= 0.0
            && w.wind_cut_in_mps < w.wind_rated_mps
            && w.wind_rated_mps < w.wind_cut_out_mps)
        {
            errors.push(ConfigError::new(
                "weather.wind_rated_mps",
                "power curve must satisfy 0 <= cut_in < rated < cut_out",
            ));
        }
        if !(w.battery_discharge_hours > 0.0 && w.battery_discharge_hours <= 24.0) {
            errors.push(ConfigError::new(
                "weather.battery_discharge_hours",
                "must be in (0, 24]",
            ));
        }
    }

    fn validate_production(&self, errors: &mut Vec<ConfigError>) {
        let p = &self.production;
        unit_interval(errors, "production.maintenance_prob_solar", p.maintenance_prob_solar);
        unit_interval(errors, "production.maintenance_prob_wind", p.maintenance_prob_wind);
        unit_interval(errors, "production.maintenance_prob_battery", p.maintenance_prob_battery);
        non_negative(errors, "production.maintenance_min_hours", p.maintenance_min_hours);
        ordered(
            errors,
            "production.maintenance_max_hours",
            p.maintenance_min_hours,
            p.maintenance_max_hours,
        );
        positive(errors, "production.outage_mean_hours", p.outage_mean_hours);
        non_negative(errors, "production.outage_cap_hours", p.outage_cap_hours);
        positive(errors, "production.storm_outage_factor", p.storm_outage_factor);
        if !(p.maintenance_max_hours + p.outage_cap_hours <= 24.0) {
            errors.push(ConfigError::new(
                "production.maintenance_max_hours",
                "maintenance_max_hours + outage_cap_hours must be <= 24",
            ));
        }
    }

    fn validate_market(&self, errors: &mut Vec<ConfigError>) {
        let m = &self.market;
        finite(errors, "market.base_price", m.base_price);
        finite(errors, "market.annual_amplitude", m.annual_amplitude);
        finite(errors, "market.semiannual_amplitude", m.semiannual_amplitude);
        finite(errors, "market.weekday_premium", m.weekday_premium);
        finite(errors, "market.annual_trend", m.annual_trend);
        positive(errors, "market.price_floor", m.price_floor);
        if !(m.price_ceiling.is_finite() && m.price_floor < m.price_ceiling) {
            errors.push(ConfigError::new(
                "market.price_ceiling",
                "must be > market.price_floor",
            ));
        }
        unit_interval(errors, "market.walk_persistence", m.walk_persistence);
        non_negative(errors, "market.walk_volatility", m.walk_volatility);
        unit_interval(errors, "market.spike_probability", m.spike_probability);
        non_negative(errors, "market.spike_min", m.spike_min);
        ordered(errors, "market.spike_max", m.spike_min, m.spike_max);
    }
}

fn unit_interval(errors: &mut Vec<ConfigError>, field: &str, v: f64) {
    if !(0.0..=1.0).contains(&v) {
        errors.push(ConfigError::new(field, format!("must be in [0.0, 1.0], got {v}")));
    }
}

fn finite(errors: &mut Vec<ConfigError>, field: &str, v: f64) {
    if !v.is_finite() {
        errors.push(ConfigError::new(field, format!("must be finite, got {v}")));
    }
}

fn positive(errors: &mut Vec<ConfigError>, field: &str, v: f64) {
    if !(v.is_finite() && v > 0.0) {
        errors.push(ConfigError::new(field, format!("must be > 0, got {v}")));
    }
}

fn non_negative(errors: &mut Vec<ConfigError>, field: &str, v: f64) {
    if !(v.is_finite() && v >= 0.0) {
        errors.push(ConfigError::new(field, format!("must be >= 0, got {v}")));
    }
}

/// Records an error under `max_field` unless `min <= max`.
fn ordered(errors: &mut Vec<ConfigError>, max_field: &str, min: f64, max: f64) {
    if !(min.is_finite() && max.is_finite() && min <= max) {
        errors.push(ConfigError::new(
            max_field,
            format!("must be >= its lower bound ({min}), got {max}"),
        ));
    }
}
