//! Orchestrator: walks date range x registry, then injects degradation and
//! summarises.

use chrono::NaiveDate;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, info, warn};

use crate::calendar::DateRange;
use crate::config::GeneratorConfig;
use crate::dataset::{DailyRecord, Dataset};
use crate::error::{GenerationError, Result};
use crate::model::seed::{MARKET_STREAM, derive_seed, row_seed};
use crate::model::{
    DowntimeModel, SpotPriceModel, WeatherModel, compute_energy, compute_revenue, round_dp,
};
use crate::quality::{OutlierThresholds, QualityInjector};
use crate::sites::{Site, SiteRegistry};
use crate::summary::{SummaryDocument, summarize};

/// Pipeline position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Generating { date: NaiveDate, site_index: usize },
    QualityInjection,
    Summarizing,
    Done,
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub dataset: Dataset,
    pub summary: SummaryDocument,
    /// Master seed actually used (drawn from OS entropy when unconfigured).
    pub seed: u64,
}

/// Single-run dataset generator.
///
/// All validation happens in [`Generator::new`]; once constructed, a run
/// cannot fail on bad input. The configuration is not modified.
#[derive(Debug)]
pub struct Generator {
    config: GeneratorConfig,
    registry: SiteRegistry,
    weather: WeatherModel,
    downtime: DowntimeModel,
    seed: u64,
    stage: Stage,
}

impl Generator {
    /// Validates `config` and prepares the models.
    ///
    /// # Errors
    ///
    /// `InvalidRange` when `end_date < start_date`; `InvalidParameter` for
    /// the first other configuration violation.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let (start, end) = (config.run.start_date, config.run.end_date);
        if end < start {
            return Err(GenerationError::InvalidRange { start, end });
        }
        if let Some(e) = config.validate().into_iter().next() {
            return Err(e.into());
        }

        let registry = config.registry()?;
        let weather = WeatherModel::new(&config.weather)?;
        let downtime = DowntimeModel::new(&config.production)?;

        let seed = match config.run.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::rng().random::<u64>();
                warn!(seed, "no seed configured, drew one from OS entropy");
                seed
            }
        };

        Ok(Self {
            config,
            registry,
            weather,
            downtime,
            seed,
            stage: Stage::Idle,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn enter(&mut self, stage: Stage) {
        debug!(from = ?self.stage, to = ?stage, "stage transition");
        self.stage = stage;
    }

    /// Runs the whole pipeline.
    ///
    /// # Errors
    ///
    /// `UnresolvedSiteReference` if an assembled record names an unknown
    /// site. Any error leaves no partial output behind.
    pub fn run(&mut self) -> Result<GenerationOutput> {
        let (start, end) = (self.config.run.start_date, self.config.run.end_date);
        let mut range = DateRange::new(start, end);
        info!(
            %start,
            %end,
            days = range.num_days(),
            sites = self.registry.len(),
            seed = self.seed,
            "generating dataset"
        );

        let mut market = SpotPriceModel::new(&self.config.market, start)?;
        let mut market_rng = StdRng::seed_from_u64(derive_seed(self.seed, MARKET_STREAM));
        let mut records = Vec::with_capacity(range.num_days() * self.registry.len());

        while let Some(date) = range.tick() {
            let price = market.sample_price(date, &mut market_rng);
            for (site_index, site) in self.registry.list_sites().iter().enumerate() {
                self.stage = Stage::Generating { date, site_index };
                records.push(self.generate_row(site, date, price));
            }
            debug!(%date, price, "day generated");
        }

        let thresholds = OutlierThresholds::from_config(&self.config.quality, &self.config.market);
        let mut dataset = Dataset::new(self.registry.clone(), thresholds, self.seed, records);
        dataset.check_references()?;
        info!(records = dataset.len(), "records assembled");

        self.enter(Stage::QualityInjection);
        let q = &self.config.quality;
        let injector = QualityInjector::new(q, &self.config.market, self.seed);
        let missing = injector.inject_missing(&mut dataset, q.missing_rate)?;
        let outliers = injector.inject_outliers(&mut dataset, q.outlier_rate)?;
        info!(missing, outliers, "data quality degraded");

        self.enter(Stage::Summarizing);
        let summary = summarize(&dataset);

        self.enter(Stage::Done);
        info!(
            records = summary.total_records,
            energy_kwh = summary.energy_production.total_kwh,
            revenue = summary.revenue.total,
            "generation complete"
        );

        Ok(GenerationOutput {
            dataset,
            summary,
            seed: self.seed,
        })
    }

    /// Builds one site's record for `date`: weather first, then downtime,
    /// both from the row's own stream.
    fn generate_row(&self, site: &Site, date: NaiveDate, price: f64) -> DailyRecord {
        let mut rng = StdRng::seed_from_u64(row_seed(self.seed, &site.site_id, date));
        let w = self.weather.sample_weather(site.site_type, date, &mut rng);
        let downtime = self
            .downtime
            .sample_downtime(site.site_type, w.condition, &mut rng);
        let energy = compute_energy(site, w.production_multiplier, downtime);

        DailyRecord {
            date,
            site_id: site.site_id.clone(),
            site_name: site.name.clone(),
            site_type: site.site_type,
            energy_produced_kwh: Some(energy),
            spot_market_price: Some(price),
            revenue: compute_revenue(energy, price),
            weather_condition: w.condition,
            downtime_hours: Some(downtime),
            temperature_c: Some(round_dp(w.temperature_c, 1)),
            wind_speed_mps: Some(round_dp(w.wind_speed_mps, 2)),
        }
    }
}

/// Validates `config` and runs a full generation.
///
/// # Errors
///
/// See [`Generator::new`] and [`Generator::run`].
pub fn generate(config: &GeneratorConfig) -> Result<GenerationOutput> {
    Generator::new(config.clone())?.run()
}
