//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use renewables_synth::{DailyRecord, GenerationOutput, GeneratorConfig, generate};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Baseline configuration over `[start, end]` with a fixed seed.
pub fn config(start: NaiveDate, end: NaiveDate, seed: u64) -> GeneratorConfig {
    let mut cfg = GeneratorConfig::baseline();
    cfg.run.start_date = start;
    cfg.run.end_date = end;
    cfg.run.seed = Some(seed);
    cfg
}

/// Same as [`config`] with both degradation rates at zero.
pub fn clean_config(start: NaiveDate, end: NaiveDate, seed: u64) -> GeneratorConfig {
    let mut cfg = config(start, end, seed);
    cfg.quality.missing_rate = 0.0;
    cfg.quality.outlier_rate = 0.0;
    cfg
}

/// Default three-year range, seed 42.
pub fn default_run() -> GenerationOutput {
    generate(&config(date(2022, 1, 1), date(2024, 12, 31), 42)).expect("default run succeeds")
}

/// Default three-year range, seed 42, no degradation.
pub fn clean_run() -> GenerationOutput {
    generate(&clean_config(date(2022, 1, 1), date(2024, 12, 31), 42)).expect("clean run succeeds")
}

/// Records for one site.
pub fn site_rows<'a>(out: &'a GenerationOutput, site_id: &str) -> Vec<&'a DailyRecord> {
    out.dataset
        .records()
        .iter()
        .filter(|r| r.site_id == site_id)
        .collect()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Pearson correlation of paired samples.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let (mx, my) = (mean(xs), mean(ys));
    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        cov += (x - mx) * (y - my);
        vx += (x - mx).powi(2);
        vy += (y - my).powi(2);
    }
    cov / (vx.sqrt() * vy.sqrt())
}
