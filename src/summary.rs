//! Post-hoc summary statistics over a finished dataset.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::calendar::days_inclusive;
use crate::dataset::{Dataset, Field};
use crate::model::round_dp;
use crate::sites::SiteType;

/// Machine-readable snapshot of a generated dataset.
///
/// Computed post-hoc from the final records, so the counts always agree with
/// what was exported. Missing cells are skipped by every aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryDocument {
    pub total_records: usize,
    pub date_range: DateSpan,
    /// Master seed; rerunning with it reproduces the dataset.
    pub seed: u64,
    pub sites: FleetSummary,
    pub by_site_type: BTreeMap<SiteType, TypeTotals>,
    pub energy_production: EnergyStats,
    pub revenue: RevenueStats,
    pub data_quality: DataQuality,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateSpan {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub days: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetSummary {
    pub total_sites: usize,
    pub site_types: BTreeMap<SiteType, usize>,
    pub sites_list: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TypeTotals {
    pub records: usize,
    pub energy_kwh: f64,
    pub revenue: f64,
}

/// Per-record energy statistics (kWh).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyStats {
    pub total_kwh: f64,
    pub avg_daily_kwh: f64,
    pub max_daily_kwh: f64,
}

/// Per-record revenue statistics ($).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueStats {
    pub total: f64,
    pub avg: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataQuality {
    /// Records times injectable columns.
    pub eligible_cells: usize,
    pub missing_count: usize,
    pub missing_rate: f64,
    pub missing_by_field: BTreeMap<Field, usize>,
    /// Present cells outside the dataset's outlier thresholds.
    pub outlier_count: usize,
    pub outlier_rate: f64,
    pub outlier_by_field: BTreeMap<Field, usize>,
}

/// Summarises `dataset`, stamped with the current time.
pub fn summarize(dataset: &Dataset) -> SummaryDocument {
    summarize_at(dataset, Utc::now())
}

/// Summarises `dataset` with a caller-supplied generation timestamp.
pub fn summarize_at(dataset: &Dataset, generated_at: DateTime<Utc>) -> SummaryDocument {
    let registry = dataset.registry();
    let thresholds = dataset.thresholds();

    let mut by_site_type: BTreeMap<SiteType, TypeTotals> = BTreeMap::new();
    let mut missing_by_field: BTreeMap<Field, usize> = Field::ALL.iter().map(|f| (*f, 0)).collect();
    let mut outlier_by_field = missing_by_field.clone();

    let mut energy_total = 0.0_f64;
    let mut energy_max = 0.0_f64;
    let mut energy_n = 0_usize;
    let mut revenue_total = 0.0_f64;
    let mut revenue_max = f64::NEG_INFINITY;

    for r in dataset.records() {
        let totals = by_site_type.entry(r.site_type).or_default();
        totals.records += 1;
        totals.revenue += r.revenue;
        revenue_total += r.revenue;
        revenue_max = revenue_max.max(r.revenue);

        if let Some(e) = r.energy_produced_kwh {
            totals.energy_kwh += e;
            energy_total += e;
            energy_max = energy_max.max(e);
            energy_n += 1;
        }

        let site = registry.resolve(&r.site_id).ok();
        for field in Field::ALL {
            match r.get(field) {
                None => *missing_by_field.entry(field).or_insert(0) += 1,
                Some(v) => {
                    if site.is_some_and(|s| thresholds.is_outlier(s, field, v)) {
                        *outlier_by_field.entry(field).or_insert(0) += 1;
                    }
                }
            }
        }
    }

    for totals in by_site_type.values_mut() {
        totals.energy_kwh = round_dp(totals.energy_kwh, 2);
        totals.revenue = round_dp(totals.revenue, 2);
    }

    let n = dataset.len();
    let eligible_cells = n * Field::ALL.len();
    let missing_count: usize = missing_by_field.values().sum();
    let outlier_count: usize = outlier_by_field.values().sum();
    let rate = |count: usize| {
        if eligible_cells == 0 {
            0.0
        } else {
            count as f64 / eligible_cells as f64
        }
    };

    let span = dataset.date_span();

    SummaryDocument {
        total_records: n,
        date_range: DateSpan {
            start: span.map(|(s, _)| s),
            end: span.map(|(_, e)| e),
            days: span.map_or(0, |(s, e)| days_inclusive(s, e)),
        },
        seed: dataset.seed(),
        sites: FleetSummary {
            total_sites: registry.len(),
            site_types: registry.count_by_type(),
            sites_list: registry
                .list_sites()
                .iter()
                .map(|s| s.site_id.clone())
                .collect(),
        },
        by_site_type,
        energy_production: EnergyStats {
            total_kwh: round_dp(energy_total, 2),
            avg_daily_kwh: if energy_n > 0 {
                round_dp(energy_total / energy_n as f64, 2)
            } else {
                0.0
            },
            max_daily_kwh: energy_max,
        },
        revenue: RevenueStats {
            total: round_dp(revenue_total, 2),
            avg: if n > 0 {
                round_dp(revenue_total / n as f64, 2)
            } else {
                0.0
            },
            max: if n > 0 { revenue_max } else { 0.0 },
        },
        data_quality: DataQuality {
            eligible_cells,
            missing_count,
            missing_rate: rate(missing_count),
            missing_by_field,
            outlier_count,
            outlier_rate: rate(outlier_count),
            outlier_by_field,
        },
        generated_at,
    }
}

impl fmt::Display for SummaryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Generation Summary ---")?;
        match (self.date_range.start, self.date_range.end) {
            (Some(s), Some(e)) => writeln!(
                f,
                "Date range:            {s} to {e} ({} days)",
                self.date_range.days
            )?,
            _ => writeln!(f, "Date range:            (empty)")?,
        }
        writeln!(f, "Records:               {}", self.total_records)?;
        writeln!(
            f,
            "Sites:                 {} ({})",
            self.sites.total_sites,
            self.sites.sites_list.join(", ")
        )?;
        writeln!(f, "Seed:                  {}", self.seed)?;
        for (site_type, totals) in &self.by_site_type {
            writeln!(
                f,
                "  {:<8} {:>6} rows  {:>18.2} kWh  ${:>16.2}",
                site_type.as_str(),
                totals.records,
                totals.energy_kwh,
                totals.revenue
            )?;
        }
        writeln!(
            f,
            "Energy:                {:.2} kWh total, {:.2} avg, {:.2} max",
            self.energy_production.total_kwh,
            self.energy_production.avg_daily_kwh,
            self.energy_production.max_daily_kwh
        )?;
        writeln!(
            f,
            "Revenue:               ${:.2} total, ${:.2} avg, ${:.2} max",
            self.revenue.total, self.revenue.avg, self.revenue.max
        )?;
        let q = &self.data_quality;
        writeln!(
            f,
            "Missing values:        {} ({:.2}%)",
            q.missing_count,
            100.0 * q.missing_rate
        )?;
        write!(
            f,
            "Outliers:              {} ({:.2}%)",
            q.outlier_count,
            100.0 * q.outlier_rate
        )
    }
}
