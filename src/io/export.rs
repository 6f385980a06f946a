//! CSV export for the dataset and JSON export for the summary.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::dataset::{DailyRecord, Dataset};
use crate::summary::SummaryDocument;

/// Dataset column header.
pub const HEADER: &str = "Date,SiteID,SiteName,SiteType,EnergyProduced_kWh,\
                          SpotMarketPrice,Revenue,WeatherCondition,DowntimeHours,\
                          Temperature_C,WindSpeed_mps";

/// File stem shared by both artifacts of a run stamped `ts`.
pub fn output_stem(ts: DateTime<Utc>) -> String {
    format!("renewables_synthetic_data_{}", ts.format("%Y%m%d_%H%M%S"))
}

/// `(csv, summary)` paths under `dir` for a run stamped `ts`.
pub fn output_paths(dir: &Path, ts: DateTime<Utc>) -> (PathBuf, PathBuf) {
    let stem = output_stem(ts);
    (
        dir.join(format!("{stem}.csv")),
        dir.join(format!("{stem}_summary.json")),
    )
}

/// Exports the dataset to a CSV file at `path`.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(dataset: &Dataset, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_csv(dataset, BufWriter::new(file))
}

/// Writes the dataset as CSV to any writer. Missing values become empty
/// cells; output is byte-identical for identical datasets.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(dataset: &Dataset, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;
    for r in dataset.records() {
        wtr.write_record(&row(r))?;
    }

    wtr.flush()?;
    Ok(())
}

fn row(r: &DailyRecord) -> [String; 11] {
    [
        r.date.format("%Y-%m-%d").to_string(),
        r.site_id.clone(),
        r.site_name.clone(),
        r.site_type.to_string(),
        cell(r.energy_produced_kwh, 2),
        cell(r.spot_market_price, 2),
        format!("{:.4}", r.revenue),
        r.weather_condition.to_string(),
        cell(r.downtime_hours, 2),
        cell(r.temperature_c, 1),
        cell(r.wind_speed_mps, 2),
    ]
}

fn cell(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(String::new, |v| format!("{v:.precision$}"))
}

/// Exports the summary as pretty-printed JSON to `path`.
///
/// # Errors
///
/// Returns an `io::Error` if file creation, serialization or writing fails.
pub fn export_summary(summary: &SummaryDocument, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_summary(summary, BufWriter::new(file))
}

/// Writes the summary as pretty-printed JSON to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if serialization or writing fails.
pub fn write_summary(summary: &SummaryDocument, mut writer: impl Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writeln!(writer)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WeatherCondition;
    use crate::quality::OutlierThresholds;
    use crate::sites::SiteRegistry;
    use crate::summary::summarize_at;
    use chrono::{NaiveDate, TimeZone};

    fn dataset() -> Dataset {
        let reg = SiteRegistry::builtin();
        let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let records = reg
            .list_sites()
            .iter()
            .map(|s| DailyRecord {
                date,
                site_id: s.site_id.clone(),
                site_name: s.name.clone(),
                site_type: s.site_type,
                energy_produced_kwh: Some(123_456.78),
                spot_market_price: Some(47.31),
                revenue: 5840.7403,
                weather_condition: WeatherCondition::PartlyCloudy,
                downtime_hours: None,
                temperature_c: Some(-3.2),
                wind_speed_mps: Some(7.0),
            })
            .collect();
        Dataset::new(reg, OutlierThresholds::default(), 1, records)
    }

    fn csv_text(ds: &Dataset) -> String {
        let mut buf = Vec::new();
        write_csv(ds, &mut buf).ok();
        String::from_utf8(buf).unwrap_or_default()
    }

    #[test]
    fn header_is_exact() {
        let text = csv_text(&dataset());
        assert_eq!(
            text.lines().next().unwrap_or(""),
            "Date,SiteID,SiteName,SiteType,EnergyProduced_kWh,SpotMarketPrice,Revenue,\
             WeatherCondition,DowntimeHours,Temperature_C,WindSpeed_mps"
        );
    }

    #[test]
    fn one_line_per_record() {
        let text = csv_text(&dataset());
        assert_eq!(text.lines().count(), 7);
    }

    #[test]
    fn row_encoding() {
        let text = csv_text(&dataset());
        let first = text.lines().nth(1).unwrap_or("");
        assert_eq!(
            first,
            "2023-01-01,SOLAR001,Desert Sun Solar Farm,solar,123456.78,47.31,5840.7403,\
             Partly Cloudy,,-3.2,7.00"
        );
    }

    #[test]
    fn round_trip_parseable() {
        let text = csv_text(&dataset());
        let mut rdr = csv::ReaderBuilder::new().from_reader(text.as_bytes());
        let headers = rdr.headers().cloned().ok();
        assert_eq!(headers.as_ref().map(csv::StringRecord::len), Some(11));
        let mut rows = 0;
        for record in rdr.records() {
            let rec = record.unwrap();
            let energy: f64 = rec[4].parse().unwrap();
            let price: f64 = rec[5].parse().unwrap();
            let revenue: f64 = rec[6].parse().unwrap();
            assert!((energy * price / 1000.0 - revenue).abs() < 1e-3);
            assert!(rec[8].is_empty());
            rows += 1;
        }
        assert_eq!(rows, 6);
    }

    #[test]
    fn deterministic_output() {
        let ds = dataset();
        assert_eq!(csv_text(&ds), csv_text(&ds));
    }

    #[test]
    fn summary_json_is_valid() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let summary = summarize_at(&dataset(), ts);
        let mut buf = Vec::new();
        write_summary(&summary, &mut buf).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(v["total_records"], 6);
        assert_eq!(v["generated_at"], "2024-05-06T07:08:09Z");
    }

    #[test]
    fn output_names_share_stem() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let (csv_path, json_path) = output_paths(Path::new("out"), ts);
        assert_eq!(
            csv_path,
            Path::new("out/renewables_synthetic_data_20240506_070809.csv")
        );
        assert_eq!(
            json_path,
            Path::new("out/renewables_synthetic_data_20240506_070809_summary.json")
        );
    }
}
