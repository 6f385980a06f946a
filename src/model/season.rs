use std::f64::consts::PI;

use chrono::NaiveDate;

use crate::calendar::day_of_year;

const YEAR_DAYS: f64 = 365.25;

/// Solar season in [-1, 1]: peaks near the June solstice (day 172), troughs
/// near the December solstice.
pub fn solar_season(date: NaiveDate) -> f64 {
    let doy = day_of_year(date) as f64;
    (2.0 * PI * (doy - 80.0) / YEAR_DAYS).sin()
}

/// Wind season in [-1, 1]: peaks mid-February, troughs mid-August.
pub fn wind_season(date: NaiveDate) -> f64 {
    let doy = day_of_year(date) as f64;
    (2.0 * PI * (doy - 45.0) / YEAR_DAYS).cos()
}

/// Annual and semi-annual price harmonics for `date`.
pub fn price_harmonics(date: NaiveDate) -> (f64, f64) {
    let doy = day_of_year(date) as f64;
    let angle = 2.0 * PI * doy / YEAR_DAYS;
    (angle.sin(), (2.0 * angle).sin())
}
