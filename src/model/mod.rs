//! Statistical generation models: seasonal weather, downtime, energy and
//! market price, plus the seed derivation that keeps every stream
//! reproducible.

pub mod market;
pub mod production;
pub mod season;
pub mod seed;
pub mod weather;

pub use market::{SpotPriceModel, compute_revenue};
pub use production::{DowntimeModel, compute_energy};
pub use weather::{WeatherCondition, WeatherModel, WeatherSample};

/// Rounds `x` to `dp` decimal places.
pub fn round_dp(x: f64, dp: i32) -> f64 {
    let scale = 10f64.powi(dp);
    (x * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_dp(1.005_1, 2), 1.01);
        assert_eq!(round_dp(2.344, 2), 2.34);
        assert_eq!(round_dp(-2.345_1, 2), -2.35);
        assert_eq!(round_dp(7.0, 4), 7.0);
    }
}
