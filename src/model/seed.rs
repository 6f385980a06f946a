//! Stable sub-seed derivation.
//!
//! Every random stream in a run is an independent `StdRng` seeded from the
//! master seed. The mix must be identical across platforms and builds, so it
//! is written out here instead of going through `std::hash`.

use chrono::{Datelike, NaiveDate};

/// Salt for the market price walk.
pub const MARKET_STREAM: u64 = 0x4d41_524b_4554_0001;
/// Salt for missing-value injection.
pub const MISSING_STREAM: u64 = 0x4d49_5353_494e_0002;
/// Salt for outlier injection.
pub const OUTLIER_STREAM: u64 = 0x4f55_544c_4945_0003;
/// Salt for per-row weather and downtime draws.
const ROW_STREAM: u64 = 0x524f_5753_0000_0004;

/// splitmix64 finaliser.
fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Derives an independent stream seed from `master` and a fixed salt.
pub fn derive_seed(master: u64, salt: u64) -> u64 {
    mix(mix(master) ^ salt)
}

/// Seed for the (site, date) row stream.
///
/// Depends only on the master seed, the site id and the date, so a row is
/// identical whatever range or execution order produced it.
pub fn row_seed(master: u64, site_id: &str, date: NaiveDate) -> u64 {
    let mut h = derive_seed(master, ROW_STREAM);
    for chunk in site_id.as_bytes().chunks(8) {
        let mut buf = [0u8; 8];
        buf[..chunk.len()].copy_from_slice(chunk);
        h = mix(h ^ u64::from_le_bytes(buf));
    }
    mix(h ^ (date.num_days_from_ce() as i64 as u64))
}
