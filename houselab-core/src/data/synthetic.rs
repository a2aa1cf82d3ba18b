//! Synthetic listing generator for demos, benches and tests.
//!
//! Output follows the input contract, including the King County date format,
//! a small share of repeated sales and the odd 33-bedroom typo, so every
//! preprocessing step has something to do.

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::RawListing;

const ZIPCODES: [i64; 8] = [98001, 98004, 98028, 98052, 98103, 98125, 98178, 98199];

/// Generate `rows` listings from `seed`. Same seed, same rows.
pub fn generate_listings(rows: usize, seed: u64) -> Vec<RawListing> {
    let mut rng = StdRng::seed_from_u64(seed);
    let first_sale = NaiveDate::from_ymd_opt(2014, 5, 2).unwrap_or_default();

    let mut listings: Vec<RawListing> = Vec::with_capacity(rows);
    for i in 0..rows {
        // ~3% of rows resell an earlier listing
        let id = if i > 0 && rng.gen_bool(0.03) {
            listings[rng.gen_range(0..listings.len())].id
        } else {
            1_000_000 + i as i64
        };

        let zipcode = ZIPCODES[rng.gen_range(0..ZIPCODES.len())];
        let bedrooms: i64 = if rng.gen_bool(0.002) {
            33
        } else {
            rng.gen_range(1..=6)
        };
        let bathrooms = f64::from(rng.gen_range(2u8..=14)) * 0.25;
        let sqft_living = f64::from(rng.gen_range(500u32..=5000));
        let floors = [1.0, 1.0, 1.5, 2.0, 2.5, 3.0][rng.gen_range(0..6)];
        let sqft_basement = if rng.gen_bool(0.4) {
            (sqft_living * rng.gen_range(0.1..0.5)).round()
        } else {
            0.0
        };
        let yr_built: i64 = rng.gen_range(1900..=2015);
        let yr_renovated: i64 = if rng.gen_bool(0.05) {
            rng.gen_range(yr_built.max(1934)..=2015)
        } else {
            0
        };

        // Price roughly follows living area, with a per-zipcode level.
        let zip_level = 150.0 + 40.0 * (zipcode % 7) as f64;
        let price = (sqft_living * zip_level * rng.gen_range(0.7..1.3)).round();

        let date = first_sale + Duration::days(rng.gen_range(0..390));

        listings.push(RawListing {
            id,
            date: date.format("%Y%m%dT000000").to_string(),
            price,
            bedrooms,
            bathrooms,
            sqft_living,
            sqft_lot: f64::from(rng.gen_range(1000u32..=20000)),
            floors,
            waterfront: i64::from(rng.gen_bool(0.01)),
            condition: rng.gen_range(1..=5),
            sqft_basement,
            yr_built,
            yr_renovated,
            zipcode,
            lat: 47.15 + rng.gen_range(0.0..0.63),
            long: -122.52 + rng.gen_range(0.0..0.7),
        });
    }
    listings
}
