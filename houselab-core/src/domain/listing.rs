//! Listing — one real-estate sale transaction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Year used in place of `yr_renovated == 0` ("never renovated").
pub const NEVER_RENOVATED_SENTINEL: i32 = 1900;

/// Input row exactly as the column contract delivers it.
///
/// Numeric fields keep their wire types; `date` is still text. Nothing here is
/// validated yet: see [`parse_listing`](crate::data::canonicalize::parse_listing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    pub id: i64,
    pub date: String,
    pub price: f64,
    pub bedrooms: i64,
    pub bathrooms: f64,
    pub sqft_living: f64,
    pub sqft_lot: f64,
    pub floors: f64,
    pub waterfront: i64,
    pub condition: i64,
    pub sqft_basement: f64,
    pub yr_built: i64,
    pub yr_renovated: i64,
    pub zipcode: i64,
    pub lat: f64,
    pub long: f64,
}

/// A validated listing: parsed date, checked years, normalized renovation year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    pub date: NaiveDate,
    pub price: f64,
    pub bedrooms: i64,
    pub bathrooms: f64,
    pub sqft_living: f64,
    pub sqft_lot: f64,
    pub floors: f64,
    pub waterfront: bool,
    pub condition: u8,
    pub sqft_basement: f64,
    pub yr_built: i32,
    /// Renovation year, or [`NEVER_RENOVATED_SENTINEL`].
    pub yr_renovated: i32,
    pub zipcode: u32,
    pub lat: f64,
    pub long: f64,
}

impl Listing {
    pub fn was_renovated(&self) -> bool {
        self.yr_renovated != NEVER_RENOVATED_SENTINEL
    }
}
