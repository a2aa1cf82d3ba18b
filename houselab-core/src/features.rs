//! Feature derivation: validated listing → enriched listing.
//!
//! Each derived field is an independent pure function of the listing's own
//! fields. No field looks at other rows.

use chrono::Datelike;

use crate::domain::{
    BasementOption, BathroomsAmount, BedroomsAmount, ConditionType, EnrichedListing, Features,
    FloorOption, Listing, Period, RenovationStatus, Season, WaterfrontOption,
};

/// Construction-year split for `is_before_1955`.
pub const BUILT_SPLIT_YEAR: i32 = 1955;
/// Renovation-year split for `renovated_2010`.
pub const RENOVATED_SPLIT_YEAR: i32 = 2010;

pub struct FeatureDeriver;

impl FeatureDeriver {
    pub fn derive(listing: &Listing) -> Features {
        let month = listing.date.month();
        Features {
            price_m2: listing.price / listing.sqft_lot,
            waterfront_option: if listing.waterfront {
                WaterfrontOption::Yes
            } else {
                WaterfrontOption::No
            },
            is_before_1955: Period::split(listing.yr_built, BUILT_SPLIT_YEAR),
            basement_option: if listing.sqft_basement == 0.0 {
                BasementOption::NoBasement
            } else {
                BasementOption::Basement
            },
            year: listing.date.year(),
            month_year: listing.date.format("%Y-%m").to_string(),
            is_floor: if listing.floors == 1.0 {
                FloorOption::GroundFloor
            } else {
                FloorOption::MoreFloors
            },
            month,
            season: season_of(month),
            is_renovated: if listing.was_renovated() {
                RenovationStatus::Renovated
            } else {
                RenovationStatus::NotRenovated
            },
            // The 1900 sentinel falls on the "before" side.
            renovated_2010: Period::split(listing.yr_renovated, RENOVATED_SPLIT_YEAR),
            condition_type: if listing.condition >= 4 {
                ConditionType::Good
            } else {
                ConditionType::Bad
            },
            bedrooms_amount: if listing.bedrooms <= 2 {
                BedroomsAmount::UpToTwo
            } else {
                BedroomsAmount::MoreThanTwo
            },
            bathrooms_amount: if listing.bathrooms <= 1.0 {
                BathroomsAmount::UpToOne
            } else {
                BathroomsAmount::MoreThanOne
            },
        }
    }

    pub fn enrich(listing: Listing) -> EnrichedListing {
        let features = Self::derive(&listing);
        EnrichedListing { listing, features }
    }

    pub fn enrich_all(listings: Vec<Listing>) -> Vec<EnrichedListing> {
        listings.into_iter().map(Self::enrich).collect()
    }
}

fn season_of(month: u32) -> Season {
    // chrono months are always 1..=12
    Season::from_month(month).unwrap_or(Season::Winter)
}
