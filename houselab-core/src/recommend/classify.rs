//! Buy classification: a fixed seven-clause rule.

use serde::{Deserialize, Serialize};

use crate::domain::{
    BasementOption, BathroomsAmount, ConditionType, EnrichedListing, FloorOption, Status,
    WaterfrontOption,
};

/// Outcome of each clause of the acquisition rule for one listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyClauses {
    /// `price <= region_median_price` (a tie is eligible)
    pub at_or_below_region_median: bool,
    pub good_condition: bool,
    pub no_waterfront: bool,
    pub no_basement: bool,
    pub ground_floor: bool,
    /// `bedrooms <= 2` on the raw count
    pub at_most_two_bedrooms: bool,
    pub at_most_one_bathroom: bool,
}

impl BuyClauses {
    pub const NAMES: [&'static str; 7] = [
        "at_or_below_region_median",
        "good_condition",
        "no_waterfront",
        "no_basement",
        "ground_floor",
        "at_most_two_bedrooms",
        "at_most_one_bathroom",
    ];

    pub fn evaluate(row: &EnrichedListing, region_median_price: f64) -> Self {
        let listing = &row.listing;
        let features = &row.features;
        Self {
            at_or_below_region_median: listing.price <= region_median_price,
            good_condition: features.condition_type == ConditionType::Good,
            no_waterfront: features.waterfront_option == WaterfrontOption::No,
            no_basement: features.basement_option == BasementOption::NoBasement,
            ground_floor: features.is_floor == FloorOption::GroundFloor,
            at_most_two_bedrooms: listing.bedrooms <= 2,
            at_most_one_bathroom: features.bathrooms_amount == BathroomsAmount::UpToOne,
        }
    }

    pub fn as_array(&self) -> [bool; 7] {
        [
            self.at_or_below_region_median,
            self.good_condition,
            self.no_waterfront,
            self.no_basement,
            self.ground_floor,
            self.at_most_two_bedrooms,
            self.at_most_one_bathroom,
        ]
    }

    pub fn all(&self) -> bool {
        self.as_array().iter().all(|held| *held)
    }

    pub fn status(&self) -> Status {
        if self.all() {
            Status::Buy
        } else {
            Status::DontBuy
        }
    }

    /// Names of the clauses that did not hold.
    pub fn failed(&self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .zip(self.as_array())
            .filter(|(_, held)| !held)
            .map(|(name, _)| *name)
            .collect()
    }
}

pub fn classify(row: &EnrichedListing, region_median_price: f64) -> Status {
    BuyClauses::evaluate(row, region_median_price).status()
}
