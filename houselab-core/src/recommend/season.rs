//! High season: the season with the highest median price per ZIP code.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::region::grouped_medians;
use crate::domain::{EnrichedListing, Season, Zipcode};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighSeason {
    pub season: Season,
    pub median_price: f64,
}

/// Median price per `(zipcode, season)` over the whole table.
pub fn season_medians(rows: &[EnrichedListing]) -> BTreeMap<(Zipcode, Season), f64> {
    grouped_medians(
        rows.iter()
            .map(|r| ((r.listing.zipcode, r.features.season), r.listing.price)),
    )
}

/// Pick the high season of every ZIP code.
///
/// Candidates are visited in season label order and sorted stably by median;
/// the last one wins. On equal medians that is the alphabetically last season.
pub fn high_seasons(rows: &[EnrichedListing]) -> BTreeMap<Zipcode, HighSeason> {
    let mut best: BTreeMap<Zipcode, HighSeason> = BTreeMap::new();
    for ((zipcode, season), median_price) in season_medians(rows) {
        let candidate = HighSeason {
            season,
            median_price,
        };
        best.entry(zipcode)
            .and_modify(|current| {
                if candidate.median_price.total_cmp(&current.median_price).is_ge() {
                    *current = candidate;
                }
            })
            .or_insert(candidate);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Listing, NEVER_RENOVATED_SENTINEL};
    use crate::features::FeatureDeriver;
    use chrono::NaiveDate;

    fn sale(zipcode: u32, month: u32, price: f64) -> EnrichedListing {
        FeatureDeriver::enrich(Listing {
            id: i64::from(month) * 1000 + price as i64,
            date: NaiveDate::from_ymd_opt(2014, month, 15).unwrap(),
            price,
            bedrooms: 3,
            bathrooms: 2.0,
            sqft_living: 1500.0,
            sqft_lot: 5000.0,
            floors: 1.0,
            waterfront: false,
            condition: 3,
            sqft_basement: 0.0,
            yr_built: 1980,
            yr_renovated: NEVER_RENOVATED_SENTINEL,
            zipcode,
            lat: 47.3,
            long: -122.2,
        })
    }

    #[test]
    fn winter_beats_summer() {
        let rows = vec![
            sale(98001, 7, 400_000.0),
            sale(98001, 12, 450_000.0),
        ];
        let high = high_seasons(&rows);
        assert_eq!(high[&98001].season, Season::Winter);
        assert_eq!(high[&98001].median_price, 450_000.0);
    }

    #[test]
    fn uses_medians_not_maxima() {
        let rows = vec![
            sale(98001, 7, 100_000.0),
            sale(98001, 7, 900_000.0),
            sale(98001, 8, 110_000.0),
            sale(98001, 4, 300_000.0),
        ];
        // Summer median is 110k despite the 900k outlier
        let high = high_seasons(&rows);
        assert_eq!(high[&98001].season, Season::Spring);
        assert_eq!(high[&98001].median_price, 300_000.0);
    }

    #[test]
    fn tie_goes_to_last_sorted_season() {
        let rows = vec![
            sale(98002, 4, 500_000.0),  // Spring
            sale(98002, 10, 500_000.0), // Fall
            sale(98002, 7, 500_000.0),  // Summer
        ];
        let high = high_seasons(&rows);
        assert_eq!(high[&98002].season, Season::Summer);
    }

    #[test]
    fn one_entry_per_zipcode() {
        let rows = vec![
            sale(98001, 1, 1.0),
            sale(98002, 1, 2.0),
            sale(98003, 6, 3.0),
            sale(98003, 9, 4.0),
        ];
        let high = high_seasons(&rows);
        assert_eq!(high.len(), 3);
        assert_eq!(season_medians(&rows).len(), 4);
    }

    #[test]
    fn empty_table_has_no_high_seasons() {
        assert!(high_seasons(&[]).is_empty());
    }
}
