//! Recommendation engine: region baseline, buy classification, high-season
//! target and resale pricing.

pub mod classify;
pub mod pricing;
pub mod region;
pub mod season;

pub use classify::{classify, BuyClauses};
pub use pricing::{DisplayAmounts, PricingError, PricingRule, RoundingPolicy};
pub use region::{median, region_medians};
pub use season::{high_seasons, season_medians, HighSeason};

use tracing::debug;

use crate::domain::{EnrichedListing, Recommendation, RecommendationTable, Status, Zipcode};

#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    #[error("no median price for zipcode {0}")]
    MissingRegion(Zipcode),

    #[error("pricing error: {0}")]
    Pricing(#[from] PricingError),
}

pub struct RecommendationEngine<'a> {
    pricing: &'a PricingRule,
}

impl<'a> RecommendationEngine<'a> {
    pub fn new(pricing: &'a PricingRule) -> Self {
        Self { pricing }
    }

    /// Classify and price every row. Row order is preserved.
    ///
    /// Both aggregates (region median and high season) are taken over the full
    /// table before any row is classified.
    pub fn run(&self, rows: Vec<EnrichedListing>) -> Result<RecommendationTable, RecommendError> {
        let region = region_medians(&rows);
        let high = high_seasons(&rows);
        debug!(
            rows = rows.len(),
            zipcodes = region.len(),
            "computed region and season medians"
        );

        let rows = rows
            .into_iter()
            .map(|enriched| {
                let zipcode = enriched.listing.zipcode;
                let region_median_price = *region
                    .get(&zipcode)
                    .ok_or(RecommendError::MissingRegion(zipcode))?;

                let status = classify(&enriched, region_median_price);
                let sale = match status {
                    Status::Buy => {
                        let target = high
                            .get(&zipcode)
                            .ok_or(RecommendError::MissingRegion(zipcode))?;
                        Some(self.pricing.plan(enriched.listing.price, target)?)
                    }
                    Status::DontBuy => None,
                };

                Ok(Recommendation {
                    enriched,
                    region_median_price,
                    status,
                    sale,
                })
            })
            .collect::<Result<Vec<_>, RecommendError>>()?;

        Ok(RecommendationTable { rows })
    }
}
