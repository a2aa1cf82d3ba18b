//! Enriched listings and the recommendation rows built on top of them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::features::{Features, Season};
use super::listing::Listing;

/// A listing plus every derived field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedListing {
    #[serde(flatten)]
    pub listing: Listing,
    #[serde(flatten)]
    pub features: Features,
}

/// Purchase decision for a single listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Buy,
    DontBuy,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Status::Buy => "buy",
            Status::DontBuy => "dont_buy",
        }
    }

    pub fn is_buy(&self) -> bool {
        matches!(self, Status::Buy)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Which multiplier the pricing rule applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Markup {
    /// Bought below the high-season median.
    BelowTarget,
    /// Bought at or above the high-season median.
    AtOrAboveTarget,
}

/// Resale plan attached to `buy` rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalePlan {
    pub high_season: Season,
    pub season_median_price: f64,
    pub markup: Markup,
    /// Exact; truncate only for display (see `RoundingPolicy`).
    pub selling_price: Decimal,
    pub profit: Decimal,
}

/// One row of the recommendation table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub enriched: EnrichedListing,
    pub region_median_price: f64,
    pub status: Status,
    /// Present iff `status == Buy`.
    pub sale: Option<SalePlan>,
}

impl Recommendation {
    pub fn id(&self) -> i64 {
        self.enriched.listing.id
    }

    pub fn zipcode(&self) -> u32 {
        self.enriched.listing.zipcode
    }

    pub fn price(&self) -> f64 {
        self.enriched.listing.price
    }
}

/// Output of the recommendation engine, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationTable {
    pub rows: Vec<Recommendation>,
}

impl RecommendationTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The `buy` rows, each with its sale plan.
    pub fn buys(&self) -> impl Iterator<Item = (&Recommendation, &SalePlan)> {
        self.rows
            .iter()
            .filter_map(|row| row.sale.as_ref().map(|sale| (row, sale)))
    }

    /// A table of the `buy` rows only, order kept.
    pub fn buys_table(&self) -> Self {
        Self {
            rows: self
                .rows
                .iter()
                .filter(|r| r.status.is_buy())
                .cloned()
                .collect(),
        }
    }

    pub fn buy_count(&self) -> usize {
        self.rows.iter().filter(|r| r.status.is_buy()).count()
    }

    /// Sum of exact projected profit over all `buy` rows.
    pub fn total_profit(&self) -> Decimal {
        self.buys().map(|(_, sale)| sale.profit).sum()
    }
}
