//! Domain types for HouseLab

pub mod features;
pub mod ids;
pub mod listing;
pub mod recommendation;

pub use features::{
    BasementOption, BathroomsAmount, BedroomsAmount, Category, ConditionType, Features,
    FloorOption, Period, RenovationStatus, Season, WaterfrontOption,
};
pub use ids::{CacheKey, DatasetHash};
pub use listing::{Listing, RawListing, NEVER_RENOVATED_SENTINEL};
pub use recommendation::{
    EnrichedListing, Markup, Recommendation, RecommendationTable, SalePlan, Status,
};

/// ZIP code: the spatial grouping key for medians.
pub type Zipcode = u32;
