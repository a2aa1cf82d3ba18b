//! Data ingestion, validation and preprocessing

pub mod canonicalize;
pub mod frame;
pub mod ingest;
pub mod schema;
pub mod synthetic;

pub use canonicalize::{
    AnomalyReport, AnomalyType, Canonicalizer, PreprocessConfig, PreprocessStats, Severity,
};
pub use frame::{enriched_to_frame, listings_from_frame, recommendations_to_frame};
pub use ingest::{DataError, DataIngestor};
pub use schema::{ListingSchema, SchemaError};
pub use synthetic::generate_listings;
