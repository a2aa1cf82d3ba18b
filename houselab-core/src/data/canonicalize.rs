//! Preprocessing: parse and validate raw rows, drop outliers, keep the most
//! recent sale per listing id.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::ingest::DataError;
use crate::domain::{Listing, RawListing, NEVER_RENOVATED_SENTINEL};

/// Outlier policy. Matching rows are removed, never corrected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    pub outlier_bedrooms: Vec<i64>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            outlier_bedrooms: vec![33],
        }
    }
}

/// Row counts through preprocessing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreprocessStats {
    pub input_rows: usize,
    pub dropped_outliers: usize,
    pub dropped_duplicates: usize,
    pub output_rows: usize,
}

/// Canonicalizer for listing data
pub struct Canonicalizer;

impl Canonicalizer {
    /// Parse every row. The first malformed row aborts the whole batch so that
    /// medians are never computed over a silently shrunken table.
    pub fn parse(rows: &[RawListing]) -> Result<Vec<Listing>, DataError> {
        rows.iter().map(parse_listing).collect()
    }

    /// Drop outliers, sort by `(id, date)` and keep the last row per id.
    ///
    /// The result is sorted by id. Applying this twice is the same as applying
    /// it once.
    pub fn canonicalize(
        listings: Vec<Listing>,
        config: &PreprocessConfig,
    ) -> (Vec<Listing>, PreprocessStats) {
        let input_rows = listings.len();

        let mut kept: Vec<Listing> = listings
            .into_iter()
            .filter(|l| !config.outlier_bedrooms.contains(&l.bedrooms))
            .collect();
        let dropped_outliers = input_rows - kept.len();

        // Stable: equal (id, date) keep input order, so the later input row wins.
        kept.sort_by(|a, b| a.id.cmp(&b.id).then(a.date.cmp(&b.date)));

        let mut deduped: Vec<Listing> = Vec::with_capacity(kept.len());
        for listing in kept {
            match deduped.last_mut() {
                Some(last) if last.id == listing.id => *last = listing,
                _ => deduped.push(listing),
            }
        }

        let stats = PreprocessStats {
            input_rows,
            dropped_outliers,
            dropped_duplicates: input_rows - dropped_outliers - deduped.len(),
            output_rows: deduped.len(),
        };
        (deduped, stats)
    }

    /// Parse then canonicalize.
    pub fn preprocess(
        rows: &[RawListing],
        config: &PreprocessConfig,
    ) -> Result<(Vec<Listing>, PreprocessStats), DataError> {
        let parsed = Self::parse(rows)?;
        Ok(Self::canonicalize(parsed, config))
    }

    /// Detect anomalies that are legal but worth a look.
    pub fn detect_anomalies(listings: &[Listing], stats: &PreprocessStats) -> Vec<AnomalyReport> {
        let mut anomalies = Vec::new();

        let mut push = |anomaly_type, count, severity| {
            if count > 0 {
                anomalies.push(AnomalyReport {
                    anomaly_type,
                    count,
                    severity,
                });
            }
        };

        push(
            AnomalyType::OutlierBedrooms,
            stats.dropped_outliers,
            Severity::Info,
        );
        push(
            AnomalyType::RepeatedSale,
            stats.dropped_duplicates,
            Severity::Info,
        );
        push(
            AnomalyType::ZeroLivingArea,
            listings.iter().filter(|l| l.sqft_living == 0.0).count(),
            Severity::Warning,
        );
        push(
            AnomalyType::ZeroBedrooms,
            listings.iter().filter(|l| l.bedrooms == 0).count(),
            Severity::Warning,
        );
        push(
            AnomalyType::ZeroBathrooms,
            listings.iter().filter(|l| l.bathrooms == 0.0).count(),
            Severity::Warning,
        );
        // 0.5 and 0.75 stand for half and three-quarter baths
        push(
            AnomalyType::FractionalBathrooms,
            listings.iter().filter(|l| l.bathrooms.fract() != 0.0).count(),
            Severity::Info,
        );

        anomalies
    }
}

/// Parse and validate a single row.
///
/// `yr_renovated == 0` becomes [`NEVER_RENOVATED_SENTINEL`].
pub fn parse_listing(raw: &RawListing) -> Result<Listing, DataError> {
    let id = raw.id;

    let date = parse_date(&raw.date).ok_or_else(|| DataError::InvalidDate {
        id,
        value: raw.date.clone(),
    })?;

    let yr_built = parse_year(id, "yr_built", raw.yr_built)?;
    let yr_renovated = if raw.yr_renovated == 0 {
        NEVER_RENOVATED_SENTINEL
    } else {
        parse_year(id, "yr_renovated", raw.yr_renovated)?
    };

    let price = positive(id, "price", raw.price)?;
    let sqft_lot = positive(id, "sqft_lot", raw.sqft_lot)?;

    let condition = u8::try_from(raw.condition)
        .ok()
        .filter(|c| (1..=5).contains(c))
        .ok_or_else(|| invalid(id, "condition", raw.condition))?;

    let zipcode = u32::try_from(raw.zipcode)
        .ok()
        .filter(|z| *z <= 99_999)
        .ok_or_else(|| invalid(id, "zipcode", raw.zipcode))?;

    if raw.bedrooms < 0 {
        return Err(invalid(id, "bedrooms", raw.bedrooms));
    }

    Ok(Listing {
        id,
        date,
        price,
        bedrooms: raw.bedrooms,
        bathrooms: non_negative(id, "bathrooms", raw.bathrooms)?,
        sqft_living: non_negative(id, "sqft_living", raw.sqft_living)?,
        sqft_lot,
        floors: non_negative(id, "floors", raw.floors)?,
        waterfront: raw.waterfront == 1,
        condition,
        sqft_basement: non_negative(id, "sqft_basement", raw.sqft_basement)?,
        yr_built,
        yr_renovated,
        zipcode,
        lat: finite(id, "lat", raw.lat)?,
        long: finite(id, "long", raw.long)?,
    })
}

/// Parse a sale date. Accepts the compact `YYYYMMDDTHHMMSS` export format and
/// the usual ISO shapes; time of day is discarded.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

    let value = value.trim();
    if let Some(date) = parse_compact_date(value) {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
}

/// `YYYYMMDD`, optionally followed by `T` and a time part.
fn parse_compact_date(value: &str) -> Option<NaiveDate> {
    let digits = value.get(..8)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let rest = &value[8..];
    if !(rest.is_empty() || rest.starts_with('T')) {
        return None;
    }
    let year = digits[..4].parse().ok()?;
    let month = digits[4..6].parse().ok()?;
    let day = digits[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// A four-digit calendar year.
fn parse_year(id: i64, column: &'static str, value: i64) -> Result<i32, DataError> {
    if (1000..=9999).contains(&value) {
        Ok(value as i32)
    } else {
        Err(DataError::InvalidYear { id, column, value })
    }
}

fn invalid(id: i64, column: &'static str, value: impl ToString) -> DataError {
    DataError::InvalidValue {
        id,
        column,
        value: value.to_string(),
    }
}

fn finite(id: i64, column: &'static str, value: f64) -> Result<f64, DataError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid(id, column, value))
    }
}

fn non_negative(id: i64, column: &'static str, value: f64) -> Result<f64, DataError> {
    finite(id, column, value).and_then(|v| {
        if v >= 0.0 {
            Ok(v)
        } else {
            Err(invalid(id, column, v))
        }
    })
}

fn positive(id: i64, column: &'static str, value: f64) -> Result<f64, DataError> {
    finite(id, column, value).and_then(|v| {
        if v > 0.0 {
            Ok(v)
        } else {
            Err(invalid(id, column, v))
        }
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub anomaly_type: AnomalyType,
    pub count: usize,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnomalyType {
    OutlierBedrooms,
    RepeatedSale,
    ZeroLivingArea,
    ZeroBedrooms,
    ZeroBathrooms,
    FractionalBathrooms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
}
