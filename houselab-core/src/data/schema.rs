//! Input column contract for listing tables.
//!
//! Column names are exact. Types are checked by kind so that both a CSV with
//! inferred `i64` columns and a Parquet file with `i32` columns are accepted.

use polars::prelude::*;

/// Neighborhood-area columns present in the King County export and dropped at
/// ingest.
pub const NEIGHBORHOOD_COLUMNS: &[&str] = &["sqft_living15", "sqft_lot15"];

/// Accepted storage kinds for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Any signed or unsigned integer type.
    Integer,
    /// Any integer or floating point type.
    Numeric,
    /// Text to be parsed as a date, or a native date or datetime column.
    Date,
}

impl ColumnKind {
    pub fn accepts(&self, dtype: &DataType) -> bool {
        let is_integer = matches!(
            dtype,
            DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        );
        match self {
            ColumnKind::Integer => is_integer,
            ColumnKind::Numeric => {
                is_integer || matches!(dtype, DataType::Float32 | DataType::Float64)
            }
            ColumnKind::Date => matches!(
                dtype,
                DataType::String | DataType::Date | DataType::Datetime(_, _)
            ),
        }
    }

    /// Type columns of this kind are cast to before extraction.
    pub fn canonical_dtype(&self) -> DataType {
        match self {
            ColumnKind::Integer => DataType::Int64,
            ColumnKind::Numeric => DataType::Float64,
            ColumnKind::Date => DataType::String,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            ColumnKind::Integer => "integer",
            ColumnKind::Numeric => "number",
            ColumnKind::Date => "date (text, date or datetime)",
        }
    }
}

/// Expected schema for listing data
pub struct ListingSchema;

impl ListingSchema {
    /// Required columns, in the order they are extracted.
    pub const COLUMNS: &'static [(&'static str, ColumnKind)] = &[
        ("id", ColumnKind::Integer),
        ("date", ColumnKind::Date),
        ("price", ColumnKind::Numeric),
        ("bedrooms", ColumnKind::Integer),
        ("bathrooms", ColumnKind::Numeric),
        ("sqft_living", ColumnKind::Numeric),
        ("sqft_lot", ColumnKind::Numeric),
        ("floors", ColumnKind::Numeric),
        ("waterfront", ColumnKind::Integer),
        ("condition", ColumnKind::Integer),
        ("sqft_basement", ColumnKind::Numeric),
        ("yr_built", ColumnKind::Integer),
        ("yr_renovated", ColumnKind::Integer),
        ("zipcode", ColumnKind::Integer),
        ("lat", ColumnKind::Numeric),
        ("long", ColumnKind::Numeric),
    ];

    /// The canonical schema a validated frame is cast to.
    pub fn schema() -> Schema {
        Schema::from_iter(
            Self::COLUMNS
                .iter()
                .map(|(name, kind)| Field::new((*name).into(), kind.canonical_dtype())),
        )
    }

    pub fn kind_of(column: &str) -> Option<ColumnKind> {
        Self::COLUMNS
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, kind)| *kind)
    }

    /// Validate DataFrame against schema
    pub fn validate(df: &DataFrame) -> Result<(), SchemaError> {
        // Check all required columns exist
        for (name, _) in Self::COLUMNS {
            if df.column(name).is_err() {
                return Err(SchemaError::MissingColumn(name.to_string()));
            }
        }

        // Check data types match
        for (name, kind) in Self::COLUMNS {
            let actual = df
                .column(name)
                .map_err(|_| SchemaError::MissingColumn(name.to_string()))?
                .dtype();
            if !kind.accepts(actual) {
                return Err(SchemaError::TypeMismatch {
                    column: name.to_string(),
                    expected: *kind,
                    actual: actual.clone(),
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Type mismatch in column {column}: expected {}, got {actual:?}", .expected.describe())]
    TypeMismatch {
        column: String,
        expected: ColumnKind,
        actual: DataType,
    },
}
