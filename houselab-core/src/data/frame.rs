//! Conversion between polars frames and listing rows.

use chrono::{DateTime, Duration};
use polars::prelude::*;
use rust_decimal::prelude::ToPrimitive;

use super::ingest::DataError;
use super::schema::{ColumnKind, ListingSchema};
use crate::domain::{Category, EnrichedListing, RawListing, RecommendationTable};
use crate::recommend::RoundingPolicy;

/// Extract the contract columns of a validated frame.
///
/// Columns are cast to [`ListingSchema::schema`] first, so `i32` Parquet
/// columns and `i64` CSV columns read the same. Extra columns are ignored. A
/// null in any required column is an error.
pub fn listings_from_frame(df: &DataFrame) -> Result<Vec<RawListing>, DataError> {
    ListingSchema::validate(df)?;
    let df = canonical_frame(df)?;

    let ints = |name: &str| -> Result<Int64Chunked, DataError> {
        Ok(df.column(name)?.i64()?.clone())
    };
    let floats = |name: &str| -> Result<Float64Chunked, DataError> {
        Ok(df.column(name)?.f64()?.clone())
    };

    let id = ints("id")?;
    let date = df.column("date")?.str()?.clone();
    let price = floats("price")?;
    let bedrooms = ints("bedrooms")?;
    let bathrooms = floats("bathrooms")?;
    let sqft_living = floats("sqft_living")?;
    let sqft_lot = floats("sqft_lot")?;
    let floors = floats("floors")?;
    let waterfront = ints("waterfront")?;
    let condition = ints("condition")?;
    let sqft_basement = floats("sqft_basement")?;
    let yr_built = ints("yr_built")?;
    let yr_renovated = ints("yr_renovated")?;
    let zipcode = ints("zipcode")?;
    let lat = floats("lat")?;
    let long = floats("long")?;

    fn required<T>(value: Option<T>, column: &str, row: usize) -> Result<T, DataError> {
        value.ok_or_else(|| DataError::NullValue {
            column: column.to_string(),
            row,
        })
    }

    (0..df.height())
        .map(|i| {
            Ok(RawListing {
                id: required(id.get(i), "id", i)?,
                date: required(date.get(i), "date", i)?.to_string(),
                price: required(price.get(i), "price", i)?,
                bedrooms: required(bedrooms.get(i), "bedrooms", i)?,
                bathrooms: required(bathrooms.get(i), "bathrooms", i)?,
                sqft_living: required(sqft_living.get(i), "sqft_living", i)?,
                sqft_lot: required(sqft_lot.get(i), "sqft_lot", i)?,
                floors: required(floors.get(i), "floors", i)?,
                waterfront: required(waterfront.get(i), "waterfront", i)?,
                condition: required(condition.get(i), "condition", i)?,
                sqft_basement: required(sqft_basement.get(i), "sqft_basement", i)?,
                yr_built: required(yr_built.get(i), "yr_built", i)?,
                yr_renovated: required(yr_renovated.get(i), "yr_renovated", i)?,
                zipcode: required(zipcode.get(i), "zipcode", i)?,
                lat: required(lat.get(i), "lat", i)?,
                long: required(long.get(i), "long", i)?,
            })
        })
        .collect()
}

/// Only the contract columns, each in its canonical type.
fn canonical_frame(df: &DataFrame) -> Result<DataFrame, DataError> {
    let columns = ListingSchema::schema()
        .iter()
        .map(|(name, dtype)| {
            let column = df.column(name.as_str())?;
            match ListingSchema::kind_of(name.as_str()) {
                Some(ColumnKind::Date) => date_strings(column),
                _ => Ok(column.cast(dtype)?),
            }
        })
        .collect::<Result<Vec<_>, DataError>>()?;
    Ok(DataFrame::new(columns)?)
}

/// The `date` column as text. Native dates and datetimes are rendered
/// `YYYY-MM-DD`; the time of day is dropped.
fn date_strings(column: &Column) -> Result<Column, DataError> {
    match column.dtype() {
        DataType::Date | DataType::Datetime(_, _) => {
            let epoch = DateTime::UNIX_EPOCH.date_naive();
            let days = column
                .cast(&DataType::Date)?
                .cast(&DataType::Int32)?
                .i32()?
                .clone();
            let text: Vec<Option<String>> = days
                .into_iter()
                .map(|d| {
                    d.map(|d| {
                        (epoch + Duration::days(i64::from(d)))
                            .format("%Y-%m-%d")
                            .to_string()
                    })
                })
                .collect();
            Ok(Column::new(column.name().clone(), text))
        }
        _ => Ok(column.clone()),
    }
}

/// Raw listings in contract column order, `date` as text.
pub fn raw_listings_to_frame(rows: &[RawListing]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Column::new("id".into(), rows.iter().map(|r| r.id).collect::<Vec<_>>()),
        Column::new(
            "date".into(),
            rows.iter().map(|r| r.date.as_str()).collect::<Vec<_>>(),
        ),
        Column::new("price".into(), rows.iter().map(|r| r.price).collect::<Vec<_>>()),
        Column::new("bedrooms".into(), rows.iter().map(|r| r.bedrooms).collect::<Vec<_>>()),
        Column::new("bathrooms".into(), rows.iter().map(|r| r.bathrooms).collect::<Vec<_>>()),
        Column::new("sqft_living".into(), rows.iter().map(|r| r.sqft_living).collect::<Vec<_>>()),
        Column::new("sqft_lot".into(), rows.iter().map(|r| r.sqft_lot).collect::<Vec<_>>()),
        Column::new("floors".into(), rows.iter().map(|r| r.floors).collect::<Vec<_>>()),
        Column::new("waterfront".into(), rows.iter().map(|r| r.waterfront).collect::<Vec<_>>()),
        Column::new("condition".into(), rows.iter().map(|r| r.condition).collect::<Vec<_>>()),
        Column::new(
            "sqft_basement".into(),
            rows.iter().map(|r| r.sqft_basement).collect::<Vec<_>>(),
        ),
        Column::new("yr_built".into(), rows.iter().map(|r| r.yr_built).collect::<Vec<_>>()),
        Column::new(
            "yr_renovated".into(),
            rows.iter().map(|r| r.yr_renovated).collect::<Vec<_>>(),
        ),
        Column::new("zipcode".into(), rows.iter().map(|r| r.zipcode).collect::<Vec<_>>()),
        Column::new("lat".into(), rows.iter().map(|r| r.lat).collect::<Vec<_>>()),
        Column::new("long".into(), rows.iter().map(|r| r.long).collect::<Vec<_>>()),
    ])
}

// ── Output frames ───────────────────────────────────────────────────

fn label_column<T: Category>(
    name: &str,
    rows: &[&EnrichedListing],
    field: impl Fn(&EnrichedListing) -> T,
) -> Column {
    Column::new(
        name.into(),
        rows.iter().map(|r| field(r).label()).collect::<Vec<_>>(),
    )
}

/// Listing and derived columns for the given rows.
fn enriched_columns(rows: &[&EnrichedListing]) -> PolarsResult<Vec<Column>> {
    let epoch = DateTime::UNIX_EPOCH.date_naive();
    let days: Vec<i32> = rows
        .iter()
        .map(|r| (r.listing.date - epoch).num_days() as i32)
        .collect();

    Ok(vec![
        Column::new("id".into(), rows.iter().map(|r| r.listing.id).collect::<Vec<_>>()),
        Column::new("date".into(), days).cast(&DataType::Date)?,
        Column::new("price".into(), rows.iter().map(|r| r.listing.price).collect::<Vec<_>>()),
        Column::new(
            "bedrooms".into(),
            rows.iter().map(|r| r.listing.bedrooms).collect::<Vec<_>>(),
        ),
        Column::new(
            "bathrooms".into(),
            rows.iter().map(|r| r.listing.bathrooms).collect::<Vec<_>>(),
        ),
        Column::new(
            "sqft_living".into(),
            rows.iter().map(|r| r.listing.sqft_living).collect::<Vec<_>>(),
        ),
        Column::new(
            "sqft_lot".into(),
            rows.iter().map(|r| r.listing.sqft_lot).collect::<Vec<_>>(),
        ),
        Column::new("floors".into(), rows.iter().map(|r| r.listing.floors).collect::<Vec<_>>()),
        Column::new(
            "waterfront".into(),
            rows.iter()
                .map(|r| i64::from(r.listing.waterfront))
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "condition".into(),
            rows.iter()
                .map(|r| i64::from(r.listing.condition))
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "sqft_basement".into(),
            rows.iter().map(|r| r.listing.sqft_basement).collect::<Vec<_>>(),
        ),
        Column::new(
            "yr_built".into(),
            rows.iter().map(|r| r.listing.yr_built).collect::<Vec<_>>(),
        ),
        Column::new(
            "yr_renovated".into(),
            rows.iter().map(|r| r.listing.yr_renovated).collect::<Vec<_>>(),
        ),
        Column::new(
            "zipcode".into(),
            rows.iter()
                .map(|r| i64::from(r.listing.zipcode))
                .collect::<Vec<_>>(),
        ),
        Column::new("lat".into(), rows.iter().map(|r| r.listing.lat).collect::<Vec<_>>()),
        Column::new("long".into(), rows.iter().map(|r| r.listing.long).collect::<Vec<_>>()),
        Column::new(
            "price_m2".into(),
            rows.iter().map(|r| r.features.price_m2).collect::<Vec<_>>(),
        ),
        label_column("waterfront_option", rows, |r| r.features.waterfront_option),
        label_column("is_before_1955", rows, |r| r.features.is_before_1955),
        label_column("basement_option", rows, |r| r.features.basement_option),
        Column::new("year".into(), rows.iter().map(|r| r.features.year).collect::<Vec<_>>()),
        Column::new(
            "month_year".into(),
            rows.iter()
                .map(|r| r.features.month_year.as_str())
                .collect::<Vec<_>>(),
        ),
        label_column("is_floor", rows, |r| r.features.is_floor),
        Column::new(
            "month".into(),
            rows.iter().map(|r| r.features.month).collect::<Vec<_>>(),
        ),
        label_column("season", rows, |r| r.features.season),
        label_column("is_renovated", rows, |r| r.features.is_renovated),
        label_column("renovated_2010", rows, |r| r.features.renovated_2010),
        label_column("condition_type", rows, |r| r.features.condition_type),
        label_column("bedrooms_amount", rows, |r| r.features.bedrooms_amount),
        label_column("bathrooms_amount", rows, |r| r.features.bathrooms_amount),
    ])
}

pub fn enriched_to_frame(rows: &[EnrichedListing]) -> PolarsResult<DataFrame> {
    let rows: Vec<&EnrichedListing> = rows.iter().collect();
    DataFrame::new(enriched_columns(&rows)?)
}

/// Recommendation table as a frame.
///
/// `high_season`, `season_median_price`, `selling_price` and `profit` are null
/// on `dont_buy` rows. `price`, `selling_price` and `profit` hold the values
/// `rounding` presents, the same figures the marker notes show.
pub fn recommendations_to_frame(
    table: &RecommendationTable,
    rounding: RoundingPolicy,
) -> PolarsResult<DataFrame> {
    let rows: Vec<&EnrichedListing> = table.rows.iter().map(|r| &r.enriched).collect();
    let mut columns = enriched_columns(&rows)?;

    let prices = Column::new(
        "price".into(),
        table
            .rows
            .iter()
            .map(|r| rounding.display_price(r.price()).to_f64())
            .collect::<Vec<_>>(),
    );
    if let Some(column) = columns.iter_mut().find(|c| c.name().as_str() == "price") {
        *column = prices;
    }

    let shown: Vec<_> = table
        .rows
        .iter()
        .map(|r| r.sale.as_ref().map(|sale| rounding.apply(r.price(), sale)))
        .collect();

    columns.extend([
        Column::new(
            "region_median_price".into(),
            table
                .rows
                .iter()
                .map(|r| r.region_median_price)
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "status".into(),
            table.rows.iter().map(|r| r.status.label()).collect::<Vec<_>>(),
        ),
        Column::new(
            "high_season".into(),
            table
                .rows
                .iter()
                .map(|r| r.sale.as_ref().map(|s| s.high_season.label()))
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "season_median_price".into(),
            table
                .rows
                .iter()
                .map(|r| r.sale.as_ref().map(|s| s.season_median_price))
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "selling_price".into(),
            shown
                .iter()
                .map(|s| s.and_then(|s| s.selling_price.to_f64()))
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "profit".into(),
            shown
                .iter()
                .map(|s| s.and_then(|s| s.profit.to_f64()))
                .collect::<Vec<_>>(),
        ),
    ]);

    DataFrame::new(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::canonicalize::Canonicalizer;
    use crate::data::PreprocessConfig;
    use crate::features::FeatureDeriver;
    use crate::recommend::{PricingRule, RecommendationEngine};

    fn contract_frame() -> DataFrame {
        df!(
            "id" => &[1i64, 2, 3],
            "date" => &["20141013T000000", "20141209T000000", "20150225T000000"],
            "price" => &[221900.0, 538000.0, 180000.0],
            "bedrooms" => &[3i64, 3, 2],
            "bathrooms" => &[1.0, 2.25, 1.0],
            "sqft_living" => &[1180i64, 2570, 770],
            "sqft_lot" => &[5650i64, 7242, 10000],
            "floors" => &[1.0, 2.0, 1.0],
            "waterfront" => &[0i64, 0, 0],
            "view" => &[0i64, 0, 0],
            "condition" => &[3i64, 3, 3],
            "sqft_basement" => &[0i64, 400, 0],
            "yr_built" => &[1955i64, 1951, 1933],
            "yr_renovated" => &[0i64, 1991, 0],
            "zipcode" => &[98178i64, 98125, 98028],
            "lat" => &[47.5112, 47.7210, 47.7379],
            "long" => &[-122.257, -122.319, -122.233],
            "sqft_living15" => &[1340i64, 1690, 2720],
            "sqft_lot15" => &[5650i64, 7639, 8062]
        )
        .unwrap()
    }

    #[test]
    fn reads_contract_columns_and_ignores_extras() {
        let rows = listings_from_frame(&contract_frame()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[0].date, "20141013T000000");
        assert_eq!(rows[1].sqft_living, 2570.0);
        assert_eq!(rows[1].yr_renovated, 1991);
        assert_eq!(rows[2].zipcode, 98028);
    }

    #[test]
    fn native_date_column_is_rendered_as_iso() {
        let mut df = contract_frame();
        let days = Column::new("date".into(), &[16356i32, 16413, 16491])
            .cast(&DataType::Date)
            .unwrap();
        df.with_column(days).unwrap();
        let rows = listings_from_frame(&df).unwrap();
        assert_eq!(rows[0].date, "2014-10-13");
    }

    #[test]
    fn datetime_date_column_is_read_as_a_day() {
        let mut df = contract_frame();
        // 2014-10-13 00:00, 2014-12-09 15:30, 2015-02-25 00:00
        let stamps = Column::new(
            "date".into(),
            &[1_413_158_400_000i64, 1_418_139_000_000, 1_424_822_400_000],
        )
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        .unwrap();
        df.with_column(stamps).unwrap();

        let rows = listings_from_frame(&df).unwrap();
        let dates: Vec<&str> = rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, ["2014-10-13", "2014-12-09", "2015-02-25"]);
    }

    #[test]
    fn narrow_integer_columns_are_widened() {
        let mut df = contract_frame();
        df.with_column(Column::new("bedrooms".into(), &[3i32, 3, 2])).unwrap();
        df.with_column(Column::new("sqft_lot".into(), &[5650i32, 7242, 10000])).unwrap();
        let rows = listings_from_frame(&df).unwrap();
        assert_eq!(rows[2].bedrooms, 2);
        assert_eq!(rows[1].sqft_lot, 7242.0);
    }

    #[test]
    fn null_in_required_column_is_reported() {
        let mut df = contract_frame();
        df.with_column(Column::new(
            "price".into(),
            &[Some(221900.0), None, Some(180000.0)],
        ))
        .unwrap();
        let err = listings_from_frame(&df).unwrap_err();
        assert!(matches!(
            err,
            DataError::NullValue { ref column, row: 1 } if column == "price"
        ));
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let df = contract_frame().drop("zipcode").unwrap();
        assert!(matches!(
            listings_from_frame(&df),
            Err(DataError::Schema(_))
        ));
    }

    #[test]
    fn raw_frame_reads_back() {
        let rows = listings_from_frame(&contract_frame()).unwrap();
        let df = raw_listings_to_frame(&rows).unwrap();
        assert_eq!(df.width(), ListingSchema::COLUMNS.len());
        assert_eq!(listings_from_frame(&df).unwrap(), rows);
    }

    #[test]
    fn recommendation_frame_has_output_columns() {
        let raw = listings_from_frame(&contract_frame()).unwrap();
        let (listings, _) = Canonicalizer::preprocess(&raw, &PreprocessConfig::default()).unwrap();
        let table = RecommendationEngine::new(&PricingRule::default())
            .run(FeatureDeriver::enrich_all(listings))
            .unwrap();

        let df = recommendations_to_frame(&table, RoundingPolicy::default()).unwrap();
        assert_eq!(df.height(), 3);
        for name in [
            "id",
            "status",
            "zipcode",
            "price",
            "region_median_price",
            "high_season",
            "season_median_price",
            "selling_price",
            "profit",
            "season",
            "price_m2",
        ] {
            assert!(df.column(name).is_ok(), "missing column {name}");
        }
        // condition 3 everywhere, so nothing is a buy
        assert_eq!(df.column("profit").unwrap().null_count(), 3);
        assert!(df.column("sqft_living15").is_err());

        let enriched = enriched_to_frame(&[]).unwrap();
        assert_eq!(enriched.height(), 0);
    }

    fn buy_table(price: f64) -> RecommendationTable {
        let raw = RawListing {
            id: 7,
            date: "20141210T000000".into(),
            price,
            bedrooms: 2,
            bathrooms: 1.0,
            sqft_living: 850.0,
            sqft_lot: 5000.0,
            floors: 1.0,
            waterfront: 0,
            condition: 4,
            sqft_basement: 0.0,
            yr_built: 1948,
            yr_renovated: 0,
            zipcode: 98001,
            lat: 47.31,
            long: -122.21,
        };
        let (listings, _) = Canonicalizer::preprocess(&[raw], &PreprocessConfig::default()).unwrap();
        RecommendationEngine::new(&PricingRule::default())
            .run(FeatureDeriver::enrich_all(listings))
            .unwrap()
    }

    fn money(df: &DataFrame, name: &str) -> f64 {
        df.column(name).unwrap().f64().unwrap().get(0).unwrap()
    }

    #[test]
    fn price_column_follows_rounding_policy() {
        // selling 110006.05, profit 10000.55
        let table = buy_table(100_005.5);
        assert_eq!(table.buy_count(), 1);

        let exact = recommendations_to_frame(&table, RoundingPolicy::Exact).unwrap();
        assert_eq!(money(&exact, "price"), 100_005.5);
        let gap = money(&exact, "selling_price") - money(&exact, "price") - money(&exact, "profit");
        assert!(gap.abs() < 1e-6);

        let before = recommendations_to_frame(&table, RoundingPolicy::TruncateBeforeProfit).unwrap();
        assert_eq!(money(&before, "price"), 100_005.0);
        assert_eq!(money(&before, "selling_price"), 110_006.0);
        assert_eq!(money(&before, "profit"), 10_001.0);

        // profit comes from exact values, so it may lag the shown difference by under one unit
        let after = recommendations_to_frame(&table, RoundingPolicy::TruncateAfterProfit).unwrap();
        assert_eq!(money(&after, "price"), 100_005.0);
        assert_eq!(money(&after, "profit"), 10_000.0);
        let gap = money(&after, "selling_price") - money(&after, "price") - money(&after, "profit");
        assert!((0.0..1.0).contains(&gap));
    }

    #[test]
    fn shown_figures_are_consistent_for_every_policy() {
        let table = buy_table(100_005.5);
        for policy in RoundingPolicy::ALL {
            let df = recommendations_to_frame(&table, policy).unwrap();
            let (rec, sale) = table.buys().next().unwrap();
            let shown = policy.apply(rec.price(), sale);
            assert_eq!(Some(money(&df, "price")), shown.price.to_f64(), "{policy}");
            assert_eq!(Some(money(&df, "profit")), shown.profit.to_f64(), "{policy}");
            if policy != RoundingPolicy::TruncateAfterProfit {
                let gap = money(&df, "selling_price") - money(&df, "price") - money(&df, "profit");
                assert!(gap.abs() < 1e-6, "{policy}");
            }
        }
    }
}
