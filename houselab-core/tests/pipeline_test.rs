//! End-to-end pipeline tests: raw rows (or a CSV file) in, recommendations out.

use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use houselab_core::data::{listings_from_frame, recommendations_to_frame, DataIngestor};
use houselab_core::domain::{
    Markup, RawListing, RenovationStatus, Period, Season, Status, NEVER_RENOVATED_SENTINEL,
};
use houselab_core::recommend::RoundingPolicy;
use houselab_core::{run_pipeline, PipelineConfig};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

fn temp_path(name: &str) -> PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!(
        "houselab_pipeline_test_{}_{id}_{name}",
        std::process::id()
    ))
}

// ── Helpers ──────────────────────────────────────────────────────────

/// A listing that passes every buy clause given a high enough region median.
fn candidate(id: i64, date: &str, price: f64, zipcode: i64) -> RawListing {
    RawListing {
        id,
        date: date.to_string(),
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
        zipcode,
        lat: 47.3,
        long: -122.2,
    }
}

/// A listing that never qualifies (three bedrooms).
fn filler(id: i64, date: &str, price: f64, zipcode: i64) -> RawListing {
    RawListing {
        bedrooms: 3,
        ..candidate(id, date, price, zipcode)
    }
}

// ── Worked examples ──────────────────────────────────────────────────

#[test]
fn buy_when_all_clauses_hold() {
    let rows = vec![
        candidate(1, "20140612T000000", 300_000.0, 98002),
        filler(2, "20140612T000000", 320_000.0, 98002),
        filler(3, "20140612T000000", 340_000.0, 98002),
    ];
    let output = run_pipeline(&rows, &PipelineConfig::default()).unwrap();
    let rec = &output.recommendations.rows[0];
    assert_eq!(rec.id(), 1);
    assert_eq!(rec.region_median_price, 320_000.0);
    assert_eq!(rec.status, Status::Buy);
}

#[test]
fn three_bedrooms_flip_to_dont_buy() {
    let rows = vec![
        filler(1, "20140612T000000", 300_000.0, 98002),
        filler(2, "20140612T000000", 320_000.0, 98002),
        filler(3, "20140612T000000", 340_000.0, 98002),
    ];
    let output = run_pipeline(&rows, &PipelineConfig::default()).unwrap();
    assert_eq!(output.recommendations.rows[0].status, Status::DontBuy);
    assert!(output.recommendations.rows[0].sale.is_none());
}

#[test]
fn never_renovated_is_normalized() {
    let rows = vec![candidate(1, "20140612T000000", 300_000.0, 98002)];
    let output = run_pipeline(&rows, &PipelineConfig::default()).unwrap();
    let row = &output.enriched[0];
    assert_eq!(row.listing.yr_renovated, NEVER_RENOVATED_SENTINEL);
    assert_eq!(row.features.is_renovated, RenovationStatus::NotRenovated);
    assert_eq!(row.features.renovated_2010, Period::Before);
}

#[test]
fn winter_high_season_prices_the_buy() {
    let rows = vec![
        filler(1, "20140715T000000", 400_000.0, 98001),
        candidate(2, "20141210T000000", 380_000.0, 98001),
        filler(3, "20150120T000000", 520_000.0, 98001),
    ];
    let output = run_pipeline(&rows, &PipelineConfig::default()).unwrap();

    let buys: Vec<_> = output.recommendations.buys().collect();
    assert_eq!(buys.len(), 1);
    let (rec, sale) = buys[0];
    assert_eq!(rec.id(), 2);
    assert_eq!(sale.high_season, Season::Winter);
    assert_eq!(sale.season_median_price, 450_000.0);
    assert_eq!(sale.markup, Markup::BelowTarget);
    assert_eq!(sale.selling_price, Decimal::new(494_000, 0));
    assert_eq!(sale.profit, Decimal::new(114_000, 0));
}

// ── Preprocessing through the pipeline ───────────────────────────────

#[test]
fn repeated_sale_keeps_latest_and_drops_outlier() {
    let rows = vec![
        filler(7, "20150301T000000", 610_000.0, 98003),
        filler(7, "20140801T000000", 500_000.0, 98003),
        RawListing {
            bedrooms: 33,
            ..filler(8, "20140801T000000", 640_000.0, 98003)
        },
    ];
    let output = run_pipeline(&rows, &PipelineConfig::default()).unwrap();
    assert_eq!(output.stats.input_rows, 3);
    assert_eq!(output.stats.dropped_outliers, 1);
    assert_eq!(output.stats.dropped_duplicates, 1);
    assert_eq!(output.enriched.len(), 1);
    assert_eq!(output.enriched[0].listing.price, 610_000.0);
    // medians are taken after preprocessing
    assert_eq!(output.recommendations.rows[0].region_median_price, 610_000.0);
}

#[test]
fn every_row_filtered_out_gives_an_empty_table() {
    let rows: Vec<RawListing> = (1..=3)
        .map(|id| RawListing {
            bedrooms: 33,
            ..candidate(id, "20140612T000000", 300_000.0, 98002)
        })
        .collect();
    let output = run_pipeline(&rows, &PipelineConfig::default()).unwrap();

    assert_eq!(output.stats.input_rows, 3);
    assert_eq!(output.stats.dropped_outliers, 3);
    assert_eq!(output.stats.output_rows, 0);
    assert!(output.enriched.is_empty());
    assert!(output.recommendations.is_empty());
    assert_eq!(output.recommendations.buy_count(), 0);
    assert_eq!(output.recommendations.total_profit(), Decimal::ZERO);

    let df = recommendations_to_frame(&output.recommendations, RoundingPolicy::default()).unwrap();
    assert_eq!(df.height(), 0);
    assert!(df.column("profit").is_ok());
}

#[test]
fn each_zipcode_has_its_own_baseline() {
    let rows = vec![
        candidate(1, "20140612T000000", 200_000.0, 98001),
        filler(2, "20140612T000000", 900_000.0, 98001),
        candidate(3, "20140612T000000", 200_000.0, 98004),
        filler(4, "20140612T000000", 100_000.0, 98004),
    ];
    let output = run_pipeline(&rows, &PipelineConfig::default()).unwrap();
    let status: Vec<Status> = output
        .recommendations
        .rows
        .iter()
        .map(|r| r.status)
        .collect();
    // 98001 median 550k admits id 1; 98004 median 150k rejects id 3
    assert_eq!(
        status,
        vec![Status::Buy, Status::DontBuy, Status::DontBuy, Status::DontBuy]
    );
}

// ── File input ───────────────────────────────────────────────────────

#[test]
fn csv_file_to_recommendation_frame() {
    let csv = "\
id,date,price,bedrooms,bathrooms,sqft_living,sqft_lot,floors,waterfront,view,condition,grade,sqft_above,sqft_basement,yr_built,yr_renovated,zipcode,lat,long,sqft_living15,sqft_lot15
1,20140715T000000,400000,3,1,1000,5000,1,0,0,3,7,1000,0,1960,0,98001,47.3,-122.2,1000,5000
2,20141210T000000,380000,2,1,850,5000,1,0,0,4,7,850,0,1948,0,98001,47.3,-122.2,900,5000
3,20150120T000000,520000,3,2,1800,6000,2,0,0,3,8,1800,0,1995,2011,98001,47.3,-122.2,1700,6000
";
    let path = temp_path("kc.csv");
    std::fs::write(&path, csv).unwrap();

    let df = DataIngestor::new().load(&path).unwrap();
    let rows = listings_from_frame(&df).unwrap();
    assert_eq!(rows.len(), 3);

    let output = run_pipeline(&rows, &PipelineConfig::default()).unwrap();
    assert_eq!(output.recommendations.buy_count(), 1);

    let frame =
        recommendations_to_frame(&output.recommendations, RoundingPolicy::default()).unwrap();
    let status = frame.column("status").unwrap().str().unwrap().clone();
    assert_eq!(status.get(1), Some("buy"));
    let selling = frame.column("selling_price").unwrap().f64().unwrap().clone();
    assert_eq!(selling.get(1), Some(494_000.0));
    assert_eq!(selling.get(0), None);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn csv_with_bad_date_aborts() {
    let csv = "\
id,date,price,bedrooms,bathrooms,sqft_living,sqft_lot,floors,waterfront,condition,sqft_basement,yr_built,yr_renovated,zipcode,lat,long
1,2014-13-45,400000,3,1,1000,5000,1,0,3,0,1960,0,98001,47.3,-122.2
";
    let path = temp_path("bad_date.csv");
    std::fs::write(&path, csv).unwrap();

    let df = DataIngestor::new().load(&path).unwrap();
    let rows = listings_from_frame(&df).unwrap();
    assert!(run_pipeline(&rows, &PipelineConfig::default()).is_err());

    let _ = std::fs::remove_file(&path);
}
