//! Exploratory hypotheses H1–H12.
//!
//! Each hypothesis groups the enriched table by one derived field and compares
//! mean prices between groups. The statement is a business claim ("waterfront
//! listings are 30% more expensive"); [`evaluate`] reports whether the data
//! backs it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{Category, EnrichedListing};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hypothesis {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    H7,
    H8,
    H9,
    H10,
    H11,
    H12,
}

/// The relation a hypothesis asserts between group means.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Claim {
    /// `mean(group) >= mean(than) * (1 + by)`
    MoreExpensive {
        group: &'static str,
        than: &'static str,
        by: f64,
    },
    /// `mean(group) <= mean(than) * (1 - by)`
    Cheaper {
        group: &'static str,
        than: &'static str,
        by: f64,
    },
    /// Average period-over-period growth of the mean is at least `by`.
    Growth { by: f64 },
}

impl Hypothesis {
    pub const ALL: [Hypothesis; 12] = [
        Hypothesis::H1,
        Hypothesis::H2,
        Hypothesis::H3,
        Hypothesis::H4,
        Hypothesis::H5,
        Hypothesis::H6,
        Hypothesis::H7,
        Hypothesis::H8,
        Hypothesis::H9,
        Hypothesis::H10,
        Hypothesis::H11,
        Hypothesis::H12,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Hypothesis::H1 => "H1",
            Hypothesis::H2 => "H2",
            Hypothesis::H3 => "H3",
            Hypothesis::H4 => "H4",
            Hypothesis::H5 => "H5",
            Hypothesis::H6 => "H6",
            Hypothesis::H7 => "H7",
            Hypothesis::H8 => "H8",
            Hypothesis::H9 => "H9",
            Hypothesis::H10 => "H10",
            Hypothesis::H11 => "H11",
            Hypothesis::H12 => "H12",
        }
    }

    /// Derived field the table is grouped by.
    pub fn field(&self) -> &'static str {
        match self {
            Hypothesis::H1 => "waterfront_option",
            Hypothesis::H2 => "is_before_1955",
            Hypothesis::H3 => "basement_option",
            Hypothesis::H4 => "year",
            Hypothesis::H5 => "month_year",
            Hypothesis::H6 => "is_floor",
            Hypothesis::H7 => "season",
            Hypothesis::H8 => "is_renovated",
            Hypothesis::H9 => "renovated_2010",
            Hypothesis::H10 => "condition_type",
            Hypothesis::H11 => "bedrooms_amount",
            Hypothesis::H12 => "bathrooms_amount",
        }
    }

    /// The claim as stated. H5 names 3-bathroom listings, but its series is
    /// the monthly mean over every listing; no bathroom filter is applied.
    pub fn statement(&self) -> &'static str {
        match self {
            Hypothesis::H1 => "Waterfront listings are on average 30% more expensive.",
            Hypothesis::H2 => "Listings built before 1955 are on average 50% cheaper.",
            Hypothesis::H3 => "Listings with a basement are on average 20% more expensive.",
            Hypothesis::H4 => "Year-over-year price growth is 10%.",
            Hypothesis::H5 => "Listings with 3 bathrooms show 15% month-over-month price growth (series over all listings).",
            Hypothesis::H6 => "Ground-floor listings are on average 50% cheaper than multi-floor ones.",
            Hypothesis::H7 => "Winter prices are on average 20% lower than summer prices.",
            Hypothesis::H8 => "Never-renovated listings are on average 30% cheaper than renovated ones.",
            Hypothesis::H9 => "Listings renovated from 2010 on are on average 40% more expensive than the rest.",
            Hypothesis::H10 => "Listings in good condition are on average 50% more expensive than those in bad condition.",
            Hypothesis::H11 => "Listings with up to 2 bedrooms are on average 20% cheaper than larger ones.",
            Hypothesis::H12 => "Listings with up to 1 bathroom are on average 30% cheaper than the rest.",
        }
    }

    pub fn claim(&self) -> Claim {
        use Claim::*;
        match self {
            Hypothesis::H1 => MoreExpensive { group: "yes", than: "no", by: 0.30 },
            Hypothesis::H2 => Cheaper { group: "before", than: "after", by: 0.50 },
            Hypothesis::H3 => MoreExpensive { group: "basement", than: "no basement", by: 0.20 },
            Hypothesis::H4 => Growth { by: 0.10 },
            Hypothesis::H5 => Growth { by: 0.15 },
            Hypothesis::H6 => Cheaper { group: "ground floor", than: "more floors", by: 0.50 },
            Hypothesis::H7 => Cheaper { group: "Winter", than: "Summer", by: 0.20 },
            Hypothesis::H8 => Cheaper { group: "not renovated", than: "renovated", by: 0.30 },
            Hypothesis::H9 => MoreExpensive { group: "after", than: "before", by: 0.40 },
            Hypothesis::H10 => MoreExpensive { group: "good", than: "bad", by: 0.50 },
            Hypothesis::H11 => Cheaper { group: "up to 2", than: "more than 2", by: 0.20 },
            Hypothesis::H12 => Cheaper { group: "up to 1", than: "more than 1", by: 0.30 },
        }
    }

    /// Grouping key of one row.
    pub fn key(&self, row: &EnrichedListing) -> String {
        let f = &row.features;
        match self {
            Hypothesis::H1 => f.waterfront_option.label().to_string(),
            Hypothesis::H2 => f.is_before_1955.label().to_string(),
            Hypothesis::H3 => f.basement_option.label().to_string(),
            Hypothesis::H4 => f.year.to_string(),
            Hypothesis::H5 => f.month_year.clone(),
            Hypothesis::H6 => f.is_floor.label().to_string(),
            Hypothesis::H7 => f.season.label().to_string(),
            Hypothesis::H8 => f.is_renovated.label().to_string(),
            Hypothesis::H9 => f.renovated_2010.label().to_string(),
            Hypothesis::H10 => f.condition_type.label().to_string(),
            Hypothesis::H11 => f.bedrooms_amount.label().to_string(),
            Hypothesis::H12 => f.bathrooms_amount.label().to_string(),
        }
    }
}

/// Mean price of one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMean {
    pub key: String,
    pub mean_price: f64,
    pub count: usize,
}

/// Mean price per group, sorted by key.
pub fn hypothesis_table(rows: &[EnrichedListing], hypothesis: Hypothesis) -> Vec<GroupMean> {
    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for row in rows {
        let entry = sums.entry(hypothesis.key(row)).or_insert((0.0, 0));
        entry.0 += row.listing.price;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(key, (sum, count))| GroupMean {
            key,
            mean_price: sum / count as f64,
            count,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Supported,
    Refuted,
    /// A compared group is missing or empty.
    Inconclusive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub hypothesis: Hypothesis,
    pub groups: Vec<GroupMean>,
    /// Observed relative difference (or average growth), comparable to the claim's `by`.
    pub observed: Option<f64>,
    pub verdict: Verdict,
}

pub fn evaluate(rows: &[EnrichedListing], hypothesis: Hypothesis) -> Evaluation {
    let groups = hypothesis_table(rows, hypothesis);
    let mean_of = |key: &str| {
        groups
            .iter()
            .find(|g| g.key == key)
            .map(|g| g.mean_price)
            .filter(|m| *m > 0.0)
    };

    let (observed, by) = match hypothesis.claim() {
        Claim::MoreExpensive { group, than, by } => (
            mean_of(group).zip(mean_of(than)).map(|(g, t)| g / t - 1.0),
            by,
        ),
        Claim::Cheaper { group, than, by } => (
            mean_of(group).zip(mean_of(than)).map(|(g, t)| 1.0 - g / t),
            by,
        ),
        Claim::Growth { by } => (average_growth(&groups), by),
    };

    let verdict = match observed {
        None => Verdict::Inconclusive,
        Some(o) if o >= by => Verdict::Supported,
        Some(_) => Verdict::Refuted,
    };

    Evaluation {
        hypothesis,
        groups,
        observed,
        verdict,
    }
}

/// Mean of consecutive relative changes between ordered groups.
fn average_growth(groups: &[GroupMean]) -> Option<f64> {
    let changes: Vec<f64> = groups
        .windows(2)
        .filter(|w| w[0].mean_price > 0.0)
        .map(|w| w[1].mean_price / w[0].mean_price - 1.0)
        .collect();
    if changes.is_empty() {
        None
    } else {
        Some(changes.iter().sum::<f64>() / changes.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Listing, NEVER_RENOVATED_SENTINEL};
    use crate::features::FeatureDeriver;
    use chrono::NaiveDate;

    fn row(date: (i32, u32), price: f64, waterfront: bool) -> EnrichedListing {
        FeatureDeriver::enrich(Listing {
            id: 1,
            date: NaiveDate::from_ymd_opt(date.0, date.1, 1).unwrap(),
            price,
            bedrooms: 3,
            bathrooms: 2.0,
            sqft_living: 1500.0,
            sqft_lot: 5000.0,
            floors: 1.0,
            waterfront,
            condition: 3,
            sqft_basement: 0.0,
            yr_built: 1980,
            yr_renovated: NEVER_RENOVATED_SENTINEL,
            zipcode: 98001,
            lat: 47.3,
            long: -122.2,
        })
    }

    #[test]
    fn month_over_month_statement_names_its_scope() {
        let statement = Hypothesis::H5.statement();
        assert!(statement.contains("3 bathrooms"));
        assert!(statement.contains("all listings"));
        assert_eq!(Hypothesis::H5.field(), "month_year");
        assert!(matches!(Hypothesis::H5.claim(), Claim::Growth { .. }));
    }

    #[test]
    fn table_groups_and_averages() {
        let rows = vec![
            row((2014, 5), 100.0, false),
            row((2014, 6), 300.0, false),
            row((2014, 7), 1000.0, true),
        ];
        let table = hypothesis_table(&rows, Hypothesis::H1);
        assert_eq!(
            table,
            vec![
                GroupMean { key: "no".into(), mean_price: 200.0, count: 2 },
                GroupMean { key: "yes".into(), mean_price: 1000.0, count: 1 },
            ]
        );
    }

    #[test]
    fn waterfront_premium_supported() {
        let rows = vec![row((2014, 5), 100.0, false), row((2014, 5), 200.0, true)];
        let eval = evaluate(&rows, Hypothesis::H1);
        assert_eq!(eval.observed, Some(1.0));
        assert_eq!(eval.verdict, Verdict::Supported);
    }

    #[test]
    fn waterfront_premium_refuted() {
        let rows = vec![row((2014, 5), 100.0, false), row((2014, 5), 110.0, true)];
        assert_eq!(evaluate(&rows, Hypothesis::H1).verdict, Verdict::Refuted);
    }

    #[test]
    fn missing_group_is_inconclusive() {
        let rows = vec![row((2014, 5), 100.0, false)];
        let eval = evaluate(&rows, Hypothesis::H1);
        assert_eq!(eval.observed, None);
        assert_eq!(eval.verdict, Verdict::Inconclusive);
    }

    #[test]
    fn winter_discount() {
        let rows = vec![row((2014, 7), 100.0, false), row((2015, 1), 70.0, false)];
        let eval = evaluate(&rows, Hypothesis::H7);
        let observed = eval.observed.unwrap();
        assert!((observed - 0.30).abs() < 1e-9);
        assert_eq!(eval.verdict, Verdict::Supported);
    }

    #[test]
    fn year_over_year_growth() {
        let rows = vec![row((2014, 5), 100.0, false), row((2015, 5), 105.0, false)];
        let eval = evaluate(&rows, Hypothesis::H4);
        assert!((eval.observed.unwrap() - 0.05).abs() < 1e-9);
        assert_eq!(eval.verdict, Verdict::Refuted);
        assert_eq!(eval.groups[0].key, "2014");
    }

    #[test]
    fn month_year_groups_sort_chronologically() {
        let rows = vec![
            row((2015, 1), 1.0, false),
            row((2014, 12), 1.0, false),
            row((2014, 5), 1.0, false),
        ];
        let keys: Vec<String> = hypothesis_table(&rows, Hypothesis::H5)
            .into_iter()
            .map(|g| g.key)
            .collect();
        assert_eq!(keys, vec!["2014-05", "2014-12", "2015-01"]);
    }

    #[test]
    fn every_hypothesis_has_distinct_field() {
        let mut fields: Vec<&str> = Hypothesis::ALL.iter().map(|h| h.field()).collect();
        fields.sort_unstable();
        fields.dedup();
        assert_eq!(fields.len(), 12);
    }

    #[test]
    fn empty_table() {
        for h in Hypothesis::ALL {
            let eval = evaluate(&[], h);
            assert!(eval.groups.is_empty());
            assert_eq!(eval.verdict, Verdict::Inconclusive);
        }
    }
}
