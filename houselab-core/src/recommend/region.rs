//! Region baseline: median sale price per ZIP code.

use std::collections::BTreeMap;

use crate::domain::{EnrichedListing, Zipcode};

/// Median of a set of prices. Even-sized sets average the two middle values.
///
/// Sorts `values` in place. `None` for an empty slice.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Group prices by a key and reduce each group to its median.
pub fn grouped_medians<K, I>(pairs: I) -> BTreeMap<K, f64>
where
    K: Ord,
    I: IntoIterator<Item = (K, f64)>,
{
    let mut groups: BTreeMap<K, Vec<f64>> = BTreeMap::new();
    for (key, price) in pairs {
        groups.entry(key).or_default().push(price);
    }
    groups
        .into_iter()
        .filter_map(|(key, mut prices)| median(&mut prices).map(|m| (key, m)))
        .collect()
}

/// `region_median_price` for every ZIP code present in `rows`.
pub fn region_medians(rows: &[EnrichedListing]) -> BTreeMap<Zipcode, f64> {
    grouped_medians(rows.iter().map(|r| (r.listing.zipcode, r.listing.price)))
}
