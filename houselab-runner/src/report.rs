//! Presentation adapters over a pipeline output: the hypothesis report and
//! the per-listing map marker notes.

use rayon::prelude::*;
use serde::Serialize;

use houselab_core::domain::{EnrichedListing, Recommendation, RecommendationTable, SalePlan};
use houselab_core::hypotheses::{evaluate, Evaluation, Hypothesis, Verdict};
use houselab_core::recommend::RoundingPolicy;

// ── Hypotheses ──────────────────────────────────────────────────────

/// All twelve hypotheses evaluated over one enriched table, in H1..H12 order.
#[derive(Debug, Clone, Serialize)]
pub struct HypothesisReport {
    pub evaluations: Vec<Evaluation>,
}

impl HypothesisReport {
    /// Evaluate every hypothesis. Each one reads the shared slice on its own
    /// rayon task.
    pub fn compute(rows: &[EnrichedListing]) -> Self {
        let evaluations = Hypothesis::ALL[..]
            .par_iter()
            .map(|h| evaluate(rows, *h))
            .collect();
        Self { evaluations }
    }

    pub fn supported(&self) -> usize {
        self.count(Verdict::Supported)
    }

    pub fn refuted(&self) -> usize {
        self.count(Verdict::Refuted)
    }

    fn count(&self, verdict: Verdict) -> usize {
        self.evaluations
            .iter()
            .filter(|e| e.verdict == verdict)
            .count()
    }

    /// One line per hypothesis: id, verdict, observed difference, statement.
    pub fn summary_lines(&self) -> Vec<String> {
        self.evaluations
            .iter()
            .map(|e| {
                let observed = e
                    .observed
                    .map(|o| format!("{:+.1}%", o * 100.0))
                    .unwrap_or_else(|| "n/a".into());
                format!(
                    "{:<4} {:<12} {:>8}  {}",
                    e.hypothesis.id(),
                    verdict_label(e.verdict),
                    observed,
                    e.hypothesis.statement()
                )
            })
            .collect()
    }
}

pub fn verdict_label(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Supported => "supported",
        Verdict::Refuted => "refuted",
        Verdict::Inconclusive => "inconclusive",
    }
}

// ── Marker notes ────────────────────────────────────────────────────

/// Map marker for one `buy` listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerNote {
    pub id: i64,
    pub lat: f64,
    pub long: f64,
    pub text: String,
}

pub fn marker_note(rec: &Recommendation, sale: &SalePlan, rounding: RoundingPolicy) -> MarkerNote {
    let listing = &rec.enriched.listing;
    let shown = rounding.apply(listing.price, sale);
    let text = format!(
        "Price: US${}. Advisable to sell in the {} for US${}. Profit: US${}. \
         Area: {} sqft. Bedroom(s): {}. Bathroom(s): {}. Year built: {}.",
        shown.price,
        sale.high_season,
        shown.selling_price,
        shown.profit,
        listing.sqft_living.trunc() as i64,
        listing.bedrooms,
        listing.bathrooms.round_ties_even() as i64,
        listing.yr_built,
    );
    MarkerNote {
        id: listing.id,
        lat: listing.lat,
        long: listing.long,
        text,
    }
}

/// Notes for the `buy` rows, in table order, at most `limit` of them.
pub fn marker_notes(
    table: &RecommendationTable,
    rounding: RoundingPolicy,
    limit: usize,
) -> Vec<MarkerNote> {
    table
        .buys()
        .take(limit)
        .map(|(rec, sale)| marker_note(rec, sale, rounding))
        .collect()
}
