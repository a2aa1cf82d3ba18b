//! Resale pricing rule and display rounding.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::season::HighSeason;
use crate::domain::{Markup, SalePlan};

/// Two-branch markup over the purchase price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingRule {
    /// Applied when `price < season_median_price`.
    pub below_target_markup: Decimal,
    /// Applied when `price >= season_median_price`.
    pub at_or_above_target_markup: Decimal,
}

impl Default for PricingRule {
    fn default() -> Self {
        Self {
            below_target_markup: Decimal::new(130, 2),
            at_or_above_target_markup: Decimal::new(110, 2),
        }
    }
}

impl PricingRule {
    /// Build from float multipliers, as read from configuration.
    pub fn from_f64(below_target: f64, at_or_above_target: f64) -> Result<Self, PricingError> {
        let convert = |value: f64| {
            Decimal::from_f64(value).ok_or(PricingError::Unrepresentable(value))
        };
        let rule = Self {
            below_target_markup: convert(below_target)?,
            at_or_above_target_markup: convert(at_or_above_target)?,
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Both multipliers must be at least 1 so that `selling_price >= price`.
    pub fn validate(&self) -> Result<(), PricingError> {
        for markup in [self.below_target_markup, self.at_or_above_target_markup] {
            if markup < Decimal::ONE {
                return Err(PricingError::MarkupBelowOne(markup));
            }
        }
        Ok(())
    }

    pub fn markup_for(&self, price: f64, season_median_price: f64) -> Markup {
        if price < season_median_price {
            Markup::BelowTarget
        } else {
            Markup::AtOrAboveTarget
        }
    }

    pub fn multiplier(&self, markup: Markup) -> Decimal {
        match markup {
            Markup::BelowTarget => self.below_target_markup,
            Markup::AtOrAboveTarget => self.at_or_above_target_markup,
        }
    }

    /// Selling price and profit for a purchase at `price`, exact.
    pub fn plan(&self, price: f64, high: &HighSeason) -> Result<SalePlan, PricingError> {
        let exact_price = Decimal::from_f64(price).ok_or(PricingError::Unrepresentable(price))?;
        let markup = self.markup_for(price, high.median_price);
        let selling_price = exact_price * self.multiplier(markup);
        Ok(SalePlan {
            high_season: high.season,
            season_median_price: high.median_price,
            markup,
            selling_price,
            profit: selling_price - exact_price,
        })
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PricingError {
    #[error("markup {0} is below 1.0; selling price would fall under purchase price")]
    MarkupBelowOne(Decimal),

    #[error("value {0} cannot be represented as a decimal")]
    Unrepresentable(f64),
}

/// When money figures are truncated to whole currency units.
///
/// The exact values on [`SalePlan`] are never modified; the policy only shapes
/// what is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingPolicy {
    /// Show exact decimals.
    Exact,
    /// Profit from exact values, then truncate each figure.
    #[default]
    TruncateAfterProfit,
    /// Truncate price and selling price, then subtract.
    TruncateBeforeProfit,
}

impl RoundingPolicy {
    pub const ALL: [RoundingPolicy; 3] = [
        RoundingPolicy::Exact,
        RoundingPolicy::TruncateAfterProfit,
        RoundingPolicy::TruncateBeforeProfit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoundingPolicy::Exact => "exact",
            RoundingPolicy::TruncateAfterProfit => "truncate_after_profit",
            RoundingPolicy::TruncateBeforeProfit => "truncate_before_profit",
        }
    }

    /// A single money figure as presented.
    pub fn display(&self, value: Decimal) -> Decimal {
        match self {
            RoundingPolicy::Exact => value.normalize(),
            RoundingPolicy::TruncateAfterProfit | RoundingPolicy::TruncateBeforeProfit => {
                value.trunc()
            }
        }
    }

    /// A purchase price as presented; non-finite prices show as zero.
    pub fn display_price(&self, price: f64) -> Decimal {
        self.display(Decimal::from_f64(price).unwrap_or_default())
    }

    pub fn apply(&self, price: f64, plan: &SalePlan) -> DisplayAmounts {
        let price = self.display_price(price);
        let selling_price = self.display(plan.selling_price);
        let profit = match self {
            RoundingPolicy::TruncateBeforeProfit => selling_price - price,
            _ => self.display(plan.profit),
        };
        DisplayAmounts {
            price,
            selling_price,
            profit,
        }
    }
}

impl std::fmt::Display for RoundingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoundingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown rounding policy '{s}' (expected one of: exact, truncate_after_profit, truncate_before_profit)"
                )
            })
    }
}

/// Money figures as presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayAmounts {
    pub price: Decimal,
    pub selling_price: Decimal,
    pub profit: Decimal,
}
