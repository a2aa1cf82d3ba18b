//! Derived categorical fields.
//!
//! Every category is a closed enum whose serde name and [`Category::label`] are
//! the exact labels the dashboard groups by ("no basement", "up to 2", ...).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A closed set of labelled values.
pub trait Category: Copy + Ord + 'static {
    /// All variants, in label order.
    const ALL: &'static [Self];

    fn label(&self) -> &'static str;
}

macro_rules! impl_display_via_label {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.label())
                }
            }
        )+
    };
}

/// Sale season. Declaration order is alphabetical, so `Ord` matches label order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Season {
    Fall,
    Spring,
    Summer,
    Winter,
}

impl Season {
    /// Season of a calendar month (1–12). `None` for anything else.
    pub fn from_month(month: u32) -> Option<Self> {
        match month {
            6..=8 => Some(Season::Summer),
            9..=11 => Some(Season::Fall),
            12 | 1 | 2 => Some(Season::Winter),
            3..=5 => Some(Season::Spring),
            _ => None,
        }
    }
}

impl Category for Season {
    const ALL: &'static [Self] = &[Season::Fall, Season::Spring, Season::Summer, Season::Winter];

    fn label(&self) -> &'static str {
        match self {
            Season::Fall => "Fall",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Winter => "Winter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaterfrontOption {
    No,
    Yes,
}

impl Category for WaterfrontOption {
    const ALL: &'static [Self] = &[WaterfrontOption::No, WaterfrontOption::Yes];

    fn label(&self) -> &'static str {
        match self {
            WaterfrontOption::No => "no",
            WaterfrontOption::Yes => "yes",
        }
    }
}

/// Before/after split used both for construction year (1955) and renovation
/// year (2010).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    After,
    Before,
}

impl Period {
    pub fn split(year: i32, threshold: i32) -> Self {
        if year < threshold {
            Period::Before
        } else {
            Period::After
        }
    }
}

impl Category for Period {
    const ALL: &'static [Self] = &[Period::After, Period::Before];

    fn label(&self) -> &'static str {
        match self {
            Period::After => "after",
            Period::Before => "before",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BasementOption {
    #[serde(rename = "basement")]
    Basement,
    #[serde(rename = "no basement")]
    NoBasement,
}

impl Category for BasementOption {
    const ALL: &'static [Self] = &[BasementOption::Basement, BasementOption::NoBasement];

    fn label(&self) -> &'static str {
        match self {
            BasementOption::Basement => "basement",
            BasementOption::NoBasement => "no basement",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FloorOption {
    #[serde(rename = "ground floor")]
    GroundFloor,
    #[serde(rename = "more floors")]
    MoreFloors,
}

impl Category for FloorOption {
    const ALL: &'static [Self] = &[FloorOption::GroundFloor, FloorOption::MoreFloors];

    fn label(&self) -> &'static str {
        match self {
            FloorOption::GroundFloor => "ground floor",
            FloorOption::MoreFloors => "more floors",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RenovationStatus {
    #[serde(rename = "not renovated")]
    NotRenovated,
    #[serde(rename = "renovated")]
    Renovated,
}

impl Category for RenovationStatus {
    const ALL: &'static [Self] = &[RenovationStatus::NotRenovated, RenovationStatus::Renovated];

    fn label(&self) -> &'static str {
        match self {
            RenovationStatus::NotRenovated => "not renovated",
            RenovationStatus::Renovated => "renovated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionType {
    Bad,
    Good,
}

impl Category for ConditionType {
    const ALL: &'static [Self] = &[ConditionType::Bad, ConditionType::Good];

    fn label(&self) -> &'static str {
        match self {
            ConditionType::Bad => "bad",
            ConditionType::Good => "good",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BedroomsAmount {
    #[serde(rename = "more than 2")]
    MoreThanTwo,
    #[serde(rename = "up to 2")]
    UpToTwo,
}

impl Category for BedroomsAmount {
    const ALL: &'static [Self] = &[BedroomsAmount::MoreThanTwo, BedroomsAmount::UpToTwo];

    fn label(&self) -> &'static str {
        match self {
            BedroomsAmount::MoreThanTwo => "more than 2",
            BedroomsAmount::UpToTwo => "up to 2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BathroomsAmount {
    #[serde(rename = "more than 1")]
    MoreThanOne,
    #[serde(rename = "up to 1")]
    UpToOne,
}

impl Category for BathroomsAmount {
    const ALL: &'static [Self] = &[BathroomsAmount::MoreThanOne, BathroomsAmount::UpToOne];

    fn label(&self) -> &'static str {
        match self {
            BathroomsAmount::MoreThanOne => "more than 1",
            BathroomsAmount::UpToOne => "up to 1",
        }
    }
}

impl_display_via_label!(
    Season,
    WaterfrontOption,
    Period,
    BasementOption,
    FloorOption,
    RenovationStatus,
    ConditionType,
    BedroomsAmount,
    BathroomsAmount,
);

/// All fields derived from a single [`Listing`](super::Listing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Features {
    pub price_m2: f64,
    pub waterfront_option: WaterfrontOption,
    pub is_before_1955: Period,
    pub basement_option: BasementOption,
    pub year: i32,
    /// `YYYY-MM`
    pub month_year: String,
    pub is_floor: FloorOption,
    pub month: u32,
    pub season: Season,
    pub is_renovated: RenovationStatus,
    pub renovated_2010: Period,
    pub condition_type: ConditionType,
    pub bedrooms_amount: BedroomsAmount,
    pub bathrooms_amount: BathroomsAmount,
}
