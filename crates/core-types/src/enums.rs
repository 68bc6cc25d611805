use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Direction of a sort pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Returns the opposite direction.
    pub fn reversed(&self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    /// Applies this direction to an ascending comparison result.
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Publication window relative to a reference day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum TimeRange {
    #[default]
    All,
    /// Published on the reference day itself.
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl TimeRange {
    /// Maximum age in days, `None` for an unbounded range.
    pub fn days(&self) -> Option<i64> {
        match self {
            TimeRange::All => None,
            TimeRange::Day => Some(0),
            TimeRange::Week => Some(7),
            TimeRange::Month => Some(30),
            TimeRange::Quarter => Some(90),
            TimeRange::Year => Some(365),
        }
    }
}

/// String ordering used when sorting text fields.
///
/// Both variants are total orders, so sorting with either is deterministic:
///
/// - `CodePoint` compares Unicode scalar values, case-sensitive. `"Beta" < "alpha"`.
/// - `CaseInsensitive` compares the lowercase forms and falls back to code point
///   order when those are equal, so `"alpha" < "Beta"` and `"Alpha" < "alpha"`.
///   A browser's `localeCompare` breaks that last tie the other way round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Collation {
    #[default]
    CodePoint,
    CaseInsensitive,
}

impl Collation {
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match self {
            Collation::CodePoint => a.cmp(b),
            Collation::CaseInsensitive => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
        }
    }
}
