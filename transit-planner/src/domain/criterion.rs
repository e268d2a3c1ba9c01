//! Optimization criteria.

use std::fmt;
use std::str::FromStr;

/// The objective a search minimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Criterion {
    /// Total elapsed seconds from the reference time to arrival.
    #[default]
    Time,
    /// Number of line changes, weighted by the transfer penalty.
    Changes,
}

/// Error returned when parsing an unknown criterion name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown criterion {0:?}: expected \"time\" or \"changes\"")]
pub struct InvalidCriterion(String);

impl FromStr for Criterion {
    type Err = InvalidCriterion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "t" | "time" => Ok(Criterion::Time),
            "p" | "changes" | "transfers" => Ok(Criterion::Changes),
            _ => Err(InvalidCriterion(s.to_string())),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::Time => f.write_str("time"),
            Criterion::Changes => f.write_str("changes"),
        }
    }
}
