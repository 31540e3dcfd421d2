//! Lookback periods understood by price sources.

use super::source::PriceSourceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How far back to fetch prices, e.g. `1y`, `6mo`, `5d`, `ytd`, `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Period {
    Days(u32),
    Months(u32),
    Years(u32),
    YearToDate,
    Max,
}

impl Default for Period {
    fn default() -> Self {
        Period::Years(1)
    }
}

impl FromStr for Period {
    type Err = PriceSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "ytd" => return Ok(Period::YearToDate),
            "max" => return Ok(Period::Max),
            _ => {}
        }

        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| PriceSourceError::InvalidPeriod(s.clone()))?;
        let (count, unit) = s.split_at(split);
        let count: u32 = count
            .parse()
            .map_err(|_| PriceSourceError::InvalidPeriod(s.clone()))?;
        if count == 0 {
            return Err(PriceSourceError::InvalidPeriod(s));
        }

        match unit {
            "d" => Ok(Period::Days(count)),
            "mo" => Ok(Period::Months(count)),
            "y" => Ok(Period::Years(count)),
            _ => Err(PriceSourceError::InvalidPeriod(s)),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Days(n) => write!(f, "{n}d"),
            Period::Months(n) => write!(f, "{n}mo"),
            Period::Years(n) => write!(f, "{n}y"),
            Period::YearToDate => f.write_str("ytd"),
            Period::Max => f.write_str("max"),
        }
    }
}

impl TryFrom<String> for Period {
    type Error = PriceSourceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}
