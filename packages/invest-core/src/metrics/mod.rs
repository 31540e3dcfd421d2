//! Portfolio metrics.
//!
//! Pure functions over a [`PriceTable`] and [`Holdings`]: total return,
//! allocation weights, rolling volatility contribution and IRR. Every guarded
//! precondition fails with a typed error instead of letting NaN or infinity
//! reach the output.

mod allocation;
mod irr;
mod returns;
mod volatility;

pub use allocation::allocation;
pub use irr::{irr, npv};
pub use returns::{pct_change, portfolio_value_series, total_return};
pub use volatility::{rolling_std, volatility_contribution, DEFAULT_VOLATILITY_WINDOW};

use crate::prices::PriceTable;
use crate::types::{Allocation, Holdings, VolatilityContribution};
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Everything the `metrics` command prints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Compounded return over the whole table
    pub total_return: f64,
    /// Weights at the latest row
    pub allocation: Allocation,
    /// Normalized rolling volatility contribution
    pub volatility_contribution: VolatilityContribution,
    /// Rolling window used for volatility
    pub window: usize,
    /// Date of the latest price row
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
}

impl MetricsReport {
    pub fn compute(prices: &PriceTable, holdings: &Holdings, window: usize) -> Result<Self> {
        Ok(Self {
            total_return: total_return(prices, holdings)?,
            allocation: allocation(prices, holdings)?,
            volatility_contribution: volatility_contribution(prices, holdings, window)?,
            window,
            as_of: prices.latest_date(),
        })
    }
}

/// Price column for a held ticker, or `MissingData` if the table lacks it.
fn held_column<'a>(prices: &'a PriceTable, ticker: &str) -> Result<&'a [f64]> {
    prices.column(ticker).ok_or_else(|| Error::MissingData {
        ticker: ticker.to_string(),
        detail: "no price column returned by the price source".to_string(),
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n)
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect()
    }

    pub fn table(columns: &[(&str, Vec<f64>)]) -> PriceTable {
        let n = columns.first().map(|(_, prices)| prices.len()).unwrap_or(0);
        PriceTable::from_columns(
            dates(n),
            columns
                .iter()
                .map(|(ticker, prices)| (ticker.to_string(), prices.clone())),
        )
        .unwrap()
    }

    pub fn holdings(entries: &[(&str, f64)]) -> Holdings {
        entries
            .iter()
            .map(|(ticker, qty)| (ticker.to_string(), *qty))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{holdings, table};
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_metrics_report() {
        let a: Vec<f64> = (0..10).map(|i| 100.0 + (i % 3) as f64).collect();
        let b: Vec<f64> = (0..10).map(|i| 50.0 + (i % 2) as f64 * 2.0).collect();
        let prices = table(&[("A", a), ("B", b)]);
        let held = holdings(&[("A", 1.0), ("B", 2.0)]);

        let report = MetricsReport::compute(&prices, &held, 5).unwrap();

        assert_eq!(report.window, 5);
        assert_eq!(report.as_of, prices.latest_date());
        assert_abs_diff_eq!(report.allocation.values().sum::<f64>(), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(
            report.volatility_contribution.values().sum::<f64>(),
            1.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_metrics_report_propagates_first_failure() {
        let prices = table(&[("A", vec![100.0])]);
        let held = holdings(&[("A", 1.0)]);

        let result = MetricsReport::compute(&prices, &held, 30);
        assert!(matches!(result, Err(Error::Computation(_))));
    }
}
