//! Portfolio value series and compounded return.

use super::held_column;
use crate::prices::PriceTable;
use crate::types::Holdings;
use crate::{Error, Result};
use chrono::NaiveDate;

/// Period-over-period percentage change.
///
/// Returns `values.len() - 1` changes; an empty or single-value input gives
/// an empty vector. A zero previous value yields an infinite or NaN change,
/// callers that need finite output guard for it.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// Total portfolio value per date: Σ price × quantity over held tickers.
pub fn portfolio_value_series(prices: &PriceTable, holdings: &Holdings) -> Result<Vec<(NaiveDate, f64)>> {
    let mut values = vec![0.0; prices.len()];
    for (ticker, quantity) in holdings {
        let column = held_column(prices, ticker)?;
        for (value, price) in values.iter_mut().zip(column) {
            *value += price * quantity;
        }
    }

    Ok(prices.dates().iter().copied().zip(values).collect())
}

/// Compounded return of the portfolio value series.
///
/// Chains `(1 + change)` over every period and subtracts one, so prices
/// `[100, 110]` with quantity 1 give `0.10`.
///
/// # Errors
///
/// - `MissingData` if a held ticker has no price column
/// - `Computation` with fewer than 2 price rows, no holdings, or a zero
///   portfolio value on any date but the last
pub fn total_return(prices: &PriceTable, holdings: &Holdings) -> Result<f64> {
    if holdings.is_empty() {
        return Err(Error::Computation("no holdings to compute a return for".to_string()));
    }

    let series = portfolio_value_series(prices, holdings)?;
    if series.len() < 2 {
        return Err(Error::Computation(format!(
            "total return needs at least 2 price rows, have {}",
            series.len()
        )));
    }

    if let Some((date, _)) = series[..series.len() - 1].iter().find(|(_, v)| *v == 0.0) {
        return Err(Error::Computation(format!("portfolio value is zero on {date}")));
    }

    let values: Vec<f64> = series.iter().map(|(_, v)| *v).collect();
    let cumulative = pct_change(&values)
        .into_iter()
        .fold(1.0, |acc, change| acc * (1.0 + change));

    Ok(cumulative - 1.0)
}
