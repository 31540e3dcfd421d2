//! Rolling volatility contribution.

use super::allocation::allocation;
use super::held_column;
use super::returns::pct_change;
use crate::prices::PriceTable;
use crate::types::{Holdings, VolatilityContribution};
use crate::{Error, Result};

/// Default rolling window, in periods.
pub const DEFAULT_VOLATILITY_WINDOW: usize = 30;

/// Sample standard deviation over each full window.
///
/// Uses the `n - 1` denominator. Returns `values.len() - window + 1` values,
/// the first covering `values[..window]`. Windows shorter than 2 or longer
/// than the input give an empty vector.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    if window < 2 || window > values.len() {
        return Vec::new();
    }

    values
        .windows(window)
        .map(|w| {
            let n = w.len() as f64;
            let mean = w.iter().sum::<f64>() / n;
            let variance = w.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
            variance.sqrt()
        })
        .collect()
}

/// Share of portfolio volatility attributable to each holding.
///
/// For every held ticker: the latest rolling standard deviation of its period
/// returns over `window` periods, times its current allocation weight. The
/// products are then normalized to sum to 1.0.
///
/// # Errors
///
/// - `InsufficientData` with fewer than `window + 1` price rows
/// - `Computation` if `window < 2`, a volatility is not finite, or every
///   contribution is zero
/// - anything [`allocation`] returns
pub fn volatility_contribution(
    prices: &PriceTable,
    holdings: &Holdings,
    window: usize,
) -> Result<VolatilityContribution> {
    if window < 2 {
        return Err(Error::Computation(format!(
            "rolling window must be at least 2 periods, got {window}"
        )));
    }

    let required = window + 1;
    if prices.len() < required {
        return Err(Error::InsufficientData {
            required,
            available: prices.len(),
        });
    }

    let weights = allocation(prices, holdings)?;

    let mut contributions = VolatilityContribution::new();
    for (ticker, weight) in weights {
        let returns = pct_change(held_column(prices, &ticker)?);
        let latest = rolling_std(&returns, window)
            .last()
            .copied()
            .ok_or(Error::InsufficientData {
                required,
                available: prices.len(),
            })?;
        if !latest.is_finite() {
            return Err(Error::Computation(format!(
                "rolling volatility for {ticker} is not finite (zero price in window?)"
            )));
        }
        contributions.insert(ticker, weight * latest);
    }

    let sum: f64 = contributions.values().sum();
    if sum == 0.0 {
        return Err(Error::Computation(
            "weighted volatility sums to zero, contribution is undefined".to_string(),
        ));
    }

    Ok(contributions
        .into_iter()
        .map(|(ticker, c)| (ticker, c / sum))
        .collect())
}
