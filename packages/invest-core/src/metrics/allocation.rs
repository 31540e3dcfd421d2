use super::held_column;
use crate::prices::PriceTable;
use crate::types::{Allocation, Holdings};
use crate::{Error, Result};

/// Weight of each holding in total portfolio value at the latest price row.
///
/// Weights sum to 1.0 whenever the total is non-zero. A total of exactly zero
/// (all prices zero, all quantities zero, or no holdings) is a `Computation`
/// error rather than a map of NaN.
pub fn allocation(prices: &PriceTable, holdings: &Holdings) -> Result<Allocation> {
    let mut values = Allocation::new();
    for (ticker, quantity) in holdings {
        let column = held_column(prices, ticker)?;
        let latest = column
            .last()
            .ok_or_else(|| Error::Computation("price table has no rows".to_string()))?;
        values.insert(ticker.clone(), latest * quantity);
    }

    let total: f64 = values.values().sum();
    if total == 0.0 {
        return Err(Error::Computation(
            "total portfolio value is zero, allocation is undefined".to_string(),
        ));
    }

    Ok(values
        .into_iter()
        .map(|(ticker, value)| (ticker, value / total))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{holdings, table};
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_allocation_equal_values() {
        let prices = table(&[("A", vec![100.0]), ("B", vec![50.0])]);
        let held = holdings(&[("A", 1.0), ("B", 2.0)]);

        let weights = allocation(&prices, &held).unwrap();

        assert_abs_diff_eq!(weights["A"], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(weights["B"], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_allocation_uses_latest_row() {
        let prices = table(&[("A", vec![1.0, 30.0]), ("B", vec![99.0, 10.0])]);
        let held = holdings(&[("A", 1.0), ("B", 1.0)]);

        let weights = allocation(&prices, &held).unwrap();

        assert_abs_diff_eq!(weights["A"], 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(weights["B"], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_allocation_sums_to_one() {
        let prices = table(&[
            ("A", vec![187.3]),
            ("B", vec![412.9]),
            ("C", vec![0.37]),
            ("D", vec![61.02]),
        ]);
        let held = holdings(&[("A", 3.0), ("B", 0.75), ("C", 1200.0), ("D", 7.5)]);

        let weights = allocation(&prices, &held).unwrap();

        assert_eq!(weights.len(), 4);
        assert_abs_diff_eq!(weights.values().sum::<f64>(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_allocation_ignores_unheld_columns() {
        let prices = table(&[("A", vec![10.0]), ("B", vec![10.0])]);
        let held = holdings(&[("A", 1.0)]);

        let weights = allocation(&prices, &held).unwrap();

        assert_eq!(weights.len(), 1);
        assert_abs_diff_eq!(weights["A"], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_allocation_zero_total() {
        let prices = table(&[("A", vec![0.0]), ("B", vec![0.0])]);
        let held = holdings(&[("A", 1.0), ("B", 2.0)]);

        assert!(matches!(allocation(&prices, &held), Err(Error::Computation(_))));
        assert!(matches!(
            allocation(&prices, &Holdings::new()),
            Err(Error::Computation(_))
        ));
    }

    #[test]
    fn test_allocation_missing_ticker() {
        let prices = table(&[("A", vec![10.0])]);
        let held = holdings(&[("A", 1.0), ("Z", 1.0)]);

        assert!(matches!(
            allocation(&prices, &held),
            Err(Error::MissingData { .. })
        ));
    }

    #[test]
    fn test_allocation_empty_table() {
        let prices = table(&[("A", vec![])]);
        let held = holdings(&[("A", 1.0)]);

        assert!(matches!(allocation(&prices, &held), Err(Error::Computation(_))));
    }
}
