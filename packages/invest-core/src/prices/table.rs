//! Date-indexed closing price table.

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Closing prices with one row per trading date and one column per ticker.
///
/// Dates are strictly ascending but need not be evenly spaced. Every column
/// holds exactly one price per row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    columns: BTreeMap<String, Vec<f64>>,
}

impl PriceTable {
    /// Build a table from row dates and per-ticker columns.
    ///
    /// Fails if the dates are not strictly ascending or a column length does
    /// not match the number of dates.
    pub fn from_columns<I>(dates: Vec<NaiveDate>, columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Vec<f64>)>,
    {
        if let Some(pair) = dates.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(Error::InvalidInput(format!(
                "price dates must be strictly ascending ({} is followed by {})",
                pair[0], pair[1]
            )));
        }

        let mut table = Self {
            dates,
            columns: BTreeMap::new(),
        };
        for (ticker, prices) in columns {
            if prices.len() != table.dates.len() {
                return Err(Error::InvalidInput(format!(
                    "column {ticker} has {} prices for {} dates",
                    prices.len(),
                    table.dates.len()
                )));
            }
            table.columns.insert(ticker, prices);
        }

        Ok(table)
    }

    /// Join per-ticker price histories on their common dates.
    ///
    /// Only dates quoted for every ticker become rows, so markets with
    /// different holidays still line up. Tickers with an empty history are
    /// left out entirely. When a history repeats a date the last price wins.
    pub fn from_series(series: BTreeMap<String, Vec<(NaiveDate, f64)>>) -> Self {
        let by_date: BTreeMap<String, BTreeMap<NaiveDate, f64>> = series
            .into_iter()
            .filter(|(_, points)| !points.is_empty())
            .map(|(ticker, points)| (ticker, points.into_iter().collect()))
            .collect();

        let mut common: Option<BTreeSet<NaiveDate>> = None;
        for points in by_date.values() {
            let dates: BTreeSet<NaiveDate> = points.keys().copied().collect();
            common = Some(match common {
                Some(acc) => acc.intersection(&dates).copied().collect(),
                None => dates,
            });
        }
        let dates: Vec<NaiveDate> = common.unwrap_or_default().into_iter().collect();

        let columns = by_date
            .into_iter()
            .map(|(ticker, points)| {
                let prices = dates.iter().map(|date| points[date]).collect();
                (ticker, prices)
            })
            .collect();

        Self { dates, columns }
    }

    /// Row dates, oldest first.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Ticker columns in sorted order.
    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Prices for one ticker, oldest first.
    pub fn column(&self, ticker: &str) -> Option<&[f64]> {
        self.columns.get(ticker).map(Vec::as_slice)
    }

    /// Date of the most recent row.
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Copy of the table restricted to the given tickers.
    ///
    /// Tickers without a column are skipped.
    pub fn select(&self, tickers: &[String]) -> Self {
        let columns = tickers
            .iter()
            .filter_map(|ticker| {
                self.columns
                    .get(ticker)
                    .map(|prices| (ticker.clone(), prices.clone()))
            })
            .collect();

        Self {
            dates: self.dates.clone(),
            columns,
        }
    }
}
