use super::period::Period;
use super::source::{PriceSource, PriceSourceError};
use super::table::PriceTable;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tokio::runtime::Runtime;
use yahoo_finance_api::{YahooConnector, YahooError};

const PROVIDER: &str = "Yahoo Finance";

/// Daily adjusted closes from Yahoo Finance.
///
/// - **Free**: No API key required.
/// - **Coverage**: Global equities, ETFs, indices, mutual funds.
///
/// The connector is async; this source owns a current-thread Tokio runtime
/// and blocks on each request so callers stay synchronous. Tickers are
/// fetched one after another and joined on their common dates.
pub struct YahooPriceSource {
    connector: YahooConnector,
    runtime: Runtime,
}

impl YahooPriceSource {
    pub fn new() -> Result<Self, PriceSourceError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| init_error(format!("Failed to create runtime: {e}")))?;

        // Create the connector within the runtime context
        let connector = runtime
            .block_on(async { YahooConnector::new() })
            .map_err(|e| init_error(format!("Failed to create connector: {e}")))?;

        Ok(Self { connector, runtime })
    }

    fn fetch_one(&self, ticker: &str, period: &Period) -> Result<Vec<(NaiveDate, f64)>, PriceSourceError> {
        let range = period.to_string();
        let result = self
            .runtime
            .block_on(self.connector.get_quote_range(ticker, "1d", &range))
            .and_then(|resp| resp.quotes())
            .map(|quotes| {
                quotes
                    .iter()
                    .filter_map(|q| Some((timestamp_to_naive_date(q.timestamp)?, q.adjclose)))
                    .collect()
            });

        series_or_empty(ticker, result)
    }
}

impl PriceSource for YahooPriceSource {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn fetch(&self, tickers: &[String], period: &Period) -> Result<PriceTable, PriceSourceError> {
        let mut series = BTreeMap::new();
        for ticker in tickers {
            let points = self.fetch_one(ticker, period)?;
            tracing::debug!(%ticker, %period, points = points.len(), "fetched price history");
            series.insert(ticker.clone(), points);
        }

        Ok(PriceTable::from_series(series))
    }
}

/// Convert a unix timestamp (seconds) to `chrono::NaiveDate`.
fn timestamp_to_naive_date(ts: i64) -> Option<NaiveDate> {
    chrono::DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive())
}

/// Yahoo answers an unknown or delisted ticker with `NoResult` or `NoQuotes`.
/// Those become an empty series: [`PriceTable::from_series`] drops the
/// column and the metrics report the ticker as missing data, while the
/// other tickers are still fetched.
fn series_or_empty(
    ticker: &str,
    result: Result<Vec<(NaiveDate, f64)>, YahooError>,
) -> Result<Vec<(NaiveDate, f64)>, PriceSourceError> {
    match result {
        Ok(points) => Ok(points),
        Err(YahooError::NoQuotes | YahooError::NoResult) => {
            tracing::warn!(%ticker, "no price history returned");
            Ok(Vec::new())
        }
        Err(e) => Err(request_error(ticker, format!("Failed to fetch price history: {e}"))),
    }
}

fn init_error(message: String) -> PriceSourceError {
    PriceSourceError::Init {
        provider: PROVIDER.into(),
        message,
    }
}

fn request_error(ticker: &str, message: String) -> PriceSourceError {
    PriceSourceError::Request {
        provider: PROVIDER.into(),
        ticker: ticker.to_string(),
        message,
    }
}
