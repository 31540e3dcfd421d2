use super::period::Period;
use super::table::PriceTable;

/// Failures at the price-source boundary.
#[derive(Debug, thiserror::Error)]
pub enum PriceSourceError {
    #[error("Invalid period: {0:?}")]
    InvalidPeriod(String),

    #[error("Failed to initialize {provider}: {message}")]
    Init { provider: String, message: String },

    #[error("{provider} request for {ticker} failed: {message}")]
    Request {
        provider: String,
        ticker: String,
        message: String,
    },
}

/// Anything that can produce historical closing prices.
///
/// Implementations block until the table is ready. Columns are a subset of
/// the requested tickers; a ticker the source knows nothing about is simply
/// absent, and the metrics engine reports it as missing data.
pub trait PriceSource: Send + Sync {
    /// Human-readable name of this source (for logs/errors).
    fn name(&self) -> &str;

    /// Closing prices for `tickers` over the lookback `period`.
    fn fetch(&self, tickers: &[String], period: &Period) -> Result<PriceTable, PriceSourceError>;
}

/// Serves a fixed in-memory table.
///
/// The period is ignored; the whole table is returned, restricted to the
/// requested tickers.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceSource {
    table: PriceTable,
}

impl StaticPriceSource {
    pub fn new(table: PriceTable) -> Self {
        Self { table }
    }
}

impl PriceSource for StaticPriceSource {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch(&self, tickers: &[String], _period: &Period) -> Result<PriceTable, PriceSourceError> {
        Ok(self.table.select(tickers))
    }
}
