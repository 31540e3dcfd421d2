//! Portfolio tools exposed to the chat agents.
//!
//! Each tool takes plain string arguments and returns a human-readable
//! string. The agents see failures as `"Error: ..."` text (see
//! [`tool_text`]) so a model can read them and recover instead of aborting
//! the conversation.

use crate::holdings::HoldingsStore;
use crate::metrics;
use crate::prices::{Period, PriceSource, PriceTable};
use crate::render::percent;
use crate::types::Holdings;
use crate::{Error, Result};
use std::sync::Arc;

pub(crate) const DEFAULT_RETURN_PERIOD: &str = "1y";
pub(crate) const DEFAULT_EXPOSURE_PERIOD: &str = "1d";

/// Tool implementations bound to a holdings store and a price source.
#[derive(Clone)]
pub struct PortfolioTools {
    store: HoldingsStore,
    prices: Arc<dyn PriceSource>,
}

impl PortfolioTools {
    pub fn new(store: HoldingsStore, prices: Arc<dyn PriceSource>) -> Self {
        Self { store, prices }
    }

    /// `"Total return over 1y: 12.34%"`
    pub fn total_return(&self, period: &str) -> Result<String> {
        let (holdings, prices) = self.load(period)?;
        let value = metrics::total_return(&prices, &holdings)?;
        Ok(format!("Total return over {period}: {}", percent(value, 2)))
    }

    /// `"IRR: 12.34%"` for comma-separated cash flows.
    pub fn irr(&self, cash_flows: &str) -> Result<String> {
        let flows = parse_cash_flows(cash_flows)?;
        let rate = metrics::irr(&flows)?;
        Ok(format_irr(rate))
    }

    /// `"Exposure: AAPL: 50.0%, MSFT: 50.0%"`
    pub fn exposure(&self, period: &str) -> Result<String> {
        let (holdings, prices) = self.load(period)?;
        let weights = metrics::allocation(&prices, &holdings)?;
        let parts: Vec<String> = weights
            .iter()
            .map(|(ticker, weight)| format!("{ticker}: {}", percent(*weight, 1)))
            .collect();
        Ok(format!("Exposure: {}", parts.join(", ")))
    }

    fn load(&self, period: &str) -> Result<(Holdings, PriceTable)> {
        let period: Period = period.parse()?;
        let holdings = self.store.load()?;
        if holdings.is_empty() {
            return Err(Error::Computation("no holdings recorded".to_string()));
        }

        let tickers: Vec<String> = holdings.keys().cloned().collect();
        let prices = self.prices.fetch(&tickers, &period)?;
        Ok((holdings, prices))
    }
}

/// `"IRR: 12.34%"`
pub fn format_irr(rate: f64) -> String {
    format!("IRR: {}", percent(rate, 2))
}

fn parse_cash_flows(raw: &str) -> Result<Vec<f64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<f64>()
                .map_err(|_| Error::InvalidInput(format!("cash flow {part:?} is not a number")))
        })
        .collect()
}

/// Tool result as the text an agent reads. Never fails; errors become text.
pub(crate) fn tool_text(tool: &str, result: Result<String>) -> String {
    result.unwrap_or_else(|e| {
        tracing::debug!(tool, error = %e, "tool call failed");
        format!("Error: {e}")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prices::StaticPriceSource;
    use tempfile::TempDir;

    fn tools_with(entries: &[(&str, f64)]) -> (TempDir, PortfolioTools) {
        let dir = TempDir::new().unwrap();
        let store = HoldingsStore::with_path(dir.path().join("holdings.json"));
        for (ticker, qty) in entries {
            store.update(ticker, *qty).unwrap();
        }

        let dates = metrics::fixtures::dates(3);
        let table = PriceTable::from_columns(
            dates,
            [
                ("AAPL".to_string(), vec![100.0, 105.0, 110.0]),
                ("MSFT".to_string(), vec![200.0, 200.0, 220.0]),
            ],
        )
        .unwrap();

        let tools = PortfolioTools::new(store, Arc::new(StaticPriceSource::new(table)));
        (dir, tools)
    }

    #[test]
    fn test_total_return_text() {
        let (_dir, tools) = tools_with(&[("AAPL", 1.0)]);
        assert_eq!(tools.total_return("1y").unwrap(), "Total return over 1y: 10.00%");
    }

    #[test]
    fn test_exposure_text() {
        let (_dir, tools) = tools_with(&[("AAPL", 2.0), ("MSFT", 1.0)]);
        assert_eq!(tools.exposure("1d").unwrap(), "Exposure: AAPL: 50.0%, MSFT: 50.0%");
    }

    #[test]
    fn test_irr_text() {
        let (_dir, tools) = tools_with(&[]);
        assert_eq!(tools.irr("-100, 110").unwrap(), "IRR: 10.00%");
        assert!(matches!(tools.irr("-100, abc"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_errors_become_text() {
        let (_dir, tools) = tools_with(&[]);

        let reply = tool_text("total_return", tools.total_return(DEFAULT_RETURN_PERIOD));
        assert_eq!(reply, "Error: Computation error: no holdings recorded");
        assert!(tool_text("total_return", tools.total_return("soon")).starts_with("Error: "));
        assert_eq!(tool_text("irr", Ok("IRR: 10.00%".to_string())), "IRR: 10.00%");
    }

    #[test]
    fn test_missing_price_column_is_reported() {
        let (_dir, tools) = tools_with(&[("NVDA", 1.0)]);
        let reply = tool_text("exposure", tools.exposure(DEFAULT_EXPOSURE_PERIOD));

        assert!(reply.starts_with("Error: "));
        assert!(reply.contains("NVDA"));
    }
}
