//! Runtime configuration from environment variables.
//!
//! | Variable                   | Meaning                          | Default                            |
//! |----------------------------|----------------------------------|------------------------------------|
//! | `INVEST_HOLDINGS_FILE`     | holdings JSON path               | `~/.invest/holdings.json`          |
//! | `INVEST_DEFAULT_PERIOD`    | price lookback                   | `1y`                               |
//! | `INVEST_VOL_WINDOW`        | rolling volatility window        | `30`                               |
//! | `OPENAI_API_KEY`           | enables the OpenAI agent         | unset                              |
//! | `OPENAI_BASE_URL`          | OpenAI-compatible base URL       | rig's OpenAI default               |
//! | `INVEST_OPENAI_MODEL`      | chat model                       | `gpt-4o-mini`                      |
//! | `HUGGINGFACEHUB_API_TOKEN` | enables the Hugging Face agent   | unset                              |
//! | `INVEST_HF_BASE_URL`       | Hugging Face base URL            | rig's Hugging Face default         |
//! | `INVEST_HF_MODEL`          | chat model                       | `meta-llama/Llama-3.1-8B-Instruct` |
//!
//! Blank values count as unset.

use crate::chat::ResponderConfig;
use crate::holdings::HoldingsStore;
use crate::metrics::DEFAULT_VOLATILITY_WINDOW;
use crate::prices::Period;
use crate::{Error, Result};
use std::env;
use std::path::PathBuf;

/// Tickers suggested when no holdings exist yet.
pub const DEFAULT_TICKERS: [&str; 3] = ["AAPL", "MSFT", "GOOG"];

#[derive(Debug, Clone)]
pub struct Config {
    pub holdings_path: PathBuf,
    pub default_period: Period,
    pub volatility_window: usize,
    pub responder: ResponderConfig,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| non_blank(lookup(key));

        let holdings_path = var("INVEST_HOLDINGS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(HoldingsStore::default_path);

        let default_period = match var("INVEST_DEFAULT_PERIOD") {
            Some(raw) => raw
                .parse()
                .map_err(|e| Error::InvalidInput(format!("INVEST_DEFAULT_PERIOD: {e}")))?,
            None => Period::default(),
        };

        let volatility_window = match var("INVEST_VOL_WINDOW") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                Error::InvalidInput(format!("INVEST_VOL_WINDOW must be a whole number, got {raw:?}"))
            })?,
            None => DEFAULT_VOLATILITY_WINDOW,
        };

        Ok(Self {
            holdings_path,
            default_period,
            volatility_window,
            responder: ResponderConfig::from_lookup(var),
        })
    }

    pub fn holdings_store(&self) -> HoldingsStore {
        HoldingsStore::with_path(&self.holdings_path)
    }
}

/// Treat empty and whitespace-only values as unset.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.holdings_path, HoldingsStore::default_path());
        assert_eq!(config.default_period, Period::Years(1));
        assert_eq!(config.volatility_window, 30);
        assert!(config.responder.openai_api_key.is_none());
        assert!(config.responder.huggingface_token.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("INVEST_HOLDINGS_FILE", "/tmp/h.json"),
            ("INVEST_DEFAULT_PERIOD", "6mo"),
            ("INVEST_VOL_WINDOW", "20"),
            ("OPENAI_API_KEY", "sk-test"),
        ])
        .unwrap();

        assert_eq!(config.holdings_path, PathBuf::from("/tmp/h.json"));
        assert_eq!(config.holdings_store().path(), PathBuf::from("/tmp/h.json"));
        assert_eq!(config.default_period, Period::Months(6));
        assert_eq!(config.volatility_window, 20);
        assert_eq!(config.responder.openai_api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = config_from(&[
            ("INVEST_HOLDINGS_FILE", "   "),
            ("INVEST_DEFAULT_PERIOD", ""),
            ("OPENAI_API_KEY", " "),
        ])
        .unwrap();

        assert_eq!(config.holdings_path, HoldingsStore::default_path());
        assert_eq!(config.default_period, Period::default());
        assert!(config.responder.openai_api_key.is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config_from(&[("INVEST_DEFAULT_PERIOD", "forever")]),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            config_from(&[("INVEST_VOL_WINDOW", "thirty")]),
            Err(Error::InvalidInput(_))
        ));
    }
}
