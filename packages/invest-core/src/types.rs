//! Core data types shared across the tracker.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Held quantity per ticker symbol.
///
/// Tickers are case-sensitive and kept in sorted order so the persisted file
/// and every printed listing come out the same way each run. Quantities may be
/// fractional; zero and negative values are accepted as-is.
pub type Holdings = BTreeMap<String, f64>;

/// Fraction of total portfolio value per ticker.
pub type Allocation = BTreeMap<String, f64>;

/// Normalized share of weighted rolling volatility per ticker.
pub type VolatilityContribution = BTreeMap<String, f64>;

/// JSON envelope for machine-readable command output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
