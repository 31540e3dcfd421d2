//! Invest Core - personal investment tracking library.
//!
//! This crate provides the pieces behind the `invest` command line tool:
//!
//! - **Holdings store**: ticker → quantity snapshot persisted as JSON
//! - **Price sources**: historical closing prices as a date-indexed table
//! - **Metrics**: total return, allocation, volatility contribution, IRR
//! - **Chat routing**: deterministic IRR answers with an LLM agent fallback
//! - **Rendering**: terminal charts for portfolio value and allocation
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use invest_core::{metrics, Holdings, PriceTable};
//!
//! let dates = vec![
//!     NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
//! ];
//! let prices = PriceTable::from_columns(dates, [("AAPL".to_string(), vec![100.0, 110.0])]).unwrap();
//!
//! let mut holdings = Holdings::new();
//! holdings.insert("AAPL".to_string(), 1.0);
//!
//! let ret = metrics::total_return(&prices, &holdings).unwrap();
//! assert!((ret - 0.10).abs() < 1e-9);
//! ```

pub mod chat;
pub mod config;
pub mod holdings;
pub mod metrics;
pub mod prices;
pub mod render;
pub mod types;

// Re-export commonly used types
pub use types::{Allocation, ApiResponse, Holdings, VolatilityContribution};

// Re-export main functionality
pub use chat::{
    build_responder, ChatReply, PortfolioTools, QueryResponder, QueryRouter, ResponderConfig,
    ResponderError, StubResponder,
};
pub use config::Config;
pub use holdings::HoldingsStore;
pub use metrics::{
    allocation, irr, npv, total_return, volatility_contribution, MetricsReport,
    DEFAULT_VOLATILITY_WINDOW,
};
pub use prices::{Period, PriceSource, PriceSourceError, PriceTable, StaticPriceSource, YahooPriceSource};
pub use render::{RenderError, Renderer, TextRenderer};

/// Error types for invest-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Persisted holdings exist but are not a flat ticker → number object.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A held ticker has no column in the price table.
    #[error("Missing price data for {ticker}: {detail}")]
    MissingData { ticker: String, detail: String },

    /// A guarded arithmetic precondition failed.
    #[error("Computation error: {0}")]
    Computation(String),

    #[error("Insufficient data: need at least {required} price rows, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("No solution: {0}")]
    NoSolution(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    PriceSource(#[from] PriceSourceError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Result type for invest-core operations.
pub type Result<T> = std::result::Result<T, Error>;
