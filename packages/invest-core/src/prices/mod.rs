//! Historical price data.
//!
//! Provides the [`PriceTable`] the metrics engine works on and the
//! [`PriceSource`] trait that produces it.

mod period;
mod source;
mod table;
mod yahoo;

pub use period::Period;
pub use source::{PriceSource, PriceSourceError, StaticPriceSource};
pub use table::PriceTable;
pub use yahoo::YahooPriceSource;
