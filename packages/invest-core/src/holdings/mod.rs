//! Holdings persistence.
//!
//! Holdings are a flat JSON object mapping ticker to quantity. Every mutation
//! is a full load-modify-save cycle against the file.

mod store;

pub use store::HoldingsStore;
