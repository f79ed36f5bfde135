//! # Folio Core Types
//!
//! Layer 0 of the workspace: the vocabulary every other crate speaks.
//! Tickers, price bars, the date-ordered `PriceTable` and the user-entered
//! `PortfolioEntry` rows live here, together with the small enums that select
//! calculation policies.
//!
//! This crate performs no I/O and holds no state.

pub mod enums;
pub mod error;
pub mod structs;
pub mod table;

// Re-export the core types to provide a clean public API.
pub use enums::{AnnualizationPolicy, DuplicatePolicy, PriceWindow};
pub use error::CoreError;
pub use structs::{PortfolioEntry, PriceBar, Ticker};
pub use table::PriceTable;

/// Longest forecast horizon accepted anywhere in the workspace, in years.
pub const MAX_HORIZON_YEARS: u32 = 100;
