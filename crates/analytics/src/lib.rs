//! # Folio Analytics
//!
//! The calculation core: a one-directional pipeline from raw prices to
//! portfolio statistics and a forward projection.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of external systems.
//!   It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** Every stage is a function of its inputs. Nothing is cached
//!   between calls, so concurrent callers need no coordination.
//!
//! ## Stages
//!
//! 1. [`weights`] - validates user rows and normalizes them to decimal weights.
//! 2. [`returns`] - turns a `PriceTable` into aligned simple returns.
//! 3. [`engine`] - annualized return/volatility, correlation, covariance and the
//!    portfolio quadratic form.
//! 4. [`forecast`] - deterministic monthly compounding with contributions.
//!
//! [`pipeline::analyze`] chains stages 1-3 and reports every excluded ticker.

pub mod engine;
pub mod error;
pub mod forecast;
pub mod pipeline;
pub mod report;
pub mod returns;
pub mod summary;
pub mod weights;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{StatisticsEngine, TRADING_DAYS_PER_YEAR};
pub use error::{AnalyticsError, AnalyticsResult};
pub use forecast::{ForecastPoint, ForecastSeries, forecast, monthly_rate};
pub use pipeline::{AnalysisOptions, Exclusion, ExclusionReason, PortfolioAnalysis, analyze};
pub use report::{AssetStats, LabeledMatrix, PortfolioStats};
pub use returns::{AssetReturns, MIN_OBSERVATIONS, ReturnSeries};
pub use summary::{PriceSummary, summarize_prices};
pub use weights::{NormalizedWeights, normalize};
