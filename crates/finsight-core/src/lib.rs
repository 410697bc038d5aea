#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/finsight-rs/finsight/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits, types and reshaping logic for company fundamentals.
//!
//! - [`normalize`] - Allow-list raw records into [`TickerRecord`]s
//! - [`merge`] - Outer-join statements on period end into [`MergedRow`]s
//! - [`join`] - Nearest-date join of shares outstanding and close prices
//! - [`scale`] - Magnitude scaling for chart axes
//! - [`frame`] - polars export of merged rows
//! - [`provider`] - Traits implemented by upstream data providers

/// Error types for data operations.
pub mod error;
/// polars export of merged fundamentals.
pub mod frame;
/// Nearest-date join and price series.
pub mod join;
/// Date-keyed statement merging.
pub mod merge;
/// Raw record normalization.
pub mod normalize;
/// Cadence, statement kind and history depth definitions.
pub mod period;
/// Provider traits for fetching company data.
pub mod provider;
/// Magnitude scaling.
pub mod scale;
/// Core data types (Symbol, TickerRecord, MergedRow, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use error::{DataError, Result};
pub use frame::fundamentals_frame;
pub use join::{DEFAULT_TOLERANCE_DAYS, PriceSeries, join_market_cap};
pub use merge::{merge_series, merge_statements};
pub use normalize::{normalize_record, normalize_series};
pub use period::{Cadence, HistoryDepth, StatementKind};
pub use provider::{
    DataProvider, DividendProvider, FullProvider, InsiderProvider, OverviewProvider,
    PriceProvider, SentimentProvider, SharesProvider, StatementProvider,
};
pub use scale::{Magnitude, ScaleFactor, auto_scale};
pub use types::{
    CombinedFundamentals, CompanyOverview, DividendRecord, InsiderTrade, MergedRow, PeriodSeries,
    NewsItem, PricePoint, RELEVANCE_THRESHOLD, SharesSnapshot, StatementHistory, Symbol,
    TickerInsiderTrade, TickerMap, TickerRecord, TickerSentiment, TopicRelevance,
};
