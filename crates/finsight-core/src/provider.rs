//! Provider traits for fetching company data.
//!
//! This module defines the core provider traits:
//!
//! - [`DataProvider`] - Base trait for all data providers
//! - [`StatementProvider`] - Balance sheet, income and cash flow statements
//! - [`SharesProvider`] - Shares outstanding history
//! - [`PriceProvider`] - Monthly close prices
//! - [`DividendProvider`] - Dividend history
//! - [`InsiderProvider`] - Insider transactions
//! - [`OverviewProvider`] - Company overview
//! - [`SentimentProvider`] - News sentiment

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::Result,
    join::PriceSeries,
    period::{HistoryDepth, StatementKind},
    types::{
        CompanyOverview, DividendRecord, InsiderTrade, NewsItem, SharesSnapshot, StatementHistory,
        Symbol,
    },
};

/// Base trait for all data providers.
pub trait DataProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "Alpha Vantage").
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;
}

/// Provider for financial statements.
#[async_trait]
pub trait StatementProvider: DataProvider {
    /// Fetches the annual and quarterly history of one statement.
    ///
    /// Each cadence is truncated to the matching [`HistoryDepth`].
    async fn fetch_statement(
        &self,
        symbol: &Symbol,
        kind: StatementKind,
        depth: HistoryDepth,
    ) -> Result<StatementHistory>;
}

/// Provider for shares outstanding.
#[async_trait]
pub trait SharesProvider: DataProvider {
    /// Fetches shares outstanding snapshots, without market cap.
    async fn fetch_shares_outstanding(&self, symbol: &Symbol) -> Result<Vec<SharesSnapshot>>;
}

/// Provider for monthly close prices.
#[async_trait]
pub trait PriceProvider: DataProvider {
    /// Fetches the monthly close series.
    async fn fetch_monthly_closes(&self, symbol: &Symbol) -> Result<PriceSeries>;
}

/// Provider for dividend history.
#[async_trait]
pub trait DividendProvider: DataProvider {
    /// Fetches up to `limit` dividends, most recent first.
    async fn fetch_dividends(&self, symbol: &Symbol, limit: usize) -> Result<Vec<DividendRecord>>;
}

/// Provider for insider transactions.
#[async_trait]
pub trait InsiderProvider: DataProvider {
    /// Fetches up to `limit` insider transactions in upstream order.
    async fn fetch_insider_trades(&self, symbol: &Symbol, limit: usize)
    -> Result<Vec<InsiderTrade>>;
}

/// Provider for company overview data.
#[async_trait]
pub trait OverviewProvider: DataProvider {
    /// Fetches name, currency and market capitalization.
    async fn fetch_overview(&self, symbol: &Symbol) -> Result<CompanyOverview>;
}

/// Provider for news sentiment.
#[async_trait]
pub trait SentimentProvider: DataProvider {
    /// Fetches recent news about `symbol`, keeping only items with a topic
    /// or ticker relevance above
    /// [`RELEVANCE_THRESHOLD`](crate::types::RELEVANCE_THRESHOLD).
    async fn fetch_news_sentiment(&self, symbol: &Symbol) -> Result<Vec<NewsItem>>;
}

/// A provider that serves every data set the reports need.
pub trait FullProvider:
    StatementProvider
    + SharesProvider
    + PriceProvider
    + DividendProvider
    + InsiderProvider
    + OverviewProvider
    + SentimentProvider
{
}

impl<T> FullProvider for T where
    T: StatementProvider
        + SharesProvider
        + PriceProvider
        + DividendProvider
        + InsiderProvider
        + OverviewProvider
        + SentimentProvider
{
}
