//! Batch report operations with per-ticker failure isolation.

use std::sync::Arc;

use chrono::TimeDelta;
use tracing::{debug, error, info, warn};

use finsight_alphavantage::AlphaVantageProvider;
use finsight_core::{
    CombinedFundamentals, CompanyOverview, DEFAULT_TOLERANCE_DAYS, DividendProvider,
    DividendRecord, FullProvider, HistoryDepth, InsiderProvider, InsiderTrade, NewsItem,
    OverviewProvider, PriceProvider, Result, SentimentProvider, SharesProvider, SharesSnapshot,
    StatementHistory, StatementKind, StatementProvider, Symbol, TickerInsiderTrade, TickerMap,
    join_market_cap, merge_statements,
};

use crate::config::{DEFAULT_DIVIDEND_LIMIT, DEFAULT_INSIDER_LIMIT, Settings};

/// Runs fetches for many tickers, one ticker at a time.
///
/// Every batch method returns a map with one entry per distinct requested
/// ticker. A ticker whose fetch fails is logged and mapped to `None`; the
/// batch carries on with the next ticker. Only fatal errors (see
/// [`DataError::is_fatal`](finsight_core::DataError::is_fatal)) abort the
/// batch.
///
/// # Example
///
/// ```rust,ignore
/// use finsight::{ReportService, Settings, Symbol};
///
/// let service = ReportService::from_settings(&Settings::from_env()?)?;
/// let shares = service
///     .fetch_shares_with_market_cap(&[Symbol::new("IBM")])
///     .await?;
/// ```
#[derive(Clone)]
pub struct ReportService {
    statements: Arc<dyn StatementProvider>,
    shares: Arc<dyn SharesProvider>,
    prices: Arc<dyn PriceProvider>,
    dividends: Arc<dyn DividendProvider>,
    insider: Arc<dyn InsiderProvider>,
    overview: Arc<dyn OverviewProvider>,
    sentiment: Arc<dyn SentimentProvider>,
    history: HistoryDepth,
    tolerance: TimeDelta,
    dividend_limit: usize,
    insider_limit: usize,
}

impl std::fmt::Debug for ReportService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportService")
            .field("statements", &self.statements.name())
            .field("shares", &self.shares.name())
            .field("prices", &self.prices.name())
            .field("dividends", &self.dividends.name())
            .field("insider", &self.insider.name())
            .field("overview", &self.overview.name())
            .field("sentiment", &self.sentiment.name())
            .field("history", &self.history)
            .field("tolerance_days", &self.tolerance.num_days())
            .field("dividend_limit", &self.dividend_limit)
            .field("insider_limit", &self.insider_limit)
            .finish()
    }
}

impl ReportService {
    /// Create a service that takes every data set from one provider.
    #[must_use]
    pub fn with_provider<P: FullProvider + 'static>(provider: Arc<P>) -> Self {
        debug!(provider = provider.name(), "Registering provider for all data sets");
        Self {
            statements: provider.clone(),
            shares: provider.clone(),
            prices: provider.clone(),
            dividends: provider.clone(),
            insider: provider.clone(),
            overview: provider.clone(),
            sentiment: provider,
            history: HistoryDepth::default(),
            tolerance: TimeDelta::days(DEFAULT_TOLERANCE_DAYS),
            dividend_limit: DEFAULT_DIVIDEND_LIMIT,
            insider_limit: DEFAULT_INSIDER_LIMIT,
        }
    }

    /// Create a service backed by Alpha Vantage.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Configuration`](finsight_core::DataError::Configuration)
    /// if the API key is blank or the HTTP client cannot be built.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let provider = AlphaVantageProvider::try_new(&settings.api_key, settings.timeout)?
            .with_base_url(&settings.base_url);
        Ok(Self::with_provider(Arc::new(provider))
            .with_history(settings.history)
            .with_tolerance_days(settings.tolerance_days)
            .with_limits(settings.dividend_limit, settings.insider_limit))
    }

    /// Replace the monthly price provider, e.g. with a cached or offline
    /// price source.
    pub fn register_prices(&mut self, provider: Arc<dyn PriceProvider>) {
        debug!(provider = provider.name(), "Registering price provider");
        self.prices = provider;
    }

    /// Set the periods kept per cadence.
    #[must_use]
    pub const fn with_history(mut self, history: HistoryDepth) -> Self {
        self.history = history;
        self
    }

    /// Set the nearest-date tolerance, in days.
    ///
    /// Negative values mean exact matches only; values beyond what
    /// [`TimeDelta`] can hold saturate.
    #[must_use]
    pub fn with_tolerance_days(mut self, days: i64) -> Self {
        self.tolerance = TimeDelta::try_days(days.max(0)).unwrap_or(TimeDelta::MAX);
        self
    }

    /// Set how many dividends and insider trades are kept per ticker.
    #[must_use]
    pub const fn with_limits(mut self, dividends: usize, insider_trades: usize) -> Self {
        self.dividend_limit = dividends;
        self.insider_limit = insider_trades;
        self
    }

    /// Fetch one statement for each ticker.
    pub async fn fetch_statements(
        &self,
        symbols: &[Symbol],
        kind: StatementKind,
    ) -> Result<TickerMap<StatementHistory>> {
        info!(tickers = symbols.len(), statement = kind.title(), "Fetching statements");
        let mut out = TickerMap::new();
        for symbol in distinct(symbols) {
            let result = self.statements.fetch_statement(symbol, kind, self.history).await;
            settle(&mut out, symbol, kind.title(), result)?;
        }
        Ok(out)
    }

    /// Fetch and merge all three statements for each ticker.
    ///
    /// A ticker is `None` only when every statement fetch failed; otherwise
    /// the statements that did arrive are merged.
    pub async fn fetch_fundamentals(
        &self,
        symbols: &[Symbol],
    ) -> Result<TickerMap<CombinedFundamentals>> {
        info!(tickers = symbols.len(), "Fetching fundamentals");
        let mut out = TickerMap::new();
        for symbol in distinct(symbols) {
            let mut histories = Vec::with_capacity(StatementKind::ALL.len());
            for kind in StatementKind::ALL {
                match self.statements.fetch_statement(symbol, kind, self.history).await {
                    Ok(history) => histories.push(Some(history)),
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        warn!(symbol = %symbol, statement = kind.title(), error = %e, "Statement fetch failed");
                        histories.push(None);
                    }
                }
            }

            if histories.iter().all(Option::is_none) {
                error!(symbol = %symbol, "All statement fetches failed");
                out.insert(symbol.clone(), None);
                continue;
            }

            let refs: Vec<Option<&StatementHistory>> = histories.iter().map(Option::as_ref).collect();
            let combined = merge_statements(&refs);
            debug!(
                symbol = %symbol,
                annual = combined.annual.len(),
                quarterly = combined.quarterly.len(),
                "Merged statements"
            );
            out.insert(symbol.clone(), Some(combined));
        }
        Ok(out)
    }

    /// Fetch shares outstanding and enrich each snapshot with market cap.
    ///
    /// If the monthly closes cannot be fetched, the snapshots are kept
    /// without market cap.
    pub async fn fetch_shares_with_market_cap(
        &self,
        symbols: &[Symbol],
    ) -> Result<TickerMap<Vec<SharesSnapshot>>> {
        info!(tickers = symbols.len(), "Fetching shares outstanding");
        let mut out = TickerMap::new();
        for symbol in distinct(symbols) {
            let snapshots = match self.shares.fetch_shares_outstanding(symbol).await {
                Ok(snapshots) => snapshots,
                Err(e) => {
                    settle::<Vec<SharesSnapshot>>(&mut out, symbol, "shares outstanding", Err(e))?;
                    continue;
                }
            };

            let enriched = match self.prices.fetch_monthly_closes(symbol).await {
                Ok(prices) => join_market_cap(&snapshots, &prices, self.tolerance),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "Monthly closes unavailable, skipping market cap");
                    snapshots
                }
            };
            out.insert(symbol.clone(), Some(enriched));
        }
        Ok(out)
    }

    /// Fetch the latest dividends for each ticker.
    pub async fn fetch_dividends(&self, symbols: &[Symbol]) -> Result<TickerMap<Vec<DividendRecord>>> {
        info!(tickers = symbols.len(), limit = self.dividend_limit, "Fetching dividends");
        let mut out = TickerMap::new();
        for symbol in distinct(symbols) {
            let result = self.dividends.fetch_dividends(symbol, self.dividend_limit).await;
            settle(&mut out, symbol, "dividends", result)?;
        }
        Ok(out)
    }

    /// Fetch the latest insider trades for each ticker.
    pub async fn fetch_insider_trades(
        &self,
        symbols: &[Symbol],
    ) -> Result<TickerMap<Vec<InsiderTrade>>> {
        info!(tickers = symbols.len(), limit = self.insider_limit, "Fetching insider trades");
        let mut out = TickerMap::new();
        for symbol in distinct(symbols) {
            let result = self.insider.fetch_insider_trades(symbol, self.insider_limit).await;
            settle(&mut out, symbol, "insider trades", result)?;
        }
        Ok(out)
    }

    /// Fetch the company overview for each ticker.
    pub async fn fetch_overviews(&self, symbols: &[Symbol]) -> Result<TickerMap<CompanyOverview>> {
        info!(tickers = symbols.len(), "Fetching company overviews");
        let mut out = TickerMap::new();
        for symbol in distinct(symbols) {
            let result = self.overview.fetch_overview(symbol).await;
            settle(&mut out, symbol, "overview", result)?;
        }
        Ok(out)
    }

    /// Fetch relevant news with sentiment scores for each ticker.
    pub async fn fetch_sentiment(&self, symbols: &[Symbol]) -> Result<TickerMap<Vec<NewsItem>>> {
        info!(tickers = symbols.len(), "Fetching news sentiment");
        let mut out = TickerMap::new();
        for symbol in distinct(symbols) {
            let result = self.sentiment.fetch_news_sentiment(symbol).await;
            settle(&mut out, symbol, "news sentiment", result)?;
        }
        Ok(out)
    }
}

/// Flattens per-ticker trades into one list tagged by ticker.
///
/// Failed tickers contribute nothing. Tickers come in map order, trades in
/// fetch order.
#[must_use]
pub fn flatten_insider_trades(trades: &TickerMap<Vec<InsiderTrade>>) -> Vec<TickerInsiderTrade> {
    trades
        .iter()
        .filter_map(|(ticker, trades)| trades.as_ref().map(|t| (ticker, t)))
        .flat_map(|(ticker, trades)| {
            trades.iter().map(move |trade| TickerInsiderTrade {
                ticker: ticker.clone(),
                trade: trade.clone(),
            })
        })
        .collect()
}

/// Requested symbols with duplicates removed, first occurrence kept.
fn distinct(symbols: &[Symbol]) -> impl Iterator<Item = &Symbol> {
    symbols
        .iter()
        .enumerate()
        .filter(|(i, symbol)| !symbols[..*i].contains(symbol))
        .map(|(_, symbol)| symbol)
}

/// Records one ticker's outcome; only fatal errors escape.
fn settle<T>(out: &mut TickerMap<T>, symbol: &Symbol, what: &str, result: Result<T>) -> Result<()> {
    match result {
        Ok(value) => {
            out.insert(symbol.clone(), Some(value));
            Ok(())
        }
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            error!(symbol = %symbol, data = what, error = %e, "Fetch failed");
            out.insert(symbol.clone(), None);
            Ok(())
        }
    }
}
