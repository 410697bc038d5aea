#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/finsight-rs/finsight/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Alpha Vantage data provider.
//!
//! This crate implements the finsight-core provider traits for the
//! [Alpha Vantage](https://www.alphavantage.co/) query API.
//!
//! # Usage
//!
//! ```rust,ignore
//! use finsight_alphavantage::{AlphaVantageProvider, DEFAULT_TIMEOUT};
//! use finsight_core::{HistoryDepth, StatementKind, StatementProvider, Symbol};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = AlphaVantageProvider::try_new("your_api_key", DEFAULT_TIMEOUT)?;
//!
//!     let symbol = Symbol::new("IBM");
//!     let balance = provider
//!         .fetch_statement(&symbol, StatementKind::BalanceSheet, HistoryDepth::default())
//!         .await?;
//!
//!     println!("{} annual reports", balance.annual.len());
//!     Ok(())
//! }
//! ```

mod payload;

use std::fmt::{self, Write};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use finsight_core::{
    CompanyOverview, DataError, DataProvider, DividendProvider, DividendRecord, HistoryDepth,
    InsiderProvider, InsiderTrade, NewsItem, OverviewProvider, PriceProvider, PriceSeries,
    RELEVANCE_THRESHOLD, Result, SentimentProvider, SharesProvider, SharesSnapshot,
    StatementHistory, StatementKind, StatementProvider, Symbol,
};
use reqwest::Client;
use serde_json::Value;

/// Default Alpha Vantage host.
pub const ALPHA_VANTAGE_BASE_URL: &str = "https://www.alphavantage.co";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const PROVIDER_NAME: &str = "Alpha Vantage";

/// Feed items requested per `NEWS_SENTIMENT` call.
const NEWS_LIMIT: &str = "500";

/// Dividend sources tried in order before the monthly adjusted series.
const DIVIDEND_SOURCES: [(&str, fn(&Value) -> Vec<DividendRecord>); 2] = [
    ("DIVIDEND_HISTORY", payload::dividend_history),
    ("DIVIDENDS", payload::dividends),
];

/// Alpha Vantage data provider.
///
/// Provides access to:
/// - Balance sheets, income statements and cash flow statements
/// - Shares outstanding history
/// - Monthly close prices
/// - Dividends, with a monthly-adjusted fallback
/// - Insider transactions
/// - Company overview
/// - News sentiment
#[derive(Clone)]
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl fmt::Debug for AlphaVantageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlphaVantageProvider")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl AlphaVantageProvider {
    /// Create a provider, validating the key and building a client with
    /// `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Configuration`] if the key is blank or the HTTP
    /// client cannot be built.
    pub fn try_new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(DataError::Configuration(
                "Alpha Vantage API key is empty".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DataError::Configuration(format!("HTTP client: {e}")))?;
        Ok(Self::with_client(client, api_key))
    }

    /// Create a new provider with a custom HTTP client.
    ///
    /// The client's timeout settings are used as-is.
    #[must_use]
    pub fn with_client(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: ALPHA_VANTAGE_BASE_URL.to_string(),
        }
    }

    /// Point the provider at another host, e.g. a proxy or a test server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build a query URL with the API key appended.
    fn url(&self, function: &str, params: &[(&str, &str)]) -> String {
        let mut url = format!("{}/query?function={function}", self.base_url);
        for (name, value) in params {
            let _ = write!(url, "&{name}={value}");
        }
        let _ = write!(url, "&apikey={}", self.api_key);
        url
    }

    /// Make a GET request for `function` on `symbol` and return the checked
    /// JSON payload.
    async fn query(&self, function: &str, symbol: &Symbol) -> Result<Value> {
        self.query_with(function, symbol, &[("symbol", symbol.as_str())])
            .await
    }

    async fn query_with(
        &self,
        function: &str,
        symbol: &Symbol,
        params: &[(&str, &str)],
    ) -> Result<Value> {
        tracing::debug!(function, %symbol, "Alpha Vantage request");

        // The key travels in the query string, so errors are stripped of the URL.
        let response = self
            .client
            .get(self.url(function, params))
            .send()
            .await
            .map_err(|e| DataError::Network(e.without_url().to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DataError::RateLimited {
                provider: PROVIDER_NAME.to_string(),
                retry_after: None,
            });
        }

        if !response.status().is_success() {
            return Err(DataError::Network(format!("HTTP {}", response.status())));
        }

        let text = response
            .text()
            .await
            .map_err(|e| DataError::Network(e.without_url().to_string()))?;

        let payload: Value = serde_json::from_str(&text)
            .map_err(|e| DataError::Parse(format!("{function} for {symbol}: {e}")))?;

        payload::check_error(&payload, symbol)?;
        Ok(payload)
    }
}

const fn statement_function(kind: StatementKind) -> &'static str {
    match kind {
        StatementKind::BalanceSheet => "BALANCE_SHEET",
        StatementKind::IncomeStatement => "INCOME_STATEMENT",
        StatementKind::CashFlow => "CASH_FLOW",
    }
}

impl DataProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn description(&self) -> &str {
        "Company statements, shares outstanding, prices, dividends and insider trades from Alpha Vantage"
    }
}

#[async_trait]
impl StatementProvider for AlphaVantageProvider {
    async fn fetch_statement(
        &self,
        symbol: &Symbol,
        kind: StatementKind,
        depth: HistoryDepth,
    ) -> Result<StatementHistory> {
        let payload = self.query(statement_function(kind), symbol).await?;
        let history = payload::statement_history(&payload, kind, depth);
        tracing::debug!(
            %symbol,
            statement = kind.title(),
            annual = history.annual.len(),
            quarterly = history.quarterly.len(),
            "Decoded statement"
        );
        Ok(history)
    }
}

#[async_trait]
impl SharesProvider for AlphaVantageProvider {
    async fn fetch_shares_outstanding(&self, symbol: &Symbol) -> Result<Vec<SharesSnapshot>> {
        let payload = self.query("SHARES_OUTSTANDING", symbol).await?;
        Ok(payload::shares_snapshots(&payload, Utc::now().date_naive()))
    }
}

#[async_trait]
impl PriceProvider for AlphaVantageProvider {
    async fn fetch_monthly_closes(&self, symbol: &Symbol) -> Result<PriceSeries> {
        let payload = self.query("TIME_SERIES_MONTHLY", symbol).await?;
        Ok(payload::monthly_closes(&payload))
    }
}

#[async_trait]
impl DividendProvider for AlphaVantageProvider {
    async fn fetch_dividends(&self, symbol: &Symbol, limit: usize) -> Result<Vec<DividendRecord>> {
        for (function, decode) in DIVIDEND_SOURCES {
            match self.query(function, symbol).await {
                Ok(payload) => {
                    let records = decode(&payload);
                    if !records.is_empty() {
                        return Ok(payload::latest_dividends(records, limit));
                    }
                    tracing::debug!(%symbol, function, "No dividends, trying next source");
                }
                Err(e @ DataError::AuthenticationFailed(_)) => return Err(e),
                Err(e) => {
                    tracing::debug!(%symbol, function, error = %e, "Dividend source failed, trying next source");
                }
            }
        }

        let payload = self.query("TIME_SERIES_MONTHLY_ADJUSTED", symbol).await?;
        Ok(payload::latest_dividends(
            payload::monthly_adjusted_dividends(&payload),
            limit,
        ))
    }
}

#[async_trait]
impl InsiderProvider for AlphaVantageProvider {
    async fn fetch_insider_trades(
        &self,
        symbol: &Symbol,
        limit: usize,
    ) -> Result<Vec<InsiderTrade>> {
        let payload = self.query("INSIDER_TRANSACTIONS", symbol).await?;
        Ok(payload::insider_trades(&payload, limit))
    }
}

#[async_trait]
impl OverviewProvider for AlphaVantageProvider {
    async fn fetch_overview(&self, symbol: &Symbol) -> Result<CompanyOverview> {
        let payload = self.query("OVERVIEW", symbol).await?;
        Ok(payload::overview(&payload))
    }
}

#[async_trait]
impl SentimentProvider for AlphaVantageProvider {
    async fn fetch_news_sentiment(&self, symbol: &Symbol) -> Result<Vec<NewsItem>> {
        let payload = self
            .query_with(
                "NEWS_SENTIMENT",
                symbol,
                &[("tickers", symbol.as_str()), ("limit", NEWS_LIMIT)],
            )
            .await?;
        let items = payload::news_sentiment(&payload, RELEVANCE_THRESHOLD);
        tracing::debug!(%symbol, items = items.len(), "Decoded news sentiment");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

    fn provider(api_key: &str) -> AlphaVantageProvider {
        AlphaVantageProvider::try_new(api_key, Duration::from_secs(2)).unwrap()
    }

    async fn mock_server() -> (MockServer, AlphaVantageProvider) {
        let server = MockServer::start().await;
        let provider = provider("test_key").with_base_url(server.uri());
        (server, provider)
    }

    fn function(name: &str) -> MockBuilder {
        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("function", name))
            .and(query_param("apikey", "test_key"))
    }

    async fn respond(server: &MockServer, name: &str, response: ResponseTemplate, calls: u64) {
        function(name)
            .respond_with(response)
            .expect(calls)
            .mount(server)
            .await;
    }

    fn json_body(body: Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(body)
    }

    #[test]
    fn test_provider_metadata() {
        let provider = provider("test_key");
        assert_eq!(provider.name(), "Alpha Vantage");
        assert!(!provider.description().is_empty());
    }

    #[test]
    fn test_url_building() {
        let provider = provider("test_key");
        assert_eq!(
            provider.url("BALANCE_SHEET", &[("symbol", "IBM")]),
            "https://www.alphavantage.co/query?function=BALANCE_SHEET&symbol=IBM&apikey=test_key"
        );

        let provider = provider.with_base_url("http://localhost:8080/");
        assert_eq!(
            provider.url("NEWS_SENTIMENT", &[("tickers", "AAPL"), ("limit", "500")]),
            "http://localhost:8080/query?function=NEWS_SENTIMENT&tickers=AAPL&limit=500&apikey=test_key"
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let provider = provider("super_secret");
        let debug = format!("{provider:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super_secret"));
    }

    #[test]
    fn test_try_new_rejects_blank_key() {
        assert!(matches!(
            AlphaVantageProvider::try_new("   ", DEFAULT_TIMEOUT),
            Err(DataError::Configuration(_))
        ));
        assert!(AlphaVantageProvider::try_new("key", DEFAULT_TIMEOUT).is_ok());
    }

    #[test]
    fn test_statement_functions() {
        assert_eq!(statement_function(StatementKind::BalanceSheet), "BALANCE_SHEET");
        assert_eq!(statement_function(StatementKind::IncomeStatement), "INCOME_STATEMENT");
        assert_eq!(statement_function(StatementKind::CashFlow), "CASH_FLOW");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let provider = provider("secret_key").with_base_url("http://127.0.0.1:9");
        let err = provider
            .fetch_overview(&Symbol::new("IBM"))
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::Network(_)));
        assert!(!err.to_string().contains("secret_key"));
    }

    #[tokio::test]
    async fn test_overview_over_http() {
        let (server, provider) = mock_server().await;
        function("OVERVIEW")
            .and(query_param("symbol", "IBM"))
            .respond_with(json_body(json!({
                "Symbol": "IBM", "Name": "International Business Machines",
                "Currency": "USD", "MarketCapitalization": "153263391000"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let overview = provider.fetch_overview(&Symbol::new("ibm")).await.unwrap();
        assert_eq!(overview.currency.as_deref(), Some("USD"));
        assert_eq!(overview.market_capitalization, Some(153_263_391_000.0));
    }

    #[tokio::test]
    async fn test_http_status_mapping() {
        let (server, provider) = mock_server().await;
        respond(&server, "OVERVIEW", ResponseTemplate::new(429), 1).await;
        respond(&server, "TIME_SERIES_MONTHLY", ResponseTemplate::new(503), 1).await;

        let symbol = Symbol::new("IBM");
        let err = provider.fetch_overview(&symbol).await.unwrap_err();
        assert!(matches!(err, DataError::RateLimited { .. }));

        let err = provider.fetch_monthly_closes(&symbol).await.unwrap_err();
        assert!(matches!(err, DataError::Network(_)));
        assert!(err.to_string().contains("503"));
        assert!(!err.to_string().contains("test_key"));
    }

    #[tokio::test]
    async fn test_error_envelopes_over_http() {
        let (server, provider) = mock_server().await;
        respond(&server, "OVERVIEW", json_body(json!({})), 1).await;
        respond(
            &server,
            "SHARES_OUTSTANDING",
            json_body(json!({"Note": "Thank you for using Alpha Vantage!"})),
            1,
        )
        .await;
        respond(
            &server,
            "INSIDER_TRANSACTIONS",
            json_body(json!({"Error Message": "the parameter apikey is invalid or missing."})),
            1,
        )
        .await;
        respond(
            &server,
            "TIME_SERIES_MONTHLY",
            ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"),
            1,
        )
        .await;

        let symbol = Symbol::new("ZZZZ");
        assert!(matches!(
            provider.fetch_overview(&symbol).await,
            Err(DataError::SymbolNotFound(_))
        ));
        assert!(matches!(
            provider.fetch_shares_outstanding(&symbol).await,
            Err(DataError::RateLimited { .. })
        ));
        assert!(matches!(
            provider.fetch_insider_trades(&symbol, 5).await,
            Err(DataError::AuthenticationFailed(_))
        ));
        assert!(matches!(
            provider.fetch_monthly_closes(&symbol).await,
            Err(DataError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_dividends_fall_back_to_monthly_adjusted() {
        let (server, provider) = mock_server().await;
        respond(
            &server,
            "DIVIDEND_HISTORY",
            json_body(json!({"Error Message": "Invalid API call."})),
            1,
        )
        .await;
        respond(&server, "DIVIDENDS", json_body(json!({"symbol": "IBM", "data": []})), 1).await;
        respond(
            &server,
            "TIME_SERIES_MONTHLY_ADJUSTED",
            json_body(json!({
                "Monthly Adjusted Time Series": {
                    "2024-05-31": {"7. dividend amount": "1.6700"},
                    "2024-04-30": {"7. dividend amount": "0.0000"},
                    "2024-02-29": {"7. dividend amount": "1.6600"}
                }
            })),
            1,
        )
        .await;

        let records = provider.fetch_dividends(&Symbol::new("IBM"), 1).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount, Some(1.67));
    }

    #[tokio::test]
    async fn test_dividends_failed_history_uses_dividends() {
        let (server, provider) = mock_server().await;
        respond(&server, "DIVIDEND_HISTORY", ResponseTemplate::new(500), 1).await;
        respond(
            &server,
            "DIVIDENDS",
            json_body(json!({"symbol": "IBM", "data": [
                {"ex_dividend_date": "2024-05-09", "amount": "1.67"},
                {"ex_dividend_date": "2024-02-08", "amount": "1.66"}
            ]})),
            1,
        )
        .await;
        respond(&server, "TIME_SERIES_MONTHLY_ADJUSTED", json_body(json!({})), 0).await;

        let records = provider.fetch_dividends(&Symbol::new("IBM"), 10).await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].ex_dividend_date > records[1].ex_dividend_date);
    }

    #[tokio::test]
    async fn test_dividends_authentication_failure_stops() {
        let (server, provider) = mock_server().await;
        respond(
            &server,
            "DIVIDEND_HISTORY",
            json_body(json!({"Error Message": "the parameter apikey is invalid or missing."})),
            1,
        )
        .await;
        respond(&server, "DIVIDENDS", json_body(json!({})), 0).await;
        respond(&server, "TIME_SERIES_MONTHLY_ADJUSTED", json_body(json!({})), 0).await;

        let err = provider.fetch_dividends(&Symbol::new("IBM"), 10).await.unwrap_err();
        assert!(matches!(err, DataError::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn test_news_sentiment_over_http() {
        let (server, provider) = mock_server().await;
        function("NEWS_SENTIMENT")
            .and(query_param("tickers", "IBM"))
            .and(query_param("limit", "500"))
            .respond_with(json_body(json!({
                "items": "2",
                "feed": [
                    {"title": "Relevant", "topics": [{"topic": "Earnings", "relevance_score": "0.9"}]},
                    {"title": "Noise", "ticker_sentiment": [{"ticker": "IBM", "relevance_score": "0.05"}]}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let items = provider.fetch_news_sentiment(&Symbol::new("IBM")).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title.as_deref(), Some("Relevant"));
    }
}
