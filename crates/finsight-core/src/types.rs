//! Core data types for company fundamentals.
//!
//! This module defines the request-scoped data structures:
//!
//! - [`Symbol`] - Trading symbol/ticker
//! - [`TickerRecord`] - One normalized statement row
//! - [`PeriodSeries`] - Date-ordered rows for one cadence
//! - [`StatementHistory`] - Annual and quarterly series of one statement
//! - [`MergedRow`] - Union of statement fields for one period end
//! - [`CombinedFundamentals`] - Merged annual and quarterly rows
//! - [`SharesSnapshot`] - Shares outstanding, optionally with market cap
//! - [`PricePoint`] - Monthly close price
//! - [`DividendRecord`], [`InsiderTrade`], [`CompanyOverview`]
//! - [`NewsItem`] - A news article with topic and ticker relevance
//!
//! Every numeric field uses `Option<f64>`, where `None` is the absent marker.
//! Absent is never replaced by zero.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::period::Cadence;

/// Per-ticker batch result. `None` marks a ticker whose fetch failed, as
/// opposed to `Some` of an empty collection for a ticker with no history.
pub type TickerMap<T> = BTreeMap<Symbol, Option<T>>;

/// A trading symbol/ticker.
///
/// Symbols are automatically uppercased and trimmed on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// One normalized financial statement row for one ticker and one period.
///
/// `period_end` is `None` when the upstream date was missing or unparseable;
/// such rows cannot take part in date-keyed merges or joins.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerRecord {
    /// End date of the fiscal period.
    #[serde(rename = "fiscalDateEnding")]
    pub period_end: Option<NaiveDate>,
    /// Reporting currency code.
    #[serde(rename = "reportedCurrency")]
    pub currency: Option<String>,
    /// Allow-listed numeric fields.
    #[serde(flatten)]
    pub fields: BTreeMap<String, Option<f64>>,
}

impl TickerRecord {
    /// Returns the value of a field, or `None` when absent or not present.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<f64> {
        self.fields.get(field).copied().flatten()
    }
}

/// Date-ordered statement rows for one ticker and one cadence.
///
/// Rows are kept sorted ascending by period end; undated rows sort last and
/// keep their relative input order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PeriodSeries {
    cadence: Cadence,
    records: Vec<TickerRecord>,
}

impl PeriodSeries {
    /// Creates a series, sorting the records by period end.
    #[must_use]
    pub fn new(cadence: Cadence, mut records: Vec<TickerRecord>) -> Self {
        records.sort_by_key(|r| (r.period_end.is_none(), r.period_end));
        Self { cadence, records }
    }

    /// Creates an empty series.
    #[must_use]
    pub const fn empty(cadence: Cadence) -> Self {
        Self {
            cadence,
            records: Vec::new(),
        }
    }

    /// Returns the cadence of this series.
    #[must_use]
    pub const fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// Returns the records in ascending date order.
    #[must_use]
    pub fn records(&self) -> &[TickerRecord] {
        &self.records
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns an iterator over the records.
    pub fn iter(&self) -> impl Iterator<Item = &TickerRecord> {
        self.records.iter()
    }
}

impl Serialize for PeriodSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.records)
    }
}

/// Annual and quarterly history of one statement for one ticker.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StatementHistory {
    /// Quarterly reports.
    pub quarterly: PeriodSeries,
    /// Annual reports.
    pub annual: PeriodSeries,
}

impl StatementHistory {
    /// Returns the series for the given cadence.
    #[must_use]
    pub const fn series(&self, cadence: Cadence) -> &PeriodSeries {
        match cadence {
            Cadence::Annual => &self.annual,
            Cadence::Quarterly => &self.quarterly,
        }
    }
}

/// Union of statement fields sharing one period end and cadence.
///
/// Fields whose source statement had no row for this date are not present
/// at all; they are never filled with zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MergedRow {
    /// End date of the fiscal period.
    #[serde(rename = "fiscalDateEnding")]
    pub period_end: NaiveDate,
    /// Reporting currency code, from the first source that reported one.
    #[serde(rename = "reportedCurrency")]
    pub currency: Option<String>,
    /// Merged numeric fields.
    #[serde(flatten)]
    pub fields: BTreeMap<String, Option<f64>>,
}

impl MergedRow {
    /// Creates an empty row for a period end.
    #[must_use]
    pub const fn new(period_end: NaiveDate) -> Self {
        Self {
            period_end,
            currency: None,
            fields: BTreeMap::new(),
        }
    }

    /// Returns the value of a field, or `None` when absent or not present.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<f64> {
        self.fields.get(field).copied().flatten()
    }

    /// Returns true if the field key is present, even with an absent value.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }
}

/// Merged annual and quarterly rows for one ticker.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CombinedFundamentals {
    /// Merged annual rows, ascending by date.
    pub annual: Vec<MergedRow>,
    /// Merged quarterly rows, ascending by date.
    pub quarterly: Vec<MergedRow>,
}

impl CombinedFundamentals {
    /// Returns the rows for the given cadence.
    #[must_use]
    pub fn rows(&self, cadence: Cadence) -> &[MergedRow] {
        match cadence {
            Cadence::Annual => &self.annual,
            Cadence::Quarterly => &self.quarterly,
        }
    }

    /// Returns true if neither cadence has any rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annual.is_empty() && self.quarterly.is_empty()
    }

    /// Currency of the most recent row that reports one, annual first.
    #[must_use]
    pub fn reported_currency(&self) -> Option<&str> {
        self.annual
            .iter()
            .rev()
            .chain(self.quarterly.iter().rev())
            .find_map(|row| row.currency.as_deref())
    }
}

/// Shares outstanding at one date, optionally enriched with market cap.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SharesSnapshot {
    /// Snapshot date; `None` when unparseable.
    pub date: Option<NaiveDate>,
    /// Basic shares outstanding.
    #[serde(rename = "shares_outstanding_basic")]
    pub basic: Option<f64>,
    /// Diluted shares outstanding.
    #[serde(rename = "shares_outstanding_diluted")]
    pub diluted: Option<f64>,
    /// Basic shares times the matched close price.
    pub market_cap_basic: Option<f64>,
    /// Diluted shares times the matched close price.
    pub market_cap_diluted: Option<f64>,
}

impl SharesSnapshot {
    /// Creates a snapshot without market cap.
    #[must_use]
    pub const fn new(date: Option<NaiveDate>, basic: Option<f64>, diluted: Option<f64>) -> Self {
        Self {
            date,
            basic,
            diluted,
            market_cap_basic: None,
            market_cap_diluted: None,
        }
    }
}

/// A dated close price.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Date of the close.
    pub date: NaiveDate,
    /// Closing price.
    pub close: f64,
}

impl PricePoint {
    /// Creates a new price point.
    #[must_use]
    pub const fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// One dividend payment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DividendRecord {
    /// Ex-dividend date.
    pub ex_dividend_date: Option<NaiveDate>,
    /// Declaration date.
    pub declaration_date: Option<NaiveDate>,
    /// Record date.
    pub record_date: Option<NaiveDate>,
    /// Payment date.
    pub payment_date: Option<NaiveDate>,
    /// Amount per share.
    pub amount: Option<f64>,
}

/// One insider transaction.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InsiderTrade {
    /// Transaction date.
    pub transaction_date: Option<NaiveDate>,
    /// Name of the insider.
    pub executive: Option<String>,
    /// Title of the insider.
    pub executive_title: Option<String>,
    /// Security traded, e.g. "Common Stock".
    pub security_type: Option<String>,
    /// "A" for acquisition, "D" for disposal.
    pub acquisition_or_disposal: Option<String>,
    /// Number of shares.
    pub shares: Option<f64>,
    /// Price per share.
    pub share_price: Option<f64>,
    /// Shares times price, when both are present.
    pub total_value: Option<f64>,
}

impl InsiderTrade {
    /// Computes `shares * share_price`, absent if either side is absent.
    #[must_use]
    pub fn traded_value(shares: Option<f64>, share_price: Option<f64>) -> Option<f64> {
        Some(shares? * share_price?)
    }
}

/// An insider trade tagged with its ticker, for flat multi-ticker listings.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TickerInsiderTrade {
    /// Ticker the trade belongs to.
    pub ticker: Symbol,
    /// The trade.
    #[serde(flatten)]
    pub trade: InsiderTrade,
}

/// Company overview subset.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyOverview {
    /// Company name.
    #[serde(rename = "Name")]
    pub name: Option<String>,
    /// Trading currency.
    #[serde(rename = "Currency")]
    pub currency: Option<String>,
    /// Market capitalization.
    #[serde(rename = "MarketCapitalization")]
    pub market_capitalization: Option<f64>,
}

/// Minimum relevance score, exclusive, for a news item to be kept.
pub const RELEVANCE_THRESHOLD: f64 = 0.2;

/// Relevance of a news item to one topic.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicRelevance {
    /// Topic name, e.g. "Earnings".
    pub topic: Option<String>,
    /// Relevance between 0 and 1.
    pub relevance_score: Option<f64>,
}

/// Relevance and sentiment of a news item towards one ticker.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerSentiment {
    /// Ticker the sentiment refers to.
    pub ticker: Option<String>,
    /// Relevance between 0 and 1.
    pub relevance_score: Option<f64>,
    /// Sentiment between -1 (bearish) and 1 (bullish).
    pub sentiment_score: Option<f64>,
    /// Sentiment label, e.g. "Somewhat-Bullish".
    pub sentiment_label: Option<String>,
}

/// One news article with its sentiment annotations.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Headline.
    pub title: Option<String>,
    /// Article URL.
    pub url: Option<String>,
    /// Publication time.
    pub time_published: Option<NaiveDateTime>,
    /// Publisher.
    pub source: Option<String>,
    /// Summary text.
    pub summary: Option<String>,
    /// Overall sentiment between -1 and 1.
    pub overall_sentiment_score: Option<f64>,
    /// Overall sentiment label.
    pub overall_sentiment_label: Option<String>,
    /// Topic relevance scores.
    pub topics: Vec<TopicRelevance>,
    /// Per-ticker relevance and sentiment.
    pub ticker_sentiment: Vec<TickerSentiment>,
}

impl NewsItem {
    /// Returns true if any topic or ticker scores above `threshold`.
    ///
    /// Absent scores never count as relevant.
    #[must_use]
    pub fn is_relevant(&self, threshold: f64) -> bool {
        let above = |score: Option<f64>| score.is_some_and(|s| s > threshold);
        self.topics.iter().any(|t| above(t.relevance_score))
            || self.ticker_sentiment.iter().any(|t| above(t.relevance_score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(period_end: Option<NaiveDate>) -> TickerRecord {
        TickerRecord {
            period_end,
            ..Default::default()
        }
    }

    #[test]
    fn test_symbol_uppercase() {
        assert_eq!(Symbol::new(" aapl ").as_str(), "AAPL");
        assert_eq!(Symbol::from("msft").to_string(), "MSFT");
    }

    #[test]
    fn test_period_series_sorts_ascending_with_undated_last() {
        let series = PeriodSeries::new(
            Cadence::Annual,
            vec![
                record(Some(date(2023, 12, 31))),
                record(None),
                record(Some(date(2021, 12, 31))),
            ],
        );
        let dates: Vec<_> = series.iter().map(|r| r.period_end).collect();
        assert_eq!(
            dates,
            vec![Some(date(2021, 12, 31)), Some(date(2023, 12, 31)), None]
        );
    }

    #[test]
    fn test_record_serializes_flat() {
        let mut rec = record(Some(date(2022, 12, 31)));
        rec.currency = Some("USD".into());
        rec.fields.insert("totalAssets".into(), Some(100.0));
        rec.fields.insert("totalLiabilities".into(), None);
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "fiscalDateEnding": "2022-12-31",
                "reportedCurrency": "USD",
                "totalAssets": 100.0,
                "totalLiabilities": null
            })
        );
    }

    #[test]
    fn test_traded_value_requires_both_sides() {
        assert_eq!(InsiderTrade::traded_value(Some(10.0), Some(2.5)), Some(25.0));
        assert_eq!(InsiderTrade::traded_value(None, Some(2.5)), None);
        assert_eq!(InsiderTrade::traded_value(Some(10.0), None), None);
    }

    #[test]
    fn test_reported_currency_prefers_latest_annual() {
        let mut old = MergedRow::new(date(2021, 12, 31));
        old.currency = Some("EUR".into());
        let mut new = MergedRow::new(date(2022, 12, 31));
        new.currency = Some("USD".into());
        let combined = CombinedFundamentals {
            annual: vec![old, new],
            quarterly: Vec::new(),
        };
        assert_eq!(combined.reported_currency(), Some("USD"));
        assert_eq!(CombinedFundamentals::default().reported_currency(), None);
    }

    #[test]
    fn test_news_relevance() {
        let mut item = NewsItem::default();
        assert!(!item.is_relevant(RELEVANCE_THRESHOLD));

        item.topics.push(TopicRelevance {
            topic: Some("Earnings".into()),
            relevance_score: Some(0.2),
        });
        item.ticker_sentiment.push(TickerSentiment {
            relevance_score: None,
            ..Default::default()
        });
        assert!(!item.is_relevant(RELEVANCE_THRESHOLD));

        item.ticker_sentiment.push(TickerSentiment {
            ticker: Some("IBM".into()),
            relevance_score: Some(0.35),
            ..Default::default()
        });
        assert!(item.is_relevant(RELEVANCE_THRESHOLD));
    }

    #[test]
    fn test_ticker_map_serializes_absent_as_null() {
        let mut map: TickerMap<Vec<DividendRecord>> = TickerMap::new();
        map.insert(Symbol::new("IBM"), Some(Vec::new()));
        map.insert(Symbol::new("FAIL"), None);
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json, serde_json::json!({"FAIL": null, "IBM": []}));
    }
}
