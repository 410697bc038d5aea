//! Decoding of Alpha Vantage JSON envelopes into core types.
//!
//! Everything here is pure: the provider fetches a [`Value`] and hands it to
//! these functions. Field-level problems never fail a payload; they become
//! absent values.

use chrono::{NaiveDate, NaiveDateTime};
use finsight_core::normalize::{parse_date, parse_date_str, parse_number, parse_text};
use finsight_core::{
    Cadence, CompanyOverview, DataError, DividendRecord, HistoryDepth, InsiderTrade, NewsItem,
    PricePoint, PriceSeries, Result, SharesSnapshot, StatementHistory, StatementKind, Symbol,
    TickerSentiment, TopicRelevance, normalize_series,
};
use serde_json::Value;

const ANNUAL_REPORTS: &str = "annualReports";
const QUARTERLY_REPORTS: &str = "quarterlyReports";
const DATA: &str = "data";
const MONTHLY_SERIES: &str = "Monthly Time Series";
const MONTHLY_ADJUSTED_SERIES: &str = "Monthly Adjusted Time Series";
const CLOSE: &str = "4. close";
const DIVIDEND_AMOUNT: &str = "7. dividend amount";
const FEED: &str = "feed";

// Dividend payloads spell their fields in several ways; the first non-null
// key wins.
const EX_DIVIDEND_KEYS: &[&str] = &[
    "ex_dividend_date",
    "exDividendDate",
    "date",
    "exDate",
    "dividend_ex_date",
    "dividendExDate",
];
const AMOUNT_KEYS: &[&str] = &["dividend", "amount", "dividend_amount", "value"];
const DECLARATION_KEYS: &[&str] = &[
    "declaration_date",
    "declarationDate",
    "declared_date",
    "declaredDate",
    "announcement_date",
    "announcementDate",
];
const RECORD_KEYS: &[&str] = &["record_date", "recordDate", "date_of_record", "dateOfRecord"];
const PAYMENT_KEYS: &[&str] = &[
    "payment_date",
    "paymentDate",
    "payDate",
    "payable_date",
    "payableDate",
    "payment_on",
    "paymentOn",
];
const HISTORY_LIST_HINTS: &[&str] = &["dividend", "data", "history", "records"];
const TIMESTAMP_FORMATS: &[&str] = &["%Y%m%dT%H%M%S", "%Y%m%dT%H%M"];

/// Maps Alpha Vantage's in-band error envelopes to errors.
///
/// Alpha Vantage answers most failures with HTTP 200 and a JSON object
/// carrying `"Error Message"`, `"Note"` or `"Information"`, or with an empty
/// object for unknown symbols.
pub(crate) fn check_error(payload: &Value, symbol: &Symbol) -> Result<()> {
    let Some(object) = payload.as_object() else {
        return Err(DataError::Parse(format!(
            "expected a JSON object for {symbol}"
        )));
    };

    if object.is_empty() {
        return Err(DataError::SymbolNotFound(symbol.to_string()));
    }

    if let Some(message) = object.get("Error Message").and_then(Value::as_str) {
        if message.contains("apikey") {
            return Err(DataError::AuthenticationFailed("Alpha Vantage".to_string()));
        }
        return Err(DataError::SymbolNotFound(format!("{symbol}: {message}")));
    }

    // Throttling and premium-endpoint notices replace the whole payload.
    if object.len() == 1 && (object.contains_key("Note") || object.contains_key("Information")) {
        return Err(DataError::RateLimited {
            provider: "Alpha Vantage".to_string(),
            retry_after: None,
        });
    }

    Ok(())
}

fn list<'a>(payload: &'a Value, key: &str) -> &'a [Value] {
    payload
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Decodes a `BALANCE_SHEET`, `INCOME_STATEMENT` or `CASH_FLOW` payload.
pub(crate) fn statement_history(
    payload: &Value,
    kind: StatementKind,
    depth: HistoryDepth,
) -> StatementHistory {
    StatementHistory {
        quarterly: normalize_series(
            list(payload, QUARTERLY_REPORTS),
            kind.fields(),
            depth.for_cadence(Cadence::Quarterly),
            Cadence::Quarterly,
        ),
        annual: normalize_series(
            list(payload, ANNUAL_REPORTS),
            kind.fields(),
            depth.for_cadence(Cadence::Annual),
            Cadence::Annual,
        ),
    }
}

/// Decodes a `SHARES_OUTSTANDING` payload.
///
/// Entries whose `date` is missing, null or empty are skipped. Any other
/// date is kept, parsed or not. When the payload carries no `data` list, a
/// single snapshot dated `today` is built from top-level fields.
pub(crate) fn shares_snapshots(payload: &Value, today: NaiveDate) -> Vec<SharesSnapshot> {
    let Some(entries) = payload.get(DATA).and_then(Value::as_array) else {
        return vec![SharesSnapshot::new(
            Some(today),
            parse_number(payload.get("shares_outstanding_basic")),
            parse_number(payload.get("shares_outstanding_diluted")),
        )];
    };

    entries
        .iter()
        .filter(|entry| has_date(entry.get("date")))
        .map(|entry| {
            SharesSnapshot::new(
                parse_date(entry.get("date")),
                parse_number(entry.get("shares_outstanding_basic")),
                parse_number(entry.get("shares_outstanding_diluted")),
            )
        })
        .collect()
}

fn has_date(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// Decodes a `TIME_SERIES_MONTHLY` payload into a close price series.
///
/// Months with an unparseable date or close are left out.
pub(crate) fn monthly_closes(payload: &Value) -> PriceSeries {
    payload
        .get(MONTHLY_SERIES)
        .and_then(Value::as_object)
        .into_iter()
        .flatten()
        .filter_map(|(date, entry)| {
            Some(PricePoint::new(
                parse_date_str(date)?,
                parse_number(entry.get(CLOSE))?,
            ))
        })
        .collect()
}

/// Decodes a `DIVIDEND_HISTORY` payload.
///
/// The records live in the first list whose key mentions dividends, data,
/// history or records, else in the first list of the payload.
pub(crate) fn dividend_history(payload: &Value) -> Vec<DividendRecord> {
    let list = first_list(payload, |key| {
        let key = key.to_ascii_lowercase();
        HISTORY_LIST_HINTS.iter().any(|hint| key.contains(hint))
    })
    .or_else(|| first_list(payload, |_| true));
    dividend_records(list.unwrap_or_default())
}

/// Decodes a `DIVIDENDS` payload from its `data` list, else from the first
/// list of the payload.
pub(crate) fn dividends(payload: &Value) -> Vec<DividendRecord> {
    let list = first_list(payload, |key| key == DATA).or_else(|| first_list(payload, |_| true));
    dividend_records(list.unwrap_or_default())
}

fn first_list<'a>(payload: &'a Value, key_matches: impl Fn(&str) -> bool) -> Option<&'a [Value]> {
    payload
        .as_object()?
        .iter()
        .filter(|(key, _)| key_matches(key.as_str()))
        .find_map(|(_, value)| value.as_array().map(Vec::as_slice))
}

fn pick<'a>(entry: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| entry.get(key).filter(|v| !v.is_null()))
}

/// Entries that are not objects, or have neither date nor amount, are
/// dropped.
fn dividend_records(entries: &[Value]) -> Vec<DividendRecord> {
    entries
        .iter()
        .filter(|d| d.is_object())
        .map(|d| DividendRecord {
            ex_dividend_date: parse_date(pick(d, EX_DIVIDEND_KEYS)),
            declaration_date: parse_date(pick(d, DECLARATION_KEYS)),
            record_date: parse_date(pick(d, RECORD_KEYS)),
            payment_date: parse_date(pick(d, PAYMENT_KEYS)),
            amount: parse_number(pick(d, AMOUNT_KEYS)),
        })
        .filter(|d| d.ex_dividend_date.is_some() || d.amount.is_some())
        .collect()
}

/// Derives dividends from a `TIME_SERIES_MONTHLY_ADJUSTED` payload: one
/// record per month with a positive dividend amount.
pub(crate) fn monthly_adjusted_dividends(payload: &Value) -> Vec<DividendRecord> {
    payload
        .get(MONTHLY_ADJUSTED_SERIES)
        .and_then(Value::as_object)
        .into_iter()
        .flatten()
        .filter_map(|(date, entry)| {
            let amount = parse_number(entry.get(DIVIDEND_AMOUNT)).filter(|a| *a > 0.0)?;
            Some(DividendRecord {
                ex_dividend_date: Some(parse_date_str(date)?),
                amount: Some(amount),
                ..Default::default()
            })
        })
        .collect()
}

/// Orders dividends newest first (undated last) and keeps `limit` of them.
pub(crate) fn latest_dividends(mut records: Vec<DividendRecord>, limit: usize) -> Vec<DividendRecord> {
    records.sort_by(|a, b| b.ex_dividend_date.cmp(&a.ex_dividend_date));
    records.truncate(limit);
    records
}

/// Decodes the first `limit` entries of an `INSIDER_TRANSACTIONS` payload.
pub(crate) fn insider_trades(payload: &Value, limit: usize) -> Vec<InsiderTrade> {
    list(payload, DATA)
        .iter()
        .take(limit)
        .map(|t| {
            let shares = parse_number(t.get("shares"));
            let share_price = parse_number(t.get("share_price"));
            InsiderTrade {
                transaction_date: parse_date(t.get("transaction_date")),
                executive: parse_text(t.get("executive")),
                executive_title: parse_text(t.get("executive_title")),
                security_type: parse_text(t.get("security_type")),
                acquisition_or_disposal: parse_text(t.get("acquisition_or_disposal")),
                shares,
                share_price,
                total_value: InsiderTrade::traded_value(shares, share_price),
            }
        })
        .collect()
}

/// Decodes a `NEWS_SENTIMENT` payload, keeping the feed items with a topic
/// or ticker relevance above `threshold`.
pub(crate) fn news_sentiment(payload: &Value, threshold: f64) -> Vec<NewsItem> {
    list(payload, FEED)
        .iter()
        .map(news_item)
        .filter(|item| item.is_relevant(threshold))
        .collect()
}

fn news_item(entry: &Value) -> NewsItem {
    NewsItem {
        title: parse_text(entry.get("title")),
        url: parse_text(entry.get("url")),
        time_published: parse_timestamp(entry.get("time_published")),
        source: parse_text(entry.get("source")),
        summary: parse_text(entry.get("summary")),
        overall_sentiment_score: parse_number(entry.get("overall_sentiment_score")),
        overall_sentiment_label: parse_text(entry.get("overall_sentiment_label")),
        topics: list(entry, "topics")
            .iter()
            .map(|t| TopicRelevance {
                topic: parse_text(t.get("topic")),
                relevance_score: parse_number(t.get("relevance_score")),
            })
            .collect(),
        ticker_sentiment: list(entry, "ticker_sentiment")
            .iter()
            .map(|t| TickerSentiment {
                ticker: parse_text(t.get("ticker")),
                relevance_score: parse_number(t.get("relevance_score")),
                sentiment_score: parse_number(t.get("ticker_sentiment_score")),
                sentiment_label: parse_text(t.get("ticker_sentiment_label")),
            })
            .collect(),
    }
}

/// Parses `20240105T123000` style timestamps.
fn parse_timestamp(value: Option<&Value>) -> Option<NaiveDateTime> {
    let s = value?.as_str()?.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Decodes an `OVERVIEW` payload.
pub(crate) fn overview(payload: &Value) -> CompanyOverview {
    CompanyOverview {
        name: parse_text(payload.get("Name")),
        currency: parse_text(payload.get("Currency")),
        market_capitalization: parse_number(payload.get("MarketCapitalization")),
    }
}
