//! Record normalization.
//!
//! Turns raw upstream records (`serde_json` objects with arbitrary values)
//! into typed rows that keep only an allow-listed set of fields. Missing,
//! malformed and non-numeric values become `None`; nothing is ever coerced
//! to zero.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::period::Cadence;
use crate::types::{PeriodSeries, TickerRecord};

/// Key holding the fiscal period end in statement payloads.
pub const PERIOD_END_KEY: &str = "fiscalDateEnding";

/// Key holding the reporting currency in statement payloads.
pub const CURRENCY_KEY: &str = "reportedCurrency";

/// Date layouts accepted for upstream dates, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

/// Parses a numeric field.
///
/// JSON numbers are taken as-is. Strings are trimmed, stripped of thousands
/// separators and parsed; placeholders such as `"None"`, `"n/a"` or `""`
/// are absent. Non-finite results and every other JSON type are absent.
#[must_use]
pub fn parse_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if matches!(s.to_ascii_lowercase().as_str(), "" | "none" | "nan" | "n/a" | "-") {
                return None;
            }
            s.replace(',', "").parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Parses a calendar date string. Anything unparseable is absent.
#[must_use]
pub fn parse_date(value: Option<&Value>) -> Option<NaiveDate> {
    parse_date_str(value?.as_str()?)
}

/// Parses a calendar date from a string slice.
///
/// A trailing time component (`2024-01-31T00:00:00` or `2024-01-31 16:00:00`)
/// is ignored.
#[must_use]
pub fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let s = s.split(['T', ' ']).next().unwrap_or(s);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parses a free-text field, treating blanks and `"None"` as absent.
#[must_use]
pub fn parse_text(value: Option<&Value>) -> Option<String> {
    let s = value?.as_str()?.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(s.to_string())
    }
}

/// Normalizes a single raw record against an allow-list of numeric fields.
///
/// Every allow-listed field is present in the output, absent when the raw
/// record lacks it or holds a non-numeric value. Other keys are dropped.
#[must_use]
pub fn normalize_record(raw: &Map<String, Value>, fields: &[&str]) -> TickerRecord {
    let fields: BTreeMap<String, Option<f64>> = fields
        .iter()
        .map(|&name| (name.to_string(), parse_number(raw.get(name))))
        .collect();

    TickerRecord {
        period_end: parse_date(raw.get(PERIOD_END_KEY)),
        currency: parse_text(raw.get(CURRENCY_KEY)),
        fields,
    }
}

/// Normalizes the first `depth` raw records into a [`PeriodSeries`].
///
/// Truncation follows the input order (upstream lists are newest first), the
/// resulting series is then ordered by date. Entries that are not JSON objects
/// yield an all-absent record so the count still reflects the input.
#[must_use]
pub fn normalize_series(
    raw: &[Value],
    fields: &[&str],
    depth: usize,
    cadence: Cadence,
) -> PeriodSeries {
    let empty = Map::new();
    let records = raw
        .iter()
        .take(depth)
        .map(|entry| normalize_record(entry.as_object().unwrap_or(&empty), fields))
        .collect();
    PeriodSeries::new(cadence, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FIELDS: &[&str] = &["totalAssets", "totalLiabilities"];

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_parse_number_variants() {
        assert_eq!(parse_number(Some(&json!("100"))), Some(100.0));
        assert_eq!(parse_number(Some(&json!(" 1,234.5 "))), Some(1234.5));
        assert_eq!(parse_number(Some(&json!(-42))), Some(-42.0));
        assert_eq!(parse_number(Some(&json!("None"))), None);
        assert_eq!(parse_number(Some(&json!("n/a"))), None);
        assert_eq!(parse_number(Some(&json!(""))), None);
        assert_eq!(parse_number(Some(&json!("bad"))), None);
        assert_eq!(parse_number(Some(&json!("inf"))), None);
        assert_eq!(parse_number(Some(&json!(true))), None);
        assert_eq!(parse_number(Some(&Value::Null)), None);
        assert_eq!(parse_number(None), None);
    }

    #[test]
    fn test_parse_date_variants() {
        let expected = NaiveDate::from_ymd_opt(2023, 6, 30);
        assert_eq!(parse_date(Some(&json!("2023-06-30"))), expected);
        assert_eq!(parse_date(Some(&json!("2023-06-30T00:00:00"))), expected);
        assert_eq!(parse_date(Some(&json!("2023-06-30 16:00:00"))), expected);
        assert_eq!(parse_date(Some(&json!("None"))), None);
        assert_eq!(parse_date(Some(&json!("2023-13-01"))), None);
        assert_eq!(parse_date(Some(&json!(20230630))), None);
    }

    #[test]
    fn test_malformed_value_is_absent_not_zero() {
        let raw = vec![
            json!({"totalAssets": "100", "totalLiabilities": "40"}),
            json!({"totalAssets": "bad"}),
        ];
        let series = normalize_series(&raw, FIELDS, 2, Cadence::Annual);
        assert_eq!(series.len(), 2);

        let first = &series.records()[0];
        assert_eq!(first.get("totalAssets"), Some(100.0));
        assert_eq!(first.get("totalLiabilities"), Some(40.0));

        let second = &series.records()[1];
        assert!(second.fields.contains_key("totalAssets"));
        assert_eq!(second.fields["totalAssets"], None);
        assert_eq!(second.fields["totalLiabilities"], None);
    }

    #[test]
    fn test_depth_truncates_in_input_order() {
        let raw = vec![
            json!({"fiscalDateEnding": "2023-12-31", "totalAssets": "3"}),
            json!({"fiscalDateEnding": "2022-12-31", "totalAssets": "2"}),
            json!({"fiscalDateEnding": "2021-12-31", "totalAssets": "1"}),
        ];
        let series = normalize_series(&raw, FIELDS, 2, Cadence::Annual);
        let assets: Vec<_> = series.iter().map(|r| r.get("totalAssets")).collect();
        assert_eq!(assets, vec![Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_unlisted_fields_are_dropped() {
        let raw = object(json!({
            "fiscalDateEnding": "2023-12-31",
            "reportedCurrency": "USD",
            "totalAssets": "10",
            "goodwill": "5"
        }));
        let rec = normalize_record(&raw, FIELDS);
        assert_eq!(rec.currency.as_deref(), Some("USD"));
        assert_eq!(rec.fields.len(), 2);
        assert!(!rec.fields.contains_key("goodwill"));
    }

    #[test]
    fn test_normalizing_normalized_record_is_identity() {
        let raw = object(json!({
            "fiscalDateEnding": "2023-12-31",
            "reportedCurrency": "USD",
            "totalAssets": "1,000",
            "totalLiabilities": "None"
        }));
        let once = normalize_record(&raw, FIELDS);
        let serialized = object(serde_json::to_value(&once).unwrap());
        let twice = normalize_record(&serialized, FIELDS);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_non_object_entries_keep_count() {
        let raw = vec![json!("garbage"), json!({"totalAssets": 5})];
        let series = normalize_series(&raw, FIELDS, 10, Cadence::Quarterly);
        assert_eq!(series.len(), 2);
        assert_eq!(series.cadence(), Cadence::Quarterly);
    }
}
