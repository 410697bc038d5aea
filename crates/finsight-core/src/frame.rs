//! Tabular export of merged fundamentals as a polars [`DataFrame`].

use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::BTreeSet;

use crate::error::{DataError, Result};
use crate::period::Cadence;
use crate::types::{CombinedFundamentals, TickerMap};

/// Column holding the ticker symbol.
pub const TICKER_COLUMN: &str = "ticker";
/// Column holding the cadence name.
pub const CADENCE_COLUMN: &str = "cadence";
/// Column holding the fiscal period end.
pub const DATE_COLUMN: &str = "fiscal_date_ending";
/// Column holding the reporting currency.
pub const CURRENCY_COLUMN: &str = "currency";

fn days_since_epoch(date: NaiveDate) -> i32 {
    (date - NaiveDate::default()).num_days() as i32
}

/// Flattens merged fundamentals for many tickers into one frame.
///
/// Columns are `ticker`, `cadence`, `fiscal_date_ending` (Date), `currency`
/// and one nullable float column per field name found in any row, sorted by
/// name. Absent tickers contribute no rows. Rows are sorted by ticker,
/// cadence and date.
pub fn fundamentals_frame(fundamentals: &TickerMap<CombinedFundamentals>) -> Result<DataFrame> {
    let rows: Vec<_> = fundamentals
        .iter()
        .filter_map(|(symbol, combined)| Some((symbol, combined.as_ref()?)))
        .flat_map(|(symbol, combined)| {
            [Cadence::Annual, Cadence::Quarterly]
                .into_iter()
                .flat_map(move |cadence| {
                    combined
                        .rows(cadence)
                        .iter()
                        .map(move |row| (symbol, cadence, row))
                })
        })
        .collect();

    let field_names: BTreeSet<&str> = rows
        .iter()
        .flat_map(|(_, _, row)| row.fields.keys().map(String::as_str))
        .collect();

    let tickers: Vec<&str> = rows.iter().map(|(s, _, _)| s.as_str()).collect();
    let cadences: Vec<&str> = rows.iter().map(|(_, c, _)| c.as_str()).collect();
    let dates: Vec<i32> = rows
        .iter()
        .map(|(_, _, row)| days_since_epoch(row.period_end))
        .collect();
    let currencies: Vec<Option<&str>> = rows
        .iter()
        .map(|(_, _, row)| row.currency.as_deref())
        .collect();

    let dates = Series::new(DATE_COLUMN.into(), dates)
        .cast(&DataType::Date)
        .map_err(|e| DataError::Other(e.to_string()))?;

    let mut columns = vec![
        Column::new(TICKER_COLUMN.into(), tickers),
        Column::new(CADENCE_COLUMN.into(), cadences),
        Column::from(dates),
        Column::new(CURRENCY_COLUMN.into(), currencies),
    ];
    for name in field_names {
        let values: Vec<Option<f64>> = rows.iter().map(|(_, _, row)| row.get(name)).collect();
        columns.push(Column::new(name.into(), values));
    }

    let df = DataFrame::new(columns).map_err(|e| DataError::Other(e.to_string()))?;

    df.lazy()
        .sort([TICKER_COLUMN, CADENCE_COLUMN, DATE_COLUMN], Default::default())
        .collect()
        .map_err(|e| DataError::Other(e.to_string()))
}
