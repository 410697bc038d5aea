//! Email-friendly HTML tables.
//!
//! Tables use inline styles only, since most mail clients drop `<style>`
//! blocks. Every text cell is escaped.

use chrono::NaiveDate;
use finsight_core::{DividendRecord, InsiderTrade, Symbol, TickerMap};

use crate::format::{escape, group_thousands};

const TABLE_STYLE: &str =
    "width:100%;border-collapse:collapse;font-family:sans-serif;font-size:12px;";
const HEADING_STYLE: &str = "margin-bottom:8px;margin-top:18px;";
const HEADER_ROW_STYLE: &str = "background:#333;color:#fff;";
const HEADER_CELL_STYLE: &str = "padding:6px;border:1px solid #ccc;";
const TICKER_ROW_STYLE: &str = "background:#f0f0f0;";
const NUMBER_CELL_STYLE: &str = "text-align:right;";

const INSIDER_COLUMNS: [&str; 8] = [
    "Date",
    "Executive",
    "Title",
    "Security",
    "Action (Acquisition / Disposal)",
    "No of Shares",
    "Price",
    "Total Trade Value",
];

const DIVIDEND_COLUMNS: [&str; 5] = [
    "Ex-Dividend Date",
    "Declaration Date",
    "Record Date",
    "Payment Date",
    "Amount",
];

/// Renders per-ticker insider trades as one table with a header row per
/// ticker.
///
/// Tickers whose fetch failed, or that have no trades, get a "No data" row.
/// An empty map renders a single paragraph.
#[must_use]
pub fn insider_trades_html(trades: &TickerMap<Vec<InsiderTrade>>) -> String {
    if trades.is_empty() {
        return "<p>No insider trades available.</p>".to_string();
    }

    let body = ticker_sections(trades, INSIDER_COLUMNS.len(), |trade| {
        [
            text_cell(trade.transaction_date.map(format_date).as_deref()),
            text_cell(trade.executive.as_deref()),
            text_cell(trade.executive_title.as_deref()),
            text_cell(trade.security_type.as_deref()),
            text_cell(trade.acquisition_or_disposal.as_deref()),
            number_cell(trade.shares.map(|v| v.to_string())),
            number_cell(trade.share_price.map(|v| v.to_string())),
            number_cell(Some(trade_value_display(trade))),
        ]
        .concat()
    });

    table("Latest Insider trades", &INSIDER_COLUMNS, &body)
}

/// Renders per-ticker dividends, in the same layout as
/// [`insider_trades_html`].
#[must_use]
pub fn dividends_html(dividends: &TickerMap<Vec<DividendRecord>>) -> String {
    if dividends.is_empty() {
        return "<p>No dividends available.</p>".to_string();
    }

    let body = ticker_sections(dividends, DIVIDEND_COLUMNS.len(), |d| {
        [
            text_cell(d.ex_dividend_date.map(format_date).as_deref()),
            text_cell(d.declaration_date.map(format_date).as_deref()),
            text_cell(d.record_date.map(format_date).as_deref()),
            text_cell(d.payment_date.map(format_date).as_deref()),
            number_cell(d.amount.map(|v| v.to_string())),
        ]
        .concat()
    });

    table("Latest Dividends", &DIVIDEND_COLUMNS, &body)
}

/// Total value shown for a trade: `N/A` when it is zero or cannot be computed.
fn trade_value_display(trade: &InsiderTrade) -> String {
    let total = trade
        .share_price
        .filter(|price| *price != 0.0)
        .and(InsiderTrade::traded_value(trade.shares, trade.share_price))
        .filter(|total| *total != 0.0 && total.is_finite());
    total.map_or_else(|| "N/A".to_string(), |t| group_thousands(t, 2, ','))
}

fn ticker_sections<T>(
    map: &TickerMap<Vec<T>>,
    columns: usize,
    row: impl Fn(&T) -> String,
) -> String {
    let mut body = String::new();
    for (ticker, entries) in map {
        match entries.as_deref() {
            None | Some([]) => body.push_str(&no_data_row(ticker, columns)),
            Some(entries) => {
                body.push_str(&format!(
                    "<tr style='{TICKER_ROW_STYLE}'><td colspan='{columns}' style='font-weight:bold;text-align:center;'>{}</td></tr>",
                    escape(ticker.as_str())
                ));
                for entry in entries {
                    body.push_str("<tr>");
                    body.push_str(&row(entry));
                    body.push_str("</tr>");
                }
            }
        }
    }
    body
}

fn no_data_row(ticker: &Symbol, columns: usize) -> String {
    format!(
        "<tr><td colspan='{columns}'><b>{}</b>: No data</td></tr>",
        escape(ticker.as_str())
    )
}

fn table(heading: &str, columns: &[&str], body: &str) -> String {
    let header: String = columns
        .iter()
        .map(|c| format!("<th style='{HEADER_CELL_STYLE}'>{}</th>", escape(c)))
        .collect();
    format!(
        "<h4 style='{HEADING_STYLE}'>{}</h4><table style='{TABLE_STYLE}'><thead><tr style='{HEADER_ROW_STYLE}'>{header}</tr></thead><tbody>{body}</tbody></table>",
        escape(heading)
    )
}

fn text_cell(value: Option<&str>) -> String {
    format!("<td>{}</td>", escape(value.unwrap_or_default()))
}

fn number_cell(value: Option<String>) -> String {
    format!(
        "<td style='{NUMBER_CELL_STYLE}'>{}</td>",
        escape(value.as_deref().unwrap_or_default())
    )
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
