//! The per-ticker fundamentals figure.
//!
//! Eight panels in a 4x2 grid, quarterly on the left and annual on the
//! right: balance sheet, income statement, cash flow and shares outstanding.
//! Every panel is scaled on its own with [`auto_scale`].

use chrono::NaiveDate;
use finsight_core::{
    Cadence, CombinedFundamentals, MergedRow, SharesSnapshot, StatementKind, Symbol, auto_scale,
};

use crate::figure::{Color, Figure, Marker, Panel, SeriesStyle};

const DEFAULT_CURRENCY: &str = "USD";
const SHARES_BASIC: &str = "shares_outstanding_basic";
const SHARES_DILUTED: &str = "shares_outstanding_diluted";

type SeriesSpec = (&'static str, Marker, Color, &'static str);

const BALANCE_SERIES: &[SeriesSpec] = &[
    ("totalAssets", Marker::Circle, Color::Blue, "Total Assets"),
    ("totalLiabilities", Marker::Cross, Color::Orange, "Total Liabilities"),
    ("totalShareholderEquity", Marker::Diamond, Color::Green, "Total Shareholder Equity"),
];

const INCOME_SERIES: &[SeriesSpec] = &[
    ("netIncome", Marker::TriangleUp, Color::Green, "Net Income"),
    ("totalRevenue", Marker::Square, Color::Blue, "Total Revenue"),
    ("costOfRevenue", Marker::Circle, Color::Orange, "Cost of Revenue"),
    ("ebitda", Marker::ThinDiamond, Color::Purple, "EBITDA"),
];

const CASH_FLOW_SERIES: &[SeriesSpec] = &[
    ("operatingCashflow", Marker::TriangleDown, Color::Blue, "Operating Cashflow"),
    ("cashflowFromInvestment", Marker::Plus, Color::Orange, "Investment Cashflow"),
    ("cashflowFromFinancing", Marker::Star, Color::Red, "Financing Cashflow"),
];

const SHARES_SERIES: &[SeriesSpec] = &[
    (SHARES_BASIC, Marker::Circle, Color::Blue, "Shares Outstanding Basic"),
    (SHARES_DILUTED, Marker::Cross, Color::Orange, "Shares Outstanding Diluted"),
];

const fn series_for(kind: StatementKind) -> &'static [SeriesSpec] {
    match kind {
        StatementKind::BalanceSheet => BALANCE_SERIES,
        StatementKind::IncomeStatement => INCOME_SERIES,
        StatementKind::CashFlow => CASH_FLOW_SERIES,
    }
}

const fn cadence_title(cadence: Cadence) -> &'static str {
    match cadence {
        Cadence::Annual => "Annual",
        Cadence::Quarterly => "Quarterly",
    }
}

/// Lays out the fundamentals figure for one ticker.
///
/// `shares` is the standalone shares outstanding series; when it has dated
/// snapshots it is drawn in both shares panels, otherwise share fields found
/// in the merged rows are used. Panels without data are kept and render as
/// placeholders.
#[must_use]
pub fn fundamentals_figure(
    ticker: &Symbol,
    fundamentals: &CombinedFundamentals,
    shares: Option<&[SharesSnapshot]>,
) -> Figure {
    let currency = fundamentals.reported_currency().unwrap_or(DEFAULT_CURRENCY);
    let cadences = [Cadence::Quarterly, Cadence::Annual];

    let mut panels = Vec::with_capacity(8);
    for kind in StatementKind::ALL {
        for cadence in cadences {
            let title = format!("{ticker} {} {}", cadence_title(cadence), kind.title());
            panels.push(rows_panel(
                title,
                fundamentals.rows(cadence),
                series_for(kind),
                Some(currency),
            ));
        }
    }

    let standalone = shares
        .map(|snapshots| standalone_shares_panel(ticker, snapshots))
        .filter(|panel| !panel.x.is_empty());
    for cadence in cadences {
        let panel = standalone.clone().unwrap_or_else(|| {
            rows_panel(
                format!("{ticker} {} Shares Outstanding", cadence_title(cadence)),
                fundamentals.rows(cadence),
                SHARES_SERIES,
                None,
            )
        });
        panels.push(panel);
    }

    tracing::debug!(
        %ticker,
        annual = fundamentals.annual.len(),
        quarterly = fundamentals.quarterly.len(),
        standalone_shares = standalone.is_some(),
        "Built fundamentals figure"
    );

    Figure::new(2, panels)
}

fn y_label(label: &str) -> String {
    if label.is_empty() {
        "Value".to_string()
    } else {
        format!("Value ({label})")
    }
}

/// A panel over merged rows.
fn rows_panel(
    title: String,
    rows: &[MergedRow],
    specs: &[SeriesSpec],
    unit: Option<&str>,
) -> Panel {
    let raw: Vec<Vec<Option<f64>>> = specs
        .iter()
        .map(|(field, ..)| rows.iter().map(|row| row.get(field)).collect())
        .collect();
    let x = rows.iter().map(|row| row.period_end).collect();
    scaled_panel(title, x, specs, raw, unit)
}

/// The standalone shares series, dated snapshots only, ascending.
fn standalone_shares_panel(ticker: &Symbol, snapshots: &[SharesSnapshot]) -> Panel {
    let mut dated: Vec<&SharesSnapshot> = snapshots.iter().filter(|s| s.date.is_some()).collect();
    dated.sort_by_key(|s| s.date);

    let raw: Vec<Vec<Option<f64>>> = vec![
        dated.iter().map(|s| s.basic).collect(),
        dated.iter().map(|s| s.diluted).collect(),
    ];
    let x = dated.iter().filter_map(|s| s.date).collect();
    scaled_panel(format!("{ticker} Shares Outstanding"), x, SHARES_SERIES, raw, None)
}

/// Builds a panel with one scale computed across all its series.
fn scaled_panel(
    title: String,
    x: Vec<NaiveDate>,
    specs: &[SeriesSpec],
    raw: Vec<Vec<Option<f64>>>,
    unit: Option<&str>,
) -> Panel {
    let scale = auto_scale(raw.iter().flatten().copied(), unit);
    let mut panel = Panel::new(title, y_label(&scale.label), x);
    for ((_, marker, color, label), values) in specs.iter().zip(&raw) {
        panel = panel.with_series(
            SeriesStyle::new(*marker, *color, *label),
            scale.apply_all(values),
        );
    }
    panel
}
