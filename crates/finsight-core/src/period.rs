//! Reporting cadence, statement kinds and history depth.
//!
//! [`Cadence`] distinguishes annual from quarterly series, [`StatementKind`]
//! names the three financial statements together with the fields kept from
//! each, and [`HistoryDepth`] bounds how many periods are retained.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reporting cadence of a statement series.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    /// Annual reports.
    #[default]
    Annual,
    /// Quarterly reports.
    Quarterly,
}

impl Cadence {
    /// Returns the lowercase name used in serialized output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Quarterly => "quarterly",
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The financial statements that make up a fundamentals report.
///
/// The declaration order is also the merge precedence order: balance sheet
/// fields win over income statement fields, which win over cash flow fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    /// Balance sheet.
    BalanceSheet,
    /// Income statement.
    IncomeStatement,
    /// Cash flow statement.
    CashFlow,
}

impl StatementKind {
    /// All statement kinds in merge precedence order.
    pub const ALL: [Self; 3] = [Self::BalanceSheet, Self::IncomeStatement, Self::CashFlow];

    /// Numeric fields retained for this statement.
    #[must_use]
    pub const fn fields(&self) -> &'static [&'static str] {
        match self {
            Self::BalanceSheet => &["totalAssets", "totalLiabilities", "totalShareholderEquity"],
            Self::IncomeStatement => &["totalRevenue", "costOfRevenue", "ebitda", "netIncome"],
            Self::CashFlow => &[
                "operatingCashflow",
                "cashflowFromInvestment",
                "cashflowFromFinancing",
            ],
        }
    }

    /// Human readable title, e.g. "Balance Sheet".
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::BalanceSheet => "Balance Sheet",
            Self::IncomeStatement => "Income Statement",
            Self::CashFlow => "Cashflow Statement",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// How many periods of history to keep per cadence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryDepth {
    /// Number of annual periods.
    pub years: usize,
    /// Number of quarterly periods.
    pub quarters: usize,
}

impl HistoryDepth {
    /// Creates a new history depth.
    #[must_use]
    pub const fn new(years: usize, quarters: usize) -> Self {
        Self { years, quarters }
    }

    /// Returns the depth for the given cadence.
    #[must_use]
    pub const fn for_cadence(&self, cadence: Cadence) -> usize {
        match cadence {
            Cadence::Annual => self.years,
            Cadence::Quarterly => self.quarters,
        }
    }
}

impl Default for HistoryDepth {
    fn default() -> Self {
        Self::new(10, 12)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_fields_are_disjoint() {
        let mut seen = std::collections::HashSet::new();
        for kind in StatementKind::ALL {
            for field in kind.fields() {
                assert!(seen.insert(*field), "{field} appears in two statements");
            }
        }
    }

    #[test]
    fn test_precedence_order() {
        assert!(StatementKind::BalanceSheet < StatementKind::IncomeStatement);
        assert!(StatementKind::IncomeStatement < StatementKind::CashFlow);
    }

    #[test]
    fn test_default_depth() {
        let depth = HistoryDepth::default();
        assert_eq!(depth.for_cadence(Cadence::Annual), 10);
        assert_eq!(depth.for_cadence(Cadence::Quarterly), 12);
    }
}
