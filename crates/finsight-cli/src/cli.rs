//! CLI argument definitions for finsight.
//!
//! | Command | Description |
//! |---------|-------------|
//! | `fundamentals` | Merged balance sheet, income and cash flow rows |
//! | `statement` | One raw statement history |
//! | `shares` | Shares outstanding with market cap |
//! | `dividends` | Latest dividends |
//! | `insider` | Latest insider trades |
//! | `overview` | Company name, currency and market cap |
//! | `sentiment` | Relevant news with sentiment scores |
//! | `chart` | SVG or PNG fundamentals chart for one ticker |

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use finsight::StatementKind;

/// Company fundamentals from Alpha Vantage.
///
/// Reads the API key from ALPHA_VANTAGE_API_KEY (or a .env file).
#[derive(Debug, Parser)]
#[command(name = "finsight", author, version, about = "Company fundamentals from Alpha Vantage")]
pub(crate) struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub(crate) pretty: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Merged annual and quarterly rows of all three statements.
    Fundamentals(FundamentalsArgs),
    /// One statement's annual and quarterly history.
    Statement(StatementArgs),
    /// Shares outstanding, enriched with market cap.
    Shares(TickerArgs),
    /// Latest dividends, most recent first.
    Dividends(DividendArgs),
    /// Latest insider trades.
    Insider(InsiderArgs),
    /// Company overview.
    Overview(TickerArgs),
    /// Recent news with topic or ticker relevance above 0.2.
    Sentiment(TickerArgs),
    /// Render the fundamentals chart of one ticker as SVG or PNG.
    Chart(ChartArgs),
}

#[derive(Debug, Args)]
pub(crate) struct TickerArgs {
    /// Ticker symbols.
    #[arg(required = true, value_name = "TICKER")]
    pub(crate) tickers: Vec<String>,
}

#[derive(Debug, Args)]
pub(crate) struct FundamentalsArgs {
    #[command(flatten)]
    pub(crate) tickers: TickerArgs,

    /// Also write the merged rows to a Parquet file.
    #[arg(long, value_name = "PATH")]
    pub(crate) parquet: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub(crate) struct StatementArgs {
    #[command(flatten)]
    pub(crate) tickers: TickerArgs,

    /// Statement to fetch.
    #[arg(long, value_enum)]
    pub(crate) kind: StatementArg,
}

#[derive(Debug, Args)]
pub(crate) struct DividendArgs {
    #[command(flatten)]
    pub(crate) tickers: TickerArgs,

    /// Dividends kept per ticker.
    #[arg(long)]
    pub(crate) limit: Option<usize>,

    /// Print an HTML table instead of JSON.
    #[arg(long, default_value_t = false)]
    pub(crate) html: bool,
}

#[derive(Debug, Args)]
pub(crate) struct InsiderArgs {
    #[command(flatten)]
    pub(crate) tickers: TickerArgs,

    /// Trades kept per ticker.
    #[arg(long)]
    pub(crate) limit: Option<usize>,

    /// Print one list of trades tagged by ticker.
    #[arg(long, default_value_t = false, conflicts_with = "html")]
    pub(crate) flat: bool,

    /// Print an HTML table instead of JSON.
    #[arg(long, default_value_t = false)]
    pub(crate) html: bool,
}

#[derive(Debug, Args)]
pub(crate) struct ChartArgs {
    /// Ticker symbol.
    #[arg(value_name = "TICKER")]
    pub(crate) ticker: String,

    /// Where to write the chart.
    #[arg(long, short, value_name = "PATH")]
    pub(crate) output: PathBuf,

    /// Image format; inferred from the output extension when omitted.
    #[arg(long, value_enum)]
    pub(crate) format: Option<ChartFormat>,
}

impl ChartArgs {
    /// The requested format, else `png` for a `.png` output, else `svg`.
    pub(crate) fn resolved_format(&self) -> ChartFormat {
        self.format
            .unwrap_or_else(|| ChartFormat::from_extension(&self.output))
    }
}

/// Chart image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ChartFormat {
    /// Scalable vector graphics.
    Svg,
    /// Portable network graphics.
    Png,
}

impl ChartFormat {
    fn from_extension(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("png") => Self::Png,
            _ => Self::Svg,
        }
    }
}

/// Statement selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum StatementArg {
    /// Balance sheet.
    BalanceSheet,
    /// Income statement.
    IncomeStatement,
    /// Cash flow statement.
    CashFlow,
}

impl From<StatementArg> for StatementKind {
    fn from(arg: StatementArg) -> Self {
        match arg {
            StatementArg::BalanceSheet => Self::BalanceSheet,
            StatementArg::IncomeStatement => Self::IncomeStatement,
            StatementArg::CashFlow => Self::CashFlow,
        }
    }
}
