//! Command execution.

use std::fs::File;
use std::path::Path;

use finsight::{
    ChartRenderer, PngRenderer, ReportService, Settings, SvgRenderer, Symbol, dividends_html,
    flatten_insider_trades, fundamentals_figure, fundamentals_frame, insider_trades_html,
};
use polars::prelude::ParquetWriter;
use serde::Serialize;
use tracing::info;

use crate::cli::{ChartArgs, ChartFormat, Cli, Command, TickerArgs};
use crate::error::CliError;

pub(crate) async fn run(cli: &Cli) -> Result<(), CliError> {
    let settings = Settings::from_env()?;
    let service = ReportService::from_settings(&settings)?;

    match &cli.command {
        Command::Fundamentals(args) => {
            let fundamentals = service.fetch_fundamentals(&symbols(&args.tickers)).await?;
            if let Some(path) = &args.parquet {
                write_parquet(&fundamentals, path)?;
            }
            emit_json(&fundamentals, cli.pretty)
        }
        Command::Statement(args) => {
            let statements = service
                .fetch_statements(&symbols(&args.tickers), args.kind.into())
                .await?;
            emit_json(&statements, cli.pretty)
        }
        Command::Shares(args) => {
            let shares = service.fetch_shares_with_market_cap(&symbols(args)).await?;
            emit_json(&shares, cli.pretty)
        }
        Command::Dividends(args) => {
            let service = service.with_limits(
                args.limit.unwrap_or(settings.dividend_limit),
                settings.insider_limit,
            );
            let dividends = service.fetch_dividends(&symbols(&args.tickers)).await?;
            if args.html {
                emit_text(&dividends_html(&dividends));
                Ok(())
            } else {
                emit_json(&dividends, cli.pretty)
            }
        }
        Command::Insider(args) => {
            let service = service.with_limits(
                settings.dividend_limit,
                args.limit.unwrap_or(settings.insider_limit),
            );
            let trades = service.fetch_insider_trades(&symbols(&args.tickers)).await?;
            if args.html {
                emit_text(&insider_trades_html(&trades));
                Ok(())
            } else if args.flat {
                emit_json(&flatten_insider_trades(&trades), cli.pretty)
            } else {
                emit_json(&trades, cli.pretty)
            }
        }
        Command::Overview(args) => {
            let overviews = service.fetch_overviews(&symbols(args)).await?;
            emit_json(&overviews, cli.pretty)
        }
        Command::Sentiment(args) => {
            let news = service.fetch_sentiment(&symbols(args)).await?;
            emit_json(&news, cli.pretty)
        }
        Command::Chart(args) => write_chart(&service, args).await,
    }
}

fn symbols(args: &TickerArgs) -> Vec<Symbol> {
    args.tickers.iter().map(Symbol::new).collect()
}

async fn write_chart(service: &ReportService, args: &ChartArgs) -> Result<(), CliError> {
    let symbol = Symbol::new(&args.ticker);
    let tickers = std::slice::from_ref(&symbol);
    let fundamentals = service.fetch_fundamentals(tickers).await?;
    let Some(Some(combined)) = fundamentals.get(&symbol) else {
        return Err(CliError::Command(format!("no fundamentals available for {symbol}")));
    };

    let shares = service.fetch_shares_with_market_cap(tickers).await?;
    let snapshots = shares.get(&symbol).and_then(Option::as_deref);

    let figure = fundamentals_figure(&symbol, combined, snapshots);
    let chart = match args.resolved_format() {
        ChartFormat::Svg => SvgRenderer::new().render(&figure)?,
        ChartFormat::Png => PngRenderer::new().render(&figure)?,
    };
    std::fs::write(&args.output, &chart.bytes)?;
    info!(
        symbol = %symbol,
        path = %args.output.display(),
        media_type = chart.media_type,
        bytes = chart.bytes.len(),
        "Wrote chart"
    );
    Ok(())
}

fn write_parquet(
    fundamentals: &finsight::TickerMap<finsight::CombinedFundamentals>,
    path: &Path,
) -> Result<(), CliError> {
    let mut frame = fundamentals_frame(fundamentals)?;
    let file = File::create(path)?;
    ParquetWriter::new(file)
        .finish(&mut frame)
        .map_err(|e| CliError::Command(format!("parquet export failed: {e}")))?;
    info!(path = %path.display(), rows = frame.height(), "Wrote parquet");
    Ok(())
}

fn emit_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    emit_text(&json);
    Ok(())
}

fn emit_text(text: &str) {
    println!("{text}");
}
