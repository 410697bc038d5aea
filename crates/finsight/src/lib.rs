#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/finsight-rs/finsight/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Company fundamentals reports.
//!
//! This crate re-exports [`finsight_core`], the Alpha Vantage provider and
//! the renderers, and provides [`ReportService`] for batch fetches with
//! per-ticker failure isolation, configured through [`Settings`].
//!
//! # Example
//!
//! ```rust,ignore
//! use finsight::{ReportService, Settings, Symbol, SvgRenderer, ChartRenderer, fundamentals_figure};
//!
//! #[tokio::main]
//! async fn main() -> finsight::Result<()> {
//!     let service = ReportService::from_settings(&Settings::from_env()?)?;
//!
//!     let ibm = Symbol::new("IBM");
//!     let fundamentals = service.fetch_fundamentals(&[ibm.clone()]).await?;
//!     if let Some(Some(combined)) = fundamentals.get(&ibm) {
//!         let chart = SvgRenderer::new().render(&fundamentals_figure(&ibm, combined, None))?;
//!         std::fs::write("ibm.svg", chart.bytes).ok();
//!     }
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use finsight_core::*;

// Providers
pub use finsight_alphavantage::AlphaVantageProvider;

// Rendering
pub use finsight_render::{
    ChartArtifact, ChartRenderer, Figure, PngRenderer, SvgRenderer, dividends_html,
    fundamentals_figure, insider_trades_html,
};

/// Environment configuration.
pub mod config;
pub use config::Settings;

mod service;
pub use service::{ReportService, flatten_insider_trades};
