#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/finsight-rs/finsight/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Charts and HTML fragments for finsight reports.
//!
//! - [`figure`] - Backend-neutral figure model and the [`ChartRenderer`] trait
//! - [`svg`] - The SVG backend
//! - [`png`] - PNG rasterization of the SVG backend
//! - [`fundamentals`] - The 4x2 fundamentals figure layout
//! - [`html`] - Insider trade and dividend tables

/// Figure model and renderer trait.
pub mod figure;
/// Fundamentals figure layout.
pub mod fundamentals;
/// HTML tables.
pub mod html;
/// PNG backend.
pub mod png;
/// SVG backend.
pub mod svg;

mod format;

pub use figure::{
    ChartArtifact, ChartRenderer, ChartSeries, Color, Figure, Marker, Panel, SeriesStyle,
};
pub use fundamentals::fundamentals_figure;
pub use html::{dividends_html, insider_trades_html};
pub use png::{PNG_MEDIA_TYPE, PngRenderer};
pub use svg::{SVG_MEDIA_TYPE, SvgRenderer};
