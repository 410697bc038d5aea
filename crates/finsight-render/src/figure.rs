//! Backend-neutral chart description.

use chrono::NaiveDate;
use finsight_core::Result;

/// Point marker drawn at each value of a series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Filled circle.
    Circle,
    /// Diagonal cross.
    Cross,
    /// Square rotated 45 degrees.
    Diamond,
    /// Narrow diamond.
    ThinDiamond,
    /// Upward triangle.
    TriangleUp,
    /// Downward triangle.
    TriangleDown,
    /// Square.
    Square,
    /// Filled plus.
    Plus,
    /// Five-pointed star.
    Star,
}

/// A named palette color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    /// Blue.
    Blue,
    /// Orange.
    Orange,
    /// Green.
    Green,
    /// Red.
    Red,
    /// Purple.
    Purple,
}

impl Color {
    /// Hex code of the color.
    #[must_use]
    pub const fn hex(&self) -> &'static str {
        match self {
            Self::Blue => "#1f77b4",
            Self::Orange => "#ff7f0e",
            Self::Green => "#2ca02c",
            Self::Red => "#d62728",
            Self::Purple => "#9467bd",
        }
    }
}

/// Display metadata of a series.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeriesStyle {
    /// Point marker.
    pub marker: Marker,
    /// Line and marker color.
    pub color: Color,
    /// Legend label.
    pub label: String,
}

impl SeriesStyle {
    /// Creates a style.
    #[must_use]
    pub fn new(marker: Marker, color: Color, label: impl Into<String>) -> Self {
        Self {
            marker,
            color,
            label: label.into(),
        }
    }
}

/// One line of a panel, aligned with the panel's x values.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartSeries {
    /// How the series is drawn.
    pub style: SeriesStyle,
    /// Scaled values; `None` is a gap.
    pub values: Vec<Option<f64>>,
}

/// A titled chart area with a shared date axis.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Panel {
    /// Panel title.
    pub title: String,
    /// Y axis label, e.g. "Value (Billions USD)".
    pub y_label: String,
    /// Dates along the x axis, ascending.
    pub x: Vec<NaiveDate>,
    /// Series drawn over `x`.
    pub series: Vec<ChartSeries>,
}

impl Panel {
    /// Creates a panel without series.
    #[must_use]
    pub fn new(title: impl Into<String>, y_label: impl Into<String>, x: Vec<NaiveDate>) -> Self {
        Self {
            title: title.into(),
            y_label: y_label.into(),
            x,
            series: Vec::new(),
        }
    }

    /// Adds a series.
    #[must_use]
    pub fn with_series(mut self, style: SeriesStyle, values: Vec<Option<f64>>) -> Self {
        self.series.push(ChartSeries { style, values });
        self
    }

    /// Finite values paired with their dates, per series.
    pub fn points(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.series.iter().flat_map(move |s| {
            self.x
                .iter()
                .zip(&s.values)
                .filter_map(|(date, value)| value.filter(|v| v.is_finite()).map(|v| (*date, v)))
        })
    }

    /// Returns true if nothing in the panel can be drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points().next().is_none()
    }
}

/// A grid of panels, filled row by row.
#[derive(Clone, Debug, PartialEq)]
pub struct Figure {
    /// Number of panel columns.
    pub columns: usize,
    /// Panels in row-major order.
    pub panels: Vec<Panel>,
}

impl Figure {
    /// Creates a figure with the given column count.
    #[must_use]
    pub fn new(columns: usize, panels: Vec<Panel>) -> Self {
        Self {
            columns: columns.max(1),
            panels,
        }
    }

    /// Number of panel rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.panels.len().div_ceil(self.columns)
    }
}

/// Rendered chart bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartArtifact {
    /// MIME type, e.g. `image/svg+xml`.
    pub media_type: &'static str,
    /// Encoded chart.
    pub bytes: Vec<u8>,
}

/// A chart backend.
pub trait ChartRenderer: Send + Sync {
    /// Draws a figure.
    ///
    /// Empty panels must render as placeholders rather than fail.
    fn render(&self, figure: &Figure) -> Result<ChartArtifact>;
}
