//! SVG chart backend.

use std::f64::consts::PI;
use std::fmt::{self, Write};

use chrono::NaiveDate;
use finsight_core::{DataError, Result};

use crate::figure::{ChartArtifact, ChartRenderer, ChartSeries, Figure, Marker, Panel};
use crate::format::{escape, group_thousands};

const PANEL_WIDTH: f64 = 800.0;
const PANEL_HEIGHT: f64 = 450.0;
const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 80.0;
const Y_TICKS: usize = 5;
const MARKER_SIZE: f64 = 4.0;

/// Media type of rendered charts.
pub const SVG_MEDIA_TYPE: &str = "image/svg+xml";

/// Draws figures as standalone SVG documents.
#[derive(Clone, Copy, Debug, Default)]
pub struct SvgRenderer;

impl SvgRenderer {
    /// Creates a renderer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Renders a figure to an SVG string.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Other`] if writing the document fails.
    pub fn render_to_string(&self, figure: &Figure) -> Result<String> {
        let mut out = String::new();
        write_figure(&mut out, figure).map_err(|e| DataError::Other(format!("SVG output: {e}")))?;
        Ok(out)
    }
}

impl ChartRenderer for SvgRenderer {
    fn render(&self, figure: &Figure) -> Result<ChartArtifact> {
        let svg = self.render_to_string(figure)?;
        tracing::debug!(panels = figure.panels.len(), bytes = svg.len(), "Rendered SVG figure");
        Ok(ChartArtifact {
            media_type: SVG_MEDIA_TYPE,
            bytes: svg.into_bytes(),
        })
    }
}

/// Plot area of one panel in document coordinates.
#[derive(Clone, Copy, Debug)]
struct Frame {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl Frame {
    fn for_cell(row: usize, column: usize) -> Self {
        Self {
            left: column as f64 * PANEL_WIDTH + MARGIN_LEFT,
            top: row as f64 * PANEL_HEIGHT + MARGIN_TOP,
            width: PANEL_WIDTH - MARGIN_LEFT - MARGIN_RIGHT,
            height: PANEL_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM,
        }
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }

    fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }
}

/// Maps dates and values into a frame.
#[derive(Clone, Copy, Debug)]
struct Scales {
    first: NaiveDate,
    span_days: f64,
    y_min: f64,
    y_max: f64,
}

impl Scales {
    fn for_panel(panel: &Panel) -> Option<Self> {
        let mut points = panel.points();
        let (first_date, first_value) = points.next()?;
        let (mut first, mut last) = (first_date, first_date);
        let (mut y_min, mut y_max) = (first_value, first_value);
        for (date, value) in points {
            first = first.min(date);
            last = last.max(date);
            y_min = y_min.min(value);
            y_max = y_max.max(value);
        }

        let pad = if y_max > y_min {
            (y_max - y_min) * 0.05
        } else {
            y_max.abs().max(1.0) * 0.1
        };

        Some(Self {
            first,
            span_days: (last - first).num_days() as f64,
            y_min: y_min - pad,
            y_max: y_max + pad,
        })
    }

    fn x(&self, frame: &Frame, date: NaiveDate) -> f64 {
        if self.span_days <= 0.0 {
            return frame.center_x();
        }
        let offset = (date - self.first).num_days() as f64;
        frame.left + offset / self.span_days * frame.width
    }

    fn y(&self, frame: &Frame, value: f64) -> f64 {
        frame.bottom() - (value - self.y_min) / (self.y_max - self.y_min) * frame.height
    }
}

fn write_figure(out: &mut String, figure: &Figure) -> fmt::Result {
    let width = figure.columns as f64 * PANEL_WIDTH;
    let height = figure.rows() as f64 * PANEL_HEIGHT;
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" font-family="sans-serif" font-size="11">"#
    )?;
    writeln!(out, r#"<rect width="100%" height="100%" fill="white"/>"#)?;

    for (index, panel) in figure.panels.iter().enumerate() {
        let frame = Frame::for_cell(index / figure.columns, index % figure.columns);
        write_panel(out, panel, &frame)?;
    }

    writeln!(out, "</svg>")
}

fn write_panel(out: &mut String, panel: &Panel, frame: &Frame) -> fmt::Result {
    writeln!(out, "<g>")?;
    writeln!(
        out,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="14" font-weight="bold">{}</text>"#,
        frame.center_x(),
        frame.top - 14.0,
        escape(&panel.title)
    )?;
    writeln!(
        out,
        r##"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="none" stroke="#444"/>"##,
        frame.left, frame.top, frame.width, frame.height
    )?;

    let Some(scales) = Scales::for_panel(panel) else {
        writeln!(
            out,
            r##"<text x="{:.1}" y="{:.1}" text-anchor="middle" fill="#888">No data</text>"##,
            frame.center_x(),
            frame.top + frame.height / 2.0
        )?;
        return writeln!(out, "</g>");
    };

    write_y_axis(out, panel, frame, &scales)?;
    write_x_axis(out, panel, frame, &scales)?;
    for series in &panel.series {
        write_series(out, &panel.x, series, frame, &scales)?;
    }
    write_legend(out, panel, frame)?;
    writeln!(out, "</g>")
}

fn write_y_axis(out: &mut String, panel: &Panel, frame: &Frame, scales: &Scales) -> fmt::Result {
    let step = (scales.y_max - scales.y_min) / (Y_TICKS - 1) as f64;
    let decimals = if scales.y_max - scales.y_min < 10.0 { 1 } else { 0 };
    for i in 0..Y_TICKS {
        let value = scales.y_min + step * i as f64;
        let y = scales.y(frame, value);
        writeln!(
            out,
            r##"<line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="#ddd"/>"##,
            frame.left,
            frame.left + frame.width
        )?;
        writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end">{}</text>"#,
            frame.left - 6.0,
            y + 4.0,
            group_thousands(value, decimals, '\'')
        )?;
    }

    let (x, y) = (frame.left - 70.0, frame.top + frame.height / 2.0);
    writeln!(
        out,
        r#"<text x="{x:.1}" y="{y:.1}" text-anchor="middle" transform="rotate(-90 {x:.1} {y:.1})">{}</text>"#,
        escape(&panel.y_label)
    )
}

fn write_x_axis(out: &mut String, panel: &Panel, frame: &Frame, scales: &Scales) -> fmt::Result {
    for date in &panel.x {
        let x = scales.x(frame, *date);
        let y = frame.bottom() + 12.0;
        writeln!(
            out,
            r#"<text x="{x:.1}" y="{y:.1}" text-anchor="end" transform="rotate(-45 {x:.1} {y:.1})">{}</text>"#,
            date.format("%d.%m.%Y")
        )?;
    }
    Ok(())
}

fn write_series(
    out: &mut String,
    x: &[NaiveDate],
    series: &ChartSeries,
    frame: &Frame,
    scales: &Scales,
) -> fmt::Result {
    let color = series.style.color.hex();
    let mut segment: Vec<(f64, f64)> = Vec::new();
    let mut segments: Vec<Vec<(f64, f64)>> = Vec::new();

    for (date, value) in x.iter().zip(&series.values) {
        match value.filter(|v| v.is_finite()) {
            Some(v) => segment.push((scales.x(frame, *date), scales.y(frame, v))),
            None => segments.push(std::mem::take(&mut segment)),
        }
    }
    segments.push(segment);

    for points in segments.iter().filter(|s| s.len() > 1) {
        let coords: Vec<String> = points.iter().map(|(x, y)| format!("{x:.1},{y:.1}")).collect();
        writeln!(
            out,
            r#"<polyline points="{}" fill="none" stroke="{color}" stroke-width="1.5"/>"#,
            coords.join(" ")
        )?;
    }

    for (px, py) in segments.iter().flatten() {
        write_marker(out, series.style.marker, *px, *py, color)?;
    }
    Ok(())
}

fn polygon(out: &mut String, points: &[(f64, f64)], color: &str) -> fmt::Result {
    let coords: Vec<String> = points.iter().map(|(x, y)| format!("{x:.1},{y:.1}")).collect();
    writeln!(out, r#"<polygon points="{}" fill="{color}"/>"#, coords.join(" "))
}

fn write_marker(out: &mut String, marker: Marker, x: f64, y: f64, color: &str) -> fmt::Result {
    let s = MARKER_SIZE;
    match marker {
        Marker::Circle => writeln!(out, r#"<circle cx="{x:.1}" cy="{y:.1}" r="{s}" fill="{color}"/>"#),
        Marker::Square => writeln!(
            out,
            r#"<rect x="{:.1}" y="{:.1}" width="{}" height="{}" fill="{color}"/>"#,
            x - s,
            y - s,
            2.0 * s,
            2.0 * s
        ),
        Marker::Cross => writeln!(
            out,
            r#"<path d="M{:.1} {:.1}L{:.1} {:.1}M{:.1} {:.1}L{:.1} {:.1}" stroke="{color}" stroke-width="2"/>"#,
            x - s,
            y - s,
            x + s,
            y + s,
            x - s,
            y + s,
            x + s,
            y - s
        ),
        Marker::Plus => writeln!(
            out,
            r#"<path d="M{:.1} {y:.1}H{:.1}M{x:.1} {:.1}V{:.1}" stroke="{color}" stroke-width="3"/>"#,
            x - s - 1.0,
            x + s + 1.0,
            y - s - 1.0,
            y + s + 1.0
        ),
        Marker::Diamond => polygon(
            out,
            &[(x, y - s - 1.0), (x + s + 1.0, y), (x, y + s + 1.0), (x - s - 1.0, y)],
            color,
        ),
        Marker::ThinDiamond => polygon(
            out,
            &[(x, y - s - 1.0), (x + s * 0.6, y), (x, y + s + 1.0), (x - s * 0.6, y)],
            color,
        ),
        Marker::TriangleUp => polygon(
            out,
            &[(x, y - s - 1.0), (x + s + 1.0, y + s), (x - s - 1.0, y + s)],
            color,
        ),
        Marker::TriangleDown => polygon(
            out,
            &[(x, y + s + 1.0), (x + s + 1.0, y - s), (x - s - 1.0, y - s)],
            color,
        ),
        Marker::Star => {
            let points: Vec<(f64, f64)> = (0..10_i32)
                .map(|i| {
                    let radius = if i % 2 == 0 { s + 2.0 } else { (s + 2.0) * 0.4 };
                    let angle = -PI / 2.0 + f64::from(i) * PI / 5.0;
                    (x + radius * angle.cos(), y + radius * angle.sin())
                })
                .collect();
            polygon(out, &points, color)
        }
    }
}

fn write_legend(out: &mut String, panel: &Panel, frame: &Frame) -> fmt::Result {
    for (i, series) in panel.series.iter().enumerate() {
        let y = frame.top + 14.0 + 16.0 * i as f64;
        let x = frame.left + 10.0;
        write_marker(out, series.style.marker, x, y - 4.0, series.style.color.hex())?;
        writeln!(
            out,
            r#"<text x="{:.1}" y="{y:.1}">{}</text>"#,
            x + 10.0,
            escape(&series.style.label)
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::{Color, SeriesStyle};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dates() -> Vec<NaiveDate> {
        vec![
            date(2023, 3, 31),
            date(2023, 6, 30),
            date(2023, 9, 30),
            date(2023, 12, 31),
        ]
    }

    #[test]
    fn test_render_artifact() {
        let panel = Panel::new("IBM Quarterly Balance Sheet", "Value (Billions USD)", dates())
            .with_series(
                SeriesStyle::new(Marker::Circle, Color::Blue, "Total Assets"),
                vec![Some(130.0), Some(131.5), Some(133.0), Some(135.2)],
            );
        let artifact = SvgRenderer::new().render(&Figure::new(1, vec![panel])).unwrap();
        assert_eq!(artifact.media_type, "image/svg+xml");

        let svg = String::from_utf8(artifact.bytes).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("IBM Quarterly Balance Sheet"));
        assert!(svg.contains("Value (Billions USD)"));
        assert!(svg.contains("Total Assets"));
        assert!(svg.contains("31.12.2023"));
        assert_eq!(svg.matches("<polyline").count(), 1);
    }

    #[test]
    fn test_absent_values_break_the_line() {
        let panel = Panel::new("t", "v", dates()).with_series(
            SeriesStyle::new(Marker::Square, Color::Green, "s"),
            vec![Some(1.0), None, Some(2.0), Some(3.0)],
        );
        let svg = SvgRenderer::new()
            .render_to_string(&Figure::new(1, vec![panel]))
            .unwrap();
        assert_eq!(svg.matches("<polyline").count(), 1);
        // Plot frame, three data markers and one legend marker.
        assert_eq!(svg.matches("<rect x=").count(), 5);
    }

    #[test]
    fn test_empty_panels_render_placeholder() {
        let empty = Panel::new("Nothing here", "Value", Vec::new());
        let absent = Panel::new("All absent", "Value", dates()).with_series(
            SeriesStyle::new(Marker::Star, Color::Red, "s"),
            vec![None; 4],
        );
        let svg = SvgRenderer::new()
            .render_to_string(&Figure::new(2, vec![empty, absent]))
            .unwrap();
        assert_eq!(svg.matches("No data").count(), 2);
        assert!(!svg.contains("<polyline"));
    }

    #[test]
    fn test_single_point_panel() {
        let panel = Panel::new("t", "v", vec![date(2024, 6, 30)]).with_series(
            SeriesStyle::new(Marker::Cross, Color::Orange, "s"),
            vec![Some(5.0)],
        );
        let svg = SvgRenderer::new()
            .render_to_string(&Figure::new(1, vec![panel]))
            .unwrap();
        assert!(!svg.contains("NaN"));
        assert!(svg.contains("30.06.2024"));
    }

    #[test]
    fn test_text_is_escaped() {
        let panel = Panel::new("R&D <Corp>", "v", Vec::new());
        let svg = SvgRenderer::new()
            .render_to_string(&Figure::new(1, vec![panel]))
            .unwrap();
        assert!(svg.contains("R&amp;D &lt;Corp&gt;"));
    }
}
