//! PNG chart backend.
//!
//! Figures are drawn as SVG by [`SvgRenderer`] and rasterized with resvg, so
//! both backends share one layout.

use finsight_core::{DataError, Result};
use resvg::{tiny_skia, usvg};

use crate::figure::{ChartArtifact, ChartRenderer, Figure};
use crate::svg::SvgRenderer;

/// Media type of rasterized charts.
pub const PNG_MEDIA_TYPE: &str = "image/png";

/// Draws figures as PNG images.
#[derive(Clone, Copy, Debug)]
pub struct PngRenderer {
    scale: f32,
}

impl Default for PngRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PngRenderer {
    /// Creates a renderer at one pixel per SVG unit.
    #[must_use]
    pub const fn new() -> Self {
        Self { scale: 1.0 }
    }

    /// Sets the pixel density. Non-positive or non-finite values fall back
    /// to 1.
    #[must_use]
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        self
    }

    /// Renders a figure to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Other`] if the figure cannot be laid out,
    /// rasterized or encoded.
    pub fn render_to_bytes(&self, figure: &Figure) -> Result<Vec<u8>> {
        let svg = SvgRenderer::new().render_to_string(figure)?;

        let mut options = usvg::Options::default();
        options.fontdb_mut().load_system_fonts();
        let tree = usvg::Tree::from_str(&svg, &options)
            .map_err(|e| DataError::Other(format!("PNG layout: {e}")))?;

        let size = tree
            .size()
            .to_int_size()
            .scale_by(self.scale)
            .ok_or_else(|| DataError::Other("PNG size out of range".to_string()))?;
        let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
            .ok_or_else(|| DataError::Other("PNG size out of range".to_string()))?;

        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(self.scale, self.scale),
            &mut pixmap.as_mut(),
        );

        pixmap
            .encode_png()
            .map_err(|e| DataError::Other(format!("PNG encoding: {e}")))
    }
}

impl ChartRenderer for PngRenderer {
    fn render(&self, figure: &Figure) -> Result<ChartArtifact> {
        let bytes = self.render_to_bytes(figure)?;
        tracing::debug!(panels = figure.panels.len(), bytes = bytes.len(), "Rendered PNG figure");
        Ok(ChartArtifact {
            media_type: PNG_MEDIA_TYPE,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::{Color, Marker, Panel, SeriesStyle};
    use chrono::NaiveDate;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn figure() -> Figure {
        let x = vec![
            NaiveDate::from_ymd_opt(2023, 6, 30).unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
        ];
        let panel = Panel::new("IBM Annual Income Statement", "Value (Billions USD)", x)
            .with_series(
                SeriesStyle::new(Marker::TriangleUp, Color::Red, "Net Income"),
                vec![Some(1.5), Some(7.5)],
            );
        Figure::new(2, vec![panel, Panel::new("Empty", "Value", Vec::new())])
    }

    /// Image width and height from the IHDR chunk.
    fn dimensions(png: &[u8]) -> (u32, u32) {
        let width = u32::from_be_bytes(png[16..20].try_into().unwrap());
        let height = u32::from_be_bytes(png[20..24].try_into().unwrap());
        (width, height)
    }

    #[test]
    fn test_render_png_artifact() {
        let artifact = PngRenderer::new().render(&figure()).unwrap();
        assert_eq!(artifact.media_type, "image/png");
        assert!(artifact.bytes.starts_with(&PNG_SIGNATURE));
        assert_eq!(dimensions(&artifact.bytes), (1600, 450));
    }

    #[test]
    fn test_scale_multiplies_pixels() {
        let png = PngRenderer::new().with_scale(0.5).render_to_bytes(&figure()).unwrap();
        assert_eq!(dimensions(&png), (800, 225));

        let png = PngRenderer::new().with_scale(f32::NAN).render_to_bytes(&figure()).unwrap();
        assert_eq!(dimensions(&png), (1600, 450));
    }
}
