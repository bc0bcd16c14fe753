//! SVG preview of the flattened pattern.
//!
//! Panels are drawn in their own 2D frame, laid out left to right and
//! bottom-aligned, with the panel name at the panel centre.

use crate::error::Result;
use crate::geometry::Curvature;
use crate::model::{Panel, Pattern};
use nalgebra::Point2;
use std::fmt::Write;

/// Preview colors (SVG color strings).
pub struct SvgColors {
    pub outline: &'static str,
    pub fill: &'static str,
    pub label: &'static str,
}

impl Default for SvgColors {
    fn default() -> Self {
        Self {
            outline: "#1f3a93",
            fill: "#d6e4f0",
            label: "#333333",
        }
    }
}

/// SVG writer for pattern previews.
pub struct SvgWriter {
    output: String,
    colors: SvgColors,
    /// Pixels per pattern unit.
    scale: f64,
    /// Space around and between panels, in pattern units.
    margin: f64,
}

impl Default for SvgWriter {
    fn default() -> Self {
        Self::new(3.0, 5.0)
    }
}

impl SvgWriter {
    pub fn new(scale: f64, margin: f64) -> Self {
        Self {
            output: String::new(),
            colors: SvgColors::default(),
            scale,
            margin,
        }
    }

    /// Get the generated SVG content.
    pub fn into_string(self) -> String {
        self.output
    }

    /// Draw all panels of a pattern.
    pub fn write_pattern(&mut self, pattern: &Pattern) -> Result<()> {
        let boxes: Vec<(f64, f64, f64, f64)> =
            pattern.panels.iter().map(|p| p.edges.bounding_box()).collect();
        let height = boxes
            .iter()
            .map(|b| b.3 - b.1)
            .fold(0.0, f64::max)
            + 2.0 * self.margin;
        let width = boxes.iter().map(|b| b.2 - b.0 + self.margin).sum::<f64>() + self.margin;

        self.write_header(width, height)?;
        let mut x = self.margin;
        for (panel, bbox) in pattern.panels.iter().zip(&boxes) {
            // Panel frame -> page units, y up
            let offset = (x - bbox.0, self.margin + bbox.3);
            self.write_panel(panel, offset)?;
            x += bbox.2 - bbox.0 + self.margin;
        }
        writeln!(self.output, "</svg>")?;
        Ok(())
    }

    fn write_header(&mut self, width: f64, height: f64) -> Result<()> {
        writeln!(
            self.output,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" viewBox="0 0 {:.3} {:.3}">"#,
            width * self.scale,
            height * self.scale,
            width,
            height
        )?;
        Ok(())
    }

    fn write_panel(&mut self, panel: &Panel, offset: (f64, f64)) -> Result<()> {
        let map = |p: Point2<f64>| (p.x + offset.0, offset.1 - p.y);

        let mut d = String::new();
        if let Some(first) = panel.edges.edges().first() {
            let (x, y) = map(first.start);
            write!(d, "M {:.3} {:.3}", x, y)?;
        }
        for edge in &panel.edges {
            let (ex, ey) = map(edge.end);
            match edge.curvature {
                Curvature::Straight => write!(d, " L {:.3} {:.3}", ex, ey)?,
                Curvature::Quadratic { control } => {
                    let (cx, cy) = map(control);
                    write!(d, " Q {:.3} {:.3} {:.3} {:.3}", cx, cy, ex, ey)?;
                }
                Curvature::Cubic { control1, control2 } => {
                    let (c1x, c1y) = map(control1);
                    let (c2x, c2y) = map(control2);
                    write!(
                        d,
                        " C {:.3} {:.3} {:.3} {:.3} {:.3} {:.3}",
                        c1x, c1y, c2x, c2y, ex, ey
                    )?;
                }
            }
        }
        d.push_str(" Z");

        writeln!(
            self.output,
            r#"  <path id="{}" d="{}" fill="{}" stroke="{}" stroke-width="0.3"/>"#,
            panel.name, d, self.colors.fill, self.colors.outline
        )?;

        let (min_x, min_y, max_x, max_y) = panel.edges.bounding_box();
        let (lx, ly) = map(Point2::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0));
        writeln!(
            self.output,
            r#"  <text x="{:.3}" y="{:.3}" font-size="3" text-anchor="middle" fill="{}">{}</text>"#,
            lx, ly, self.colors.label, panel.name
        )?;
        Ok(())
    }
}

/// Render a pattern preview.
pub fn generate_svg(pattern: &Pattern) -> Result<String> {
    let mut writer = SvgWriter::default();
    writer.write_pattern(pattern)?;
    Ok(writer.into_string())
}
