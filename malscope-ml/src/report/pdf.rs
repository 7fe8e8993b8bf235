//! PDF rendering of report figures.

use super::artifacts::{ArtifactRenderer, Figure, PlotArtifact};
use crate::config::ReportConfig;
use crate::error::MlError;
use genpdf::elements::{Break, FrameCellDecorator, Paragraph, TableLayout};
use genpdf::style::{Color, Style, StyledString};
use genpdf::{Document, Element, Position, RenderResult, SimplePageDecorator, Size};
use std::path::{Path, PathBuf};
use tracing::debug;

const MM_PER_INCH: f64 = 25.4;
const SERIES_COLOR: Color = Color::Rgb(31, 119, 180);
const GUIDE_COLOR: Color = Color::Greyscale(160);

/// Writes one PDF document per artifact into `output_dir`.
pub struct PdfRenderer {
    config: ReportConfig,
}

impl PdfRenderer {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    /// Chart area in millimetres from the configured figure size.
    pub fn chart_size_mm(&self) -> (f64, f64) {
        (
            self.config.figure_width_in * MM_PER_INCH,
            self.config.figure_height_in * MM_PER_INCH,
        )
    }

    /// Size of one device pixel in millimetres at the configured DPI.
    pub fn pixel_mm(&self) -> f64 {
        MM_PER_INCH / f64::from(self.config.dpi.max(1))
    }

    fn document(&self, title: &str) -> Result<Document, MlError> {
        let fonts =
            genpdf::fonts::from_files(&self.config.font_dir, &self.config.font_family, None)
                .map_err(|e| {
                    MlError::report(format!(
                        "cannot load font family '{}' from {}: {e}",
                        self.config.font_family,
                        self.config.font_dir.display()
                    ))
                })?;
        let mut doc = Document::new(fonts);
        doc.set_title(title);
        let mut decorator = SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);
        doc.push(Paragraph::new(StyledString::new(
            title.to_string(),
            Style::new().bold().with_font_size(14),
        )));
        doc.push(Break::new(1));
        Ok(doc)
    }

    fn push_figure(&self, doc: &mut Document, figure: &Figure) -> Result<(), MlError> {
        let (width, height) = self.chart_size_mm();
        let pixel = self.pixel_mm();
        match figure {
            Figure::Matrix { cells, normalized } => {
                doc.push(matrix_table(cells, *normalized)?);
            }
            Figure::Curve {
                curve,
                x_label,
                y_label,
                area_label,
            } => {
                doc.push(Chart {
                    width,
                    height,
                    pixel,
                    shape: Shape::Line(curve.points().collect()),
                });
                doc.push(Break::new(1));
                doc.push(Paragraph::new(format!("x: {x_label}, y: {y_label}")));
                doc.push(Paragraph::new(area_label.clone()));
            }
            Figure::Bars {
                labels,
                values,
                unit,
            } => {
                doc.push(Chart {
                    width,
                    height,
                    pixel,
                    shape: Shape::Bars(values.clone()),
                });
                doc.push(Break::new(1));
                doc.push(bar_legend(labels, values, unit)?);
            }
        }
        Ok(())
    }
}

impl ArtifactRenderer for PdfRenderer {
    fn render(&self, artifact: &PlotArtifact, figure: &Figure) -> Result<PathBuf, MlError> {
        std::fs::create_dir_all(&self.config.output_dir)?;
        let path = artifact.path_in(&self.config.output_dir);
        let mut doc = self.document(&artifact.title())?;
        self.push_figure(&mut doc, figure)?;
        doc.render_to_file(&path)?;
        debug!(path = %path.display(), "Wrote plot artifact");
        Ok(path)
    }
}

fn matrix_table(cells: &[[f64; 2]; 2], normalized: bool) -> Result<TableLayout, MlError> {
    let fmt = |v: f64| {
        if normalized {
            format!("{v:.2}")
        } else {
            format!("{v:.0}")
        }
    };
    let mut table = TableLayout::new(vec![2, 1, 1]);
    table.set_cell_decorator(FrameCellDecorator::new(true, true, false));
    table
        .row()
        .element(Paragraph::new("actual \\ predicted"))
        .element(Paragraph::new("benign"))
        .element(Paragraph::new("malicious"))
        .push()?;
    for (name, row) in ["benign", "malicious"].iter().zip(cells) {
        table
            .row()
            .element(Paragraph::new(*name))
            .element(Paragraph::new(fmt(row[0])))
            .element(Paragraph::new(fmt(row[1])))
            .push()?;
    }
    Ok(table)
}

fn bar_legend(labels: &[String], values: &[f64], unit: &str) -> Result<TableLayout, MlError> {
    let columns = labels.len().max(1);
    let mut table = TableLayout::new(vec![1; columns]);
    table.set_cell_decorator(FrameCellDecorator::new(true, true, false));
    let mut names = table.row();
    for label in labels {
        names.push_element(Paragraph::new(label.clone()));
    }
    names.push()?;
    let mut row = table.row();
    for v in values {
        row.push_element(Paragraph::new(format!("{v:.3} {unit}")));
    }
    row.push()?;
    Ok(table)
}

enum Shape {
    /// Points in data space, both axes within [0, 1].
    Line(Vec<(f64, f64)>),
    Bars(Vec<f64>),
}

/// Fixed-size vector chart drawn with page lines.
struct Chart {
    width: f64,
    height: f64,
    /// Points closer than this on the page are merged.
    pixel: f64,
    shape: Shape,
}

impl Chart {
    /// Page position for a point in the unit square, origin bottom-left.
    fn at(&self, x: f64, y: f64) -> Position {
        Position::new(
            x.clamp(0.0, 1.0) * self.width,
            (1.0 - y.clamp(0.0, 1.0)) * self.height,
        )
    }

    fn rect(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Position> {
        vec![
            self.at(x0, y0),
            self.at(x1, y0),
            self.at(x1, y1),
            self.at(x0, y1),
            self.at(x0, y0),
        ]
    }
}

impl Element for Chart {
    fn render(
        &mut self,
        _context: &genpdf::Context,
        area: genpdf::render::Area<'_>,
        _style: Style,
    ) -> Result<RenderResult, genpdf::error::Error> {
        let frame = Style::new();
        let guide = Style::new().with_color(GUIDE_COLOR);
        let series = Style::new().with_color(SERIES_COLOR);

        area.draw_line(self.rect(0.0, 0.0, 1.0, 1.0), frame);
        match &self.shape {
            Shape::Line(points) => {
                // chance diagonal
                area.draw_line(vec![self.at(0.0, 0.0), self.at(1.0, 1.0)], guide);
                let page: Vec<(f64, f64)> = points
                    .iter()
                    .map(|&(x, y)| (x.clamp(0.0, 1.0) * self.width, y.clamp(0.0, 1.0) * self.height))
                    .collect();
                let path: Vec<Position> = decimate(&page, self.pixel)
                    .into_iter()
                    .map(|(x, y)| self.at(x / self.width, y / self.height))
                    .collect();
                area.draw_line(path, series);
            }
            Shape::Bars(values) => {
                let max = values.iter().copied().fold(0.0_f64, f64::max);
                let slot = 1.0 / values.len().max(1) as f64;
                for (i, &v) in values.iter().enumerate() {
                    let h = if max > 0.0 { v / max * 0.9 } else { 0.0 };
                    let x0 = i as f64 * slot + slot * 0.2;
                    let x1 = (i + 1) as f64 * slot - slot * 0.2;
                    area.draw_line(self.rect(x0, 0.0, x1, h), series);
                }
            }
        }
        Ok(RenderResult {
            size: Size::new(self.width, self.height),
            has_more: false,
        })
    }
}

/// Drop points within `min_step` of the previously kept one; the last point is always kept.
fn decimate(points: &[(f64, f64)], min_step: f64) -> Vec<(f64, f64)> {
    let mut kept: Vec<(f64, f64)> = Vec::with_capacity(points.len());
    for (i, &(x, y)) in points.iter().enumerate() {
        let is_last = i + 1 == points.len();
        match kept.last() {
            Some(&(px, py)) if !is_last && (x - px).hypot(y - py) < min_step => {}
            _ => kept.push((x, y)),
        }
    }
    kept
}
