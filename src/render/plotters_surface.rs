//! `plotters`-backed surface writing SVG or PNG files
//!
//! Every `show` redraws the whole figure into the same file, so the file
//! always holds the latest frame.

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::figure::{
    Axes, Figure, FigureBuffer, LegendPosition, Mark, Panel, RenderSurface, Series,
};
use super::theme::Theme;
use crate::error::{ProcalError, Result};

/// Width of one panel in pixels
const PANEL_WIDTH: u32 = 400;
/// Figure height in pixels
const FIGURE_HEIGHT: u32 = 400;
const MARKER_SIZE: i32 = 3;
const LINE_WIDTH: u32 = 2;

/// Output encoding, chosen from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            _ => Err(ProcalError::RenderError(format!(
                "unsupported output '{}': use .svg or .png",
                path.display()
            ))),
        }
    }
}

pub struct PlottersSurface {
    path: PathBuf,
    format: OutputFormat,
    /// Overrides the size derived from the panel count
    size: Option<(u32, u32)>,
    theme: Theme,
    buffer: FigureBuffer,
    frames: usize,
}

impl PlottersSurface {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let format = OutputFormat::from_path(&path)?;
        Ok(Self {
            path,
            format,
            size: None,
            theme: Theme::default(),
            buffer: FigureBuffer::default(),
            frames: 0,
        })
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = Some((width, height));
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of figures written so far
    pub fn frames(&self) -> usize {
        self.frames
    }

    fn figure_size(&self, figure: &Figure) -> (u32, u32) {
        self.size
            .unwrap_or((PANEL_WIDTH * figure.panels.len().max(1) as u32, FIGURE_HEIGHT))
    }
}

impl RenderSurface for PlottersSurface {
    fn create_panels(&mut self, n_panels: usize) -> Result<()> {
        self.buffer.create_panels(n_panels)
    }

    fn configure_axes(&mut self, panel: usize, axes: Axes) -> Result<()> {
        self.buffer.panel_mut(panel)?.axes = axes;
        Ok(())
    }

    fn scatter(&mut self, panel: usize, series: Series) -> Result<()> {
        self.buffer.panel_mut(panel)?.marks.push(Mark::Scatter(series));
        Ok(())
    }

    fn line(&mut self, panel: usize, series: Series) -> Result<()> {
        self.buffer.panel_mut(panel)?.marks.push(Mark::Line(series));
        Ok(())
    }

    fn show(&mut self) -> Result<()> {
        let figure = self.buffer.current()?;
        let size = self.figure_size(figure);
        match self.format {
            OutputFormat::Svg => {
                let root = SVGBackend::new(&self.path, size).into_drawing_area();
                draw_figure(&root, figure, &self.theme)?;
            }
            OutputFormat::Png => {
                let root = BitMapBackend::new(&self.path, size).into_drawing_area();
                draw_figure(&root, figure, &self.theme)?;
            }
        }
        self.frames += 1;
        info!(path = %self.path.display(), frame = self.frames, "Rendered figure");
        Ok(())
    }
}

fn render_error<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> ProcalError {
    ProcalError::RenderError(e.to_string())
}

/// Draw every panel of `figure` side by side onto `root`
pub fn draw_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    theme: &Theme,
) -> Result<()> {
    root.fill(&theme.background_color()?).map_err(render_error)?;
    let areas = root.split_evenly((1, figure.panels.len().max(1)));
    for (area, panel) in areas.iter().zip(&figure.panels) {
        draw_panel(area, panel, theme)?;
    }
    root.present().map_err(render_error)?;
    Ok(())
}

fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel,
    theme: &Theme,
) -> Result<()> {
    let (x0, x1) = panel.x_bounds();
    let (y0, y1) = panel.y_bounds();
    let primary = theme.primary_color()?;
    let font = theme.font_family.as_str();
    let title_size = theme.font_size(16.0).round() as i32;
    let label_size = theme.font_size(12.0).round() as i32;

    let mut builder = ChartBuilder::on(area);
    builder
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50);
    if let Some(title) = &panel.axes.title {
        builder.caption(title, (font, title_size).into_font().color(&primary));
    }
    let mut chart = builder
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(render_error)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(panel.axes.x_label.clone().unwrap_or_default())
        .y_desc(panel.axes.y_label.clone().unwrap_or_default())
        .axis_style(primary)
        .label_style((font, label_size).into_font().color(&primary))
        .axis_desc_style((font, label_size).into_font().color(&primary))
        .draw()
        .map_err(render_error)?;

    let mut labelled = false;
    for mark in &panel.marks {
        match mark {
            Mark::Scatter(series) => {
                let color = theme.color(series.color)?;
                let anno = chart
                    .draw_series(
                        series
                            .points
                            .iter()
                            .map(|&p| Circle::new(p, MARKER_SIZE, color.filled())),
                    )
                    .map_err(render_error)?;
                if let Some(label) = &series.label {
                    anno.label(label)
                        .legend(move |(x, y)| Circle::new((x + 10, y), MARKER_SIZE, color.filled()));
                    labelled = true;
                }
            }
            Mark::Line(series) => {
                let color = theme.color(series.color)?;
                let anno = chart
                    .draw_series(LineSeries::new(
                        series.points.iter().copied(),
                        color.stroke_width(LINE_WIDTH),
                    ))
                    .map_err(render_error)?;
                if let Some(label) = &series.label {
                    anno.label(label).legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(LINE_WIDTH))
                    });
                    labelled = true;
                }
                if series.markers {
                    chart
                        .draw_series(
                            series
                                .points
                                .iter()
                                .map(|&p| Circle::new(p, MARKER_SIZE, color.filled())),
                        )
                        .map_err(render_error)?;
                }
            }
        }
    }

    if let (Some(position), true) = (panel.axes.legend, labelled) {
        debug!(?position, "Drawing legend");
        chart
            .configure_series_labels()
            .position(series_label_position(position))
            .background_style(WHITE.mix(0.8))
            .border_style(primary.mix(0.4))
            .label_font((font, label_size).into_font().color(&primary))
            .draw()
            .map_err(render_error)?;
    }
    Ok(())
}

fn series_label_position(position: LegendPosition) -> SeriesLabelPosition {
    match position {
        LegendPosition::UpperLeft => SeriesLabelPosition::UpperLeft,
        LegendPosition::UpperRight => SeriesLabelPosition::UpperRight,
        LegendPosition::LowerLeft => SeriesLabelPosition::LowerLeft,
        LegendPosition::LowerRight => SeriesLabelPosition::LowerRight,
    }
}
