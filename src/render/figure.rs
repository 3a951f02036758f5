//! Rendering surface commands and the in-memory figure model
//!
//! A [`RenderSurface`] receives panel/axis creation, scatter, line and
//! "display now" commands. Both bundled surfaces buffer the commands into a
//! [`Figure`]; they differ only in what `show` does with it.

use serde::{Deserialize, Serialize};

use crate::error::{ProcalError, Result};

/// Where a panel legend is placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegendPosition {
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
}

/// Title, labels and limits of one panel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Axes {
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    /// Fixed x limits; derived from the data when `None`
    pub x_range: Option<(f64, f64)>,
    /// Fixed y limits; derived from the data when `None`
    pub y_range: Option<(f64, f64)>,
    pub legend: Option<LegendPosition>,
}

impl Axes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = Some(x_label.into());
        self.y_label = Some(y_label.into());
        self
    }

    pub fn with_x_range(mut self, lo: f64, hi: f64) -> Self {
        self.x_range = Some((lo, hi));
        self
    }

    pub fn with_y_range(mut self, lo: f64, hi: f64) -> Self {
        self.y_range = Some((lo, hi));
        self
    }

    pub fn with_legend(mut self, position: LegendPosition) -> Self {
        self.legend = Some(position);
        self
    }
}

/// A sequence of points drawn as a scatter or a line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub label: Option<String>,
    pub points: Vec<(f64, f64)>,
    /// Index into the theme palette
    pub color: usize,
    /// Draw a marker at every point (lines only)
    pub markers: bool,
}

impl Series {
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self {
            label: None,
            points,
            color: 0,
            markers: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_color(mut self, color: usize) -> Self {
        self.color = color;
        self
    }

    pub fn with_markers(mut self) -> Self {
        self.markers = true;
        self
    }
}

/// One drawing command inside a panel, in issue order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Mark {
    Scatter(Series),
    Line(Series),
}

/// One panel of a figure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub axes: Axes,
    pub marks: Vec<Mark>,
}

impl Panel {
    pub fn scatters(&self) -> impl Iterator<Item = &Series> {
        self.marks.iter().filter_map(|m| match m {
            Mark::Scatter(s) => Some(s),
            Mark::Line(_) => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = &Series> {
        self.marks.iter().filter_map(|m| match m {
            Mark::Line(s) => Some(s),
            Mark::Scatter(_) => None,
        })
    }

    /// Find a line by its label
    pub fn line(&self, label: &str) -> Option<&Series> {
        self.lines().find(|s| s.label.as_deref() == Some(label))
    }

    /// x limits: fixed range, else padded data extent, else `(0, 1)`
    pub fn x_bounds(&self) -> (f64, f64) {
        self.axes
            .x_range
            .unwrap_or_else(|| padded_extent(self.all_points().map(|p| p.0)))
    }

    /// y limits: fixed range, else padded data extent, else `(0, 1)`
    pub fn y_bounds(&self) -> (f64, f64) {
        self.axes
            .y_range
            .unwrap_or_else(|| padded_extent(self.all_points().map(|p| p.1)))
    }

    fn all_points(&self) -> impl Iterator<Item = &(f64, f64)> {
        self.marks.iter().flat_map(|m| match m {
            Mark::Scatter(s) | Mark::Line(s) => s.points.iter(),
        })
    }
}

/// Extent of finite values padded by 5% per side; never degenerate
fn padded_extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    if hi - lo <= f64::EPSILON * lo.abs().max(1.0) {
        return (lo - 0.5, hi + 0.5);
    }
    let pad = 0.05 * (hi - lo);
    (lo - pad, hi + pad)
}

/// A row of panels
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub panels: Vec<Panel>,
}

impl Figure {
    pub fn with_panels(n_panels: usize) -> Self {
        Self {
            panels: vec![Panel::default(); n_panels],
        }
    }

    pub fn panel(&self, index: usize) -> Option<&Panel> {
        self.panels.get(index)
    }

    fn panel_mut(&mut self, index: usize) -> Result<&mut Panel> {
        let n = self.panels.len();
        self.panels.get_mut(index).ok_or_else(|| {
            ProcalError::RenderError(format!("panel {} out of range for {} panels", index, n))
        })
    }
}

/// Receives drawing commands for one figure at a time
pub trait RenderSurface {
    /// Start a new figure made of `n_panels` side-by-side panels
    fn create_panels(&mut self, n_panels: usize) -> Result<()>;

    /// Set title, labels, limits and legend of a panel
    fn configure_axes(&mut self, panel: usize, axes: Axes) -> Result<()>;

    /// Draw points without connecting them
    fn scatter(&mut self, panel: usize, series: Series) -> Result<()>;

    /// Draw points connected in order
    fn line(&mut self, panel: usize, series: Series) -> Result<()>;

    /// Display the current figure
    fn show(&mut self) -> Result<()>;
}

/// Command buffer shared by the bundled surfaces
#[derive(Debug, Clone, Default)]
pub(crate) struct FigureBuffer {
    current: Option<Figure>,
}

impl FigureBuffer {
    pub(crate) fn create_panels(&mut self, n_panels: usize) -> Result<()> {
        if n_panels == 0 {
            return Err(ProcalError::RenderError(
                "a figure needs at least one panel".to_string(),
            ));
        }
        self.current = Some(Figure::with_panels(n_panels));
        Ok(())
    }

    pub(crate) fn panel_mut(&mut self, index: usize) -> Result<&mut Panel> {
        self.current
            .as_mut()
            .ok_or_else(|| ProcalError::RenderError("no figure; create panels first".to_string()))?
            .panel_mut(index)
    }

    pub(crate) fn current(&self) -> Result<&Figure> {
        self.current
            .as_ref()
            .ok_or_else(|| ProcalError::RenderError("nothing to show".to_string()))
    }
}

/// Keeps every shown figure in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    buffer: FigureBuffer,
    shown: Vec<Figure>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Figures passed to `show`, oldest first
    pub fn shown(&self) -> &[Figure] {
        &self.shown
    }

    pub fn last_shown(&self) -> Option<&Figure> {
        self.shown.last()
    }

    pub fn show_count(&self) -> usize {
        self.shown.len()
    }
}

impl RenderSurface for RecordingSurface {
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
        let figure = self.buffer.current()?.clone();
        self.shown.push(figure);
        Ok(())
    }
}
