//! Rendering surfaces
//!
//! - [`RenderSurface`] - the command interface the session draws through
//! - [`RecordingSurface`] - keeps shown figures in memory
//! - [`PlottersSurface`] - writes SVG or PNG files with `plotters`
//! - [`Theme`] - palette and fonts

pub mod figure;
pub mod plotters_surface;
pub mod theme;

pub use figure::{Axes, Figure, LegendPosition, Mark, Panel, RecordingSurface, RenderSurface, Series};
pub use plotters_surface::{draw_figure, OutputFormat, PlottersSurface};
pub use theme::Theme;
