//! Parameterized curve `f(x) = x * sin(x * p)` on `[0, 10]`

use tracing::info;

use crate::error::{ProcalError, Result};
use crate::render::{Axes, RenderSurface, Series};
use crate::utils::linspace;

const X_MAX: f64 = 10.0;
const N_POINTS: usize = 1000;

/// Parse a raw curve parameter, rejecting anything that is not a finite number
pub fn parse_parameter(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(p) if p.is_finite() => Ok(p),
        _ => Err(ProcalError::invalid_parameter(
            "parameter",
            format!("{:?}", raw),
            "must be a number",
        )),
    }
}

/// Points of the curve for parameter `p`
pub fn curve_points(p: f64) -> Vec<(f64, f64)> {
    linspace(0.0, X_MAX, N_POINTS)
        .into_iter()
        .map(|x| (x, x * (x * p).sin()))
        .collect()
}

/// Draw the curve for an already parsed parameter
pub fn render_curve(p: f64, surface: &mut dyn RenderSurface) -> Result<()> {
    if !p.is_finite() {
        return Err(ProcalError::invalid_parameter("parameter", p, "must be a number"));
    }
    surface.create_panels(1)?;
    surface.configure_axes(0, Axes::new().with_labels("X", "f(X)"))?;
    surface.line(0, Series::new(curve_points(p)))?;
    surface.show()?;
    info!(parameter = p, "Rendered curve");
    Ok(())
}

/// Parse `raw` and draw; nothing is drawn when parsing fails
pub fn plot_curve(raw: &str, surface: &mut dyn RenderSurface) -> Result<()> {
    let p = parse_parameter(raw)?;
    render_curve(p, surface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingSurface;

    #[test]
    fn test_parse_parameter() {
        assert_eq!(parse_parameter("2").unwrap(), 2.0);
        assert_eq!(parse_parameter(" -0.5 ").unwrap(), -0.5);
        assert!(parse_parameter("abc").unwrap_err().is_invalid_parameter());
        assert!(parse_parameter("").unwrap_err().is_invalid_parameter());
        assert!(parse_parameter("NaN").unwrap_err().is_invalid_parameter());
        assert!(parse_parameter("inf").unwrap_err().is_invalid_parameter());
    }

    #[test]
    fn test_curve_values() {
        let points = curve_points(1.0);
        assert_eq!(points.len(), N_POINTS);
        assert_eq!(points[0], (0.0, 0.0));
        let (x, y) = points[N_POINTS - 1];
        assert_eq!(x, 10.0);
        assert!((y - 10.0 * 10.0f64.sin()).abs() < 1e-12);
    }

    #[test]
    fn test_plot_curve_labels() {
        let mut surface = RecordingSurface::new();
        plot_curve("0.5", &mut surface).unwrap();
        let fig = surface.last_shown().unwrap();
        assert_eq!(fig.panels.len(), 1);
        assert_eq!(fig.panels[0].axes.x_label.as_deref(), Some("X"));
        assert_eq!(fig.panels[0].axes.y_label.as_deref(), Some("f(X)"));
    }

    #[test]
    fn test_bad_input_draws_nothing() {
        let mut surface = RecordingSurface::new();
        assert!(plot_curve("abc", &mut surface).is_err());
        assert_eq!(surface.show_count(), 0);
    }
}
