//! Bias-variance session
//!
//! A [`BiasVarianceSession`] owns a fixed training set, a fixed validation
//! set and the [`FitHistory`] of every k-NN fit made so far. Each call to
//! [`BiasVarianceSession::fit_and_record`] fits one model, appends its
//! training and validation error to the history and redraws three panels:
//!
//! 1. training scatter with the fitted curve
//! 2. validation scatter with the same curve
//! 3. both error curves against flexibility (`n_train - k`)
//!
//! [`BiasVarianceSession::inspect_data`] draws the same layout without a
//! model and never touches the history.

pub mod curve;
pub mod history;

pub use curve::{curve_points, parse_parameter, plot_curve, render_curve};
pub use history::{flexibility, FitHistory, FlexibilityPoint, HistoryEntry};

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::data::Dataset;
use crate::error::{ProcalError, Result};
use crate::render::{Axes, LegendPosition, RenderSurface, Series};
use crate::training::{mean_squared_error, KnnFitter, ModelFitter, Predictor};
use crate::utils::linspace;

const TRAIN_PANEL: usize = 0;
const VALIDATION_PANEL: usize = 1;
const ERROR_PANEL: usize = 2;

/// Palette index of scatter points
const POINT_COLOR: usize = 0;
/// Palette index of the fitted curve
const CURVE_COLOR: usize = 1;

/// Headroom above the largest target on the scatter panels
const Y_HEADROOM: f64 = 1.10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Points on the prediction grid
    pub grid_points: usize,
    /// Width of the x range relative to the feature range, split evenly
    /// between both sides
    pub range_padding: f64,
    pub feature_label: String,
    pub target_label: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grid_points: 1000,
            range_padding: 1.10,
            feature_label: "Peptide GRAVY Score".to_string(),
            target_label: "Peptide Retention Time".to_string(),
        }
    }
}

impl SessionConfig {
    pub fn with_grid_points(mut self, n: usize) -> Self {
        self.grid_points = n;
        self
    }

    pub fn with_range_padding(mut self, padding: f64) -> Self {
        self.range_padding = padding;
        self
    }

    pub fn with_labels(mut self, feature: impl Into<String>, target: impl Into<String>) -> Self {
        self.feature_label = feature.into();
        self.target_label = target.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid_points < 2 {
            return Err(ProcalError::invalid_parameter(
                "grid_points",
                self.grid_points,
                "need at least 2 grid points",
            ));
        }
        if !(self.range_padding.is_finite() && self.range_padding >= 1.0) {
            return Err(ProcalError::invalid_parameter(
                "range_padding",
                self.range_padding,
                "must be a finite factor of at least 1",
            ));
        }
        Ok(())
    }
}

/// The fit-evaluate-accumulate-replot loop
pub struct BiasVarianceSession<F: ModelFitter = KnnFitter> {
    train: Dataset,
    validation: Dataset,
    train_x: Array2<f64>,
    train_y: Array1<f64>,
    val_x: Array2<f64>,
    val_y: Array1<f64>,
    fitter: F,
    config: SessionConfig,
    history: FitHistory,
}

impl BiasVarianceSession<KnnFitter> {
    /// Session with a Euclidean, uniformly weighted k-NN fitter
    pub fn new(train: Dataset, validation: Dataset) -> Result<Self> {
        Self::with_fitter(train, validation, KnnFitter::default())
    }
}

impl<F: ModelFitter> BiasVarianceSession<F> {
    pub fn with_fitter(train: Dataset, validation: Dataset, fitter: F) -> Result<Self> {
        if train.is_empty() {
            return Err(ProcalError::InvalidInput("training set is empty".to_string()));
        }
        if validation.is_empty() {
            return Err(ProcalError::InvalidInput("validation set is empty".to_string()));
        }
        Ok(Self {
            train_x: train.features(),
            train_y: train.targets(),
            val_x: validation.features(),
            val_y: validation.targets(),
            train,
            validation,
            fitter,
            config: SessionConfig::default(),
            history: FitHistory::new(),
        })
    }

    pub fn with_config(mut self, config: SessionConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn train(&self) -> &Dataset {
        &self.train
    }

    pub fn validation(&self) -> &Dataset {
        &self.validation
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn history(&self) -> &FitHistory {
        &self.history
    }

    /// Forget every recorded fit
    pub fn reset_history(&mut self) {
        info!(cleared = self.history.len(), "Reset fit history");
        self.history.clear();
    }

    /// Draw both datasets and an empty error panel
    pub fn inspect_data(&self, surface: &mut dyn RenderSurface) -> Result<()> {
        info!(
            n_train = self.train.len(),
            n_validation = self.validation.len(),
            "Inspecting data"
        );
        self.render(surface, None)
    }

    /// Fit with `k` neighbors, record both errors and redraw.
    ///
    /// `k` outside `[1, n_train]` fails with `InvalidParameter` before
    /// anything is fitted, recorded or drawn.
    pub fn fit_and_record(
        &mut self,
        k: usize,
        surface: &mut dyn RenderSurface,
    ) -> Result<HistoryEntry> {
        let n_train = self.train.len();
        if k < 1 || k > n_train {
            return Err(ProcalError::invalid_parameter(
                "k",
                k,
                format!("choose a k between 1 and {}", n_train),
            ));
        }

        let model = self.fitter.fit(k, &self.train_x, &self.train_y)?;
        let train_mse = mean_squared_error(&self.train_y, &model.predict(&self.train_x)?)?;
        let val_mse = mean_squared_error(&self.val_y, &model.predict(&self.val_x)?)?;

        let entry = HistoryEntry {
            k,
            train_mse,
            val_mse,
        };
        self.history.push(entry);
        debug!(
            k,
            flexibility = flexibility(n_train, k),
            train_mse,
            val_mse,
            fits = self.history.len(),
            "Recorded fit"
        );

        self.render(surface, Some(&model))?;
        Ok(entry)
    }

    /// Feature range over both datasets, widened by `range_padding`.
    ///
    /// The extra width is split evenly between the two sides, so the default
    /// 1.10 adds 5% of the width on each side. The extrema are not scaled by
    /// the factor themselves, which keeps the window symmetric for negative
    /// features. A zero-width range is padded by 0.5 on each side.
    pub fn x_range(&self) -> (f64, f64) {
        let (lo, hi) = match (self.train.feature_range(), self.validation.feature_range()) {
            (Some((a, b)), Some((c, d))) => (a.min(c), b.max(d)),
            (Some(r), None) | (None, Some(r)) => r,
            (None, None) => (0.0, 1.0),
        };
        let width = hi - lo;
        if width <= 0.0 {
            return (lo - 0.5, hi + 0.5);
        }
        let pad = 0.5 * (self.config.range_padding - 1.0) * width;
        (lo - pad, hi + pad)
    }

    /// `[0, 1.10 * max target]` over both datasets
    pub fn y_range(&self) -> (f64, f64) {
        let max = [self.train.max_target(), self.validation.max_target()]
            .into_iter()
            .flatten()
            .fold(f64::NEG_INFINITY, f64::max);
        let top = Y_HEADROOM * max;
        if top > 0.0 {
            (0.0, top)
        } else {
            (0.0, 1.0)
        }
    }

    fn render(&self, surface: &mut dyn RenderSurface, model: Option<&F::Model>) -> Result<()> {
        let (x0, x1) = self.x_range();
        let (y0, y1) = self.y_range();

        let curve = match model {
            Some(model) => {
                let grid = linspace(x0, x1, self.config.grid_points);
                let query = Array2::from_shape_vec((grid.len(), 1), grid.clone())?;
                let predictions = model.predict(&query)?;
                Some(grid.into_iter().zip(predictions.iter().copied()).collect::<Vec<_>>())
            }
            None => None,
        };

        surface.create_panels(3)?;

        let scatter_axes = |title: &str| {
            Axes::new()
                .with_title(title)
                .with_labels(&self.config.feature_label, &self.config.target_label)
                .with_x_range(x0, x1)
                .with_y_range(y0, y1)
        };
        for (panel, title, data) in [
            (TRAIN_PANEL, "Training Set", &self.train),
            (VALIDATION_PANEL, "Validation Set", &self.validation),
        ] {
            surface.configure_axes(panel, scatter_axes(title))?;
            surface.scatter(panel, Series::new(data.points()).with_color(POINT_COLOR))?;
            if let Some(curve) = &curve {
                surface.line(panel, Series::new(curve.clone()).with_color(CURVE_COLOR))?;
            }
        }

        surface.configure_axes(
            ERROR_PANEL,
            Axes::new()
                .with_title("Bias-Variance Trade-off")
                .with_labels("Flexibility", "Mean Squared Error")
                .with_legend(LegendPosition::LowerLeft),
        )?;
        if model.is_some() {
            let points = self.history.by_flexibility(self.train.len());
            let train_errors = points
                .iter()
                .map(|p| (p.flexibility as f64, p.train_mse))
                .collect();
            let val_errors = points
                .iter()
                .map(|p| (p.flexibility as f64, p.val_mse))
                .collect();
            surface.line(
                ERROR_PANEL,
                Series::new(train_errors)
                    .with_label("Training MSE")
                    .with_color(0)
                    .with_markers(),
            )?;
            surface.line(
                ERROR_PANEL,
                Series::new(val_errors)
                    .with_label("Validation MSE")
                    .with_color(1)
                    .with_markers(),
            )?;
        }

        surface.show()
    }
}
