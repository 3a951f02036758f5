//! Model training module
//!
//! Provides the model-fitter seam used by the bias-variance session:
//! - [`ModelFitter`] turns a neighbor count and training pairs into a predictor
//! - [`Predictor`] evaluates a fitted model on a feature matrix
//! - K-Nearest Neighbors regression
//! - Mean squared error

pub mod knn;
pub mod metrics;

pub use knn::{KNNRegressor, KnnFitter};
pub use metrics::mean_squared_error;

use crate::error::Result;
use ndarray::{Array1, Array2};

/// A fitted model that can predict targets for a feature matrix
pub trait Predictor {
    /// Predict one target per row of `x`
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;
}

/// Fits a model of a given complexity on training pairs
pub trait ModelFitter {
    type Model: Predictor;

    /// Fit a model using `n_neighbors` as its complexity parameter
    fn fit(&self, n_neighbors: usize, x: &Array2<f64>, y: &Array1<f64>) -> Result<Self::Model>;
}
