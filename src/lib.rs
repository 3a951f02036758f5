//! procal-knn - bias-variance teaching toolkit
//!
//! k-nearest-neighbors regression of peptide retention time on a peptide
//! feature (usually the GRAVY hydrophobicity score), with the training and
//! validation error plotted against model flexibility after every fit.
//!
//! # Modules
//!
//! - [`session`] - the fit-evaluate-accumulate-replot loop and the curve plot
//! - [`training`] - k-NN regressor, fitter traits and error metrics
//! - [`data`] - datasets, the PROCAL loader and the Percolator reader
//! - [`render`] - drawing surfaces and themes
//! - [`utils`] - CSV loading and numeric helpers
//! - [`config`] - JSON configuration
//! - [`cli`] - command-line interface
//!
//! # Example
//!
//! ```no_run
//! use procal_knn::prelude::*;
//!
//! # fn main() -> procal_knn::Result<()> {
//! let split = load_retention_times(&RetentionTimeConfig::default(), None)?;
//! let mut session = BiasVarianceSession::new(split.train, split.validation)?;
//! let mut surface = PlottersSurface::new("bias_variance.svg")?;
//!
//! session.inspect_data(&mut surface)?;
//! for k in [50, 20, 5, 1] {
//!     session.fit_and_record(k, &mut surface)?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;

pub mod data;
pub mod training;
pub mod session;
pub mod render;

pub mod utils;
pub mod config;
pub mod cli;

pub use error::{ProcalError, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::AppConfig;
    pub use crate::data::{
        load_retention_times, read_percolator, Dataset, FeatureScorer, RetentionTimeConfig,
        RetentionTimeSplit, Sample,
    };
    pub use crate::error::{ProcalError, Result};
    pub use crate::render::{PlottersSurface, RecordingSurface, RenderSurface, Theme};
    pub use crate::session::{
        plot_curve, BiasVarianceSession, FitHistory, HistoryEntry, SessionConfig,
    };
    pub use crate::training::{KNNRegressor, KnnFitter, ModelFitter, Predictor};
}
