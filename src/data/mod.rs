//! Example datasets
//!
//! - [`Dataset`] / [`Sample`] - the typed (feature, target) pairs the session consumes
//! - [`load_retention_times`] - PROCAL retention times from a Skyline export
//! - [`read_percolator`] - Percolator input (PIN) files

pub mod dataset;
pub mod percolator;
pub mod procal;

pub use dataset::{Dataset, Sample};
pub use percolator::{parse_percolator, read_percolator};
pub use procal::{
    load_retention_times, split_retention_times, FeatureScorer, RetentionTimeConfig,
    RetentionTimeSplit,
};
