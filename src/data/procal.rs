//! PROCAL retention-time loader
//!
//! Reads a Skyline CSV export, keeps one replicate, derives the peptide
//! feature, then shuffles with an explicit seed and splits into training
//! and validation sets.

use polars::prelude::DataFrame;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::dataset::{Dataset, Sample};
use crate::error::{ProcalError, Result};
use crate::utils::{numeric_column, string_column, DataLoader};

/// Computes a scalar feature from a peptide sequence.
///
/// The GRAVY score is the usual choice; it is supplied by the caller.
pub trait FeatureScorer {
    fn score(&self, sequence: &str) -> Result<f64>;
}

impl<F> FeatureScorer for F
where
    F: Fn(&str) -> Result<f64>,
{
    fn score(&self, sequence: &str) -> Result<f64> {
        self(sequence)
    }
}

/// Configuration for [`load_retention_times`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionTimeConfig {
    /// Skyline CSV export
    pub path: PathBuf,
    /// Column holding the replicate (run) name
    pub replicate_column: String,
    /// Substring selecting a single replicate
    pub replicate_stem: String,
    /// Column holding the peptide sequence
    pub sequence_column: String,
    /// Column holding the retention time
    pub target_column: String,
    /// Column holding a precomputed feature, used when no scorer is given
    pub feature_column: String,
    /// Number of validation samples
    pub n_test: usize,
    /// Seed for the shuffle before splitting
    pub random_state: u64,
}

impl Default for RetentionTimeConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/PXD006832/Skyline_output_all_runs.csv"),
            replicate_column: "Replicate Name".to_string(),
            replicate_stem: "161207_ProPep_50fmol_4to42_R1".to_string(),
            sequence_column: "Peptide Sequence".to_string(),
            target_column: "Peptide Retention Time".to_string(),
            feature_column: "Peptide GRAVY Score".to_string(),
            n_test: 15,
            random_state: 42,
        }
    }
}

impl RetentionTimeConfig {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    pub fn with_replicate_stem(mut self, stem: impl Into<String>) -> Self {
        self.replicate_stem = stem.into();
        self
    }

    pub fn with_feature_column(mut self, column: impl Into<String>) -> Self {
        self.feature_column = column.into();
        self
    }

    pub fn with_n_test(mut self, n_test: usize) -> Self {
        self.n_test = n_test;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }
}

/// Training and validation sets produced by the loader
#[derive(Debug, Clone)]
pub struct RetentionTimeSplit {
    pub train: Dataset,
    pub validation: Dataset,
}

/// Load, filter, featurize, shuffle and split a Skyline export
pub fn load_retention_times(
    config: &RetentionTimeConfig,
    scorer: Option<&dyn FeatureScorer>,
) -> Result<RetentionTimeSplit> {
    let df = DataLoader::new().load_csv(&config.path)?;
    info!(
        path = %config.path.display(),
        rows = df.height(),
        "Loaded retention time export"
    );
    split_retention_times(&df, config, scorer)
}

/// Same as [`load_retention_times`] on an already loaded table
pub fn split_retention_times(
    df: &DataFrame,
    config: &RetentionTimeConfig,
    scorer: Option<&dyn FeatureScorer>,
) -> Result<RetentionTimeSplit> {
    let samples = replicate_samples(df, config, scorer)?;
    let n = samples.len();
    if config.n_test == 0 || config.n_test >= n {
        return Err(ProcalError::invalid_parameter(
            "n_test",
            config.n_test,
            format!("must be between 1 and {} for {} samples", n.saturating_sub(1), n),
        ));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(config.random_state);
    indices.shuffle(&mut rng);

    let n_train = n - config.n_test;
    let train = Dataset::new(indices[..n_train].iter().map(|&i| samples[i]).collect())?;
    let validation = Dataset::new(indices[n_train..].iter().map(|&i| samples[i]).collect())?;

    info!(
        replicate = %config.replicate_stem,
        n_train = train.len(),
        n_validation = validation.len(),
        seed = config.random_state,
        "Split retention times"
    );

    Ok(RetentionTimeSplit { train, validation })
}

/// Rows of the selected replicate as samples
fn replicate_samples(
    df: &DataFrame,
    config: &RetentionTimeConfig,
    scorer: Option<&dyn FeatureScorer>,
) -> Result<Vec<Sample>> {
    let replicates = string_column(df, &config.replicate_column)?;
    let targets = numeric_column(df, &config.target_column)?;

    // Sequences are only read when a scorer derives the feature
    let (sequences, precomputed) = match scorer {
        Some(_) => (string_column(df, &config.sequence_column)?, Vec::new()),
        None => (Vec::new(), numeric_column(df, &config.feature_column)?),
    };

    let mut samples = Vec::new();
    let mut dropped = 0usize;
    for (row, (replicate, target)) in replicates.iter().zip(&targets).enumerate() {
        let selected = replicate
            .as_deref()
            .is_some_and(|name| name.contains(config.replicate_stem.as_str()));
        if !selected {
            continue;
        }
        let feature = match scorer {
            Some(scorer) => match sequences[row].as_deref() {
                Some(seq) => Some(scorer.score(seq)?),
                None => None,
            },
            None => precomputed[row],
        };
        match (feature, target) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => {
                samples.push(Sample::new(x, *y))
            }
            _ => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!(dropped, "Dropped rows with a missing feature or retention time");
    }
    if samples.is_empty() {
        return Err(ProcalError::DataError(format!(
            "no usable rows for replicate '{}'",
            config.replicate_stem
        )));
    }
    Ok(samples)
}
