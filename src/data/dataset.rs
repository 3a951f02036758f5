//! Typed samples and datasets consumed by the bias-variance session

use ndarray::{Array1, Array2};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

use crate::error::{ProcalError, Result};
use crate::utils::numeric_column;

/// A single observation: one feature value and one target value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Feature, e.g. a GRAVY hydrophobicity score
    pub x: f64,
    /// Target, e.g. a retention time in minutes
    pub y: f64,
}

impl Sample {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Ordered, immutable collection of samples
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Sample>", into = "Vec<Sample>")]
pub struct Dataset {
    samples: Vec<Sample>,
}

impl Dataset {
    /// Build a dataset, rejecting non-finite values
    pub fn new(samples: Vec<Sample>) -> Result<Self> {
        if let Some((i, s)) = samples
            .iter()
            .enumerate()
            .find(|(_, s)| !s.x.is_finite() || !s.y.is_finite())
        {
            return Err(ProcalError::InvalidInput(format!(
                "sample {} is not finite (x={}, y={})",
                i, s.x, s.y
            )));
        }
        Ok(Self { samples })
    }

    /// Build a dataset from parallel feature and target slices
    pub fn from_pairs(x: &[f64], y: &[f64]) -> Result<Self> {
        if x.len() != y.len() {
            return Err(ProcalError::ShapeError {
                expected: format!("{} targets", x.len()),
                actual: format!("{} targets", y.len()),
            });
        }
        Self::new(x.iter().zip(y).map(|(&x, &y)| Sample::new(x, y)).collect())
    }

    /// Extract two numeric columns from a table, skipping rows where either is missing
    pub fn from_frame(df: &DataFrame, feature_column: &str, target_column: &str) -> Result<Self> {
        let xs = numeric_column(df, feature_column)?;
        let ys = numeric_column(df, target_column)?;
        let samples = xs
            .into_iter()
            .zip(ys)
            .filter_map(|(x, y)| match (x, y) {
                (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some(Sample::new(x, y)),
                _ => None,
            })
            .collect();
        Self::new(samples)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Target values in sample order
    pub fn ys(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.y).collect()
    }

    /// Feature matrix with one column
    pub fn features(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.samples.len(), 1), |(i, _)| self.samples[i].x)
    }

    /// Target vector
    pub fn targets(&self) -> Array1<f64> {
        self.samples.iter().map(|s| s.y).collect()
    }

    /// `(min, max)` of the feature, `None` when empty
    pub fn feature_range(&self) -> Option<(f64, f64)> {
        self.samples.iter().fold(None, |acc, s| match acc {
            None => Some((s.x, s.x)),
            Some((lo, hi)) => Some((lo.min(s.x), hi.max(s.x))),
        })
    }

    /// Largest target value, `None` when empty
    pub fn max_target(&self) -> Option<f64> {
        self.samples
            .iter()
            .map(|s| s.y)
            .fold(None, |acc, y| Some(acc.map_or(y, |m: f64| m.max(y))))
    }

    /// Scatter points `(x, y)`
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.samples.iter().map(|s| (s.x, s.y)).collect()
    }
}

impl TryFrom<Vec<Sample>> for Dataset {
    type Error = ProcalError;

    fn try_from(samples: Vec<Sample>) -> Result<Self> {
        Self::new(samples)
    }
}

impl From<Dataset> for Vec<Sample> {
    fn from(dataset: Dataset) -> Self {
        dataset.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn test_ranges() {
        let ds = Dataset::from_pairs(&[-1.5, 0.0, 2.0], &[10.0, 30.0, 20.0]).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.feature_range(), Some((-1.5, 2.0)));
        assert_eq!(ds.max_target(), Some(30.0));
        assert_eq!(ds.features().shape(), &[3, 1]);
        assert_eq!(ds.targets().to_vec(), vec![10.0, 30.0, 20.0]);
    }

    #[test]
    fn test_empty_ranges() {
        let ds = Dataset::default();
        assert!(ds.is_empty());
        assert_eq!(ds.feature_range(), None);
        assert_eq!(ds.max_target(), None);
    }

    #[test]
    fn test_rejects_non_finite() {
        let result = Dataset::from_pairs(&[1.0, f64::NAN], &[1.0, 2.0]);
        assert!(matches!(result, Err(ProcalError::InvalidInput(_))));
    }

    #[test]
    fn test_collected_samples_are_validated() {
        let samples: Vec<Sample> = [(0.0, 1.0), (1.0, f64::NAN), (2.0, 3.0)]
            .into_iter()
            .map(|(x, y)| Sample::new(x, y))
            .collect();
        assert!(matches!(
            Dataset::try_from(samples),
            Err(ProcalError::InvalidInput(_))
        ));

        let ok = Dataset::try_from(vec![Sample::new(0.0, 1.0)]).unwrap();
        assert_eq!(ok.len(), 1);
    }

    #[test]
    fn test_deserialize_goes_through_validation() {
        let ds: Dataset = serde_json::from_str(r#"[{"x":0.5,"y":12.0},{"x":-0.4,"y":25.5}]"#).unwrap();
        assert_eq!(ds.samples(), &[Sample::new(0.5, 12.0), Sample::new(-0.4, 25.5)]);
        assert_eq!(serde_json::to_string(&ds).unwrap(), r#"[{"x":0.5,"y":12.0},{"x":-0.4,"y":25.5}]"#);

        let empty: Dataset = serde_json::from_str("[]").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_from_frame_skips_missing() {
        let df = df!(
            "gravy" => &[Some(0.1), None, Some(-0.4)],
            "rt" => &[Some(12.0), Some(13.0), Some(25.5)]
        )
        .unwrap();
        let ds = Dataset::from_frame(&df, "gravy", "rt").unwrap();
        assert_eq!(ds.samples(), &[Sample::new(0.1, 12.0), Sample::new(-0.4, 25.5)]);
    }
}
