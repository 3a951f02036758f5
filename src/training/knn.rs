//! K-Nearest Neighbors regression
//!
//! Brute-force KNN regressor with a bounded max-heap neighbor search and
//! the [`KnnFitter`] used by the bias-variance session.

use ndarray::{Array1, Array2, ArrayView1};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::{ModelFitter, Predictor};
use crate::error::{ProcalError, Result};

/// K-Nearest Neighbors Regressor (Euclidean distance, uniform weights)
#[derive(Debug, Clone)]
pub struct KNNRegressor {
    n_neighbors: usize,
    x_train: Option<Array2<f64>>,
    y_train: Option<Array1<f64>>,
}

impl KNNRegressor {
    pub fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors,
            x_train: None,
            y_train: None,
        }
    }

    /// Fit the regressor (stores training data)
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(ProcalError::ShapeError {
                expected: format!("{} targets", x.nrows()),
                actual: format!("{} targets", y.len()),
            });
        }
        let k = self.n_neighbors;
        if k == 0 || k > x.nrows() {
            return Err(ProcalError::invalid_parameter(
                "n_neighbors",
                k,
                format!("must be between 1 and {}", x.nrows()),
            ));
        }
        self.x_train = Some(x.clone());
        self.y_train = Some(y.clone());
        Ok(())
    }

    /// Predict target values (parallelized over query rows)
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let (x_train, y_train) = match (&self.x_train, &self.y_train) {
            (Some(x_train), Some(y_train)) => (x_train, y_train),
            _ => return Err(ProcalError::ModelNotFitted),
        };
        if x.ncols() != x_train.ncols() {
            return Err(ProcalError::ShapeError {
                expected: format!("{} feature columns", x_train.ncols()),
                actual: format!("{} feature columns", x.ncols()),
            });
        }
        let k = self.n_neighbors;

        let predictions: Vec<f64> = (0..x.nrows())
            .into_par_iter()
            .map(|i| mean_target(&find_k_nearest(x.row(i), x_train, y_train, k)))
            .collect();

        Ok(Array1::from_vec(predictions))
    }
}

impl Predictor for KNNRegressor {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        KNNRegressor::predict(self, x)
    }
}

/// Fits a fresh [`KNNRegressor`] for every requested neighbor count
#[derive(Debug, Clone, Copy, Default)]
pub struct KnnFitter;

impl ModelFitter for KnnFitter {
    type Model = KNNRegressor;

    fn fit(&self, n_neighbors: usize, x: &Array2<f64>, y: &Array1<f64>) -> Result<KNNRegressor> {
        let mut model = KNNRegressor::new(n_neighbors);
        model.fit(x, y)?;
        Ok(model)
    }
}

// ============================================================================
// Neighbor search helpers
// ============================================================================

/// Max-heap entry for partial sort (keeps k smallest distances)
#[derive(PartialEq)]
struct DistTarget(f64, f64);

impl Eq for DistTarget {}
impl PartialOrd for DistTarget {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for DistTarget {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
    }
}

/// Targets of the k nearest training rows, found with a max-heap in O(n log k)
fn find_k_nearest(
    point: ArrayView1<f64>,
    x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    k: usize,
) -> Vec<f64> {
    let mut heap = BinaryHeap::with_capacity(k + 1);

    for (row, &target) in x_train.rows().into_iter().zip(y_train.iter()) {
        let dist = euclidean(point, row);
        if heap.len() < k {
            heap.push(DistTarget(dist, target));
        } else if let Some(top) = heap.peek() {
            if dist < top.0 {
                heap.pop();
                heap.push(DistTarget(dist, target));
            }
        }
    }

    heap.into_iter().map(|dt| dt.1).collect()
}

fn euclidean(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(ai, bi)| {
            let d = ai - bi;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

fn mean_target(targets: &[f64]) -> f64 {
    targets.iter().sum::<f64>() / targets.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn create_regression_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_vec((10, 1), (0..10).map(|i| i as f64).collect()).unwrap();
        let y: Array1<f64> = x.column(0).iter().map(|v| 2.0 * v + 1.0).collect();
        (x, y)
    }

    #[test]
    fn test_knn_regressor() {
        let (x, y) = create_regression_data();

        let mut knn = KNNRegressor::new(3);
        knn.fit(&x, &y).unwrap();

        let predictions = knn.predict(&x).unwrap();
        let mse: f64 = y
            .iter()
            .zip(predictions.iter())
            .map(|(yi, pi)| (yi - pi).powi(2))
            .sum::<f64>()
            / y.len() as f64;

        assert!(mse < 1.0, "MSE ({}) should be low", mse);
    }

    #[test]
    fn test_k1_reproduces_training_targets() {
        let (x, y) = create_regression_data();
        let knn = KnnFitter::default().fit(1, &x, &y).unwrap();
        let predictions = knn.predict(&x).unwrap();
        for (p, t) in predictions.iter().zip(y.iter()) {
            assert_eq!(p, t);
        }
    }

    #[test]
    fn test_k_equal_n_predicts_global_mean() {
        let (x, y) = create_regression_data();
        let knn = KnnFitter::default().fit(10, &x, &y).unwrap();
        let mean = y.sum() / y.len() as f64;
        let predictions = knn.predict(&array![[-100.0], [4.5], [100.0]]).unwrap();
        for p in predictions.iter() {
            assert!((p - mean).abs() < 1e-12);
        }
    }

    #[test]
    fn test_fit_rejects_out_of_range_k() {
        let (x, y) = create_regression_data();
        assert!(KnnFitter::default().fit(0, &x, &y).is_err());
        let err = KnnFitter::default().fit(11, &x, &y).unwrap_err();
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn test_predict_before_fit() {
        let knn = KNNRegressor::new(1);
        let result = knn.predict(&array![[1.0]]);
        assert!(matches!(result, Err(ProcalError::ModelNotFitted)));
    }

    #[test]
    fn test_euclidean_distance() {
        let a = array![0.0, 0.0];
        let b = array![3.0, 4.0];
        assert!((euclidean(a.view(), b.view()) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_ties_at_the_boundary_keep_k_targets() {
        // 0.0 and 2.0 are equidistant from 1.0; exactly two neighbors survive
        let x = array![[0.0], [1.0], [2.0]];
        let y = array![10.0, 20.0, 30.0];
        let knn = KnnFitter.fit(2, &x, &y).unwrap();
        let p = knn.predict(&array![[1.0]]).unwrap()[0];
        assert!(p == 15.0 || p == 25.0, "{}", p);
    }
}
