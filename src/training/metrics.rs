//! Regression metrics

use ndarray::Array1;

use crate::error::{ProcalError, Result};

/// Mean squared error between true and predicted targets
pub fn mean_squared_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    if y_true.len() != y_pred.len() {
        return Err(ProcalError::ShapeError {
            expected: format!("{} predictions", y_true.len()),
            actual: format!("{} predictions", y_pred.len()),
        });
    }
    if y_true.is_empty() {
        return Err(ProcalError::InvalidInput(
            "cannot compute MSE of an empty set".to_string(),
        ));
    }

    let n = y_true.len() as f64;
    let mse = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p) * (t - p))
        .sum::<f64>()
        / n;
    Ok(mse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_mse_perfect_fit() {
        let y = array![1.0, 2.0, 3.0];
        assert_eq!(mean_squared_error(&y, &y).unwrap(), 0.0);
    }

    #[test]
    fn test_mse_known_value() {
        let y_true = array![1.0, 2.0, 3.0, 4.0];
        let y_pred = array![2.0, 2.0, 1.0, 4.0];
        // (1 + 0 + 4 + 0) / 4
        assert_relative_eq!(mean_squared_error(&y_true, &y_pred).unwrap(), 1.25);
    }

    #[test]
    fn test_mse_length_mismatch() {
        let result = mean_squared_error(&array![1.0, 2.0], &array![1.0]);
        assert!(matches!(result, Err(ProcalError::ShapeError { .. })));
    }
}
