//! Regression models
//!
//! Two fixed-hyperparameter regressors back the pipelines:
//! - Gradient-boosted decision trees with second-order squared-error
//!   boosting (variant 1)
//! - A small feed-forward neural network trained with Adam (variant 2)

pub mod gradient_boosting;
pub mod neural_network;

pub use gradient_boosting::{GradientBoostingConfig, GradientBoostingRegressor};
pub use neural_network::{NeuralNetConfig, NeuralNetRegressor};

use ndarray::Array1;

/// Root mean squared error between targets and predictions
pub fn root_mean_squared_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let mse = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / y_true.len() as f64;
    mse.sqrt()
}
