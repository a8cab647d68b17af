//! Feed-forward neural network regressor
//!
//! A small dense network trained by mini-batch gradient descent with the
//! Adam optimizer on mean squared error. Root mean squared error is
//! recorded per epoch as the monitoring metric.

use crate::error::{Result, VelocountError};
use ndarray::{Array1, Array2, Axis};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use super::root_mean_squared_error;

/// Neural network configuration
///
/// Defaults mirror the production counter-prediction architecture: two
/// hidden ReLU layers of 25 and 15 units, one linear output unit, Adam
/// with a 0.001 learning rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeuralNetConfig {
    /// Hidden layer sizes
    pub hidden_layers: Vec<usize>,
    /// Adam learning rate
    pub learning_rate: f64,
    /// Adam first-moment decay
    pub beta1: f64,
    /// Adam second-moment decay
    pub beta2: f64,
    /// Number of passes over the training data
    pub max_epochs: usize,
    /// Mini-batch size
    pub batch_size: usize,
    /// Random seed for initialization and shuffling
    pub random_state: Option<u64>,
}

impl Default for NeuralNetConfig {
    fn default() -> Self {
        Self {
            hidden_layers: vec![25, 15],
            learning_rate: 0.001,
            beta1: 0.9,
            beta2: 0.999,
            max_epochs: 100,
            batch_size: 32,
            random_state: Some(42),
        }
    }
}

const ADAM_EPSILON: f64 = 1e-8;

/// Feed-forward regressor with ReLU hidden layers and a linear output unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeuralNetRegressor {
    config: NeuralNetConfig,
    weights: Vec<Array2<f64>>,
    biases: Vec<Array1<f64>>,
    rmse_history: Vec<f64>,
    n_features: usize,
    is_fitted: bool,
}

impl NeuralNetRegressor {
    pub fn new(config: NeuralNetConfig) -> Self {
        Self {
            config,
            weights: Vec::new(),
            biases: Vec::new(),
            rmse_history: Vec::new(),
            n_features: 0,
            is_fitted: false,
        }
    }

    /// Fit the network to a feature matrix and target vector
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(VelocountError::ShapeError {
                expected: format!("{n_samples} targets"),
                actual: format!("{}", y.len()),
            });
        }
        self.n_features = x.ncols();
        self.rmse_history.clear();

        let mut rng = match self.config.random_state {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        self.initialize_weights(&mut rng);

        // Adam moment estimates, one pair per layer
        let mut m_w: Vec<Array2<f64>> = self
            .weights
            .iter()
            .map(|w| Array2::zeros(w.raw_dim()))
            .collect();
        let mut v_w = m_w.clone();
        let mut m_b: Vec<Array1<f64>> = self
            .biases
            .iter()
            .map(|b| Array1::zeros(b.len()))
            .collect();
        let mut v_b = m_b.clone();
        let mut step = 0usize;

        for epoch in 0..self.config.max_epochs {
            let mut indices: Vec<usize> = (0..n_samples).collect();
            indices.shuffle(&mut rng);

            for batch in indices.chunks(self.config.batch_size) {
                let x_batch = gather_rows(x, batch);
                let y_batch: Array1<f64> = batch.iter().map(|&i| y[i]).collect();

                let (activations, z_values) = self.forward(&x_batch);
                let gradients = self.backward(&y_batch, &activations, &z_values);

                step += 1;
                let bc1 = 1.0 - self.config.beta1.powi(step as i32);
                let bc2 = 1.0 - self.config.beta2.powi(step as i32);

                for (i, (grad_w, grad_b)) in gradients.into_iter().enumerate() {
                    m_w[i] = &m_w[i] * self.config.beta1 + &grad_w * (1.0 - self.config.beta1);
                    v_w[i] = &v_w[i] * self.config.beta2
                        + &grad_w.mapv(|g| g * g) * (1.0 - self.config.beta2);
                    m_b[i] = &m_b[i] * self.config.beta1 + &grad_b * (1.0 - self.config.beta1);
                    v_b[i] = &v_b[i] * self.config.beta2
                        + &grad_b.mapv(|g| g * g) * (1.0 - self.config.beta2);

                    let update_w = (&m_w[i] / bc1) / &v_w[i].mapv(|v| (v / bc2).sqrt() + ADAM_EPSILON);
                    let update_b = (&m_b[i] / bc1) / &v_b[i].mapv(|v| (v / bc2).sqrt() + ADAM_EPSILON);

                    self.weights[i] = &self.weights[i] - &(update_w * self.config.learning_rate);
                    self.biases[i] = &self.biases[i] - &(update_b * self.config.learning_rate);
                }
            }

            let epoch_rmse = root_mean_squared_error(y, &self.predict_unchecked(x));
            tracing::debug!(epoch, rmse = epoch_rmse, "epoch complete");
            self.rmse_history.push(epoch_rmse);
        }

        self.is_fitted = true;
        Ok(())
    }

    /// Predict targets for a feature matrix
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(VelocountError::ModelNotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(VelocountError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{}", x.ncols()),
            });
        }
        Ok(self.predict_unchecked(x))
    }

    /// Per-epoch training RMSE recorded during the last fit
    pub fn rmse_history(&self) -> &[f64] {
        &self.rmse_history
    }

    fn predict_unchecked(&self, x: &Array2<f64>) -> Array1<f64> {
        let (activations, _) = self.forward(x);
        activations.last().unwrap().column(0).to_owned()
    }

    fn initialize_weights(&mut self, rng: &mut Xoshiro256PlusPlus) {
        self.weights.clear();
        self.biases.clear();

        let mut layer_sizes = vec![self.n_features];
        layer_sizes.extend(&self.config.hidden_layers);
        layer_sizes.push(1); // single linear output unit

        for i in 0..layer_sizes.len() - 1 {
            let n_in = layer_sizes[i];
            let n_out = layer_sizes[i + 1];

            // Xavier/Glorot uniform initialization
            let scale = (6.0 / (n_in + n_out) as f64).sqrt();
            let weights: Vec<f64> = (0..n_in * n_out)
                .map(|_| rng.gen::<f64>() * 2.0 * scale - scale)
                .collect();

            self.weights
                .push(Array2::from_shape_vec((n_in, n_out), weights).unwrap());
            self.biases.push(Array1::zeros(n_out));
        }
    }

    /// Forward pass, returning per-layer activations and pre-activations
    fn forward(&self, x: &Array2<f64>) -> (Vec<Array2<f64>>, Vec<Array2<f64>>) {
        let mut activations = vec![x.clone()];
        let mut z_values = Vec::new();

        for (i, (w, b)) in self.weights.iter().zip(self.biases.iter()).enumerate() {
            let z = activations.last().unwrap().dot(w) + b;
            z_values.push(z.clone());

            let a = if i < self.weights.len() - 1 {
                z.mapv(|v| v.max(0.0)) // ReLU
            } else {
                z // linear output
            };
            activations.push(a);
        }

        (activations, z_values)
    }

    /// Backpropagate the MSE gradient, returning per-layer weight and bias
    /// gradients in forward order
    fn backward(
        &self,
        y: &Array1<f64>,
        activations: &[Array2<f64>],
        z_values: &[Array2<f64>],
    ) -> Vec<(Array2<f64>, Array1<f64>)> {
        let n = y.len() as f64;
        let mut gradients = Vec::new();

        let y_2d = y.clone().insert_axis(Axis(1));
        let output = activations.last().unwrap();
        let mut delta = (output - &y_2d) * (2.0 / n);

        for i in (0..self.weights.len()).rev() {
            let a_prev = &activations[i];
            let grad_w = a_prev.t().dot(&delta);
            let grad_b = delta.sum_axis(Axis(0));
            gradients.push((grad_w, grad_b));

            if i > 0 {
                let relu_grad = z_values[i - 1].mapv(|v| if v > 0.0 { 1.0 } else { 0.0 });
                delta = delta.dot(&self.weights[i].t()) * relu_grad;
            }
        }

        gradients.reverse();
        gradients
    }
}

fn gather_rows(x: &Array2<f64>, indices: &[usize]) -> Array2<f64> {
    let n_cols = x.ncols();
    let mut rows = Vec::with_capacity(indices.len() * n_cols);
    for &i in indices {
        rows.extend(x.row(i).iter().copied());
    }
    Array2::from_shape_vec((indices.len(), n_cols), rows).unwrap()
}
