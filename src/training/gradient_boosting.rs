//! Gradient-boosted decision trees for squared-error regression
//!
//! Second-order boosting in the XGBoost style:
//! - gradient and hessian of the loss drive tree construction
//!   (squared error: grad = pred - y, hess = 1)
//! - regularized leaf weights: w* = -G / (H + lambda)
//! - gain-scored exact greedy splits:
//!   Gain = 0.5 * [GL²/(HL+λ) + GR²/(HR+λ) - (GL+GR)²/(HL+HR+λ)] - γ

use crate::error::Result;
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Gradient boosting configuration
///
/// Defaults mirror the production counter-prediction constants: 110 trees
/// of depth 8 with a 0.2 learning rate, squared-error objective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingConfig {
    /// Number of boosting rounds (trees)
    pub n_estimators: usize,
    /// Shrinkage applied to every tree's contribution
    pub learning_rate: f64,
    /// Maximum tree depth
    pub max_depth: usize,
    /// Minimum hessian sum required in each child
    pub min_child_weight: f64,
    /// L2 regularization on leaf weights
    pub reg_lambda: f64,
    /// Minimum gain required to make a split
    pub gamma: f64,
    /// Row subsample ratio per tree
    pub subsample: f64,
    /// Random seed
    pub random_state: Option<u64>,
}

impl Default for GradientBoostingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 110,
            learning_rate: 0.2,
            max_depth: 8,
            min_child_weight: 1.0,
            reg_lambda: 1.0,
            gamma: 0.0,
            subsample: 1.0,
            random_state: Some(42),
        }
    }
}

/// A single node of a boosted regression tree
#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        weight: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, sample: &[f64]) -> f64 {
        match self {
            Node::Leaf { weight } => *weight,
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if sample[*feature] <= *threshold {
                    left.predict(sample)
                } else {
                    right.predict(sample)
                }
            }
        }
    }
}

/// Gradient Boosting Regressor (squared error loss)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingRegressor {
    config: GradientBoostingConfig,
    trees: Vec<Node>,
    base_score: f64,
    n_features: usize,
}

impl GradientBoostingRegressor {
    pub fn new(config: GradientBoostingConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            base_score: 0.0,
            n_features: 0,
        }
    }

    /// Fit the ensemble to a feature matrix and target vector
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        self.n_features = x.ncols();

        // Base prediction = mean(y)
        self.base_score = y.mean().unwrap_or(0.0);
        let mut preds = Array1::from_elem(n_samples, self.base_score);

        let mut rng = match self.config.random_state {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        let features: Vec<usize> = (0..self.n_features).collect();
        self.trees.clear();

        for round in 0..self.config.n_estimators {
            // Squared error: grad = pred - y, hess = 1
            let grad: Array1<f64> = &preds - y;
            let hess = Array1::from_elem(n_samples, 1.0);

            let rows = subsample_rows(&mut rng, n_samples, self.config.subsample);
            let tree = build_tree(x, &grad, &hess, &rows, &features, 0, &self.config);

            for i in 0..n_samples {
                let row = x.row(i);
                preds[i] += self.config.learning_rate * tree.predict(row.as_slice().unwrap());
            }

            tracing::trace!(round, "boosting round complete");
            self.trees.push(tree);
        }

        Ok(())
    }

    /// Predict targets for a feature matrix
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let n = x.nrows();
        let mut preds = Array1::from_elem(n, self.base_score);
        for i in 0..n {
            let row = x.row(i);
            let sample = row.as_slice().unwrap();
            for tree in &self.trees {
                preds[i] += self.config.learning_rate * tree.predict(sample);
            }
        }
        Ok(preds)
    }

    /// Coefficient of determination (R²)
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let p = self.predict(x)?;
        let ym = y.mean().unwrap_or(0.0);
        let ss_res = (&p - y).mapv(|v| v * v).sum();
        let ss_tot = y.mapv(|v| (v - ym).powi(2)).sum();
        Ok(if ss_tot == 0.0 { 1.0 } else { 1.0 - ss_res / ss_tot })
    }

    /// Split-count feature importances, normalized to sum to one
    pub fn feature_importances(&self) -> Option<Array1<f64>> {
        if self.n_features == 0 {
            return None;
        }
        let mut counts = vec![0.0f64; self.n_features];
        for tree in &self.trees {
            count_splits(tree, &mut counts);
        }
        let total: f64 = counts.iter().sum();
        if total > 0.0 {
            for c in counts.iter_mut() {
                *c /= total;
            }
        }
        Some(Array1::from_vec(counts))
    }
}

fn count_splits(node: &Node, counts: &mut [f64]) {
    if let Node::Split {
        feature,
        left,
        right,
        ..
    } = node
    {
        if *feature < counts.len() {
            counts[*feature] += 1.0;
        }
        count_splits(left, counts);
        count_splits(right, counts);
    }
}

/// Recursively build one boosted tree using exact greedy split finding
fn build_tree(
    x: &Array2<f64>,
    grad: &Array1<f64>,
    hess: &Array1<f64>,
    indices: &[usize],
    features: &[usize],
    depth: usize,
    config: &GradientBoostingConfig,
) -> Node {
    let g_sum: f64 = indices.iter().map(|&i| grad[i]).sum();
    let h_sum: f64 = indices.iter().map(|&i| hess[i]).sum();
    let leaf_weight = -g_sum / (h_sum + config.reg_lambda);

    if depth >= config.max_depth || indices.len() < 2 || h_sum < config.min_child_weight {
        return Node::Leaf {
            weight: leaf_weight,
        };
    }

    // Best split across features, searched in parallel
    let best = features
        .par_iter()
        .filter_map(|&f| best_split_for_feature(x, grad, hess, indices, f, config))
        .max_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal));

    match best {
        Some((feature, threshold, gain)) if gain > config.gamma => {
            let (left_idx, right_idx): (Vec<usize>, Vec<usize>) =
                indices.iter().partition(|&&i| x[[i, feature]] <= threshold);

            if left_idx.is_empty() || right_idx.is_empty() {
                return Node::Leaf {
                    weight: leaf_weight,
                };
            }

            let left = build_tree(x, grad, hess, &left_idx, features, depth + 1, config);
            let right = build_tree(x, grad, hess, &right_idx, features, depth + 1, config);

            Node::Split {
                feature,
                threshold,
                left: Box::new(left),
                right: Box::new(right),
            }
        }
        _ => Node::Leaf {
            weight: leaf_weight,
        },
    }
}

/// Exact greedy split search over a single feature
fn best_split_for_feature(
    x: &Array2<f64>,
    grad: &Array1<f64>,
    hess: &Array1<f64>,
    indices: &[usize],
    feature: usize,
    config: &GradientBoostingConfig,
) -> Option<(usize, f64, f64)> {
    let mut sorted: Vec<usize> = indices.to_vec();
    sorted.sort_by(|&a, &b| {
        x[[a, feature]]
            .partial_cmp(&x[[b, feature]])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let g_total: f64 = sorted.iter().map(|&i| grad[i]).sum();
    let h_total: f64 = sorted.iter().map(|&i| hess[i]).sum();
    let lambda = config.reg_lambda;

    let mut g_left = 0.0;
    let mut h_left = 0.0;
    let mut best: Option<(usize, f64, f64)> = None;

    for (pos, &idx) in sorted.iter().enumerate() {
        g_left += grad[idx];
        h_left += hess[idx];

        if pos + 1 >= sorted.len() {
            break;
        }
        // Cannot split between identical feature values
        let next = sorted[pos + 1];
        if (x[[idx, feature]] - x[[next, feature]]).abs() < 1e-12 {
            continue;
        }

        let g_right = g_total - g_left;
        let h_right = h_total - h_left;
        if h_left < config.min_child_weight || h_right < config.min_child_weight {
            continue;
        }

        let gain = 0.5
            * ((g_left * g_left) / (h_left + lambda) + (g_right * g_right) / (h_right + lambda)
                - (g_total * g_total) / (h_total + lambda));

        if best.map_or(true, |(_, _, g)| gain > g) {
            let threshold = (x[[idx, feature]] + x[[next, feature]]) / 2.0;
            best = Some((feature, threshold, gain));
        }
    }

    best
}

fn subsample_rows(rng: &mut Xoshiro256PlusPlus, n: usize, ratio: f64) -> Vec<usize> {
    if ratio >= 1.0 {
        return (0..n).collect();
    }
    let k = ((n as f64) * ratio).ceil() as usize;
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    indices.truncate(k);
    indices.sort_unstable();
    indices
}
