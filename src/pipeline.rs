//! Pipeline composition and public entry points
//!
//! Control flow is strictly linear: raw frame -> (external merge) -> date
//! expansion -> encoding -> regression. `fit` trains every stage in
//! sequence; `predict` replays the same transform chain with the
//! parameters learned during fit.

use crate::error::{Result, VelocountError};
use crate::features::{DateFeatureExtractor, ExternalDataMerger, DATE_FEATURE_COLUMNS};
use crate::preprocessing::FeatureEncoder;
use crate::training::{
    GradientBoostingConfig, GradientBoostingRegressor, NeuralNetConfig, NeuralNetRegressor,
};
use ndarray::Array1;
use polars::prelude::*;

/// Auxiliary table shipped alongside the crate, used by the gradient
/// boosted variant
pub const DEFAULT_EXTERNAL_DATA_PATH: &str = "data/external_conditions.csv";

/// Identifying categorical columns expected on every input frame
const COUNTER_COLUMNS: [&str; 2] = ["counter_name", "site_name"];

/// Categorical columns contributed by the external merge
const EXTERNAL_CATEGORICAL_COLUMNS: [&str; 4] = ["etat_sol", "conf", "hourly", "ww"];

/// Numeric passthrough columns contributed by the external merge
const EXTERNAL_NUMERIC_COLUMNS: [&str; 1] = ["rr1"];

enum Regressor {
    GradientBoosting(GradientBoostingRegressor),
    NeuralNet(NeuralNetRegressor),
}

/// A fittable/predictable bicycle-counter regression pipeline
pub struct CounterPipeline {
    merger: Option<ExternalDataMerger>,
    date_extractor: DateFeatureExtractor,
    encoder: FeatureEncoder,
    regressor: Regressor,
    is_fitted: bool,
}

impl CounterPipeline {
    /// Variant 1: external merge + gradient boosted trees, default constants
    pub fn gradient_boosted(merger: ExternalDataMerger) -> Self {
        Self::gradient_boosted_with_config(merger, GradientBoostingConfig::default())
    }

    /// Variant 1 with explicit booster configuration
    pub fn gradient_boosted_with_config(
        merger: ExternalDataMerger,
        config: GradientBoostingConfig,
    ) -> Self {
        let categorical: Vec<String> = DATE_FEATURE_COLUMNS
            .iter()
            .chain(COUNTER_COLUMNS.iter())
            .chain(EXTERNAL_CATEGORICAL_COLUMNS.iter())
            .map(|s| s.to_string())
            .collect();
        let numeric: Vec<String> = EXTERNAL_NUMERIC_COLUMNS
            .iter()
            .map(|s| s.to_string())
            .collect();

        Self {
            merger: Some(merger),
            date_extractor: DateFeatureExtractor::new(),
            encoder: FeatureEncoder::new(&categorical, &numeric),
            regressor: Regressor::GradientBoosting(GradientBoostingRegressor::new(config)),
            is_fitted: false,
        }
    }

    /// Variant 2: date features only + feed-forward network, default
    /// architecture
    pub fn neural() -> Self {
        Self::neural_with_config(NeuralNetConfig::default())
    }

    /// Variant 2 with explicit network configuration
    pub fn neural_with_config(config: NeuralNetConfig) -> Self {
        let categorical: Vec<String> = DATE_FEATURE_COLUMNS
            .iter()
            .chain(COUNTER_COLUMNS.iter())
            .map(|s| s.to_string())
            .collect();

        Self {
            merger: None,
            date_extractor: DateFeatureExtractor::new(),
            encoder: FeatureEncoder::new(&categorical, &[]),
            regressor: Regressor::NeuralNet(NeuralNetRegressor::new(config)),
            is_fitted: false,
        }
    }

    /// Train every stage in sequence on a feature frame and target series
    pub fn fit(&mut self, x: &DataFrame, y: &Series) -> Result<()> {
        let frame = self.apply_frame_stages(x)?;
        let features = self.encoder.fit_transform(&frame)?;
        let target = target_vector(y)?;

        if target.len() != features.nrows() {
            return Err(VelocountError::ShapeError {
                expected: format!("{} targets", features.nrows()),
                actual: format!("{}", target.len()),
            });
        }

        tracing::debug!(
            rows = features.nrows(),
            features = features.ncols(),
            "fitting regressor"
        );

        match &mut self.regressor {
            Regressor::GradientBoosting(model) => model.fit(&features, &target)?,
            Regressor::NeuralNet(model) => model.fit(&features, &target)?,
        }

        self.is_fitted = true;
        Ok(())
    }

    /// Replay the transform chain and predict one value per input row
    pub fn predict(&self, x: &DataFrame) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(VelocountError::ModelNotFitted);
        }

        let frame = self.apply_frame_stages(x)?;
        let features = self.encoder.transform(&frame)?;

        match &self.regressor {
            Regressor::GradientBoosting(model) => model.predict(&features),
            Regressor::NeuralNet(model) => model.predict(&features),
        }
    }

    /// Names of the encoded feature columns (after fit)
    pub fn feature_names(&self) -> Vec<String> {
        self.encoder.feature_names()
    }

    fn apply_frame_stages(&self, x: &DataFrame) -> Result<DataFrame> {
        let merged = match &self.merger {
            Some(merger) => merger.transform(x)?,
            None => x.clone(),
        };
        self.date_extractor.transform(&merged)
    }
}

/// Zero-argument factory for the gradient boosted variant
///
/// Loads the auxiliary weather/calendar table from
/// [`DEFAULT_EXTERNAL_DATA_PATH`].
pub fn gradient_boosted_estimator() -> Result<CounterPipeline> {
    let merger = ExternalDataMerger::from_csv(DEFAULT_EXTERNAL_DATA_PATH)?;
    Ok(CounterPipeline::gradient_boosted(merger))
}

/// Zero-argument factory for the neural network variant
pub fn neural_estimator() -> CounterPipeline {
    CounterPipeline::neural()
}

/// Convert the target series to a Float64 vector, null -> NaN
fn target_vector(y: &Series) -> Result<Array1<f64>> {
    let casted = y.cast(&DataType::Float64)?;
    let ca = casted.f64()?;
    Ok(ca.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}
