//! One-hot encoding with numeric passthrough

use crate::error::{Result, VelocountError};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Encodes enumerated categorical columns as indicator blocks and copies
/// enumerated numeric columns through unchanged.
///
/// Fit learns a sorted category vocabulary per categorical column. Values
/// are compared by their string rendering, so integer-coded columns (`year`,
/// `conf`, `ww`, ...) and string columns encode uniformly. At transform
/// time a category unseen during fit, or a null, produces an all-zero
/// indicator block rather than an error. Columns not named in either list
/// are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureEncoder {
    categorical_columns: Vec<String>,
    numeric_columns: Vec<String>,
    categories: HashMap<String, Vec<String>>,
    is_fitted: bool,
}

impl FeatureEncoder {
    /// Create an encoder over explicit column lists
    pub fn new<S: Into<String> + Clone>(categorical: &[S], numeric: &[S]) -> Self {
        Self {
            categorical_columns: categorical.iter().cloned().map(Into::into).collect(),
            numeric_columns: numeric.iter().cloned().map(Into::into).collect(),
            categories: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Learn the category vocabulary of every categorical column
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        self.categories.clear();

        for col_name in &self.categorical_columns {
            let values = string_values(df, col_name)?;
            let unique: BTreeSet<String> = values.into_iter().flatten().collect();
            self.categories
                .insert(col_name.clone(), unique.into_iter().collect());
        }

        // Numeric columns carry no state, but must exist at fit time
        for col_name in &self.numeric_columns {
            if df.column(col_name).is_err() {
                return Err(VelocountError::FeatureNotFound(col_name.clone()));
            }
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Encode a frame into the fixed-width feature matrix
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(VelocountError::ModelNotFitted);
        }

        let n_rows = df.height();
        let mut matrix = Array2::<f64>::zeros((n_rows, self.n_features_out()));

        let mut offset = 0usize;
        for col_name in &self.categorical_columns {
            let vocabulary = &self.categories[col_name];
            let index: HashMap<&str, usize> = vocabulary
                .iter()
                .enumerate()
                .map(|(i, v)| (v.as_str(), i))
                .collect();

            let values = string_values(df, col_name)?;
            for (row, value) in values.iter().enumerate() {
                if let Some(pos) = value.as_deref().and_then(|v| index.get(v)) {
                    matrix[[row, offset + pos]] = 1.0;
                }
            }
            offset += vocabulary.len();
        }

        for col_name in &self.numeric_columns {
            let column = df
                .column(col_name)
                .map_err(|_| VelocountError::FeatureNotFound(col_name.clone()))?;
            let ca = column
                .as_materialized_series()
                .cast(&DataType::Float64)?
                .f64()?
                .clone();
            for (row, value) in ca.into_iter().enumerate() {
                matrix[[row, offset]] = value.unwrap_or(f64::NAN);
            }
            offset += 1;
        }

        Ok(matrix)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Width of the encoded matrix
    pub fn n_features_out(&self) -> usize {
        let indicator_width: usize = self
            .categorical_columns
            .iter()
            .map(|c| self.categories.get(c).map_or(0, Vec::len))
            .sum();
        indicator_width + self.numeric_columns.len()
    }

    /// Output column names: `column=category` per indicator, then numerics
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.n_features_out());
        for col_name in &self.categorical_columns {
            if let Some(vocabulary) = self.categories.get(col_name) {
                names.extend(vocabulary.iter().map(|v| format!("{col_name}={v}")));
            }
        }
        names.extend(self.numeric_columns.iter().cloned());
        names
    }
}

/// Read a column as null-preserving strings, casting non-string dtypes
fn string_values(df: &DataFrame, col_name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(col_name)
        .map_err(|_| VelocountError::FeatureNotFound(col_name.to_string()))?;
    let casted = column.as_materialized_series().cast(&DataType::String)?;
    Ok(casted
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}
