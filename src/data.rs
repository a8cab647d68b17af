//! Data loading utilities

use crate::error::{Result, VelocountError};
use polars::prelude::*;
use std::fs::File;

/// Loader for tabular data files consumed by the pipelines
pub struct DataLoader {
    /// Parse date-like string columns into Datetime columns
    try_parse_dates: bool,
    /// Number of rows used for schema inference
    infer_schema_length: Option<usize>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self {
            try_parse_dates: true,
            infer_schema_length: Some(100),
        }
    }

    /// Enable or disable automatic date parsing
    pub fn with_date_parsing(mut self, enabled: bool) -> Self {
        self.try_parse_dates = enabled;
        self
    }

    /// Set the number of rows used for schema inference
    pub fn with_infer_schema_length(mut self, n: usize) -> Self {
        self.infer_schema_length = Some(n);
        self
    }

    /// Load a CSV file with a header row
    pub fn load_csv(&self, path: &str) -> Result<DataFrame> {
        let file = File::open(path)
            .map_err(|e| VelocountError::DataError(format!("{path}: {e}")))?;

        let parse_opts = CsvParseOptions::default()
            .with_try_parse_dates(self.try_parse_dates);

        let reader = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(file);

        reader
            .finish()
            .map_err(|e| VelocountError::DataError(e.to_string()))
    }
}
