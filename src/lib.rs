//! velocount - bicycle counter traffic prediction
//!
//! Two alternative model-training pipelines for predicting bicycle counter
//! readings from timestamped records plus external weather/calendar data:
//!
//! - **Gradient boosted variant**: backward as-of merge with an external
//!   weather/lockdown table, date feature extraction, one-hot encoding,
//!   gradient boosted trees.
//! - **Neural variant**: date feature extraction, one-hot encoding, a small
//!   feed-forward network.
//!
//! # Modules
//!
//! - [`features`] - date expansion and external-data as-of enrichment
//! - [`preprocessing`] - one-hot encoding with numeric passthrough
//! - [`training`] - the two regression models
//! - [`pipeline`] - stage composition and the factory entry points
//! - [`data`] - CSV loading for the auxiliary table
//!
//! # Example
//!
//! ```no_run
//! use polars::prelude::*;
//! use velocount::gradient_boosted_estimator;
//!
//! # fn main() -> velocount::Result<()> {
//! let train: DataFrame = unimplemented!("frame with date/counter_name/site_name");
//! let target: Series = unimplemented!("bike counts");
//!
//! let mut pipeline = gradient_boosted_estimator()?;
//! pipeline.fit(&train, &target)?;
//! let predictions = pipeline.predict(&train)?;
//! # Ok(())
//! # }
//! ```

pub mod data;
pub mod error;
pub mod features;
pub mod pipeline;
pub mod preprocessing;
pub mod training;

pub use error::{Result, VelocountError};
pub use pipeline::{gradient_boosted_estimator, neural_estimator, CounterPipeline};
