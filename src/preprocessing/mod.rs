//! Feature encoding
//!
//! Turns the post-merge, post-date-expansion frame into the fixed-width
//! numeric matrix consumed by the regressors. Categorical columns are
//! one-hot encoded with an ignore-unknown policy; numeric columns pass
//! through unchanged.

mod encoder;

pub use encoder::FeatureEncoder;
