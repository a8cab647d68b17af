//! Feature derivation stages
//!
//! Provides the two frame-to-frame transforms that run ahead of encoding:
//! - Calendar field extraction from the `date` column
//! - Backward as-of enrichment with external weather/calendar data

mod dates;
mod external;

pub use dates::{DateFeatureExtractor, DATE_FEATURE_COLUMNS};
pub use external::{ExternalDataMerger, AUXILIARY_COLUMNS};
