//! Calendar feature extraction from the timestamp column

use crate::error::{Result, VelocountError};
use polars::prelude::*;

/// Names of the derived calendar columns, in output order
pub const DATE_FEATURE_COLUMNS: [&str; 5] = ["year", "month", "day", "weekday", "hour"];

/// Derives integer calendar fields from the `date` column.
///
/// The transform is stateless: it needs no fit step and never mutates its
/// input. The output frame carries `year`, `month`, `day`, `weekday`
/// (0=Monday..6=Sunday) and `hour` (0-23) as Int32 columns, with the
/// original `date` column removed. Null dates propagate as null derived
/// fields.
#[derive(Debug, Clone, Default)]
pub struct DateFeatureExtractor;

impl DateFeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Expand `date` into calendar columns and drop it
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let column = df
            .column("date")
            .map_err(|_| VelocountError::FeatureNotFound("date".to_string()))?;
        let series = column.as_materialized_series();

        let datetime = match series.dtype() {
            DataType::Datetime(_, _) => series.clone(),
            DataType::Date => series.cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?,
            other => {
                return Err(VelocountError::DataError(format!(
                    "column 'date' has non-temporal dtype {other}"
                )))
            }
        };

        let year = datetime.year()?.into_series();
        let month = datetime.month()?.into_series();
        let day = datetime.day()?.into_series();
        // polars numbers weekdays 1=Monday..7=Sunday; shift to 0-based
        let weekday = datetime.weekday()?.apply_values(|v| v - 1).into_series();
        let hour = datetime.hour()?.into_series();

        let mut result = df.drop("date")?;
        for (name, series) in DATE_FEATURE_COLUMNS
            .iter()
            .zip([year, month, day, weekday, hour])
        {
            let casted = series.cast(&DataType::Int32)?.with_name((*name).into());
            result.with_column(casted)?;
        }

        Ok(result)
    }
}
