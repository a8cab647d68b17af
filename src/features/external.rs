//! Backward as-of enrichment with external weather/calendar data

use crate::data::DataLoader;
use crate::error::{Result, VelocountError};
use polars::prelude::*;

/// Auxiliary columns attached to every input row, in output order
pub const AUXILIARY_COLUMNS: [&str; 5] = ["conf", "hourly", "ww", "rr1", "etat_sol"];

/// Attaches external observations to input rows via a backward as-of match.
///
/// The auxiliary table (lockdown/curfew flags plus weather readings) is
/// loaded once at construction and held immutable. Each input row receives
/// the auxiliary row with the greatest timestamp that is less than or equal
/// to its own `date`; rows that precede every auxiliary observation receive
/// nulls. The input row order is preserved: `output[i]` always corresponds
/// to `input[i]`.
#[derive(Debug, Clone)]
pub struct ExternalDataMerger {
    /// Auxiliary value columns, sorted ascending by observation timestamp
    aux_values: DataFrame,
    /// Observation timestamps (epoch milliseconds) matching `aux_values` rows
    timestamps: Vec<i64>,
}

impl ExternalDataMerger {
    /// Load the auxiliary table from a CSV file
    pub fn from_csv(path: &str) -> Result<Self> {
        let df = DataLoader::new().load_csv(path)?;
        Self::from_frame(df)
    }

    /// Build the merger from an already-loaded auxiliary frame
    pub fn from_frame(df: DataFrame) -> Result<Self> {
        for name in std::iter::once("date").chain(AUXILIARY_COLUMNS) {
            if df.column(name).is_err() {
                return Err(VelocountError::FeatureNotFound(name.to_string()));
            }
        }

        let raw_ts = datetime_millis(df.column("date")?.as_materialized_series())?;

        // Stable sort by timestamp, dropping null-dated auxiliary rows.
        // Stability makes duplicate timestamps resolve last-in-file-order.
        let mut order: Vec<(u32, i64)> = raw_ts
            .iter()
            .enumerate()
            .filter_map(|(i, ts)| ts.map(|t| (i as u32, t)))
            .collect();
        order.sort_by_key(|&(_, t)| t);

        let perm: Vec<IdxSize> = order.iter().map(|&(i, _)| i as IdxSize).collect();
        let timestamps: Vec<i64> = order.iter().map(|&(_, t)| t).collect();

        let aux_values = df
            .select(AUXILIARY_COLUMNS)?
            .take(&IdxCa::from_vec("perm".into(), perm))?;

        Ok(Self {
            aux_values,
            timestamps,
        })
    }

    /// Number of auxiliary observations held by the merger
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Attach auxiliary columns to each input row
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let column = df
            .column("date")
            .map_err(|_| VelocountError::FeatureNotFound("date".to_string()))?;
        let left_ts = datetime_millis(column.as_materialized_series())?;

        let matches = self.match_indices(&left_ts);
        let idx = IdxCa::from_iter_options("aux_idx".into(), matches.into_iter());
        let attached = self.aux_values.take(&idx)?;

        let result = df.hstack(attached.get_columns())?;
        Ok(result)
    }

    /// For each input timestamp, find the index of the last auxiliary row
    /// with timestamp <= it.
    ///
    /// Works as a single merge-scan over the two sorted sequences: input
    /// rows are visited in ascending timestamp order via a sort permutation,
    /// so the auxiliary cursor only ever moves forward. Results are written
    /// back at each row's original position, which is what preserves the
    /// input order in the output.
    fn match_indices(&self, left_ts: &[Option<i64>]) -> Vec<Option<IdxSize>> {
        let mut left_order: Vec<(usize, i64)> = left_ts
            .iter()
            .enumerate()
            .filter_map(|(i, ts)| ts.map(|t| (i, t)))
            .collect();
        left_order.sort_by_key(|&(_, t)| t);

        let mut matches: Vec<Option<IdxSize>> = vec![None; left_ts.len()];
        let mut cursor = 0usize;
        for (orig_idx, t) in left_order {
            while cursor < self.timestamps.len() && self.timestamps[cursor] <= t {
                cursor += 1;
            }
            if cursor > 0 {
                matches[orig_idx] = Some((cursor - 1) as IdxSize);
            }
        }
        matches
    }
}

/// Extract a datetime column as epoch milliseconds, null-preserving
fn datetime_millis(series: &Series) -> Result<Vec<Option<i64>>> {
    let casted = match series.dtype() {
        DataType::Datetime(TimeUnit::Milliseconds, None) => series.clone(),
        DataType::Datetime(_, _) | DataType::Date => {
            series.cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        }
        other => {
            return Err(VelocountError::DataError(format!(
                "column '{}' has non-temporal dtype {other}",
                series.name()
            )))
        }
    };
    Ok(casted.datetime()?.into_iter().collect())
}
