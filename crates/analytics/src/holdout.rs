//! Holdout Error Metrics
//!
//! The trailing rows of the table stand in for a test split. They are not
//! guaranteed to be unseen by the model.

use crate::AnalyticsError;
use feature_engine::{round2, FeatureVector};
use inference_engine::SalesModel;
use serde::{Deserialize, Serialize};
use storage::SalesTable;
use tracing::debug;

/// Trailing rows evaluated by default
pub const DEFAULT_HOLDOUT_ROWS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoldoutMetrics {
    #[serde(rename = "MAE")]
    pub mae: f64,
    #[serde(rename = "RMSE")]
    pub rmse: f64,
}

/// MAE and RMSE of the model over the last `rows` observations
pub fn holdout_metrics(
    table: &SalesTable,
    model: &dyn SalesModel,
    rows: usize,
) -> Result<HoldoutMetrics, AnalyticsError> {
    let holdout = table.tail(rows);
    if holdout.is_empty() {
        return Err(AnalyticsError::EmptyTable);
    }

    let inputs: Vec<FeatureVector> = holdout.iter().map(|r| r.features.to_vector()).collect();
    let predictions = model.predict_batch(&inputs)?;

    let n = holdout.len() as f64;
    let (abs_sum, sq_sum) = holdout
        .iter()
        .zip(&predictions)
        .fold((0.0, 0.0), |(abs_sum, sq_sum), (row, predicted)| {
            let err = row.total_sales - predicted;
            (abs_sum + err.abs(), sq_sum + err * err)
        });

    let mae = abs_sum / n;
    let rmse = (sq_sum / n).sqrt();
    debug!("Holdout over {} rows: mae={} rmse={}", holdout.len(), mae, rmse);

    Ok(HoldoutMetrics {
        mae: round2(mae),
        rmse: round2(rmse),
    })
}
