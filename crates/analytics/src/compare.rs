//! Actual vs Predicted Comparison

use crate::AnalyticsError;
use inference_engine::SalesModel;
use serde::{Deserialize, Serialize};
use storage::{SalesTable, StoreId};

/// Trailing months compared by default
pub const DEFAULT_COMPARE_POINTS: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonPoint {
    pub year: i32,
    pub month: u32,
    pub actual: f64,
    pub predicted: f64,
}

/// Model output on the store's own stored features for its last `points` months
pub fn compare(
    table: &SalesTable,
    model: &dyn SalesModel,
    store: StoreId,
    points: usize,
) -> Result<Vec<ComparisonPoint>, AnalyticsError> {
    let history = table.store_history(store);
    if history.is_empty() {
        return Err(AnalyticsError::StoreNotFound(store));
    }

    let recent = &history[history.len().saturating_sub(points)..];
    recent
        .iter()
        .map(|row| -> Result<ComparisonPoint, AnalyticsError> {
            Ok(ComparisonPoint {
                year: row.year(),
                month: row.month(),
                actual: row.total_sales,
                predicted: model.predict(&row.features.to_vector())?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::{FeatureRecord, FEATURE_DIMENSION};
    use inference_engine::LinearModel;
    use storage::ObservationRecord;

    fn table() -> SalesTable {
        let rows = (1..=9u32)
            .rev()
            .map(|month| {
                let mut values = [0.0; FEATURE_DIMENSION];
                values[0] = month as f64;
                ObservationRecord {
                    store: 3,
                    total_sales: month as f64 * 100.0,
                    features: FeatureRecord::from_values(2023, month, &values).unwrap(),
                }
            })
            .collect();
        SalesTable::new(rows)
    }

    fn lag_model() -> LinearModel {
        let mut coefficients = vec![0.0; FEATURE_DIMENSION];
        coefficients[0] = 10.0;
        LinearModel::new(0.0, coefficients)
    }

    #[test]
    fn test_trailing_points_in_calendar_order() {
        let points = compare(&table(), &lag_model(), 3, 6).unwrap();
        let months: Vec<_> = points.iter().map(|p| p.month).collect();
        assert_eq!(months, vec![4, 5, 6, 7, 8, 9]);
        assert_eq!(points[0].actual, 400.0);
        assert_eq!(points[0].predicted, 40.0);
    }

    #[test]
    fn test_more_points_than_history() {
        let points = compare(&table(), &lag_model(), 3, 50).unwrap();
        assert_eq!(points.len(), 9);
    }

    #[test]
    fn test_unknown_store() {
        assert!(matches!(
            compare(&table(), &lag_model(), 8, 6),
            Err(AnalyticsError::StoreNotFound(8))
        ));
    }
}
