//! Feature Importance Split

use crate::AnalyticsError;
use feature_engine::{ACTIONABLE_FEATURES, FEATURE_DIMENSION, FEATURE_NAMES};
use inference_engine::SalesModel;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Importances split into manager-controllable and contextual features
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImportanceSplit {
    pub actionable: Vec<FeatureImportance>,
    pub conceptual: Vec<FeatureImportance>,
}

/// Pair the model's importances with feature names and split them.
///
/// Each half is sorted by importance, highest first.
pub fn split_importances(model: &dyn SalesModel) -> Result<ImportanceSplit, AnalyticsError> {
    let importances = model
        .feature_importances()
        .ok_or(AnalyticsError::ImportancesUnavailable)?;

    if importances.len() != FEATURE_DIMENSION {
        return Err(AnalyticsError::ImportanceLength {
            expected: FEATURE_DIMENSION,
            actual: importances.len(),
        });
    }

    let mut ranked: Vec<FeatureImportance> = FEATURE_NAMES
        .iter()
        .zip(importances)
        .map(|(name, importance)| FeatureImportance {
            feature: name.to_string(),
            importance,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(Ordering::Equal)
    });

    let (actionable, conceptual) = ranked
        .into_iter()
        .partition(|f| ACTIONABLE_FEATURES.contains(&f.feature.as_str()));

    Ok(ImportanceSplit {
        actionable,
        conceptual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use inference_engine::LinearModel;

    #[test]
    fn test_split_and_sort() {
        let importances: Vec<f64> = (0..FEATURE_DIMENSION).map(|i| i as f64 / 100.0).collect();
        let model = LinearModel::constant(0.0).with_importances(importances);

        let split = split_importances(&model).unwrap();
        let actionable: Vec<_> = split.actionable.iter().map(|f| f.feature.as_str()).collect();
        assert_eq!(
            actionable,
            vec!["Average_Price", "Is_Promotion_Month", "Profit_Margin"]
        );

        assert_eq!(split.conceptual.len(), 13);
        assert_eq!(split.conceptual[0].feature, "sales_to_avg_ratio");
        assert_eq!(split.conceptual[12].feature, "Lag_1");
        assert!(split
            .conceptual
            .windows(2)
            .all(|w| w[0].importance >= w[1].importance));
    }

    #[test]
    fn test_short_importances_are_configuration_error() {
        let model = LinearModel::constant(0.0).with_importances(vec![0.1; 15]);
        match split_importances(&model) {
            Err(AnalyticsError::ImportanceLength { expected, actual }) => {
                assert_eq!((expected, actual), (16, 15))
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_model_without_importances() {
        let model = LinearModel::constant(0.0);
        assert!(matches!(
            split_importances(&model),
            Err(AnalyticsError::ImportancesUnavailable)
        ));
    }
}
