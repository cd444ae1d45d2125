//! Sales Analytics
//!
//! Stateless views over the historical table and the loaded model. None of
//! them depend on the forecast engine.

mod compare;
mod holdout;
mod importance;
mod seasonality;

pub use compare::{compare, ComparisonPoint, DEFAULT_COMPARE_POINTS};
pub use holdout::{holdout_metrics, HoldoutMetrics, DEFAULT_HOLDOUT_ROWS};
pub use importance::{split_importances, FeatureImportance, ImportanceSplit};
pub use seasonality::{seasonality, MonthlySeasonality};

use inference_engine::InferenceError;
use storage::{SalesTable, StoreId};
use thiserror::Error;

/// Errors raised by analytics views
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Store {0} not found.")]
    StoreNotFound(StoreId),
    #[error("No rows available for evaluation")]
    EmptyTable,
    #[error("Model does not provide feature importances")]
    ImportancesUnavailable,
    #[error("Mismatch between model features ({expected}) and feature importances ({actual})")]
    ImportanceLength { expected: usize, actual: usize },
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Distinct store identifiers, ascending
pub fn list_stores(table: &SalesTable) -> Vec<StoreId> {
    table.store_ids()
}
