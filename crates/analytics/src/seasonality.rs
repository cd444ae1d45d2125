//! Monthly Seasonality

use crate::AnalyticsError;
use feature_engine::WindowStats;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use storage::{SalesTable, StoreId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySeasonality {
    pub month: u32,
    pub avg_sales: f64,
    /// Sample standard deviation; 0.0 for a single observation
    pub std_sales: f64,
}

/// Mean and spread of `Total_Sales` per calendar month, optionally for one store
pub fn seasonality(
    table: &SalesTable,
    store: Option<StoreId>,
) -> Result<Vec<MonthlySeasonality>, AnalyticsError> {
    if let Some(id) = store {
        if !table.contains_store(id) {
            return Err(AnalyticsError::StoreNotFound(id));
        }
    }

    let mut by_month: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for row in table
        .rows()
        .iter()
        .filter(|r| store.map_or(true, |id| r.store == id))
    {
        by_month.entry(row.month()).or_default().push(row.total_sales);
    }

    Ok(by_month
        .into_iter()
        .map(|(month, sales)| {
            // NaN targets are skipped, as a groupby mean would
            let present: Vec<f64> = sales.into_iter().filter(|v| !v.is_nan()).collect();
            let stats = WindowStats::compute(&present);
            MonthlySeasonality {
                month,
                avg_sales: if present.is_empty() { f64::NAN } else { stats.mean },
                std_sales: stats.sample_std_dev.unwrap_or(0.0),
            }
        })
        .collect())
}
