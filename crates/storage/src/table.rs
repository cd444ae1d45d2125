//! Historical Sales Table

use feature_engine::FeatureRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

/// Store identifier as it appears in the `Store Number` column
pub type StoreId = i64;

/// One (store, year, month) observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub store: StoreId,
    /// Actual monthly sales (`Total_Sales`)
    pub total_sales: f64,
    /// Model inputs and calendar position
    pub features: FeatureRecord,
}

impl ObservationRecord {
    pub fn year(&self) -> i32 {
        self.features.year
    }

    pub fn month(&self) -> u32 {
        self.features.month
    }
}

/// Immutable table of observations in load order
#[derive(Debug, Clone, Default)]
pub struct SalesTable {
    rows: Vec<ObservationRecord>,
}

impl SalesTable {
    /// Create a table from already-parsed rows
    pub fn new(rows: Vec<ObservationRecord>) -> Self {
        info!("Sales table holds {} rows", rows.len());
        Self { rows }
    }

    /// All rows in load order
    pub fn rows(&self) -> &[ObservationRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows of one store ordered by (year, month); ties keep load order
    pub fn store_history(&self, store: StoreId) -> Vec<&ObservationRecord> {
        let mut history: Vec<_> = self.rows.iter().filter(|r| r.store == store).collect();
        history.sort_by_key(|r| (r.year(), r.month()));
        history
    }

    /// Most recent observation of a store
    pub fn latest(&self, store: StoreId) -> Option<&ObservationRecord> {
        self.store_history(store).last().copied()
    }

    pub fn contains_store(&self, store: StoreId) -> bool {
        self.rows.iter().any(|r| r.store == store)
    }

    /// Distinct store identifiers, ascending
    pub fn store_ids(&self) -> Vec<StoreId> {
        self.rows
            .iter()
            .map(|r| r.store)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Trailing `n` rows in load order
    pub fn tail(&self, n: usize) -> &[ObservationRecord] {
        &self.rows[self.rows.len().saturating_sub(n)..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::FEATURE_DIMENSION;

    fn record(store: StoreId, year: i32, month: u32, sales: f64) -> ObservationRecord {
        let mut values = [0.0; FEATURE_DIMENSION];
        values[0] = sales;
        ObservationRecord {
            store,
            total_sales: sales,
            features: FeatureRecord::from_values(year, month, &values).unwrap(),
        }
    }

    fn sample_table() -> SalesTable {
        SalesTable::new(vec![
            record(7, 2022, 12, 3.0),
            record(2, 2022, 1, 10.0),
            record(7, 2022, 2, 1.0),
            record(7, 2023, 1, 4.0),
            record(2, 2021, 11, 9.0),
            record(7, 2022, 11, 2.0),
        ])
    }

    #[test]
    fn test_store_history_sorted_by_calendar() {
        let table = sample_table();
        let months: Vec<_> = table
            .store_history(7)
            .iter()
            .map(|r| (r.year(), r.month()))
            .collect();
        assert_eq!(months, vec![(2022, 2), (2022, 11), (2022, 12), (2023, 1)]);
    }

    #[test]
    fn test_latest_record() {
        let table = sample_table();
        assert_eq!(table.latest(7).unwrap().total_sales, 4.0);
        assert_eq!(table.latest(2).unwrap().total_sales, 10.0);
        assert!(table.latest(99999).is_none());
    }

    #[test]
    fn test_store_ids_distinct_sorted() {
        let table = sample_table();
        assert_eq!(table.store_ids(), vec![2, 7]);
        assert!(table.contains_store(2));
        assert!(!table.contains_store(3));
    }

    #[test]
    fn test_tail() {
        let table = sample_table();
        assert_eq!(table.tail(2).len(), 2);
        assert_eq!(table.tail(2)[1].total_sales, 2.0);
        assert_eq!(table.tail(200).len(), 6);
        assert!(SalesTable::default().tail(5).is_empty());
    }
}
