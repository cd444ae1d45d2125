//! Iterative Forecast Engine
//!
//! Each month's prediction is fed back as the newest lag before the next
//! month's inputs are regenerated, so an n-month forecast costs n model calls.

use crate::model::check_input_width;
use crate::{InferenceError, SalesModel};
use feature_engine::{round2, FeatureRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storage::{SalesTable, StoreId};
use tracing::{debug, info};

/// Historical mean absolute error used as a fixed uncertainty band
pub const DEFAULT_ERROR_MARGIN: f64 = 5000.0;

/// Months forecast when the request does not say
pub const DEFAULT_HORIZON: usize = 4;

/// One forecast month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastStep {
    pub predicted: f64,
    pub upper: f64,
    pub lower: f64,
}

impl ForecastStep {
    /// Symmetric band around `predicted`, floored at zero
    pub fn with_margin(predicted: f64, margin: f64) -> Self {
        Self {
            predicted,
            upper: predicted + margin,
            lower: (predicted - margin).max(0.0),
        }
    }

    fn rounded(self) -> Self {
        Self {
            predicted: round2(self.predicted),
            upper: round2(self.upper),
            lower: round2(self.lower),
        }
    }
}

/// Forecast for one store over the requested horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSequence {
    #[serde(rename = "prediction")]
    pub steps: Vec<ForecastStep>,
    pub total: f64,
}

impl ForecastSequence {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Forecast plus the working record after every step
#[derive(Debug, Clone)]
pub struct ForecastTrace {
    pub sequence: ForecastSequence,
    /// `states[i]` is the record the model would see for month `i + 1`
    pub states: Vec<FeatureRecord>,
}

/// Runs recursive forecasts against a shared, read-only model
#[derive(Clone)]
pub struct ForecastEngine {
    model: Arc<dyn SalesModel>,
    error_margin: f64,
}

impl ForecastEngine {
    /// Create an engine, rejecting models whose input width is not 16
    pub fn new(model: Arc<dyn SalesModel>, error_margin: f64) -> Result<Self, InferenceError> {
        check_input_width(model.as_ref())?;
        info!(
            "Forecast engine ready: model={}, error_margin={}",
            model.name(),
            error_margin
        );
        Ok(Self {
            model,
            error_margin,
        })
    }

    pub fn model(&self) -> &Arc<dyn SalesModel> {
        &self.model
    }

    pub fn error_margin(&self) -> f64 {
        self.error_margin
    }

    /// Forecast `horizon` months past the store's latest observation
    pub fn forecast(
        &self,
        table: &SalesTable,
        store: StoreId,
        horizon: usize,
    ) -> Result<ForecastSequence, InferenceError> {
        self.forecast_with_trace(table, store, horizon)
            .map(|trace| trace.sequence)
    }

    /// Same as [`forecast`](Self::forecast) but also returns intermediate states
    pub fn forecast_with_trace(
        &self,
        table: &SalesTable,
        store: StoreId,
        horizon: usize,
    ) -> Result<ForecastTrace, InferenceError> {
        let latest = table
            .latest(store)
            .ok_or(InferenceError::StoreNotFound(store))?;

        debug!(
            "Forecasting store {} from {}-{:02} for {} months",
            store,
            latest.year(),
            latest.month(),
            horizon
        );

        self.forecast_from(latest.features, horizon)
    }

    /// Run the recurrence from an explicit starting record
    pub fn forecast_from(
        &self,
        start: FeatureRecord,
        horizon: usize,
    ) -> Result<ForecastTrace, InferenceError> {
        let mut steps = Vec::with_capacity(horizon);
        let mut states = Vec::with_capacity(horizon);
        let mut record = start;
        let mut total = 0.0;

        for step in 0..horizon {
            let predicted = self.model.predict(&record.to_vector())?;
            debug!(step, predicted, year = record.year, month = record.month, "forecast step");

            steps.push(ForecastStep::with_margin(predicted, self.error_margin).rounded());
            total += predicted;

            record = record.advance(predicted);
            states.push(record);
        }

        Ok(ForecastTrace {
            sequence: ForecastSequence {
                steps,
                total: round2(total),
            },
            states,
        })
    }
}
