//! Forecast Routes

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::{count_field, run_model, store_field};
use crate::error::ApiError;
use crate::AppContext;
use analytics::ComparisonPoint;
use inference_engine::ForecastSequence;

/// Forecast the next `weeks` months for a store
pub async fn predict(
    State(ctx): State<Arc<AppContext>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ForecastSequence>, ApiError> {
    let Json(body) = body?;
    let store = store_field(&body)?;
    let horizon = count_field(&body, "weeks", ctx.forecast.default_horizon);
    if horizon > ctx.forecast.max_horizon {
        return Err(ApiError::InvalidInput(format!(
            "'weeks' must be at most {}",
            ctx.forecast.max_horizon
        )));
    }
    debug!(store, horizon, "forecast requested");

    let start = Instant::now();
    let worker = Arc::clone(&ctx);
    let sequence = run_model(move || worker.engine.forecast(&worker.table, store, horizon)).await?;

    metrics::counter!("forecast_requests_total").increment(1);
    metrics::counter!("forecast_steps_total").increment(horizon as u64);
    metrics::histogram!("forecast_duration_seconds").record(start.elapsed().as_secs_f64());
    info!(store, horizon, total = sequence.total, "forecast served");

    Ok(Json(sequence))
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub data: Vec<ComparisonPoint>,
}

/// Actual vs predicted sales for a store's most recent months
pub async fn compare(
    State(ctx): State<Arc<AppContext>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<CompareResponse>, ApiError> {
    let Json(body) = body?;
    let store = store_field(&body)?;
    let points = count_field(&body, "num_points", ctx.forecast.default_compare_points);

    let worker = Arc::clone(&ctx);
    let data =
        run_model(move || analytics::compare(&worker.table, worker.model(), store, points)).await?;
    Ok(Json(CompareResponse { data }))
}
