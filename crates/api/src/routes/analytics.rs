//! Analytics Routes

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::run_model;
use crate::error::ApiError;
use crate::AppContext;
use analytics::{HoldoutMetrics, ImportanceSplit, MonthlySeasonality};
use storage::StoreId;

/// Holdout MAE / RMSE
pub async fn metrics(State(ctx): State<Arc<AppContext>>) -> Result<Json<HoldoutMetrics>, ApiError> {
    let metrics = run_model(move || {
        analytics::holdout_metrics(&ctx.table, ctx.model(), ctx.forecast.holdout_rows)
    })
    .await?;
    Ok(Json(metrics))
}

/// Actionable vs conceptual feature importances
pub async fn feature_importance(
    State(ctx): State<Arc<AppContext>>,
) -> Result<Json<ImportanceSplit>, ApiError> {
    Ok(Json(analytics::split_importances(ctx.model())?))
}

#[derive(Debug, Deserialize)]
pub struct SeasonalityQuery {
    pub store: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SeasonalityResponse {
    pub seasonality: Vec<MonthlySeasonality>,
}

/// Monthly mean and spread, optionally for a single store
pub async fn seasonality(
    State(ctx): State<Arc<AppContext>>,
    query: Result<Query<SeasonalityQuery>, QueryRejection>,
) -> Result<Json<SeasonalityResponse>, ApiError> {
    let Query(query) = query?;
    let store = match query.store.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<StoreId>()
                .map_err(|_| ApiError::InvalidInput("Invalid store ID".to_string()))?,
        ),
    };

    let seasonality = analytics::seasonality(&ctx.table, store)?;
    Ok(Json(SeasonalityResponse { seasonality }))
}

#[derive(Debug, Serialize)]
pub struct StoresResponse {
    pub stores: Vec<StoreId>,
}

pub async fn stores(State(ctx): State<Arc<AppContext>>) -> Json<StoresResponse> {
    Json(StoresResponse {
        stores: analytics::list_stores(&ctx.table),
    })
}
