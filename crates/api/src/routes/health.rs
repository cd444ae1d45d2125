//! Health and Telemetry Routes

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::AppContext;

pub async fn index() -> &'static str {
    "ML Forecast API is live and working!"
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub stores: usize,
    pub rows: usize,
    pub model: String,
    pub narration_enabled: bool,
}

pub async fn health(State(ctx): State<Arc<AppContext>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: ctx.version.clone(),
        uptime_seconds: ctx.start_time.elapsed().as_secs(),
        stores: ctx.table.store_ids().len(),
        rows: ctx.table.len(),
        model: ctx.model().name().to_string(),
        narration_enabled: ctx.narrator.is_enabled(),
    })
}

/// Prometheus text exposition
pub async fn telemetry(State(ctx): State<Arc<AppContext>>) -> impl IntoResponse {
    match &ctx.telemetry {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/plain")],
            "metrics recorder not installed".to_string(),
        ),
    }
}
