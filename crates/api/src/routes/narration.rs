//! Narration Routes
//!
//! Thin pass-throughs to the chat-completion backend.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::AppContext;
use assistant::{ChartQuestion, ForecastSummaryRequest, ImportanceSummaryRequest};

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryReply {
    pub summary: String,
}

/// Answer a question about the chart currently on screen
pub async fn chat(
    State(ctx): State<Arc<AppContext>>,
    payload: Result<Json<ChartQuestion>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(payload) = payload?;
    debug!("chat question for {:?} chart", payload.chart_type);
    let reply = ctx.narrator.explain_chart(&payload).await?;
    Ok(Json(ChatReply { reply }))
}

/// Summarize a forecast total and its confidence range
pub async fn ai_summary(
    State(ctx): State<Arc<AppContext>>,
    payload: Result<Json<ForecastSummaryRequest>, JsonRejection>,
) -> Result<Json<SummaryReply>, ApiError> {
    let Json(payload) = payload?;
    let summary = ctx.narrator.summarize_forecast(&payload).await?;
    Ok(Json(SummaryReply { summary }))
}

/// Explain the top actionable and conceptual features
pub async fn ai_feature_importance(
    State(ctx): State<Arc<AppContext>>,
    payload: Result<Json<ImportanceSummaryRequest>, JsonRejection>,
) -> Result<Json<SummaryReply>, ApiError> {
    let Json(payload) = payload?;
    let summary = ctx.narrator.summarize_importances(&payload).await?;
    Ok(Json(SummaryReply { summary }))
}
