//! Route Handlers

pub mod analytics;
pub mod forecast;
pub mod health;
pub mod narration;

use crate::error::ApiError;
use serde_json::Value;
use storage::StoreId;

/// Read the required `store` field: an integer, or a string holding one
pub(crate) fn store_field(body: &Value) -> Result<StoreId, ApiError> {
    let invalid = || ApiError::InvalidInput("Missing or invalid 'store'".to_string());
    match body.get("store") {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as StoreId))
            .ok_or_else(invalid),
        Some(Value::String(s)) => s.trim().parse().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

/// Read an optional count. Absent or non-numeric values fall back to
/// `default`; numbers at or below zero mean zero.
pub(crate) fn count_field(body: &Value, key: &str, default: usize) -> usize {
    let parsed = match body.get(key) {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.map_or(default, |v| v.max(0) as usize)
}

/// Run synchronous model work off the async workers
pub(crate) async fn run_model<T, E, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Upstream(format!("model task failed: {}", e)))?
        .map_err(Into::into)
}
