//! Sales Inference Engine
//!
//! Wraps a pre-trained regression model behind [`SalesModel`] and runs the
//! recursive month-by-month forecast over a store's latest observation.

mod engine;
mod linear;
mod model;
mod onnx;

pub use engine::{
    ForecastEngine, ForecastSequence, ForecastStep, ForecastTrace, DEFAULT_ERROR_MARGIN,
    DEFAULT_HORIZON,
};
pub use linear::LinearModel;
pub use model::{check_input_width, load_importances, load_model, SalesModel};
pub use onnx::OnnxModel;

use storage::StoreId;
use thiserror::Error;

/// Errors during model loading or inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected} features, got {actual}")]
    InvalidInputShape { expected: usize, actual: usize },
    #[error("Store {0} not found.")]
    StoreNotFound(StoreId),
}
