//! Model Abstraction

use crate::{InferenceError, LinearModel, OnnxModel};
use feature_engine::{FeatureVector, FEATURE_DIMENSION};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// A trained regression model over the 16-feature schema.
///
/// Implementations must be deterministic for the forecast guarantees to hold.
pub trait SalesModel: Send + Sync {
    /// Short label for logs and health output
    fn name(&self) -> &str;

    /// Number of inputs the model was trained on
    fn input_width(&self) -> usize {
        FEATURE_DIMENSION
    }

    /// Predict monthly sales for one feature vector
    fn predict(&self, features: &FeatureVector) -> Result<f64, InferenceError>;

    /// Predict a batch of rows
    fn predict_batch(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, InferenceError> {
        rows.iter().map(|row| self.predict(row)).collect()
    }

    /// Per-feature importance scores aligned with `FEATURE_NAMES`
    fn feature_importances(&self) -> Option<Vec<f64>> {
        None
    }
}

/// Fail fast when a model and the feature schema were not exported together
pub fn check_input_width(model: &dyn SalesModel) -> Result<(), InferenceError> {
    let width = model.input_width();
    if width != FEATURE_DIMENSION {
        return Err(InferenceError::InvalidInputShape {
            expected: FEATURE_DIMENSION,
            actual: width,
        });
    }
    Ok(())
}

/// Read an importance sidecar: a JSON array of numbers in schema order
pub fn load_importances(path: &Path) -> Result<Vec<f64>, InferenceError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&raw)
        .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))
}

/// Load a model file, choosing the format by extension
pub fn load_model(
    path: &Path,
    importances: Option<&Path>,
) -> Result<Arc<dyn SalesModel>, InferenceError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let model: Arc<dyn SalesModel> = match extension.as_deref() {
        Some("onnx") => {
            let mut model = OnnxModel::load(path)?;
            if let Some(sidecar) = importances {
                model = model.with_importances(load_importances(sidecar)?);
            }
            Arc::new(model)
        }
        Some("json") => {
            let mut model = LinearModel::from_path(path)?;
            if let Some(sidecar) = importances {
                model = model.with_importances(load_importances(sidecar)?);
            }
            Arc::new(model)
        }
        other => {
            return Err(InferenceError::ModelLoadError(format!(
                "unsupported model format {:?} for {}",
                other.unwrap_or(""),
                path.display()
            )))
        }
    };

    check_input_width(model.as_ref())?;
    info!("Loaded model {} from {}", model.name(), path.display());
    Ok(model)
}
