//! ONNX Regression Model
//!
//! Runs a tree-ensemble or linear regressor exported to ONNX (input
//! `[1, 16]` float32, single scalar output) with tract.

use crate::{InferenceError, SalesModel};
use feature_engine::{FeatureVector, FEATURE_DIMENSION};
use std::path::Path;
use tracing::{debug, info};
use tract_onnx::prelude::*;

type Plan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

pub struct OnnxModel {
    plan: Plan,
    name: String,
    importances: Option<Vec<f64>>,
}

impl OnnxModel {
    /// Load and optimize an ONNX model for single-row inference
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        info!("Loading ONNX model from {}", path.display());
        let load_err = |e: TractError| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e));

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(load_err)?
            .with_input_fact(0, f32::fact([1, FEATURE_DIMENSION]).into())
            .map_err(load_err)?
            .into_optimized()
            .map_err(load_err)?
            .into_runnable()
            .map_err(load_err)?;

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("onnx")
            .to_string();

        Ok(Self {
            plan,
            name,
            importances: None,
        })
    }

    pub fn with_importances(mut self, importances: Vec<f64>) -> Self {
        self.importances = Some(importances);
        self
    }
}

impl SalesModel for OnnxModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, features: &FeatureVector) -> Result<f64, InferenceError> {
        if features.len() != FEATURE_DIMENSION {
            return Err(InferenceError::InvalidInputShape {
                expected: FEATURE_DIMENSION,
                actual: features.len(),
            });
        }

        let values: Vec<f32> = features.as_slice().iter().map(|v| *v as f32).collect();
        let input = Tensor::from_shape(&[1, FEATURE_DIMENSION], &values)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let output = outputs
            .first()
            .ok_or_else(|| InferenceError::InferenceFailed("model produced no outputs".to_string()))?
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let value = output
            .iter()
            .next()
            .copied()
            .ok_or_else(|| InferenceError::InferenceFailed("empty model output".to_string()))?;

        debug!("ONNX prediction {}", value);
        Ok(value as f64)
    }

    fn feature_importances(&self) -> Option<Vec<f64>> {
        self.importances.clone()
    }
}
