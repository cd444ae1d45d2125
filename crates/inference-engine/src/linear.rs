//! Linear Regression Model
//!
//! JSON export of a fitted linear model: `{"intercept", "coefficients",
//! "importances"?}`. Also handy as a deterministic stand-in in tests.

use crate::{InferenceError, SalesModel};
use feature_engine::{FeatureVector, FEATURE_DIMENSION};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    #[serde(default = "default_name")]
    pub name: String,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub importances: Option<Vec<f64>>,
}

fn default_name() -> String {
    "linear".to_string()
}

impl LinearModel {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self {
            name: default_name(),
            intercept,
            coefficients,
            importances: None,
        }
    }

    /// Model that ignores its inputs and always returns `value`
    pub fn constant(value: f64) -> Self {
        Self::new(value, vec![0.0; FEATURE_DIMENSION])
    }

    pub fn with_importances(mut self, importances: Vec<f64>) -> Self {
        self.importances = Some(importances);
        self
    }

    pub fn from_json_str(raw: &str) -> Result<Self, InferenceError> {
        serde_json::from_str(raw).map_err(|e| InferenceError::ModelLoadError(e.to_string()))
    }

    pub fn from_path(path: &Path) -> Result<Self, InferenceError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&raw)
    }
}

impl SalesModel for LinearModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_width(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, features: &FeatureVector) -> Result<f64, InferenceError> {
        if features.len() != self.coefficients.len() {
            return Err(InferenceError::InvalidInputShape {
                expected: self.coefficients.len(),
                actual: features.len(),
            });
        }

        let dot: f64 = self
            .coefficients
            .iter()
            .zip(features.as_slice())
            .map(|(w, x)| w * x)
            .sum();
        Ok(self.intercept + dot)
    }

    fn feature_importances(&self) -> Option<Vec<f64>> {
        self.importances.clone()
    }
}
