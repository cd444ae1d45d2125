//! Feature Vector Assembly

use crate::error::FeatureError;
use serde::{Deserialize, Serialize};

/// Number of features the sales model consumes
pub const FEATURE_DIMENSION: usize = 16;

/// Feature names in the exact order the model expects them
pub const FEATURE_NAMES: [&str; FEATURE_DIMENSION] = [
    "Lag_1",
    "Lag_2",
    "Lag_3",
    "Lag_12",
    "Month_sin",
    "Month_cos",
    "store_mean_sales",
    "store_std_sales",
    "rolling_mean_3",
    "rolling_std_3",
    "rolling_mean_6",
    "rolling_trend",
    "sales_to_avg_ratio",
    "Profit_Margin",
    "Is_Promotion_Month",
    "Average_Price",
];

/// Manager-controllable inputs (pricing, promotion timing)
pub const ACTIONABLE_FEATURES: [&str; 3] = ["Profit_Margin", "Is_Promotion_Month", "Average_Price"];

/// Ordered feature values handed to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Raw feature values, `FEATURE_DIMENSION` long
    pub values: Vec<f64>,
}

impl FeatureVector {
    /// Wrap raw values, rejecting anything that is not exactly 16 wide
    pub fn from_values(values: Vec<f64>) -> Result<Self, FeatureError> {
        if values.len() != FEATURE_DIMENSION {
            return Err(FeatureError::DimensionMismatch {
                expected: FEATURE_DIMENSION,
                actual: values.len(),
            });
        }
        Ok(Self { values })
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One store-month worth of model inputs plus its calendar position.
///
/// Values are plain `f64` so a working copy can be advanced step by step
/// without touching the table it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub year: i32,
    pub month: u32,

    pub lag_1: f64,
    pub lag_2: f64,
    pub lag_3: f64,
    pub lag_12: f64,

    pub month_sin: f64,
    pub month_cos: f64,

    pub store_mean_sales: f64,
    pub store_std_sales: f64,

    pub rolling_mean_3: f64,
    pub rolling_std_3: f64,
    pub rolling_mean_6: f64,
    pub rolling_trend: f64,
    pub sales_to_avg_ratio: f64,

    pub profit_margin: f64,
    pub is_promotion_month: f64,
    pub average_price: f64,
}

impl FeatureRecord {
    /// Build a record from a calendar position and schema-ordered values
    pub fn from_values(year: i32, month: u32, values: &[f64]) -> Result<Self, FeatureError> {
        if values.len() != FEATURE_DIMENSION {
            return Err(FeatureError::DimensionMismatch {
                expected: FEATURE_DIMENSION,
                actual: values.len(),
            });
        }
        if !(1..=12).contains(&month) {
            return Err(FeatureError::InvalidMonth(month));
        }

        Ok(Self {
            year,
            month,
            lag_1: values[0],
            lag_2: values[1],
            lag_3: values[2],
            lag_12: values[3],
            month_sin: values[4],
            month_cos: values[5],
            store_mean_sales: values[6],
            store_std_sales: values[7],
            rolling_mean_3: values[8],
            rolling_std_3: values[9],
            rolling_mean_6: values[10],
            rolling_trend: values[11],
            sales_to_avg_ratio: values[12],
            profit_margin: values[13],
            is_promotion_month: values[14],
            average_price: values[15],
        })
    }

    /// Values in `FEATURE_NAMES` order
    pub fn values(&self) -> [f64; FEATURE_DIMENSION] {
        [
            self.lag_1,
            self.lag_2,
            self.lag_3,
            self.lag_12,
            self.month_sin,
            self.month_cos,
            self.store_mean_sales,
            self.store_std_sales,
            self.rolling_mean_3,
            self.rolling_std_3,
            self.rolling_mean_6,
            self.rolling_trend,
            self.sales_to_avg_ratio,
            self.profit_margin,
            self.is_promotion_month,
            self.average_price,
        ]
    }

    /// Assemble the model input vector
    pub fn to_vector(&self) -> FeatureVector {
        FeatureVector {
            values: self.values().to_vec(),
        }
    }
}
