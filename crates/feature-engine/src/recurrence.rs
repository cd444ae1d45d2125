//! One-Month-Ahead Feature Recurrence
//!
//! After the model predicts a month, the next month's inputs are regenerated
//! from the shifted lag window. Store aggregates, `Lag_12` and the business
//! features are carried over unchanged.

use crate::features::FeatureRecord;
use crate::statistics::WindowStats;
use std::f64::consts::PI;
use tracing::trace;

/// Keeps `sales_to_avg_ratio` finite when the rolling mean is zero
pub const RATIO_EPSILON: f64 = 1e-6;

/// Calendar month following `(year, month)`
pub fn next_period(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// Sine/cosine encoding of a month on a 12-period cycle
pub fn month_encoding(month: u32) -> (f64, f64) {
    let angle = 2.0 * PI * month as f64 / 12.0;
    (angle.sin(), angle.cos())
}

impl FeatureRecord {
    /// Produce the next month's record given this month's prediction
    pub fn advance(self, predicted: f64) -> Self {
        let lag_1 = predicted;
        let lag_2 = self.lag_1;
        let lag_3 = self.lag_2;

        let (year, month) = next_period(self.year, self.month);
        let (month_sin, month_cos) = month_encoding(month);

        let lags = [lag_1, lag_2, lag_3];
        let short = WindowStats::compute(&lags);

        // No six-month history exists at inference time, so the window is
        // padded with three copies of the three-month mean.
        let padded = [lag_1, lag_2, lag_3, short.mean, short.mean, short.mean];
        let rolling_mean_6 = WindowStats::mean_of(&padded);

        trace!(year, month, lag_1, rolling_mean_3 = short.mean, "advanced feature record");

        Self {
            year,
            month,
            lag_1,
            lag_2,
            lag_3,
            month_sin,
            month_cos,
            rolling_mean_3: short.mean,
            rolling_std_3: short.std_dev,
            rolling_mean_6,
            rolling_trend: short.mean - rolling_mean_6,
            sales_to_avg_ratio: predicted / (short.mean + RATIO_EPSILON),
            ..self
        }
    }
}
